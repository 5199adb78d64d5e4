//! Content acquisition: turn a reference into raw image bytes.
//!
//! A reference starting with `data:` is decoded in place; anything else is
//! resolved to an absolute URL and fetched with a single GET. Bytes are never
//! decoded as an image, they stay an opaque payload.
//!
//! Only `data:[<mime>];base64,<payload>` is understood. Any other encoding
//! token yields `Ok(None)`: no content, but not an error either.

use crate::config::UrlResolution;
use crate::error::ImageError;
use crate::pipeline::resolve;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Standard alphabet with padding, lenient about non-zero trailing bits
/// (`QR==` decodes to `A`) as browsers and most decoders are.
const INLINE_DATA: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A reference made ready for acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    /// Absolute URL to GET.
    RemoteUrl(String),
    /// Payload decoded from a `data:` reference.
    InlineData(Vec<u8>),
}

/// Whether `reference` uses the inline data scheme.
pub fn is_data_scheme(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Decode a `data:` reference.
///
/// Returns `Ok(None)` when the header does not end in `base64`.
pub fn parse_data_scheme(reference: &str) -> Result<Option<Vec<u8>>, ImageError> {
    let (header, payload) =
        reference
            .split_once(',')
            .ok_or_else(|| ImageError::MalformedDataScheme {
                reference: reference.to_string(),
            })?;

    if !header.ends_with("base64") {
        debug!("Unsupported data: encoding in header '{}'", header);
        return Ok(None);
    }

    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    INLINE_DATA
        .decode(payload.as_bytes())
        .map(Some)
        .map_err(|e| ImageError::DecodeFailure {
            reference: reference.to_string(),
            detail: e.to_string(),
        })
}

/// Classify a reference: decode inline data or resolve the remote URL.
///
/// `Ok(None)` means an inline reference in an unsupported encoding.
pub fn resolve_source(
    reference: &str,
    page: &Url,
    mode: UrlResolution,
) -> Result<Option<ResolvedSource>, ImageError> {
    if is_data_scheme(reference) {
        return Ok(parse_data_scheme(reference)?.map(ResolvedSource::InlineData));
    }
    resolve::resolve(reference, page, mode).map(|url| Some(ResolvedSource::RemoteUrl(url)))
}

/// GET `url` once and return the body of a `200 OK` response.
///
/// `timeout_secs == 0` waits indefinitely.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    timeout_secs: u64,
) -> Result<Vec<u8>, ImageError> {
    let mut request = client.get(url);
    if timeout_secs > 0 {
        request = request.timeout(Duration::from_secs(timeout_secs));
    }

    let response = request.send().await.map_err(|e| {
        warn!("Image request failed for {}: {}", url, e);
        ImageError::FetchFailure {
            url: url.to_string(),
            detail: if e.is_timeout() {
                format!("timed out after {timeout_secs}s")
            } else {
                e.to_string()
            },
        }
    })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ImageError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImageError::FetchFailure {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

    debug!("Fetched {} ({} bytes)", url, bytes.len());
    Ok(bytes.to_vec())
}

/// Return the bytes for an already resolved source.
pub async fn acquire(
    client: &reqwest::Client,
    source: ResolvedSource,
    timeout_secs: u64,
) -> Result<Vec<u8>, ImageError> {
    match source {
        ResolvedSource::InlineData(bytes) => Ok(bytes),
        ResolvedSource::RemoteUrl(url) => fetch(client, &url, timeout_secs).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn decodes_base64_png() {
        let bytes = parse_data_scheme("data:image/png;base64,QUJD").unwrap();
        assert_eq!(bytes, Some(b"ABC".to_vec()));
    }

    #[test]
    fn round_trips_known_payload() {
        let original: Vec<u8> = (0u8..=255).collect();
        let reference = format!("data:image/png;base64,{}", STANDARD.encode(&original));
        assert_eq!(parse_data_scheme(&reference).unwrap(), Some(original));
    }

    #[test]
    fn non_zero_trailing_bits_are_accepted() {
        // canonical form of "A" is QQ==
        let bytes = parse_data_scheme("data:image/gif;base64,QR==").unwrap();
        assert_eq!(bytes, Some(b"A".to_vec()));
    }

    #[test]
    fn whitespace_in_payload_is_ignored() {
        let bytes = parse_data_scheme("data:image/png;base64, QU\nJD ").unwrap();
        assert_eq!(bytes, Some(b"ABC".to_vec()));
    }

    #[test]
    fn missing_comma_is_malformed() {
        let err = parse_data_scheme("data:image/png;base64").unwrap_err();
        assert!(matches!(err, ImageError::MalformedDataScheme { .. }));
    }

    #[test]
    fn non_base64_encoding_yields_no_content() {
        assert_eq!(
            parse_data_scheme("data:image/svg+xml;utf8,<svg></svg>").unwrap(),
            None
        );
        assert_eq!(parse_data_scheme("data:,hello").unwrap(), None);
    }

    #[test]
    fn invalid_payload_is_decode_failure() {
        let err = parse_data_scheme("data:image/png;base64,Q!!").unwrap_err();
        assert!(matches!(err, ImageError::DecodeFailure { .. }));
    }

    #[test]
    fn resolve_source_branches() {
        let page = Url::parse("http://x.test/a/b.html").unwrap();
        assert_eq!(
            resolve_source("data:image/gif;base64,QUJD", &page, UrlResolution::Rfc3986).unwrap(),
            Some(ResolvedSource::InlineData(b"ABC".to_vec()))
        );
        assert_eq!(
            resolve_source("pic.jpg", &page, UrlResolution::Rfc3986).unwrap(),
            Some(ResolvedSource::RemoteUrl("http://x.test/a/pic.jpg".into()))
        );
    }

    #[test]
    fn acquire_inline_needs_no_network() {
        let client = reqwest::Client::new();
        let bytes = tokio_test::block_on(acquire(
            &client,
            ResolvedSource::InlineData(vec![1, 2, 3]),
            0,
        ))
        .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
