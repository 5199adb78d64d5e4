//! Filename normalisation: derive a safe artifact name from a reference.
//!
//! 1. `/` becomes `_`; CR and LF are removed.
//! 2. The result is cut to `max_path_len - output_dir_len` characters, keeping
//!    the start (scheme, host and early path survive, long query strings go).
//! 3. Every character outside `[A-Za-z0-9_.-]` is dropped.
//!
//! Dropping rather than replacing means two distinct references can map to
//! the same name; the later artifact then overwrites the earlier one.

use crate::error::ImageError;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Longest name allowed for an output directory of `output_dir_len` chars.
pub fn name_budget(output_dir_len: usize, max_path_len: usize) -> usize {
    max_path_len.saturating_sub(output_dir_len)
}

/// Normalise `reference` into a file name.
pub fn normalize_name(
    reference: &str,
    output_dir_len: usize,
    max_path_len: usize,
) -> Result<String, ImageError> {
    let flattened: String = reference
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == '/' { '_' } else { c })
        .collect();

    let truncated: String = flattened
        .chars()
        .take(name_budget(output_dir_len, max_path_len))
        .collect();

    let name = RE_DISALLOWED.replace_all(&truncated, "").into_owned();

    // "." and ".." would resolve to directories
    if name.is_empty() || name == "." || name == ".." {
        return Err(ImageError::EmptyNormalizedName {
            reference: reference.to_string(),
        });
    }
    Ok(name)
}
