//! Reference extraction: pick the one source reference of an `<img>` element.
//!
//! Lazy-loading and responsive-image markup routinely leaves a placeholder in
//! `src` while the real image lives in a deferred attribute, so the attributes
//! are consulted in a strict priority order:
//!
//! ```text
//! data-srcset > srcset > data-src > data-lazy > src
//! ```
//!
//! For the `srcset` family only the first whitespace-delimited token is kept.
//! That is the first candidate of the list, not a full parse of the
//! responsive-image grammar.

use crate::error::ImageError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// An attribute that may carry an image's source reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceAttribute {
    DataSrcset,
    Srcset,
    DataSrc,
    DataLazy,
    Src,
}

impl SourceAttribute {
    /// All source attributes, highest priority first.
    pub const PRIORITY: [SourceAttribute; 5] = [
        SourceAttribute::DataSrcset,
        SourceAttribute::Srcset,
        SourceAttribute::DataSrc,
        SourceAttribute::DataLazy,
        SourceAttribute::Src,
    ];

    /// The HTML attribute name.
    pub fn name(self) -> &'static str {
        match self {
            SourceAttribute::DataSrcset => "data-srcset",
            SourceAttribute::Srcset => "srcset",
            SourceAttribute::DataSrc => "data-src",
            SourceAttribute::DataLazy => "data-lazy",
            SourceAttribute::Src => "src",
        }
    }

    /// Whether the value is a responsive candidate list.
    pub fn is_srcset(self) -> bool {
        matches!(self, SourceAttribute::DataSrcset | SourceAttribute::Srcset)
    }
}

/// The reference chosen for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSource {
    pub attribute: SourceAttribute,
    pub reference: String,
}

/// One `<img>` element, reduced to what the pipeline needs.
///
/// Candidates are kept in priority order, not markup order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReference {
    pub candidates: Vec<(SourceAttribute, String)>,
    pub alt: Option<String>,
}

impl ImageReference {
    /// Build from `(name, value)` attribute pairs. Names are matched
    /// case-insensitively; the first occurrence of a name wins.
    pub fn from_attrs<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let attrs: Vec<(&str, &str)> = attrs.into_iter().collect();
        let lookup = |name: &str| {
            attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.to_string())
        };

        let candidates = SourceAttribute::PRIORITY
            .iter()
            .filter_map(|&attr| lookup(attr.name()).map(|v| (attr, v)))
            .collect();

        Self {
            candidates,
            alt: lookup("alt"),
        }
    }

    pub fn from_element(element: ElementRef<'_>) -> Self {
        Self::from_attrs(element.value().attrs())
    }

    /// Select the source reference by attribute priority.
    ///
    /// A present-but-empty attribute still wins over lower-priority ones.
    pub fn source(&self) -> Result<SelectedSource, ImageError> {
        let (attribute, value) = self
            .candidates
            .first()
            .ok_or(ImageError::NoSourceAttribute)?;

        let reference = if attribute.is_srcset() {
            first_srcset_token(value).to_string()
        } else {
            value.clone()
        };

        Ok(SelectedSource {
            attribute: *attribute,
            reference,
        })
    }
}

/// The first whitespace-delimited token of a `srcset` value.
pub fn first_srcset_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

/// All `<img>` elements of a parsed document, in document order.
pub fn find_images(document: &Html) -> Vec<ImageReference> {
    document
        .select(&IMG_SELECTOR)
        .map(ImageReference::from_element)
        .collect()
}

/// Parse `html` and return its image elements.
pub fn find_images_in_html(html: &str) -> Vec<ImageReference> {
    find_images(&Html::parse_document(html))
}
