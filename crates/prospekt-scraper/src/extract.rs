//! Field extraction from a single leaflet block.
//!
//! Both discovery strategies end up with a DOM element that is believed to
//! describe one leaflet. [`DiscoveredBlock`] gathers what the record model
//! needs from it: visible text fragments, a title, the date-looking fragment
//! and a thumbnail URL.

use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Selector};

use crate::error::ScraperError;

/// Image attributes checked in order before falling back to `srcset`.
const IMAGE_SOURCE_ATTRS: [&str; 4] = ["src", "data-src", "data-lazy-src", "data-original"];

/// Elements whose text never reaches the rendered page.
const NON_VISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

static EMPHASIS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("b, strong, h2, h3, h4").expect("valid emphasis selector")
});

/// A candidate leaflet element and the raw material extracted from it.
pub struct DiscoveredBlock<'a> {
    element: ElementRef<'a>,
    texts: Vec<String>,
    image: Option<ElementRef<'a>>,
}

impl<'a> DiscoveredBlock<'a> {
    #[must_use]
    pub fn new(element: ElementRef<'a>) -> Self {
        Self {
            element,
            texts: text_fragments(element),
            image: element.select(&IMG).next(),
        }
    }

    /// Trimmed, non-empty visible text nodes in document order.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Text of the first bold or heading element, else the first fragment.
    #[must_use]
    pub fn title(&self) -> String {
        self.element
            .select(&EMPHASIS)
            .next()
            .map(|el| visible_text(el).trim().to_owned())
            .or_else(|| self.texts.first().cloned())
            .unwrap_or_default()
    }

    /// First fragment containing at least `min_periods` periods, or `""`.
    ///
    /// A run of dots is the cheapest signal for `dd.mm.yyyy`-style text.
    #[must_use]
    pub fn date_text(&self, min_periods: usize) -> &str {
        self.texts
            .iter()
            .find(|text| text.matches('.').count() >= min_periods)
            .map_or("", String::as_str)
    }

    /// Absolute URL of the block's first image, if it names one.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] when the image reference cannot be
    /// resolved against `base`.
    pub fn thumbnail(&self, base: &Url) -> Result<Option<String>, ScraperError> {
        self.image
            .and_then(image_source)
            .map(|src| resolve_url(base, src))
            .transpose()
    }

    /// Like [`Self::thumbnail`], but an unresolvable reference is logged and
    /// treated as no image.
    #[must_use]
    pub fn usable_thumbnail(&self, base: &Url) -> Option<String> {
        self.thumbnail(base).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unusable image reference; using placeholder");
            None
        })
    }
}

/// The image reference of an `<img>`: the first non-empty source attribute,
/// else the first URL of `srcset`.
#[must_use]
pub fn image_source(img: ElementRef<'_>) -> Option<&str> {
    let attrs = img.value();
    IMAGE_SOURCE_ATTRS
        .iter()
        .filter_map(|name| attrs.attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .or_else(|| {
            attrs
                .attr("srcset")
                .and_then(|srcset| {
                    srcset
                        .split(|c: char| c == ',' || c.is_whitespace())
                        .find(|t| !t.is_empty())
                })
        })
}

/// Resolves `reference` against `base`; absolute http(s) URLs pass through.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `reference` cannot be joined.
pub fn resolve_url(base: &Url, reference: &str) -> Result<String, ScraperError> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(reference.to_owned());
    }
    base.join(reference)
        .map(String::from)
        .map_err(|e| ScraperError::InvalidUrl {
            url: reference.to_owned(),
            reason: e.to_string(),
        })
}

/// Visible text fragments below `element`, trimmed, empties dropped.
#[must_use]
pub fn text_fragments(element: ElementRef<'_>) -> Vec<String> {
    visible_text_nodes(element)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// All visible text below `element`, concatenated.
#[must_use]
pub fn visible_text(element: ElementRef<'_>) -> String {
    visible_text_nodes(element).collect()
}

fn visible_text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| NON_VISIBLE_TAGS.contains(&parent.value().name()));
        (!hidden).then_some(&**text)
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
