//! Candidate-block rules for the HTTP strategy.
//!
//! Each rule is a pure function over the parsed document. Their results are
//! merged in rule order with duplicates (same DOM node) dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::extract::visible_text;

pub(crate) type CandidateRule = for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>;

pub(crate) const CANDIDATE_RULES: [(&str, CandidateRule); 3] = [
    ("preview_text", preview_text_blocks),
    ("show_leaflet_parent", show_leaflet_parents),
    ("structural_selector", structural_blocks),
];

const PREVIEW_MARKER: &str = "Vorschau";
const LEAFLET_MARKER: &str = "Prospekt";
const SHOW_LEAFLET_ACTION: &str = "Zeige den Prospekt";

/// Document-level containers would match the text rules for every page.
const DOCUMENT_TAGS: [&str; 3] = ["html", "head", "body"];

const STRUCTURAL_SELECTORS: [&str; 13] = [
    "div.item",
    "article",
    ".aktuelle-prospekte-item",
    ".prospekte-block",
    ".grid-item",
    ".aktuelle-prospekte .item",
    ".leaflet-preview-container",
    ".prospekt-container",
    "article.leaflet",
    "div[class*='leaflet']",
    "div[class*='prospekt']",
    ".col-md-3",
    ".col-sm-4",
];

static PARSED_STRUCTURAL: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    STRUCTURAL_SELECTORS
        .iter()
        .map(|css| (*css, Selector::parse(css).expect("valid structural selector")))
        .collect()
});

/// Runs every rule and merges the results, first occurrence wins.
pub(crate) fn collect_candidates(doc: &Html) -> Vec<ElementRef<'_>> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for (rule, find) in CANDIDATE_RULES {
        let found = find(doc);
        tracing::debug!(rule, count = found.len(), "candidate rule finished");
        for element in found {
            if seen.insert(element.id()) {
                blocks.push(element);
            }
        }
    }

    tracing::info!(count = blocks.len(), "leaflet blocks found for processing");
    blocks
}

/// Elements whose text mentions both a preview and a leaflet.
fn preview_text_blocks(doc: &Html) -> Vec<ElementRef<'_>> {
    let blocks: Vec<ElementRef<'_>> = all_elements(doc)
        .filter(|element| {
            let text = visible_text(*element);
            text.contains(PREVIEW_MARKER) && text.contains(LEAFLET_MARKER)
        })
        .collect();
    if !blocks.is_empty() {
        tracing::info!(count = blocks.len(), "found blocks with leaflet preview text");
    }
    blocks
}

/// Parents of "show the leaflet" buttons and links.
fn show_leaflet_parents(doc: &Html) -> Vec<ElementRef<'_>> {
    let blocks: Vec<ElementRef<'_>> = all_elements(doc)
        .filter(|element| own_text(*element).contains(SHOW_LEAFLET_ACTION))
        .filter_map(|element| element.parent().and_then(ElementRef::wrap))
        .collect();
    if !blocks.is_empty() {
        tracing::info!(count = blocks.len(), "found show-leaflet actions");
    }
    blocks
}

/// Elements matching the known listing-card selectors, selector by selector.
fn structural_blocks(doc: &Html) -> Vec<ElementRef<'_>> {
    let mut blocks = Vec::new();
    for (css, selector) in PARSED_STRUCTURAL.iter() {
        let before = blocks.len();
        blocks.extend(doc.select(selector));
        let count = blocks.len() - before;
        if count > 0 {
            tracing::info!(selector = css, count, "found blocks with selector");
        }
    }
    blocks
}

fn all_elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| !DOCUMENT_TAGS.contains(&element.value().name()))
}

/// Text held directly by `element`, excluding its child elements.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
        .collect()
}
