//! Anchor extraction built on `scraper`.

use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// One hyperlink as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Raw `href` attribute value.
    pub href: String,
    /// Visible text of the element and its descendants, whitespace-collapsed.
    pub text: String,
}

impl Anchor {
    /// Convenience constructor, mostly for tests and in-memory pages.
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Returns every `a[href]` element of `html` in document order.
///
/// Malformed markup never fails; the parser recovers what it can.
pub fn parse_anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    document
        .select(anchor_selector())
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                href: href.to_string(),
                text: anchor_text(&element),
            })
        })
        .collect()
}

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("anchor selector"))
}

fn anchor_text(element: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    for piece in element.text() {
        raw.push_str(piece);
    }
    collapse_whitespace(&raw)
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim().to_string()
}
