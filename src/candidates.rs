//! Candidate link extraction: which anchors on a page are worth scoring.

use crate::html::Anchor;
use crate::page::PageRef;
use std::collections::HashSet;
use std::fmt;
use tracing::trace;

/// Fixed ceiling on the number of candidates scored per page.
pub const MAX_CANDIDATES: usize = 30;
/// Anchor texts shorter than this (in characters) carry too little signal.
pub const MIN_ANCHOR_CHARS: usize = 3;

const NOISE_MARKERS: &[&str] = &[":", "#", ".svg"];

/// An admissible outgoing link: the text to embed plus where it leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Visible anchor text, used as the embedding input.
    pub text: String,
    /// Navigable identity of the linked article.
    pub page: PageRef,
}

/// Why an anchor was excluded. Checks run in this order; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not under the article path prefix.
    NotArticle,
    /// Namespace separator, fragment marker or image-file suffix.
    Noise,
    /// Points at the landing page.
    MainPage,
    /// Anchor text below [`MIN_ANCHOR_CHARS`].
    ShortText,
    /// Target already visited during this run.
    Visited,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotArticle => "not an article path",
            Self::Noise => "namespace, fragment or media link",
            Self::MainPage => "main page",
            Self::ShortText => "anchor text too short",
            Self::Visited => "already visited",
        };
        f.write_str(label)
    }
}

/// Applies the filter policy to a single anchor.
pub fn admit(anchor: &Anchor, visited: &HashSet<PageRef>) -> Result<PageRef, Rejection> {
    let page = PageRef::from_href(&anchor.href);
    if !page.is_article_path() {
        return Err(Rejection::NotArticle);
    }
    if NOISE_MARKERS
        .iter()
        .any(|marker| anchor.href.contains(marker))
    {
        return Err(Rejection::Noise);
    }
    if page.is_main_page() {
        return Err(Rejection::MainPage);
    }
    if anchor.text.chars().count() < MIN_ANCHOR_CHARS {
        return Err(Rejection::ShortText);
    }
    if visited.contains(&page) {
        return Err(Rejection::Visited);
    }
    Ok(page)
}

/// Collects up to `max_candidates` admissible links in document order.
///
/// Stops at the cap; later anchors are never looked at. An empty result means
/// the page is a dead end.
pub fn extract_candidates<'a, I>(
    anchors: I,
    visited: &HashSet<PageRef>,
    max_candidates: usize,
) -> Vec<CandidateLink>
where
    I: IntoIterator<Item = &'a Anchor>,
{
    let mut candidates = Vec::new();
    if max_candidates == 0 {
        return candidates;
    }

    for anchor in anchors {
        match admit(anchor, visited) {
            Ok(page) => {
                candidates.push(CandidateLink {
                    text: anchor.text.clone(),
                    page,
                });
                if candidates.len() >= max_candidates {
                    break;
                }
            }
            Err(reason) => trace!(href = %anchor.href, %reason, "skipping anchor"),
        }
    }
    candidates
}
