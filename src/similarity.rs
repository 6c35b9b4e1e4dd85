//! Picks the candidate whose anchor text sits closest to the target title.

use crate::candidates::CandidateLink;
use crate::embedder::{validate_batch, Embedder, EmbeddingError};
use crate::page::PageRef;
use tracing::debug;

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero length. Accumulates in f64 so
/// large finite components do not overflow.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if !denom.is_finite() || denom <= f64::from(f32::EPSILON) {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Index of the strictly highest score; ties resolve to the earliest entry.
///
/// NaN ranks below every number, so it only wins when nothing else is there.
pub fn stable_argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        let score = if score.is_nan() { f32::NEG_INFINITY } else { score };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Scores every candidate against `target_title` in one embedding call.
///
/// The target title is embedded first, followed by the anchor texts, so a
/// backend sees a single batch per page.
pub fn score_candidates<E>(
    embedder: &E,
    candidates: &[CandidateLink],
    target_title: &str,
) -> Result<Vec<f32>, EmbeddingError>
where
    E: Embedder + ?Sized,
{
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut texts = Vec::with_capacity(candidates.len() + 1);
    texts.push(target_title);
    texts.extend(candidates.iter().map(|candidate| candidate.text.as_str()));

    let vectors = embedder.encode(&texts)?;
    validate_batch(&vectors, texts.len())?;

    let (target, rest) = vectors
        .split_first()
        .ok_or_else(|| EmbeddingError::Malformed("missing target embedding".to_string()))?;
    Ok(rest
        .iter()
        .map(|vector| cosine_similarity(target, vector))
        .collect())
}

/// Returns the page behind the best-scoring candidate, or `None` for an empty list.
pub fn select_best<E>(
    embedder: &E,
    candidates: &[CandidateLink],
    target: &PageRef,
) -> Result<Option<PageRef>, EmbeddingError>
where
    E: Embedder + ?Sized,
{
    let title = target.display_title();
    let scores = score_candidates(embedder, candidates, &title)?;
    let Some(best) = stable_argmax(&scores) else {
        return Ok(None);
    };

    let winner = &candidates[best];
    debug!(
        target = %title,
        candidates = candidates.len(),
        choice = %winner.page,
        anchor = %winner.text,
        score = scores[best],
        "selected next hop"
    );
    Ok(Some(winner.page.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashedEmbedder;
    use std::cell::Cell;
    use std::collections::HashMap;

    fn candidate(text: &str, href: &str) -> CandidateLink {
        CandidateLink {
            text: text.to_string(),
            page: PageRef::from_href(href),
        }
    }

    /// Looks texts up in a fixed table and counts calls.
    struct TableEmbedder {
        table: HashMap<&'static str, Vec<f32>>,
        calls: Cell<usize>,
    }

    impl TableEmbedder {
        fn new(entries: &[(&'static str, [f32; 2])]) -> Self {
            Self {
                table: entries.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl Embedder for TableEmbedder {
        fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.set(self.calls.get() + 1);
            texts
                .iter()
                .map(|text| {
                    self.table
                        .get(text)
                        .cloned()
                        .ok_or_else(|| EmbeddingError::Malformed(format!("unknown text {text}")))
                })
                .collect()
        }

        fn dimensions(&self) -> Option<usize> {
            Some(2)
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(stable_argmax(&[0.2, 0.9, 0.9, 0.1]), Some(1));
        assert_eq!(stable_argmax(&[0.5]), Some(0));
        assert_eq!(stable_argmax(&[-0.3, -0.1]), Some(1));
        assert_eq!(stable_argmax(&[]), None);
    }

    #[test]
    fn nan_scores_never_beat_numbers() {
        assert_eq!(stable_argmax(&[f32::NAN, 0.1, f32::NAN]), Some(1));
        assert_eq!(stable_argmax(&[f32::NAN, f32::NAN]), Some(0));
    }

    #[test]
    fn large_components_stay_finite() {
        let big = [1e30, 1e30];
        let score = cosine_similarity(&big, &big);
        assert!((score - 1.0).abs() < 1e-6, "{score}");
        assert!(cosine_similarity(&[f32::MAX, 0.0], &[f32::MAX, 0.0]).is_finite());
    }

    #[test]
    fn large_twins_still_resolve_to_the_first() {
        let embedder = TableEmbedder::new(&[
            ("Target", [1e30, 1e30]),
            ("Left twin", [1e30, 1e30]),
            ("Right twin", [1e30, 1e30]),
        ]);
        let candidates = vec![
            candidate("Left twin", "/wiki/Left"),
            candidate("Right twin", "/wiki/Right"),
        ];
        let target = PageRef::from_href("/wiki/Target");
        let best = select_best(&embedder, &candidates, &target).expect("select");
        assert_eq!(best, Some(PageRef::from_href("/wiki/Left")));
    }

    #[test]
    fn picks_most_similar_anchor() {
        let embedder = TableEmbedder::new(&[
            ("Barack Obama", [1.0, 0.0]),
            ("Potato chips", [0.0, 1.0]),
            ("President of the United States", [0.9, 0.1]),
            ("Ireland", [0.3, 0.7]),
        ]);
        let candidates = vec![
            candidate("Potato chips", "/wiki/Potato_chip"),
            candidate("President of the United States", "/wiki/President_of_the_United_States"),
            candidate("Ireland", "/wiki/Ireland"),
        ];
        let target = PageRef::from_href("/wiki/Barack_Obama");
        let best = select_best(&embedder, &candidates, &target).expect("select");
        assert_eq!(
            best,
            Some(PageRef::from_href("/wiki/President_of_the_United_States"))
        );
        assert_eq!(embedder.calls.get(), 1, "one batched call per page");
    }

    #[test]
    fn ties_resolve_to_first_candidate() {
        let embedder = TableEmbedder::new(&[
            ("Target", [1.0, 1.0]),
            ("Left twin", [2.0, 2.0]),
            ("Right twin", [2.0, 2.0]),
        ]);
        let candidates = vec![
            candidate("Left twin", "/wiki/Left"),
            candidate("Right twin", "/wiki/Right"),
        ];
        let target = PageRef::from_href("/wiki/Target");
        for _ in 0..3 {
            let best = select_best(&embedder, &candidates, &target).expect("select");
            assert_eq!(best, Some(PageRef::from_href("/wiki/Left")));
        }
    }

    #[test]
    fn empty_candidates_select_nothing_without_embedding() {
        let embedder = TableEmbedder::new(&[]);
        let target = PageRef::from_href("/wiki/Barack_Obama");
        assert_eq!(select_best(&embedder, &[], &target).expect("select"), None);
        assert_eq!(embedder.calls.get(), 0);
    }

    #[test]
    fn backend_errors_propagate() {
        let embedder = TableEmbedder::new(&[("Barack Obama", [1.0, 0.0])]);
        let candidates = vec![candidate("Unknown text", "/wiki/Unknown")];
        let target = PageRef::from_href("/wiki/Barack_Obama");
        assert!(matches!(
            select_best(&embedder, &candidates, &target),
            Err(EmbeddingError::Malformed(_))
        ));
    }

    #[test]
    fn count_mismatch_is_an_error() {
        struct Short;
        impl Embedder for Short {
            fn encode(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
                Ok(vec![vec![1.0]])
            }
            fn dimensions(&self) -> Option<usize> {
                Some(1)
            }
            fn name(&self) -> &str {
                "short"
            }
        }
        let candidates = vec![candidate("Honolulu", "/wiki/Honolulu")];
        let target = PageRef::from_href("/wiki/Barack_Obama");
        assert!(matches!(
            select_best(&Short, &candidates, &target),
            Err(EmbeddingError::CountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn works_with_hashed_backend() {
        let embedder = HashedEmbedder::default();
        let candidates = vec![
            candidate("Solanum tuberosum", "/wiki/Solanum_tuberosum"),
            candidate("Barack Obama Sr.", "/wiki/Barack_Obama_Sr."),
        ];
        let target = PageRef::from_href("/wiki/Barack_Obama");
        let best = select_best(&embedder, &candidates, &target).expect("select");
        assert_eq!(best, Some(PageRef::from_href("/wiki/Barack_Obama_Sr.")));
    }
}
