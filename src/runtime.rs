//! Traversal driver: fetch, extract, select, repeat.

use crate::candidates::{extract_candidates, MAX_CANDIDATES};
use crate::controls::{Cli, HopControls};
use crate::embedder::{self, Embedder, EmbeddingError};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::html::parse_anchors;
use crate::outcome::{TraversalOutcome, TraversalStatus};
use crate::page::PageRef;
use crate::similarity::select_best;
use anyhow::Context;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Greedy single-path walker over a wiki.
///
/// Owns its fetcher and embedder for the lifetime of the value, so the
/// embedding backend is loaded once and reused for every hop.
pub struct Traversal<F, E> {
    fetcher: F,
    embedder: E,
    controls: HopControls,
}

impl<F, E> Traversal<F, E>
where
    F: PageFetcher,
    E: Embedder,
{
    /// Wires a traversal from its collaborators.
    pub fn new(fetcher: F, embedder: E, controls: HopControls) -> Self {
        Self {
            fetcher,
            embedder,
            controls,
        }
    }

    /// Controls this traversal runs with.
    pub fn controls(&self) -> &HopControls {
        &self.controls
    }

    /// Walks from `start` until `target`, a dead end, a failed fetch or the
    /// optional hop ceiling.
    ///
    /// Fetch failures end the run with [`TraversalStatus::FetchFailed`];
    /// embedding failures abort it and are returned as errors.
    pub fn run(&self, start: PageRef, target: &PageRef) -> Result<TraversalOutcome, EmbeddingError> {
        let started = Instant::now();
        let mut visited: HashSet<PageRef> = HashSet::new();
        let mut path: Vec<String> = Vec::new();
        let mut hops = 0usize;
        let mut current = start;

        info!(
            start = %current,
            target = %target,
            embedder = self.embedder.name(),
            "starting traversal"
        );

        let status = loop {
            if current == *target {
                break TraversalStatus::TargetReached;
            }
            if let Some(limit) = self.controls.max_hops() {
                if hops >= limit {
                    break TraversalStatus::HopLimitReached { limit };
                }
            }

            visited.insert(current.clone());
            let url = self.url_for(&current);
            info!(%url, hop = hops, "visiting");

            let body = match self.fetcher.fetch(&url) {
                Ok(body) => body,
                Err(err) => {
                    warn!(%url, error = %err, "fetch failed");
                    break TraversalStatus::FetchFailed {
                        reason: err.to_string(),
                    };
                }
            };

            let anchors = parse_anchors(&body);
            let candidates = extract_candidates(&anchors, &visited, MAX_CANDIDATES);
            debug!(
                anchors = anchors.len(),
                candidates = candidates.len(),
                "extracted candidates"
            );

            let Some(next) = select_best(&self.embedder, &candidates, target)? else {
                break TraversalStatus::NoValidLink;
            };
            path.push(self.url_for(&next));
            current = next;
            hops += 1;
        };

        let outcome = TraversalOutcome {
            status,
            elapsed: started.elapsed(),
            hops,
            final_url: self.url_for(&current),
            final_page: current,
            path,
        };
        info!(
            status = ?outcome.status,
            hops = outcome.hops,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "traversal finished"
        );
        Ok(outcome)
    }

    fn url_for(&self, page: &PageRef) -> String {
        match self.controls.resolve(page) {
            Ok(url) => url.into(),
            Err(err) => {
                warn!(%page, error = %err, "falling back to raw concatenation");
                format!(
                    "{}{}",
                    self.controls.base_url().as_str().trim_end_matches('/'),
                    page
                )
            }
        }
    }
}

/// Entry point used by the binary: builds collaborators from `cli` and runs once.
pub fn run(cli: &Cli) -> anyhow::Result<TraversalOutcome> {
    let controls = cli.build_controls()?;
    let (start, target) = cli.endpoints()?;
    let fetcher = HttpFetcher::new(&cli.user_agent, cli.fetch_timeout())
        .context("failed to build HTTP client")?;
    let embedder = embedder::load(&cli.embedder_config()).context("failed to load embedder")?;

    let traversal = Traversal::new(fetcher, embedder, controls);
    let outcome = traversal
        .run(start, &target)
        .context("traversal aborted by embedding failure")?;
    Ok(outcome)
}
