#![warn(missing_docs)]
//! Core library entry points for the wikihop link walker.

pub mod candidates;
pub mod controls;
pub mod embedder;
pub mod fetcher;
pub mod html;
pub mod logging;
pub mod outcome;
pub mod page;
pub mod runtime;
pub mod similarity;

pub use candidates::{extract_candidates, CandidateLink, Rejection, MAX_CANDIDATES};
pub use controls::{Cli, ConfigError, HopControls};
pub use embedder::{Embedder, EmbedderConfig, EmbeddingBackend, EmbeddingError};
pub use fetcher::{FetchError, HttpFetcher, PageFetcher};
pub use html::{parse_anchors, Anchor};
pub use outcome::{TraversalOutcome, TraversalStatus};
pub use page::{PageRef, PageRefError};
pub use runtime::{run as run_traversal, Traversal};
pub use similarity::{cosine_similarity, select_best};
