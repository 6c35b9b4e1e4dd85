//! Run configuration: command-line flags and the controls derived from them.

use crate::embedder::{EmbedderConfig, EmbeddingBackend};
use crate::fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::page::{PageRef, PageRefError};
use clap::Parser;
use std::time::Duration;
use url::Url;

/// Default wiki the traversal runs against.
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

/// Tunable knobs that bound a traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HopControls {
    base_url: Url,
    max_hops: Option<usize>,
}

impl HopControls {
    /// Constructs a new set of hop controls.
    pub fn new(base_url: Url, max_hops: Option<usize>) -> Self {
        Self { base_url, max_hops }
    }

    /// Site every page reference resolves against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Optional ceiling on accepted hops; `None` runs until a terminal state.
    pub fn max_hops(&self) -> Option<usize> {
        self.max_hops
    }

    /// Absolute URL for `page`.
    pub fn resolve(&self, page: &PageRef) -> Result<Url, ConfigError> {
        page.resolve(&self.base_url)
            .map_err(|source| ConfigError::Resolve {
                page: page.to_string(),
                source,
            })
    }
}

/// Configuration problems detected before a run starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `--base-url` is not an absolute http(s) URL.
    #[error("invalid base url {url:?}: {reason}")]
    BaseUrl {
        /// Supplied value.
        url: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A start or target page could not be parsed.
    #[error("invalid {role} page: {source}")]
    Page {
        /// `start` or `target`.
        role: &'static str,
        /// Parse failure.
        #[source]
        source: PageRefError,
    },
    /// A page reference does not form a valid URL on the base site.
    #[error("cannot resolve {page} against the base url: {source}")]
    Resolve {
        /// Offending reference.
        page: String,
        /// URL parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Command-line interface for the `wikihop` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikihop",
    about = "Greedily hop from one wiki article to another by anchor-text similarity"
)]
pub struct Cli {
    /// Start article (title, Title_With_Underscores or /wiki/ path)
    #[arg(long, env = "WIKIHOP_START")]
    pub start: String,

    /// Target article (title, Title_With_Underscores or /wiki/ path)
    #[arg(long, env = "WIKIHOP_TARGET")]
    pub target: String,

    /// Wiki site root that page paths resolve against
    #[arg(long, env = "WIKIHOP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User-Agent header sent with page requests
    #[arg(long, env = "WIKIHOP_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Seconds to wait for each page request
    #[arg(long, env = "WIKIHOP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Stop after this many hops (unbounded when omitted)
    #[arg(long, env = "WIKIHOP_MAX_HOPS")]
    pub max_hops: Option<usize>,

    /// Embedding backend used to score anchor text
    #[arg(long, env = "WIKIHOP_BACKEND", value_enum, default_value_t = EmbeddingBackend::OpenAi)]
    pub backend: EmbeddingBackend,

    /// OpenAI API key used for embedding calls
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Embedding model identifier (e.g. text-embedding-3-small)
    #[arg(
        long,
        env = "WIKIHOP_OPENAI_MODEL",
        default_value = "text-embedding-3-small"
    )]
    pub openai_model: String,

    /// Base URL for the OpenAI-compatible API
    #[arg(
        long,
        env = "WIKIHOP_OPENAI_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    pub openai_base_url: String,

    /// Optional dimension override when supported by the model
    #[arg(long, env = "WIKIHOP_OPENAI_DIMENSIONS")]
    pub openai_dimensions: Option<usize>,

    /// Max texts to send per embedding request
    #[arg(long, env = "WIKIHOP_OPENAI_BATCH", default_value_t = 64)]
    pub openai_batch: usize,

    /// Max seconds to wait for each embedding request
    #[arg(long, env = "WIKIHOP_OPENAI_TIMEOUT_SECS", default_value_t = 30)]
    pub openai_timeout_secs: u64,

    /// Vector size for the offline hashed backend
    #[arg(long, env = "WIKIHOP_HASHED_DIMENSIONS", default_value_t = crate::embedder::hashed::DEFAULT_DIMENSIONS)]
    pub hashed_dimensions: usize,

    /// Print the summary as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// Converts the parsed CLI into `HopControls`.
    pub fn build_controls(&self) -> Result<HopControls, ConfigError> {
        let base_url = parse_base_url(&self.base_url)?;
        Ok(HopControls::new(base_url, self.max_hops))
    }

    /// Start and target page references.
    pub fn endpoints(&self) -> Result<(PageRef, PageRef), ConfigError> {
        let start = PageRef::parse(&self.start).map_err(|source| ConfigError::Page {
            role: "start",
            source,
        })?;
        let target = PageRef::parse(&self.target).map_err(|source| ConfigError::Page {
            role: "target",
            source,
        })?;
        Ok((start, target))
    }

    /// Timeout applied to page requests.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Settings for the one-time embedder load.
    pub fn embedder_config(&self) -> EmbedderConfig {
        EmbedderConfig {
            backend: self.backend,
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
            dimensions: self.openai_dimensions,
            batch_size: self.openai_batch.max(1),
            timeout: Duration::from_secs(self.openai_timeout_secs.max(1)),
            hashed_dimensions: self.hashed_dimensions,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::BaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
