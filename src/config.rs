//! Configuration types for search, acceptance filtering, and output

use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Provider-side image type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    /// Photographic content (the original tool's default)
    Photo,
    /// Clip-art style graphics
    Clipart,
    /// Face-centric results
    Face,
    /// Line drawings
    Lineart,
    /// Animated images
    Animated,
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Clipart => write!(f, "clipart"),
            Self::Face => write!(f, "face"),
            Self::Lineart => write!(f, "lineart"),
            Self::Animated => write!(f, "animated"),
        }
    }
}

/// Provider-side safe search level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeLevel {
    /// Strict filtering (the original tool's default)
    High,
    /// Moderate filtering
    Medium,
    /// No filtering
    Off,
}

impl std::fmt::Display for SafeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Provider-side size class filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    Icon,
    Small,
    Medium,
    Large,
    Xlarge,
    Xxlarge,
    Huge,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icon => write!(f, "icon"),
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
            Self::Xlarge => write!(f, "xlarge"),
            Self::Xxlarge => write!(f, "xxlarge"),
            Self::Huge => write!(f, "huge"),
        }
    }
}

/// Provider-side aspect ratio filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    Tall,
    Square,
    Wide,
    Panoramic,
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tall => write!(f, "tall"),
            Self::Square => write!(f, "square"),
            Self::Wide => write!(f, "wide"),
            Self::Panoramic => write!(f, "panoramic"),
        }
    }
}

/// Filter options passed through verbatim to the search provider
///
/// These narrow the provider's result set server-side; they are independent
/// of the local [`AcceptanceCriteria`] applied after fetching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Image type filter (photo, clipart, ...)
    pub image_type: Option<ImageType>,
    /// Safe search level
    pub safe: Option<SafeLevel>,
    /// Size class filter
    pub size: Option<ImageSize>,
    /// Aspect ratio filter
    pub aspect_ratio: Option<AspectRatio>,
}

/// Immutable search query: the text plus provider filter options
///
/// Created once from user input at invocation start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search text (words joined with spaces)
    pub text: String,
    /// Provider filter options
    pub options: SearchOptions,
}

impl SearchQuery {
    /// Create a query with default (empty) provider options
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            options: SearchOptions::default(),
        }
    }

    /// Create a query with explicit provider options
    pub fn with_options<S: Into<String>>(text: S, options: SearchOptions) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

/// Acceptance rules a candidate must satisfy before it is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    /// Minimum decoded resolution as `(width, height)`; both axes must be
    /// met independently
    pub min_resolution: Option<(u32, u32)>,
    /// Allowed content types (case-insensitive match on the transport's
    /// declared type)
    pub allowed_content_types: Option<Vec<String>>,
    /// When set, a missing or unrecognized content type is rejected instead
    /// of falling back to the most common accepted type
    pub strict_content_type: bool,
}

impl AcceptanceCriteria {
    /// Criteria that accept everything (no fetch-side filtering)
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Criteria requiring a minimum decoded resolution
    #[must_use]
    pub fn min_resolution(width: u32, height: u32) -> Self {
        Self {
            min_resolution: Some((width, height)),
            ..Self::default()
        }
    }

    /// Parse a `WIDTHxHEIGHT` resolution string (e.g. `1920x1080`)
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidConfig`] when the string is not two
    /// positive integers separated by `x`.
    pub fn parse_resolution(s: &str) -> Result<(u32, u32)> {
        let lowered = s.to_ascii_lowercase();
        let mut parts = lowered.splitn(2, 'x');
        let parse = |part: Option<&str>| -> Result<u32> {
            part.and_then(|p| p.trim().parse::<u32>().ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ScoutError::invalid_config(format!(
                        "Resolution must be in format WIDTHxHEIGHT (e.g., 1920x1080), got '{}'",
                        s
                    ))
                })
        };
        let width = parse(parts.next())?;
        let height = parse(parts.next())?;
        Ok((width, height))
    }

    /// Whether any rule requires fetching candidate bytes before acceptance
    ///
    /// When true the orchestrator over-requests raw candidates to
    /// compensate for expected rejection.
    #[must_use]
    pub fn requires_filtering(&self) -> bool {
        self.min_resolution.is_some() || self.allowed_content_types.is_some()
    }
}

/// Credentials for the external search provider
///
/// An explicit value passed into the pipeline; never read from ambient
/// global state after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Provider API key
    pub api_key: String,
    /// Search engine identifier
    pub engine_id: String,
}

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "GCS_DEVELOPER_KEY";
/// Environment variable holding the search engine identifier
pub const ENGINE_ID_ENV: &str = "GCS_CX";

impl Credentials {
    /// Create credentials from explicit values
    pub fn new<S: Into<String>>(api_key: S, engine_id: S) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }

    /// Read credentials from the conventional environment variables
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidConfig`] when either variable is unset
    /// or empty. This is checked before any network call is made.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let engine_id = std::env::var(ENGINE_ID_ENV).unwrap_or_default();
        if api_key.is_empty() || engine_id.is_empty() {
            return Err(ScoutError::invalid_config(format!(
                "Please set {} and {} environment variables",
                API_KEY_ENV, ENGINE_ID_ENV
            )));
        }
        Ok(Self { api_key, engine_id })
    }
}

/// Where accepted results are committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write image files under the given base directory; the run's
    /// sanitized query name becomes a subdirectory of it
    Directory(PathBuf),
    /// Print accepted source URLs to standard output, one per line
    UrlStream,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::UrlStream
    }
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of results to accept and persist
    pub max_results: usize,
    /// Total search attempts before giving up
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Per-candidate fetch timeout
    pub fetch_timeout: Duration,
    /// Local acceptance rules
    pub criteria: AcceptanceCriteria,
    /// Where accepted results go
    pub output: OutputTarget,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_results: 1,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(5),
            criteria: AcceptanceCriteria::none(),
            output: OutputTarget::default(),
        }
    }
}

impl RunConfig {
    /// Create a builder with default values
    #[must_use]
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Builder for [`RunConfig`] with validation at build time
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Set the maximum number of results to accept
    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.config.max_results = max_results;
        self
    }

    /// Set the total number of search attempts
    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the fixed delay between attempts
    #[must_use]
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.config.retry_delay = retry_delay;
        self
    }

    /// Set the per-candidate fetch timeout
    #[must_use]
    pub fn fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.config.fetch_timeout = fetch_timeout;
        self
    }

    /// Set the acceptance criteria
    #[must_use]
    pub fn criteria(mut self, criteria: AcceptanceCriteria) -> Self {
        self.config.criteria = criteria;
        self
    }

    /// Set the output target
    #[must_use]
    pub fn output(mut self, output: OutputTarget) -> Self {
        self.config.output = output;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidConfig`] when `max_results` is zero or
    /// `max_retries` is zero.
    pub fn build(self) -> Result<RunConfig> {
        if self.config.max_results == 0 {
            return Err(ScoutError::invalid_config("max_results must be at least 1"));
        }
        if self.config.max_retries == 0 {
            return Err(ScoutError::invalid_config("max_retries must be at least 1"));
        }
        Ok(self.config)
    }
}
