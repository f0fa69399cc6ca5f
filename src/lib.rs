#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # imgscout
//!
//! A batch tool and library for retrieving images matching a text query
//! from an image-search provider, filtering candidates by minimum pixel
//! resolution, and persisting the accepted results to local storage (or
//! printing their source URLs).
//!
//! The core is the search-retrieve-filter-persist pipeline: one invocation
//! issues a query, retries on transient failure with a fixed delay,
//! evaluates each candidate against acceptance criteria, and commits
//! accepted results with deterministic `image_<n>` naming under a
//! sanitized, query-derived directory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgscout::{
//!     AcceptanceCriteria, Credentials, OutputTarget, RunConfig, SearchQuery,
//!     search_images,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = Credentials::from_env()?;
//! let config = RunConfig::builder()
//!     .max_results(3)
//!     .criteria(AcceptanceCriteria::min_resolution(1920, 1080))
//!     .output(OutputTarget::Directory("downloads".into()))
//!     .build()?;
//!
//! let summary = search_images(credentials, &SearchQuery::new("mountain"), config).await?;
//! println!("accepted {} image(s)", summary.accepted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! - **Library Usage**: the pipeline, provider client, and persister are
//!   available by default; swap in your own [`ImageSearchProvider`] or
//!   [`CandidateFetcher`] implementation at the trait seams.
//! - **CLI Usage**: the `cli` feature (default) adds the `imgscout` binary
//!   and subscriber setup.
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! imgscout = { version = "0.2", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod persist;
pub mod pipeline;
pub mod search;
#[cfg(feature = "cli")]
pub mod tracing_config;

// Public API exports
pub use config::{
    AcceptanceCriteria, AspectRatio, Credentials, ImageSize, ImageType, OutputTarget, RunConfig,
    RunConfigBuilder, SafeLevel, SearchOptions, SearchQuery,
};
pub use error::{Result, ScoutError};
pub use evaluate::{
    evaluate_bytes, evaluate_candidate, CandidateFetcher, Evaluation, FetchedImage, HttpFetcher,
    RejectReason,
};
pub use persist::{extension_for_content_type, sanitize_dir_name, AcceptedResult, Persister};
pub use pipeline::{RunOutcome, RunSummary, SearchPipeline};
pub use search::{Candidate, GoogleCustomSearch, ImageSearchProvider};

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};

/// Run one search-filter-persist cycle with the default collaborators
///
/// Wires a [`GoogleCustomSearch`] provider and an [`HttpFetcher`] with the
/// configured timeout, then drives [`SearchPipeline::run`]. For custom
/// providers or fetchers, build the pipeline directly.
///
/// # Errors
/// Fatal configuration errors and retry-exhausted transport errors; an
/// empty yield is reported through [`RunOutcome::NoMatches`] instead.
pub async fn search_images(
    credentials: Credentials,
    query: &SearchQuery,
    config: RunConfig,
) -> Result<RunSummary> {
    let provider = GoogleCustomSearch::new(credentials)?;
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let pipeline = SearchPipeline::new(provider, fetcher, config);
    pipeline.run(query).await
}
