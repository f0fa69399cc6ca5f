//! Image search CLI
//!
//! One invocation performs one search-filter-download cycle and terminates.
//! Exit status: 0 on success, 1 on fatal failure (bad configuration,
//! missing credentials, exhausted transport retries), 2 when no candidate
//! matched after all retries.

use crate::{
    config::{
        AcceptanceCriteria, AspectRatio, Credentials, ImageSize, ImageType, OutputTarget,
        RunConfig, SafeLevel, SearchOptions, SearchQuery,
    },
    evaluate::HttpFetcher,
    pipeline::{RunOutcome, SearchPipeline},
    search::GoogleCustomSearch,
    tracing_config::TracingConfig,
};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

/// Exit status for a run that found no matching images
const EXIT_NO_MATCHES: u8 = 2;

/// Search an image provider and save results matching a minimum resolution
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "imgscout")]
pub struct Cli {
    /// Search terms (joined with spaces)
    #[arg(value_name = "QUERY", required = true)]
    pub query: Vec<String>,

    /// Maximum number of results to accept
    #[arg(short = 'n', long, default_value_t = 1)]
    pub max_results: usize,

    /// Minimum resolution in format WIDTHxHEIGHT (e.g. 1920x1080)
    #[arg(short, long, value_name = "WxH")]
    pub resolution: Option<String>,

    /// Print accepted source URLs to stdout instead of downloading
    #[arg(long)]
    pub urls_only: bool,

    /// Base directory for downloads; the sanitized query becomes a
    /// subdirectory of it
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Provider-side image type filter
    #[arg(long, value_enum)]
    pub image_type: Option<CliImageType>,

    /// Provider-side safe search level
    #[arg(long, value_enum)]
    pub safe: Option<CliSafeLevel>,

    /// Provider-side size class filter
    #[arg(long, value_enum)]
    pub size: Option<CliImageSize>,

    /// Provider-side aspect ratio filter
    #[arg(long, value_enum)]
    pub aspect: Option<CliAspectRatio>,

    /// Restrict acceptance to these content types (repeatable)
    #[arg(long = "allow-type", value_name = "MIME")]
    pub allowed_types: Vec<String>,

    /// Reject candidates whose content type is missing or unrecognized
    /// instead of assuming image/jpeg
    #[arg(long)]
    pub strict_content_type: bool,

    /// Total search attempts before giving up
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Delay between attempts, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 2)]
    pub retry_delay: u64,

    /// Per-candidate fetch timeout, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub timeout: u64,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliImageType {
    Photo,
    Clipart,
    Face,
    Lineart,
    Animated,
}

impl From<CliImageType> for ImageType {
    fn from(value: CliImageType) -> Self {
        match value {
            CliImageType::Photo => Self::Photo,
            CliImageType::Clipart => Self::Clipart,
            CliImageType::Face => Self::Face,
            CliImageType::Lineart => Self::Lineart,
            CliImageType::Animated => Self::Animated,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliSafeLevel {
    High,
    Medium,
    Off,
}

impl From<CliSafeLevel> for SafeLevel {
    fn from(value: CliSafeLevel) -> Self {
        match value {
            CliSafeLevel::High => Self::High,
            CliSafeLevel::Medium => Self::Medium,
            CliSafeLevel::Off => Self::Off,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliImageSize {
    Icon,
    Small,
    Medium,
    Large,
    Xlarge,
    Xxlarge,
    Huge,
}

impl From<CliImageSize> for ImageSize {
    fn from(value: CliImageSize) -> Self {
        match value {
            CliImageSize::Icon => Self::Icon,
            CliImageSize::Small => Self::Small,
            CliImageSize::Medium => Self::Medium,
            CliImageSize::Large => Self::Large,
            CliImageSize::Xlarge => Self::Xlarge,
            CliImageSize::Xxlarge => Self::Xxlarge,
            CliImageSize::Huge => Self::Huge,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliAspectRatio {
    Tall,
    Square,
    Wide,
    Panoramic,
}

impl From<CliAspectRatio> for AspectRatio {
    fn from(value: CliAspectRatio) -> Self {
        match value {
            CliAspectRatio::Tall => Self::Tall,
            CliAspectRatio::Square => Self::Square,
            CliAspectRatio::Wide => Self::Wide,
            CliAspectRatio::Panoramic => Self::Panoramic,
        }
    }
}

impl Cli {
    /// Build acceptance criteria from the CLI arguments
    ///
    /// A malformed resolution string is a fatal configuration error, not a
    /// retryable one.
    fn criteria(&self) -> anyhow::Result<AcceptanceCriteria> {
        let min_resolution = match &self.resolution {
            Some(s) => Some(AcceptanceCriteria::parse_resolution(s)?),
            None => None,
        };
        let allowed_content_types = if self.allowed_types.is_empty() {
            None
        } else {
            Some(self.allowed_types.clone())
        };
        Ok(AcceptanceCriteria {
            min_resolution,
            allowed_content_types,
            strict_content_type: self.strict_content_type,
        })
    }

    fn search_query(&self) -> SearchQuery {
        SearchQuery::with_options(
            self.query.join(" "),
            SearchOptions {
                image_type: self.image_type.map(Into::into),
                safe: self.safe.map(Into::into),
                size: self.size.map(Into::into),
                aspect_ratio: self.aspect.map(Into::into),
            },
        )
    }
}

/// CLI entry point
///
/// # Errors
/// Fatal configuration and transport errors surface as `Err`; the caller
/// maps them to exit status 1.
pub async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    // Fail fast on configuration before any network activity
    let criteria = cli.criteria()?;
    let credentials = Credentials::from_env()?;

    let output = if cli.urls_only {
        OutputTarget::UrlStream
    } else {
        OutputTarget::Directory(cli.output_dir.clone())
    };

    let config = RunConfig::builder()
        .max_results(cli.max_results)
        .max_retries(cli.retries)
        .retry_delay(Duration::from_secs(cli.retry_delay))
        .fetch_timeout(Duration::from_secs(cli.timeout))
        .criteria(criteria)
        .output(output)
        .build()?;

    let query = cli.search_query();
    info!("Searching for '{}'", query.text);

    let provider = GoogleCustomSearch::new(credentials)?;
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let pipeline = SearchPipeline::new(provider, fetcher, config);

    let summary = pipeline.run(&query).await.context("Search failed")?;

    match summary.outcome {
        RunOutcome::Saved => {
            if !cli.urls_only {
                // URL mode already wrote its lines to stdout
                let dir = cli.output_dir.join(crate::persist::sanitize_dir_name(&query.text));
                println!(
                    "Saved {} image(s) to {}",
                    summary.accepted,
                    dir.display()
                );
            }
            Ok(ExitCode::SUCCESS)
        },
        RunOutcome::NoMatches => {
            eprintln!("No images found matching the criteria");
            Ok(ExitCode::from(EXIT_NO_MATCHES))
        },
    }
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> anyhow::Result<()> {
    TracingConfig::new()
        .with_verbosity(verbose_count)
        .init()
        .context("Failed to initialize tracing subscriber")
}
