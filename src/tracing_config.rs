//! Tracing configuration for the CLI
//!
//! Applications configure subscribers while libraries only emit trace
//! events; this module is the application side. All diagnostic output goes
//! to stderr so that URL-only mode keeps stdout clean for its one-URL-per-
//! line contract.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Output format for tracing events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output (default for CLI)
    Console,
    /// Compact console output for CI environments
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-3+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",  // Default: warnings and errors only
            1 => "info",  // -v: progress and summaries
            2 => "debug", // -vv: internal state and per-candidate decisions
            _ => "trace", // -vvv+: extremely detailed traces
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// # Errors
    /// Returns an error when the filter string is malformed or a subscriber
    /// is already installed.
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = if let Some(env_filter) = &self.env_filter {
            EnvFilter::try_new(env_filter)?
        } else {
            EnvFilter::try_new(self.verbosity_to_filter())?
        };

        match self.format {
            TracingFormat::Console => {
                Registry::default()
                    .with(filter)
                    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                    .try_init()?;
            },
            TracingFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_ansi(false),
                    )
                    .try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .try_init()?;
            },
        }

        Ok(())
    }
}
