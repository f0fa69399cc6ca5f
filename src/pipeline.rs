//! The search-retrieve-filter-persist pipeline
//!
//! [`SearchPipeline`] issues the query to the search provider, drives each
//! returned candidate through fetch and evaluation in provider order, and
//! commits acceptances through the persister until the requested yield is
//! reached. The whole cycle retries with a fixed delay when the search call
//! fails or produces zero acceptances; per-candidate failures are logged
//! and skipped, never escalated.

use crate::config::{OutputTarget, RunConfig, SearchQuery};
use crate::error::Result;
use crate::evaluate::{evaluate_candidate, CandidateFetcher, Evaluation};
use crate::persist::{AcceptedResult, Persister};
use crate::search::ImageSearchProvider;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Terminal state of a completed (non-fatal) run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one result was accepted and persisted
    Saved,
    /// Every attempt yielded zero acceptances; distinct from a transport
    /// failure
    NoMatches,
}

/// What one pipeline run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of accepted and persisted results
    pub accepted: usize,
    /// Search attempts actually made
    pub attempts: u32,
    /// Terminal state
    pub outcome: RunOutcome,
    /// Source URLs of accepted results, in acceptance order
    pub accepted_urls: Vec<String>,
    /// Files committed in download mode, in acceptance order
    pub files: Vec<PathBuf>,
}

/// Mutable per-run counters, owned exclusively by the pipeline
#[derive(Debug, Default)]
struct RunState {
    accepted: usize,
    attempt: u32,
}

/// Orchestrates one search-filter-persist cycle with bounded retries
pub struct SearchPipeline<P, F> {
    provider: P,
    fetcher: F,
    config: RunConfig,
}

impl<P, F> SearchPipeline<P, F>
where
    P: ImageSearchProvider,
    F: CandidateFetcher,
{
    /// Create a pipeline from its collaborators and configuration
    pub fn new(provider: P, fetcher: F, config: RunConfig) -> Self {
        Self {
            provider,
            fetcher,
            config,
        }
    }

    /// Run one full search-filter-persist cycle
    ///
    /// Builds the persister from the configured [`OutputTarget`]: download
    /// mode creates the sanitized query directory (idempotently) before the
    /// first persist; URL mode writes to standard output.
    ///
    /// # Errors
    /// Returns a fatal error only for configuration problems or when the
    /// retry ceiling is exhausted on transport failures. An empty yield is
    /// reported through [`RunOutcome::NoMatches`], not an error.
    pub async fn run(&self, query: &SearchQuery) -> Result<RunSummary> {
        let mut persister = match &self.config.output {
            OutputTarget::Directory(base) => Persister::directory(base, &query.text)?,
            OutputTarget::UrlStream => Persister::stdout(),
        };
        self.run_with_persister(query, &mut persister).await
    }

    /// Run the cycle against a caller-supplied persister
    ///
    /// This is the seam tests use to capture stream output or point
    /// downloads at a temp directory.
    ///
    /// # Errors
    /// Same contract as [`SearchPipeline::run`].
    pub async fn run_with_persister(
        &self,
        query: &SearchQuery,
        persister: &mut Persister,
    ) -> Result<RunSummary> {
        let mut state = RunState::default();
        let mut accepted_urls = Vec::new();
        let mut files = Vec::new();

        // Over-request raw candidates when local filtering is expected to
        // reject some of them. Known gap: the factor is not adaptive, so a
        // high rejection rate under-delivers instead of fetching more.
        let raw_count = if self.config.criteria.requires_filtering() {
            // Saturate: the provider clamps to its page cap anyway
            self.config.max_results.saturating_mul(2)
        } else {
            self.config.max_results
        };

        // Download mode always needs the bytes; URL mode only fetches when
        // a criterion has to inspect them.
        let needs_fetch = persister.output_dir().is_some()
            || self.config.criteria.requires_filtering();

        while state.attempt < self.config.max_retries {
            state.attempt += 1;
            debug!(
                attempt = state.attempt,
                max = self.config.max_retries,
                "Issuing search for '{}'",
                query.text
            );

            let candidates = match self.provider.search(query, raw_count).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    if state.attempt < self.config.max_retries {
                        warn!(
                            "Error occurred, retrying... (attempt {}/{}): {}",
                            state.attempt, self.config.max_retries, e
                        );
                        tokio::time::sleep(self.config.retry_delay).await;
                        continue;
                    }
                    // Ceiling exhausted: surface the provider's error
                    return Err(e);
                },
            };

            info!(
                "Provider returned {} candidate(s) on attempt {}",
                candidates.len(),
                state.attempt
            );

            for candidate in candidates {
                if state.accepted >= self.config.max_results {
                    break;
                }

                let accepted = if needs_fetch {
                    match evaluate_candidate(&self.fetcher, &candidate.url, &self.config.criteria)
                        .await
                    {
                        Evaluation::Accepted(image) => {
                            let image = if persister.output_dir().is_some() {
                                Some(image)
                            } else {
                                // URL mode: bytes were only needed for
                                // evaluation
                                None
                            };
                            AcceptedResult {
                                url: candidate.url.clone(),
                                image,
                            }
                        },
                        Evaluation::Rejected(reason) => {
                            debug!("Rejected {}: {}", candidate.url, reason);
                            continue;
                        },
                    }
                } else {
                    AcceptedResult {
                        url: candidate.url.clone(),
                        image: None,
                    }
                };

                // Count only successful persists; a persist failure is a
                // per-candidate error like any other
                match persister.persist(accepted, state.accepted + 1) {
                    Ok(committed) => {
                        state.accepted += 1;
                        accepted_urls.push(candidate.url);
                        if let Some(path) = committed {
                            files.push(path);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to persist {}: {}", candidate.url, e);
                    },
                }
            }

            if state.accepted > 0 {
                if state.accepted < self.config.max_results {
                    warn!(
                        "Accepted {} of {} requested image(s)",
                        state.accepted, self.config.max_results
                    );
                }
                break;
            }

            if state.attempt < self.config.max_retries {
                warn!(
                    "No suitable images found, retrying... (attempt {}/{})",
                    state.attempt, self.config.max_retries
                );
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        let outcome = if state.accepted > 0 {
            RunOutcome::Saved
        } else {
            info!("No images found matching the criteria");
            RunOutcome::NoMatches
        };

        Ok(RunSummary {
            accepted: state.accepted,
            attempts: state.attempt,
            outcome,
            accepted_urls,
            files,
        })
    }
}
