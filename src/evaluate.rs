//! Candidate fetching and acceptance evaluation
//!
//! Evaluation is total: every failure mode (timeout, bad status, undecodable
//! payload, unmet criteria) maps to a [`RejectReason`] instead of an error,
//! so the orchestrator can log and move on to the next candidate.

use crate::config::AcceptanceCriteria;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fallback content type when the transport declares none
///
/// The most common accepted type; used unless the criteria demand strict
/// content-type handling.
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Raw bytes for a candidate plus the transport's declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// The full response body
    pub bytes: Vec<u8>,
    /// Declared content type, normalized to lowercase without parameters
    pub content_type: Option<String>,
}

/// Retrieves raw bytes for a candidate URL with a bounded timeout
#[async_trait]
pub trait CandidateFetcher: Send + Sync {
    /// Fetch the candidate's bytes
    ///
    /// # Errors
    /// Returns [`ScoutError::Search`] on timeout, connection failure, or
    /// non-success status. Callers treat these as per-candidate rejections.
    async fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// reqwest-backed fetcher with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given per-request timeout
    ///
    /// # Errors
    /// Returns [`ScoutError::Search`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::network_error("Failed to create HTTP client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CandidateFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScoutError::network_error(&format!("Failed to fetch {}", url), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::search(format!(
                "HTTP error {} for {}",
                status, url
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(normalize_content_type);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScoutError::network_error(&format!("Failed to read body of {}", url), e))?
            .to_vec();

        log::debug!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}

/// Lowercase a declared content type and strip parameters (`; charset=...`)
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_ascii_lowercase()
}

/// Why a candidate was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Fetch failed: timeout, connection error, or non-success status
    Transport(String),
    /// Payload could not be decoded as an image
    Decode(String),
    /// Decoded dimensions fall short of the required minimums
    TooSmall {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
        /// Required minimum width
        min_width: u32,
        /// Required minimum height
        min_height: u32,
    },
    /// Declared content type is not in the allowlist
    ContentType(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Decode(msg) => write!(f, "decode error: {}", msg),
            Self::TooSmall {
                width,
                height,
                min_width,
                min_height,
            } => write!(
                f,
                "resolution {}x{} below minimum {}x{}",
                width, height, min_width, min_height
            ),
            Self::ContentType(ct) => write!(f, "content type '{}' not allowed", ct),
        }
    }
}

/// Outcome of evaluating one candidate against the acceptance criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The candidate met every rule; ownership of the bytes moves to the
    /// persister
    Accepted(FetchedImage),
    /// The candidate was rejected with a reason
    Rejected(RejectReason),
}

impl Evaluation {
    /// Whether the candidate was accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Evaluate already-fetched bytes against the criteria
///
/// Pure function of the payload and metadata: no I/O, never fails.
#[must_use]
pub fn evaluate_bytes(fetched: FetchedImage, criteria: &AcceptanceCriteria) -> Evaluation {
    if let Some(allowed) = &criteria.allowed_content_types {
        let declared = fetched
            .content_type
            .as_deref()
            .filter(|ct| ct.starts_with("image/"));
        let effective = match declared {
            Some(ct) => ct,
            None if criteria.strict_content_type => {
                let declared_raw = fetched
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "none".to_string());
                return Evaluation::Rejected(RejectReason::ContentType(declared_raw));
            },
            None => FALLBACK_CONTENT_TYPE,
        };
        let allowed_match = allowed.iter().any(|a| a.eq_ignore_ascii_case(effective));
        if !allowed_match {
            return Evaluation::Rejected(RejectReason::ContentType(effective.to_string()));
        }
    }

    if let Some((min_width, min_height)) = criteria.min_resolution {
        let decoded = match image::load_from_memory(&fetched.bytes) {
            Ok(img) => img,
            Err(e) => {
                return Evaluation::Rejected(RejectReason::Decode(e.to_string()));
            },
        };
        let (width, height) = (decoded.width(), decoded.height());
        // Both axes independently; an image failing on either is rejected
        if width < min_width || height < min_height {
            return Evaluation::Rejected(RejectReason::TooSmall {
                width,
                height,
                min_width,
                min_height,
            });
        }
    }

    Evaluation::Accepted(fetched)
}

/// Fetch a candidate and evaluate it against the criteria
///
/// Never returns an error: fetch failures become
/// [`RejectReason::Transport`].
pub async fn evaluate_candidate<F: CandidateFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    criteria: &AcceptanceCriteria,
) -> Evaluation {
    match fetcher.fetch(url).await {
        Ok(fetched) => evaluate_bytes(fetched, criteria),
        Err(e) => Evaluation::Rejected(RejectReason::Transport(e.to_string())),
    }
}
