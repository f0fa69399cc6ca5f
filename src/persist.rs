//! Committing accepted results to durable storage
//!
//! Download mode writes `image_<n><ext>` files under a sanitized,
//! query-derived directory via a temp-file-then-rename commit, so a
//! partially written file never appears under its final name. URL mode
//! writes one line per accepted source URL to an output stream.

use crate::error::{Result, ScoutError};
use crate::evaluate::FetchedImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Characters replaced with `_` in the query-derived directory name
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Map a query string to a directory name legal on common filesystems
///
/// Pure and total: every input maps to a string containing none of the
/// reserved characters, and the same input always maps to the same output.
#[must_use]
pub fn sanitize_dir_name(query_text: &str) -> String {
    query_text
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Derive a file extension from a declared content type
///
/// `png` maps to `.png`, anything containing `jpeg`/`jpg` maps to `.jpg`,
/// and everything else (including a missing type) defaults to `.jpg`.
#[must_use]
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    match content_type.map(str::to_ascii_lowercase) {
        Some(ct) if ct.contains("png") => ".png",
        // jpeg/jpg and everything unrecognized share the default
        _ => ".jpg",
    }
}

/// A candidate that passed acceptance, ready to commit
///
/// Ownership transfers to the [`Persister`], which is the last holder.
#[derive(Debug, Clone)]
pub struct AcceptedResult {
    /// Source URL of the accepted candidate
    pub url: String,
    /// Fetched payload; present in download mode, absent in URL-only mode
    pub image: Option<FetchedImage>,
}

/// Commits accepted results to a directory or an output stream
pub enum Persister {
    /// Write image files under the sanitized run directory
    Directory {
        /// The run's output directory, computed once and reused
        dir: PathBuf,
    },
    /// Write accepted URLs, one per line
    Stream {
        /// The output sink
        writer: Box<dyn Write + Send>,
    },
}

impl Persister {
    /// Create a directory-mode persister under `base`
    ///
    /// The sanitized query text becomes a subdirectory of `base`; creation
    /// is idempotent.
    ///
    /// # Errors
    /// Returns an I/O error when the directory cannot be created.
    pub fn directory(base: &Path, query_text: &str) -> Result<Self> {
        let dir = base.join(sanitize_dir_name(query_text));
        std::fs::create_dir_all(&dir)
            .map_err(|e| ScoutError::file_io_error("create output directory", &dir, &e))?;
        Ok(Self::Directory { dir })
    }

    /// Create a stream-mode persister writing to standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::Stream {
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Create a stream-mode persister writing to an arbitrary sink
    pub fn stream<W: Write + Send + 'static>(writer: W) -> Self {
        Self::Stream {
            writer: Box::new(writer),
        }
    }

    /// The output directory, when in directory mode
    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        match self {
            Self::Directory { dir } => Some(dir),
            Self::Stream { .. } => None,
        }
    }

    /// Commit one accepted result
    ///
    /// `index` is 1-based and reflects acceptance order, not candidate
    /// order. Returns the committed file path in directory mode.
    ///
    /// # Errors
    /// Returns an I/O error when the write or rename fails, or an internal
    /// error when directory mode is given a result without a payload.
    pub fn persist(&mut self, accepted: AcceptedResult, index: usize) -> Result<Option<PathBuf>> {
        match self {
            Self::Stream { writer } => {
                writeln!(writer, "{}", accepted.url)
                    .map_err(|e| ScoutError::file_io_error("write URL to stream", "<stream>", &e))?;
                writer
                    .flush()
                    .map_err(|e| ScoutError::file_io_error("flush stream", "<stream>", &e))?;
                Ok(None)
            },
            Self::Directory { dir } => {
                let image = accepted.image.ok_or_else(|| {
                    ScoutError::internal("directory persist requires fetched bytes")
                })?;
                let ext = extension_for_content_type(image.content_type.as_deref());
                let final_path = dir.join(format!("image_{}{}", index, ext));

                // Write fully to a temp file in the same directory, then
                // rename into place.
                let mut temp = NamedTempFile::new_in(&*dir)
                    .map_err(|e| ScoutError::file_io_error("create temp file", &*dir, &e))?;
                temp.write_all(&image.bytes)
                    .map_err(|e| ScoutError::file_io_error("write image bytes", &final_path, &e))?;
                temp.flush()
                    .map_err(|e| ScoutError::file_io_error("flush image bytes", &final_path, &e))?;
                temp.persist(&final_path).map_err(|e| {
                    ScoutError::file_io_error("commit image file", &final_path, &e.error)
                })?;

                log::debug!("Committed {}", final_path.display());
                Ok(Some(final_path))
            },
        }
    }
}
