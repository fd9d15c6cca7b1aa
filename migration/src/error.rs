//! Error types for the migration pipeline.
//!
//! Every fallible operation in this crate returns a [`MigrationError`].
//! The first five variants are the failure taxonomy of the pipeline proper;
//! the rest is plumbing (I/O, JSON, process spawning) that callers usually
//! just report.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a migration run.
///
/// None of these are retried. Every step is deterministic given its input,
/// so running it again would only reproduce the failure.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A required account, name, domain or module record is absent.
    #[error("couldn't find {0}")]
    NotFound(String),

    /// The document's chain identity does not match the selected patch.
    #[error("wrong chain_id: {found} != {expected}")]
    WrongNetwork {
        /// Chain id the patch was written for.
        expected: String,
        /// Chain id declared by the document.
        found: String,
    },

    /// The schema-conversion executable failed or produced no output.
    #[error("schema conversion failed: {0}")]
    Conversion(String),

    /// The boot-validation run did not prove the genesis bootable.
    #[error("boot validation failed: {0}")]
    Validation(String),

    /// An internal consistency check failed. This is a defect, not a
    /// recoverable condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A subsystem that is injected fresh already exists in the document.
    #[error("{0} is already present in app_state")]
    AlreadyPresent(String),

    /// A token amount is not a non-negative decimal integer.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Filesystem access failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An external executable could not be started or supervised.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name or path.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// (De)serialization of a document failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrationError {
    /// Shorthand for wrapping an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;
