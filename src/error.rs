use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching, verifying, installing or testing a formula.
///
/// The first group covers fetch/verify failures; nothing is written to the
/// install prefix when one of them occurs. The second group covers
/// install/test failures. Neither kind is retried.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The descriptor itself is malformed.
    #[error("invalid formula `{name}`: {reason}")]
    InvalidFormula { name: String, reason: String },

    /// The artifact could not be downloaded or read.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched bytes do not hash to the declared digest.
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// Staging or copying into the prefix failed.
    #[error("install failed: {0}")]
    Install(String),

    /// A file the install step asked for was not staged.
    #[error("staged artifact not found: {0}")]
    MissingArtifact(PathBuf),

    /// The smoke test did not pass.
    #[error("test failed: {0}")]
    TestFailed(String),
}

impl FormulaError {
    /// True for errors that happen before anything touches the prefix.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            FormulaError::InvalidFormula { .. }
                | FormulaError::Fetch { .. }
                | FormulaError::ChecksumMismatch { .. }
        )
    }
}

impl From<std::io::Error> for FormulaError {
    fn from(err: std::io::Error) -> Self {
        FormulaError::Install(err.to_string())
    }
}
