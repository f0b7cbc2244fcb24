//! Error taxonomy for fixture runs.
//!
//! Only [`HarnessError`] aborts a run. Malformed lines and normalizer
//! failures are captured per case and end up in the
//! [`RunSummary`](crate::RunSummary).

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that stop a run before (or while) fixtures are read.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// No fixture file exists for the requested language.
    #[error("fixture file not found for language '{lang}': {}", .path.display())]
    FixtureFileNotFound {
        lang: String,
        path: PathBuf,
        /// Languages that do have a fixture file, for the error hint.
        available: Vec<String>,
    },

    /// Language code contains characters that can't name a fixture file.
    #[error("invalid language code '{0}' (expected letters, digits, '-' or '_')")]
    InvalidLanguage(String),

    /// Language is on the exclusion list.
    #[error("language '{0}' is excluded from fixture runs")]
    LanguageExcluded(String),

    /// I/O error while opening or reading a fixture file.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a fixture line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    #[error("missing '|||' delimiter")]
    MissingDelimiter,
    #[error("empty input")]
    EmptyInput,
    #[error("empty category")]
    EmptyCategory,
    #[error("empty expected output")]
    EmptyExpected,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// A fixture line that violates the `input|||category[|||expected]` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}:{line}: {reason}", .path.display())]
pub struct MalformedFixture {
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    pub reason: MalformedReason,
}

/// A single item of the lazy fixture sequence that isn't a case.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// Recorded as a failure; reading continues with the next line.
    #[error(transparent)]
    Malformed(#[from] MalformedFixture),

    /// Reading can't continue.
    #[error(transparent)]
    Harness(#[from] HarnessError),
}

/// Failure of the external normalizer for one input.
#[derive(Debug, thiserror::Error)]
pub enum NormalizerError {
    /// Normalizer program could not be started.
    #[error("failed to start normalizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Normalizer program exited unsuccessfully.
    #[error("normalizer failed ({status}): {stderr}")]
    Exit { status: String, stderr: String },

    /// Normalizer did not answer within the configured bound.
    #[error("normalizer timed out after {0:?}")]
    Timeout(Duration),

    /// Normalizer wrote something that isn't UTF-8.
    #[error("normalizer produced non-UTF-8 output")]
    InvalidOutput,

    /// I/O error while talking to the normalizer.
    #[error("I/O error talking to normalizer: {0}")]
    Io(#[from] std::io::Error),

    /// Free-form failure reported by an in-process normalizer.
    #[error("{0}")]
    Failed(String),
}
