use thiserror::Error;

/// A reference lookup that could not be answered.
///
/// Expand rules treat every variant as recoverable and fall back to the
/// unchanged record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Unavailable {
    #[error("failed to start lookup process: {0}")]
    SpawnFailed(String),

    #[error("lookup timed out after {0}s")]
    TimedOut(u64),

    #[error("unparseable lookup response: {0}")]
    Unparseable(String),

    #[error("region {contig}:{start}-{end} is out of range")]
    OutOfRange { contig: String, start: u64, end: u64 },

    #[error("lookup backend error: {0}")]
    Backend(String),
}

/// Per-record failures. The line processor writes the raw line back out
/// unchanged when one of these is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least 5 tab-separated columns, found {found}")]
    MissingColumns { found: usize },

    #[error("invalid {column} coordinate '{value}'")]
    InvalidCoordinate { column: &'static str, value: String },

    #[error("cannot classify ref '{reference}' / alt '{alternate}' for {target} notation")]
    Unclassifiable {
        reference: String,
        alternate: String,
        target: &'static str,
    },
}
