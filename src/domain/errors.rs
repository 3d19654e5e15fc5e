//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Audio storage error: {0}")]
    Storage(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User with email \"{email}\" was not found. They must be registered first.")]
    UserNotFound { email: String },

    #[error("This user is already a participant.")]
    DuplicateParticipant,

    #[error("Prompt failed: {0}")]
    Ui(String),
}

/// Why a single import line produced no meeting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// First token is not a calendar date. Recoverable: the line is skipped.
    #[error("invalid date '{token}' (expected a date like {expected})")]
    InvalidDate { token: String, expected: String },

    /// Fewer than two tokens. Kept out of the user-facing report; logged at
    /// debug level and counted as skipped noise.
    #[error("no title after the date")]
    MalformedLine,

    /// The draft parsed but the store rejected it.
    #[error("meeting could not be saved: {reason}")]
    PersistenceFailure { reason: String },

    /// Nothing in the file looked like a meeting line.
    #[error("no line matched the expected format `YYYY-MM-DD Title`")]
    NoInputMatched,
}

/// A per-line import error with enough context to find the line again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind} in \"{snippet}\"")]
pub struct LineError {
    /// 1-based line number in the uploaded file.
    pub line: usize,
    pub kind: ImportErrorKind,
    /// Truncated copy of the offending line.
    pub snippet: String,
}
