//! Error types for fixture setup and assertions

use thiserror::Error;

/// A test expectation that did not hold
///
/// Kept apart from setup errors so a runner can report it as a failed
/// assertion rather than a broken environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors raised by the fixture module and its helpers
#[derive(Error, Debug)]
pub enum Error {
    /// Module is misconfigured: missing dump file, no active connection
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The driver could not establish a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// A cleanup, load or collection operation failed
    #[error("Operation error: {0}")]
    Operation(String),

    /// The helper was called in a way that makes the assertion meaningless
    #[error("Expectation error: {0}")]
    Expectation(String),

    /// A helper's expectation did not hold for the data
    #[error("Assertion failed: {0}")]
    Assertion(AssertionFailure),
}

impl Error {
    /// True when this is a test expectation mismatch rather than a setup problem
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }

    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(AssertionFailure::new(message))
    }
}

/// Errors from the embedded document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid connection target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("No active connection")]
    NotConnected,

    #[error("Authentication failed for user '{0}'")]
    Authentication(String),

    #[error("Duplicate _id '{id}' in collection '{collection}'")]
    DuplicateId { collection: String, id: String },

    #[error("Document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Dump parse error at line {line}: {reason}")]
    DumpSyntax { line: usize, reason: String },

    #[error("Invalid criteria: {0}")]
    Criteria(String),
}

pub type Result<T> = std::result::Result<T, Error>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
