//! Error taxonomy shared across the engine

use thiserror::Error;

/// Errors reported by engine operations
///
/// Every operation either completes in full or reports exactly one of these
/// kinds with no partial mutation of repository state. Retry-on-conflict is
/// caller policy; the engine never retries internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: empty commit message, empty file set, bad hex, a
    /// parent missing on graph insert, or a diff input over the line ceiling
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown commit, parent, or branch
    #[error("not found: {0}")]
    NotFound(String),

    /// Head moved between read and append, or a duplicate hash carried
    /// different content
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored content no longer matches its recorded hash
    #[error("hash mismatch for {name}: expected {expected}, got {actual}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// Result type used throughout minivcs
pub type Result<T> = std::result::Result<T, Error>;
