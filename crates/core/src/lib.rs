//! minivcs Core - content-addressed primitives for the minivcs engine
//!
//! This crate provides the foundational layer:
//! - SHA-1 content hashing
//! - LCS-based line diffing
//! - Snapshot representation (named file contents at a point in history)
//! - The error taxonomy shared by every engine operation

pub mod diff;
pub mod error;
pub mod hash;
pub mod snapshot;

// Re-export main types for convenience
pub use diff::{ChangeSummary, DiffEngine, DiffOp, FileDiff, LineDiff};
pub use error::{Error, Result};
pub use hash::{hash_bytes, ContentHash, IncrementalHasher};
pub use snapshot::{FileEntry, Snapshot};
