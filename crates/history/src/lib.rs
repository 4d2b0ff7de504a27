//! Commit history and repository state management
//!
//! This crate provides:
//! - Commit objects with content-derived identity
//! - The append-only commit DAG and its rendering-agnostic projection
//! - Repository orchestration: the commit path, checkout, branches

pub mod commit;
pub mod graph;
pub mod repository;

// Re-exports
pub use commit::{identity_hash, Commit};
pub use graph::{CommitGraph, GraphEdge, GraphNode, GraphView};
pub use repository::{Repository, DEFAULT_BRANCH};

/// Result type for history operations
pub type Result<T> = minivcs_core::Result<T>;
