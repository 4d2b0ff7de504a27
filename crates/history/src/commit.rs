//! Commit data structures

use minivcs_core::diff::ChangeSummary;
use minivcs_core::{ContentHash, Error, IncrementalHasher, Result, Snapshot};
use serde::{Deserialize, Serialize};

/// An immutable commit in the history DAG
///
/// The hash is derived from the commit's content, never assigned by the
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Content-derived identity
    pub hash: ContentHash,
    /// Commit message (validated non-empty by the commit path)
    pub message: String,
    /// Commit author
    pub author: String,
    /// Timestamp (Unix milliseconds); recorded, but not part of the identity
    /// hash
    pub timestamp_ms: u64,
    /// Parent commit hashes: 0 for a root, 1 for a normal commit, >= 2
    /// reserved for future merges
    pub parents: Vec<ContentHash>,
    /// Full file set at this commit
    pub snapshot: Snapshot,
    /// Aggregate line changes relative to the parent snapshot
    pub summary: ChangeSummary,
}

impl Commit {
    /// Create a new commit, deriving its hash from the content
    pub fn new(
        message: &str,
        author: &str,
        parents: Vec<ContentHash>,
        snapshot: Snapshot,
        summary: ChangeSummary,
    ) -> Self {
        let hash = identity_hash(message, author, &parents, &snapshot);
        Self {
            hash,
            message: message.to_string(),
            author: author.to_string(),
            timestamp_ms: current_timestamp_ms(),
            parents,
            snapshot,
            summary,
        }
    }

    /// Check whether this commit is a root (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Serialize commit to bytes
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Validation(format!("commit encode: {e}")))
    }

    /// Deserialize commit from bytes
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Validation(format!("commit decode: {e}")))
    }

    /// Compare everything the identity hash covers, plus the raw snapshot
    /// bytes
    ///
    /// Timestamps are excluded: they are not part of identity, so a re-built
    /// commit with the same content is the same commit.
    pub(crate) fn same_content(&self, other: &Commit) -> bool {
        self.message == other.message
            && self.author == other.author
            && self.parents == other.parents
            && self.snapshot == other.snapshot
    }
}

/// Canonical commit identity hash
///
/// Digest over the length-prefixed concatenation of: message, author, the
/// ordered parent hashes, and the snapshot's sorted `(name, content hash)`
/// manifest. Sorting by name makes the hash independent of map iteration
/// order; the timestamp is deliberately absent so identical inputs always
/// reproduce the identical hash.
pub fn identity_hash(
    message: &str,
    author: &str,
    parents: &[ContentHash],
    snapshot: &Snapshot,
) -> ContentHash {
    let mut hasher = IncrementalHasher::new();
    update_field(&mut hasher, message.as_bytes());
    update_field(&mut hasher, author.as_bytes());

    hasher.update(&(parents.len() as u64).to_le_bytes());
    for parent in parents {
        hasher.update(parent.as_bytes());
    }

    let manifest = snapshot.manifest();
    hasher.update(&(manifest.len() as u64).to_le_bytes());
    for (name, content_hash) in manifest {
        update_field(&mut hasher, name.as_bytes());
        hasher.update(content_hash.as_bytes());
    }

    hasher.finalize()
}

/// Length-prefix a variable-length field so adjacent fields cannot alias
fn update_field(hasher: &mut IncrementalHasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
