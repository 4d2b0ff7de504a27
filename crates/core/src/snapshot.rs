//! Snapshot representation: the complete named file set at a point in history

use crate::hash::{hash_bytes, ContentHash};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single file captured by a commit
///
/// Owned exclusively by the commit that contains it; never mutated after
/// capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name, unique within its snapshot
    pub name: String,
    /// SHA-1 of the raw content
    pub content_hash: ContentHash,
    /// Content length in bytes
    pub size: u64,
    /// Full raw content; snapshots store content, not deltas
    pub content: Vec<u8>,
}

impl FileEntry {
    /// Capture a file, hashing its content
    pub fn capture(name: impl Into<String>, content: Vec<u8>) -> Self {
        let content_hash = hash_bytes(&content);
        Self {
            name: name.into(),
            content_hash,
            size: content.len() as u64,
            content,
        }
    }
}

/// The complete file set at a point in history
///
/// Keyed by file name. BTreeMap iteration is sorted, which gives the
/// canonical ordering that commit-identity hashing relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    entries: BTreeMap<String, FileEntry>,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Capture a snapshot from a file-content map, hashing every file
    pub fn capture<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let entries = files
            .into_iter()
            .map(|(name, content)| {
                let entry = FileEntry::capture(name.clone(), content);
                (name, entry)
            })
            .collect();
        Self { entries }
    }

    /// Get an entry by file name
    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.get(name)
    }

    /// Check whether a file name is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get the number of files in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in file-name order
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    /// Iterate over file names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Sorted `(name, content hash)` pairs
    ///
    /// This is the canonical manifest hashed into commit identity; sorting
    /// by name makes it independent of how the input map was built.
    pub fn manifest(&self) -> Vec<(&str, ContentHash)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.content_hash))
            .collect()
    }

    /// Consume the snapshot into a name -> raw bytes map, the checkout
    /// projection handed back to the caller
    pub fn into_contents(self) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .into_iter()
            .map(|(name, entry)| (name, entry.content))
            .collect()
    }

    /// Re-hash every entry against its recorded hash
    ///
    /// Guards checkout against corruption introduced by the storage
    /// collaborator.
    pub fn verify(&self) -> Result<()> {
        for entry in self.entries.values() {
            let actual = hash_bytes(&entry.content);
            if actual != entry.content_hash {
                return Err(Error::HashMismatch {
                    name: entry.name.clone(),
                    expected: entry.content_hash.to_hex(),
                    actual: actual.to_hex(),
                });
            }
        }
        Ok(())
    }
}
