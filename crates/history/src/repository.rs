//! Repository state and the commit/checkout paths

use crate::{Commit, CommitGraph, GraphView};
use minivcs_core::diff::{split_lines, ChangeSummary, DiffEngine, FileDiff};
use minivcs_core::{ContentHash, Error, Result, Snapshot};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Default branch name for new repositories
pub const DEFAULT_BRANCH: &str = "main";

/// Mutable repository state guarded by one lock
#[derive(Debug, Default)]
struct RepoState {
    graph: CommitGraph,
    /// Branch name -> head hash; `None` until the first commit lands
    heads: BTreeMap<String, Option<ContentHash>>,
}

/// A repository: commit DAG plus branch heads
///
/// Commits are immutable once appended, so reads (checkout, history, diff,
/// graph view) clone what they need out under the read lock and work
/// unlocked; the commit path holds the write lock only for the final
/// compare-and-advance.
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Branch used when callers do not name one
    pub default_branch: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at_ms: u64,
    state: RwLock<RepoState>,
    differ: DiffEngine,
}

impl Repository {
    /// Create a repository with an empty default branch
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut heads = BTreeMap::new();
        heads.insert(DEFAULT_BRANCH.to_string(), None);

        Self {
            name: name.into(),
            description: description.into(),
            default_branch: DEFAULT_BRANCH.to_string(),
            created_at_ms: current_timestamp_ms(),
            state: RwLock::new(RepoState {
                graph: CommitGraph::new(),
                heads,
            }),
            differ: DiffEngine::new(),
        }
    }

    /// Replace the diff engine (e.g. to change the line ceiling)
    pub fn with_diff_engine(mut self, differ: DiffEngine) -> Self {
        self.differ = differ;
        self
    }

    /// Create a commit from a fully materialized file-content map
    ///
    /// `parent` is the branch head the caller observed when it captured
    /// `files`. The append only applies if the head still equals it at apply
    /// time; otherwise the head moved under us and the caller gets a
    /// conflict to retry with the new head as parent. Either the graph is
    /// mutated and the head advanced, or nothing changes.
    pub fn commit(
        &self,
        branch: &str,
        files: BTreeMap<String, Vec<u8>>,
        message: &str,
        author: &str,
        parent: Option<ContentHash>,
    ) -> Result<Commit> {
        if message.trim().is_empty() {
            return Err(Error::Validation("commit message must not be empty".into()));
        }
        if files.is_empty() {
            return Err(Error::Validation("cannot commit an empty file set".into()));
        }

        // Read phase: resolve the parent snapshot
        let parent_snapshot = {
            let state = self.state.read();
            if !state.heads.contains_key(branch) {
                return Err(Error::NotFound(format!("branch {branch} not found")));
            }
            match parent {
                Some(hash) => Some(state.graph.get(&hash)?.snapshot.clone()),
                None => None,
            }
        };

        // Compute phase: hash contents and summarize changes, no lock held
        let snapshot = Snapshot::capture(files);
        let summary = self.summarize(parent_snapshot.as_ref(), &snapshot);
        let commit = Commit::new(
            message,
            author,
            parent.into_iter().collect(),
            snapshot,
            summary,
        );

        // Append phase: compare-and-advance under the write lock
        let mut state = self.state.write();
        let head = *state
            .heads
            .get(branch)
            .ok_or_else(|| Error::NotFound(format!("branch {branch} not found")))?;
        if head != parent {
            return Err(Error::Conflict(format!(
                "branch {branch} moved: expected head {}, found {}",
                head_label(&parent),
                head_label(&head)
            )));
        }
        state.graph.add_commit(commit.clone())?;
        state.heads.insert(branch.to_string(), Some(commit.hash));

        tracing::info!(
            branch,
            hash = %commit.hash,
            files = commit.snapshot.len(),
            "commit appended, head advanced"
        );
        Ok(commit)
    }

    /// Return the snapshot recorded by `hash`, verifying content integrity
    ///
    /// A pure projection: every snapshot stores full file content, so there
    /// is nothing to patch or merge.
    pub fn checkout(&self, hash: &ContentHash) -> Result<Snapshot> {
        let snapshot = self.state.read().graph.get(hash)?.snapshot.clone();
        snapshot.verify()?;
        tracing::debug!(%hash, files = snapshot.len(), "checkout verified");
        Ok(snapshot)
    }

    /// Walk parent links from `head` back to the root, newest first
    pub fn history(&self, head: &ContentHash) -> Result<Vec<Commit>> {
        self.state.read().graph.history(head)
    }

    /// Newest-first commits reachable from a branch head, capped at `limit`
    pub fn log(&self, branch: &str, limit: usize) -> Result<Vec<Commit>> {
        match self.head(branch)? {
            Some(hash) => {
                let mut commits = self.history(&hash)?;
                commits.truncate(limit);
                Ok(commits)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Get the head of a branch (`None` while the branch is empty)
    pub fn head(&self, branch: &str) -> Result<Option<ContentHash>> {
        self.state
            .read()
            .heads
            .get(branch)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("branch {branch} not found")))
    }

    /// List branches and their heads in name order
    pub fn branches(&self) -> Vec<(String, Option<ContentHash>)> {
        self.state
            .read()
            .heads
            .iter()
            .map(|(name, head)| (name.clone(), *head))
            .collect()
    }

    /// Create a branch pointing at `at`, or an empty branch
    pub fn create_branch(&self, name: &str, at: Option<ContentHash>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation("branch name must not be empty".into()));
        }

        let mut state = self.state.write();
        if state.heads.contains_key(name) {
            return Err(Error::Conflict(format!("branch {name} already exists")));
        }
        if let Some(hash) = at {
            state.graph.get(&hash)?;
        }
        state.heads.insert(name.to_string(), at);

        tracing::info!(branch = name, at = ?at.map(|h| h.to_hex()), "branch created");
        Ok(())
    }

    /// Project the commit DAG for visualization collaborators
    pub fn graph_view(&self) -> GraphView {
        self.state.read().graph.to_view()
    }

    /// Per-file line diffs between two commits
    ///
    /// Covers the union of both snapshots' file names; a name missing on one
    /// side diffs against the empty line sequence, so new files are pure
    /// additions and deleted files pure removals. Unchanged files are
    /// omitted.
    pub fn diff(&self, from: &ContentHash, to: &ContentHash) -> Result<Vec<FileDiff>> {
        let (old_snapshot, new_snapshot) = {
            let state = self.state.read();
            (
                state.graph.get(from)?.snapshot.clone(),
                state.graph.get(to)?.snapshot.clone(),
            )
        };

        let mut names: BTreeSet<&str> = old_snapshot.names().collect();
        names.extend(new_snapshot.names());

        let mut diffs = Vec::new();
        for name in names {
            let old_lines = file_lines(&old_snapshot, name);
            let new_lines = file_lines(&new_snapshot, name);
            let lines = self.differ.diff_lines(&old_lines, &new_lines)?;
            let summary = ChangeSummary::from_ops(&lines);
            if summary.is_empty() {
                continue;
            }
            diffs.push(FileDiff {
                name: name.to_string(),
                lines,
                summary,
            });
        }
        Ok(diffs)
    }

    /// Sum per-file change counts between the parent snapshot and the new one
    fn summarize(&self, old: Option<&Snapshot>, new: &Snapshot) -> ChangeSummary {
        let empty = Snapshot::new();
        let old = old.unwrap_or(&empty);

        let mut names: BTreeSet<&str> = old.names().collect();
        names.extend(new.names());

        let mut total = ChangeSummary::default();
        for name in names {
            let old_lines = file_lines(old, name);
            let new_lines = file_lines(new, name);
            total.merge(&self.differ.summary(&old_lines, &new_lines));
        }
        total
    }
}

/// Lines of a named file, or the empty sequence when the file is absent
fn file_lines(snapshot: &Snapshot, name: &str) -> Vec<String> {
    snapshot
        .get(name)
        .map(|entry| split_lines(&entry.content))
        .unwrap_or_default()
}

fn head_label(head: &Option<ContentHash>) -> String {
    match head {
        Some(hash) => hash.to_hex(),
        None => "empty".to_string(),
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
