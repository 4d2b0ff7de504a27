//! Append-only commit DAG

use crate::Commit;
use ahash::AHashMap;
use minivcs_core::diff::ChangeSummary;
use minivcs_core::{ContentHash, Error, Result};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Append-only directed acyclic graph of commits
///
/// Nodes are keyed by commit hash; edges run parent -> child. Acyclicity is
/// structural: an edge is only ever added from an existing node to the node
/// being inserted, so a cycle cannot form.
#[derive(Debug, Default)]
pub struct CommitGraph {
    nodes: AHashMap<ContentHash, Commit>,
    edges: Vec<(ContentHash, ContentHash)>,
}

impl CommitGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of commits in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether a commit hash is present
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Insert a commit whose parents must already be present
    ///
    /// Re-inserting a commit with identical content is a no-op success. A
    /// hash that collides with different content is an integrity fault and
    /// cannot happen while the content hasher is correct.
    pub fn add_commit(&mut self, commit: Commit) -> Result<()> {
        if let Some(existing) = self.nodes.get(&commit.hash) {
            if existing.same_content(&commit) {
                return Ok(());
            }
            return Err(Error::Conflict(format!(
                "commit {} already exists with different content",
                commit.hash
            )));
        }

        for parent in &commit.parents {
            if !self.nodes.contains_key(parent) {
                return Err(Error::Validation(format!(
                    "parent commit {parent} does not exist"
                )));
            }
        }

        for parent in &commit.parents {
            self.edges.push((*parent, commit.hash));
        }
        self.nodes.insert(commit.hash, commit);
        Ok(())
    }

    /// Get a commit by hash
    pub fn get(&self, hash: &ContentHash) -> Result<&Commit> {
        self.nodes
            .get(hash)
            .ok_or_else(|| Error::NotFound(format!("commit {hash} not found")))
    }

    /// Walk parent links from `head` back to the root, newest first
    ///
    /// Parents are treated as a list so future merge commits traverse
    /// without restructuring; the visited set bounds the walk by the total
    /// commit count.
    pub fn history(&self, head: &ContentHash) -> Result<Vec<Commit>> {
        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([*head]);

        while let Some(hash) = queue.pop_front() {
            if !visited.insert(hash) {
                continue;
            }
            let commit = self.get(&hash)?;
            ordered.push(commit.clone());
            for parent in &commit.parents {
                queue.push_back(*parent);
            }
        }

        Ok(ordered)
    }

    /// Project the graph into a rendering-agnostic view
    ///
    /// Nodes are ordered oldest first (timestamp, then hash, so the order is
    /// stable even within one millisecond); edges keep append order.
    pub fn to_view(&self) -> GraphView {
        let mut nodes: Vec<&Commit> = self.nodes.values().collect();
        nodes.sort_by_key(|c| (c.timestamp_ms, c.hash));

        GraphView {
            nodes: nodes
                .into_iter()
                .map(|commit| GraphNode {
                    hash: commit.hash.to_hex(),
                    message: commit.message.clone(),
                    author: commit.author.clone(),
                    timestamp_ms: commit.timestamp_ms,
                    summary: commit.summary,
                    files: commit.snapshot.len(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|(parent, child)| GraphEdge {
                    from: parent.to_hex(),
                    to: child.to_hex(),
                })
                .collect(),
            total_commits: self.nodes.len(),
        }
    }
}

/// Rendering-agnostic projection of the DAG for visualization collaborators
#[derive(Debug, Clone, Serialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub total_commits: usize,
}

/// One commit as seen by the graph view
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp_ms: u64,
    pub summary: ChangeSummary,
    pub files: usize,
}

/// One parent -> child link as seen by the graph view
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use minivcs_core::Snapshot;

    fn commit_with(message: &str, parents: Vec<ContentHash>) -> Commit {
        let snapshot = Snapshot::capture(vec![(
            "a.txt".to_string(),
            format!("content for {message}").into_bytes(),
        )]);
        Commit::new(message, "alice", parents, snapshot, ChangeSummary::default())
    }

    #[test]
    fn test_add_root_commit() {
        let mut graph = CommitGraph::new();
        let root = commit_with("root", vec![]);

        graph.add_commit(root.clone()).unwrap();

        assert_eq!(graph.len(), 1);
        assert!(graph.contains(&root.hash));
        assert_eq!(graph.get(&root.hash).unwrap().message, "root");
    }

    #[test]
    fn test_add_child_commit() {
        let mut graph = CommitGraph::new();
        let root = commit_with("root", vec![]);
        let child = commit_with("child", vec![root.hash]);

        graph.add_commit(root).unwrap();
        graph.add_commit(child.clone()).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(&child.hash).unwrap().parents.len(), 1);
    }

    #[test]
    fn test_add_commit_missing_parent() {
        let mut graph = CommitGraph::new();
        let orphan_parent = commit_with("never added", vec![]);
        let child = commit_with("child", vec![orphan_parent.hash]);

        let err = graph.add_commit(child).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_duplicate_commit_is_noop() {
        let mut graph = CommitGraph::new();
        let root = commit_with("root", vec![]);

        graph.add_commit(root.clone()).unwrap();
        graph.add_commit(root.clone()).unwrap();

        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_duplicate_hash_different_content_is_conflict() {
        let mut graph = CommitGraph::new();
        let root = commit_with("root", vec![]);
        graph.add_commit(root.clone()).unwrap();

        // Forge a node that claims the same hash but different content; the
        // hasher cannot produce this, so it must be treated as corruption
        let mut forged = root.clone();
        forged.message = "forged".to_string();

        let err = graph.add_commit(forged).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(graph.get(&root.hash).unwrap().message, "root");
    }

    #[test]
    fn test_get_not_found() {
        let graph = CommitGraph::new();
        let missing = commit_with("missing", vec![]);

        let err = graph.get(&missing.hash).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_history_newest_first() {
        let mut graph = CommitGraph::new();
        let c1 = commit_with("first", vec![]);
        let c2 = commit_with("second", vec![c1.hash]);
        let c3 = commit_with("third", vec![c2.hash]);

        graph.add_commit(c1.clone()).unwrap();
        graph.add_commit(c2.clone()).unwrap();
        graph.add_commit(c3.clone()).unwrap();

        let history = graph.history(&c3.hash).unwrap();
        let hashes: Vec<_> = history.iter().map(|c| c.hash).collect();
        assert_eq!(hashes, vec![c3.hash, c2.hash, c1.hash]);
        assert!(history.last().unwrap().is_root());
    }

    #[test]
    fn test_history_from_mid_chain() {
        let mut graph = CommitGraph::new();
        let c1 = commit_with("first", vec![]);
        let c2 = commit_with("second", vec![c1.hash]);
        let c3 = commit_with("third", vec![c2.hash]);

        graph.add_commit(c1.clone()).unwrap();
        graph.add_commit(c2.clone()).unwrap();
        graph.add_commit(c3).unwrap();

        let history = graph.history(&c2.hash).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hash, c2.hash);
    }

    #[test]
    fn test_history_unknown_head() {
        let graph = CommitGraph::new();
        let missing = commit_with("missing", vec![]);

        let err = graph.history(&missing.hash).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_history_walk_is_bounded() {
        let mut graph = CommitGraph::new();
        let mut parent: Option<ContentHash> = None;
        let mut head = None;

        for i in 0..50 {
            let commit = commit_with(&format!("commit {i}"), parent.into_iter().collect());
            parent = Some(commit.hash);
            head = Some(commit.hash);
            graph.add_commit(commit).unwrap();
        }

        let history = graph.history(&head.unwrap()).unwrap();
        assert_eq!(history.len(), graph.len());
        assert!(history.last().unwrap().is_root());
    }

    #[test]
    fn test_graph_view_projection() {
        let mut graph = CommitGraph::new();
        let c1 = commit_with("first", vec![]);
        let c2 = commit_with("second", vec![c1.hash]);

        graph.add_commit(c1.clone()).unwrap();
        graph.add_commit(c2.clone()).unwrap();

        let view = graph.to_view();
        assert_eq!(view.total_commits, 2);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].from, c1.hash.to_hex());
        assert_eq!(view.edges[0].to, c2.hash.to_hex());
        assert_eq!(view.nodes[0].files, 1);
    }

    #[test]
    fn test_graph_view_empty() {
        let view = CommitGraph::new().to_view();
        assert_eq!(view.total_commits, 0);
        assert!(view.nodes.is_empty());
        assert!(view.edges.is_empty());
    }
}
