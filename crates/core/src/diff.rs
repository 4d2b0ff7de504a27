//! LCS-based line diffing
//!
//! The differ fills a full dynamic-programming table of size
//! `(|old|+1) x (|new|+1)`, so both time and space scale as
//! `O(|old| * |new|)`. That quadratic cost is the engine's scaling limit:
//! inputs beyond the configured line ceiling are rejected by the line-level
//! API and degraded to a whole-file rewrite count by the summary API.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Classification of a single diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffOp {
    /// Line present in both sequences
    Equal,
    /// Line present only in the new sequence
    Add,
    /// Line present only in the old sequence
    Remove,
}

/// One line of a computed diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    pub op: DiffOp,
    pub text: String,
    /// Position in the old sequence (set for Equal and Remove)
    pub old_index: Option<usize>,
    /// Position in the new sequence (set for Equal and Add)
    pub new_index: Option<usize>,
}

/// Aggregate line-change counts for a commit relative to its parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub additions: u64,
    pub deletions: u64,
    pub modifications: u64,
}

impl ChangeSummary {
    /// Field-wise sum, used to fold per-file summaries into one commit summary
    pub fn merge(&mut self, other: &ChangeSummary) {
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.modifications += other.modifications;
    }

    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0 && self.modifications == 0
    }

    /// Fold a diff into counts under the paired-replace policy
    ///
    /// Raw removed/added counts come straight from the backtrace. Each
    /// maximal run of removals immediately followed by additions is a
    /// replace hunk: `min(removed, added)` of its lines count as
    /// modifications and leave both raw counts.
    pub fn from_ops(ops: &[LineDiff]) -> Self {
        let mut summary = ChangeSummary::default();
        let mut i = 0;
        while i < ops.len() {
            match ops[i].op {
                DiffOp::Equal => i += 1,
                DiffOp::Remove => {
                    let mut removed = 0u64;
                    while i < ops.len() && ops[i].op == DiffOp::Remove {
                        removed += 1;
                        i += 1;
                    }
                    let mut added = 0u64;
                    while i < ops.len() && ops[i].op == DiffOp::Add {
                        added += 1;
                        i += 1;
                    }
                    let paired = removed.min(added);
                    summary.modifications += paired;
                    summary.deletions += removed - paired;
                    summary.additions += added - paired;
                }
                DiffOp::Add => {
                    while i < ops.len() && ops[i].op == DiffOp::Add {
                        summary.additions += 1;
                        i += 1;
                    }
                }
            }
        }
        summary
    }
}

/// Line-level diff for one file between two snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDiff {
    pub name: String,
    pub lines: Vec<LineDiff>,
    pub summary: ChangeSummary,
}

/// Default per-side line ceiling for the quadratic differ
pub const DEFAULT_MAX_LINES: usize = 10_000;

/// LCS line differ
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    max_lines: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a differ with a custom per-side line ceiling
    pub fn with_max_lines(max_lines: usize) -> Self {
        Self { max_lines }
    }

    /// Compute the classified line diff between two line sequences
    ///
    /// Fails with a validation error when either side exceeds the line
    /// ceiling; large inputs would otherwise degrade quadratically.
    pub fn diff_lines(&self, old: &[String], new: &[String]) -> Result<Vec<LineDiff>> {
        if old.len() > self.max_lines || new.len() > self.max_lines {
            return Err(Error::Validation(format!(
                "diff input exceeds {} lines ({} old, {} new)",
                self.max_lines,
                old.len(),
                new.len()
            )));
        }
        let table = lcs_table(old, new);
        Ok(backtrack(&table, old, new))
    }

    /// Aggregate counts for the change between two line sequences
    ///
    /// Unlike [`diff_lines`](Self::diff_lines) this never fails: inputs over
    /// the ceiling are counted as a whole-file rewrite so an oversized file
    /// cannot block the commit path.
    pub fn summary(&self, old: &[String], new: &[String]) -> ChangeSummary {
        if old.len() > self.max_lines || new.len() > self.max_lines {
            tracing::warn!(
                old_lines = old.len(),
                new_lines = new.len(),
                ceiling = self.max_lines,
                "diff input exceeds line ceiling, counting as whole-file rewrite"
            );
            return ChangeSummary {
                additions: new.len() as u64,
                deletions: old.len() as u64,
                modifications: 0,
            };
        }
        let table = lcs_table(old, new);
        ChangeSummary::from_ops(&backtrack(&table, old, new))
    }
}

/// Split raw file content into lines for diffing
///
/// A trailing newline does not produce a phantom empty last line. Content is
/// treated as UTF-8 with lossy replacement; binary diffing is out of scope.
pub fn split_lines(content: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(content)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Fill the LCS table: `table[i][j]` is the LCS length of `old[0..i)` and
/// `new[0..j)`
fn lcs_table(old: &[String], new: &[String]) -> Vec<Vec<u32>> {
    let mut table = vec![vec![0u32; new.len() + 1]; old.len() + 1];
    for i in 1..=old.len() {
        for j in 1..=new.len() {
            table[i][j] = if old[i - 1] == new[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

/// Walk the table from `table[|old|][|new|]` back to the origin
///
/// Matched lines emit Equal; otherwise the larger neighbor wins, with ties
/// resolved toward the addition branch so inputs with multiple LCS solutions
/// always produce the same diff.
fn backtrack(table: &[Vec<u32>], old: &[String], new: &[String]) -> Vec<LineDiff> {
    let mut ops = Vec::with_capacity(old.len().max(new.len()));
    let mut i = old.len();
    let mut j = new.len();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1] == new[j - 1] {
            ops.push(LineDiff {
                op: DiffOp::Equal,
                text: old[i - 1].clone(),
                old_index: Some(i - 1),
                new_index: Some(j - 1),
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            ops.push(LineDiff {
                op: DiffOp::Add,
                text: new[j - 1].clone(),
                old_index: None,
                new_index: Some(j - 1),
            });
            j -= 1;
        } else {
            ops.push(LineDiff {
                op: DiffOp::Remove,
                text: old[i - 1].clone(),
                old_index: Some(i - 1),
                new_index: None,
            });
            i -= 1;
        }
    }

    ops.reverse();
    ops
}
