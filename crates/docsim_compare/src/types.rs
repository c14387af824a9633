use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous slice of a token sequence, identified by its 0-based
/// position in the partition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub index: usize,
    /// Token offset of the first token (inclusive).
    pub start: usize,
    /// Token offset past the last token (exclusive).
    pub end: usize,
}

impl Block {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrow the tokens this block covers.
    pub fn slice<'a, S>(&self, tokens: &'a [S]) -> &'a [S] {
        &tokens[self.start..self.end]
    }
}

/// Match outcome for one block of the first sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlignedBlock {
    pub a_index: usize,
    /// Index of the counterpart block this one consumed, when a candidate
    /// cleared the threshold.
    pub b_index: Option<usize>,
    pub matched: bool,
}

/// Full alignment of two partitioned sequences: both partitions plus one
/// entry per a-block, in partition order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockAlignment {
    pub block_size: usize,
    pub a_blocks: Vec<Block>,
    pub b_blocks: Vec<Block>,
    pub entries: Vec<AlignedBlock>,
}

impl BlockAlignment {
    /// Matched flags for the second sequence's blocks, derived from the
    /// entries.
    pub fn b_matched(&self) -> Vec<bool> {
        let mut matched = vec![false; self.b_blocks.len()];
        for entry in &self.entries {
            if let Some(b) = entry.b_index {
                matched[b] = true;
            }
        }
        matched
    }

    /// For each b-block, the a-block that consumed it (if any).
    pub fn b_counterparts(&self) -> Vec<Option<usize>> {
        let mut counterparts = vec![None; self.b_blocks.len()];
        for entry in &self.entries {
            if let Some(b) = entry.b_index {
                counterparts[b] = Some(entry.a_index);
            }
        }
        counterparts
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("invalid block size: must be >= 1 (got {block_size})")]
    InvalidBlockSize { block_size: usize },
}
