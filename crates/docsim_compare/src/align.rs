//! Fixed-size block partitioning and threshold alignment.
//!
//! Alignment is deliberately greedy: each a-block takes the first b-block
//! that clears the threshold, in positional order, and a consumed b-block
//! is unavailable to later a-blocks. Downstream artifact indices depend on
//! this exact rule, so it must not be replaced with a globally optimal
//! assignment.

use crate::score::similarity_ratio;
use crate::types::{AlignedBlock, Block, BlockAlignment, CompareError};

/// Ratio a block pair must exceed (strictly) to count as a match. Fixed so
/// every pair of a run is judged by the same rule.
pub const BLOCK_MATCH_THRESHOLD: f64 = 0.6;

/// Reject block sizes the partition rule cannot honor.
pub fn validate_block_size(block_size: usize) -> Result<(), CompareError> {
    if block_size == 0 {
        return Err(CompareError::InvalidBlockSize { block_size });
    }
    Ok(())
}

/// Partition `len` tokens into `ceil(len / block_size)` blocks.
///
/// Every block spans `block_size` tokens except the last, which keeps the
/// remainder. A zero-length sequence partitions into no blocks.
pub fn partition(len: usize, block_size: usize) -> Result<Vec<Block>, CompareError> {
    validate_block_size(block_size)?;
    let mut blocks = Vec::with_capacity(len.div_ceil(block_size));
    let mut start = 0;
    let mut index = 0;
    while start < len {
        let end = (start + block_size).min(len);
        blocks.push(Block { index, start, end });
        start = end;
        index += 1;
    }
    Ok(blocks)
}

/// Align `a` against `b` block by block.
///
/// Each a-block scans b's blocks in positional order and consumes the first
/// one whose ratio exceeds [`BLOCK_MATCH_THRESHOLD`]; when several clear it,
/// the lowest index wins. Repeated calls on the same input produce the same
/// alignment.
pub fn align<S: AsRef<str>>(
    a: &[S],
    b: &[S],
    block_size: usize,
) -> Result<BlockAlignment, CompareError> {
    let a_blocks = partition(a.len(), block_size)?;
    let b_blocks = partition(b.len(), block_size)?;

    let mut consumed = vec![false; b_blocks.len()];
    let mut entries = Vec::with_capacity(a_blocks.len());
    for a_block in &a_blocks {
        let a_tokens = a_block.slice(a);
        let mut b_index = None;
        for b_block in &b_blocks {
            if consumed[b_block.index] {
                continue;
            }
            if similarity_ratio(a_tokens, b_block.slice(b)) > BLOCK_MATCH_THRESHOLD {
                consumed[b_block.index] = true;
                b_index = Some(b_block.index);
                break;
            }
        }
        entries.push(AlignedBlock {
            a_index: a_block.index,
            b_index,
            matched: b_index.is_some(),
        });
    }

    Ok(BlockAlignment {
        block_size,
        a_blocks,
        b_blocks,
        entries,
    })
}
