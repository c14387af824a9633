//! docsim_compare: similarity scoring and block alignment for token
//! sequences.
//!
//! Two pieces live here:
//!
//! - **Scoring** ([`score`], [`similarity_ratio`]): a symmetric ratio in
//!   [0, 1] built from the maximal matching runs shared by two sequences,
//!   plus the `-1.0` sentinel for a sequence scored against itself in an
//!   all-pairs matrix ([`score_matrix`]).
//! - **Alignment** ([`align`], [`partition`]): fixed-size block
//!   partitioning and a deterministic first-match pairing of blocks across
//!   two sequences, used downstream to highlight matched passages.
//!
//! Both operate on plain `&[S] where S: AsRef<str>` slices so the crate has
//! no opinion about where tokens come from.

pub mod align;
pub mod score;
pub mod types;

pub use align::{align, partition, validate_block_size, BLOCK_MATCH_THRESHOLD};
pub use score::{
    matching_runs, score, score_matrix, similarity_ratio, MatchingRun, SELF_COMPARISON_SCORE,
};
pub use types::{AlignedBlock, Block, BlockAlignment, CompareError};
