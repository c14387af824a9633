//! Similarity scoring over token slices.
//!
//! The ratio follows the longest-matching-block construction: find the
//! longest contiguous run of tokens common to both sequences, recurse on
//! the regions to its left and right, then merge runs that touch on both
//! sides. The score is `2 * matched / (len(a) + len(b))`, symmetric and in
//! [0, 1] for distinct inputs.

use std::collections::HashMap;

/// Score reserved for a sequence compared against itself in an all-pairs
/// matrix. Means "excluded from ranking", not "zero similarity"; callers
/// sorting or thresholding scores must special-case it.
pub const SELF_COMPARISON_SCORE: f64 = -1.0;

/// One maximal run of identical tokens: `a[a_start..a_start + len]` equals
/// `b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingRun {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

impl MatchingRun {
    pub fn a_end(&self) -> usize {
        self.a_start + self.len
    }

    pub fn b_end(&self) -> usize {
        self.b_start + self.len
    }
}

/// Longest common contiguous run within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// `b2j` maps each token of `b` to its ascending positions. Ties go to the
/// run starting earliest in `a`, then earliest in `b`, which pins down the
/// recursion deterministically.
fn find_longest_run<S: AsRef<str>>(
    a: &[S],
    b2j: &HashMap<&str, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> MatchingRun {
    let mut best = MatchingRun {
        a_start: a_lo,
        b_start: b_lo,
        len: 0,
    };
    // run_len[j] = length of the common run ending at a[i - 1], b[j].
    let mut run_len: HashMap<usize, usize> = HashMap::new();
    for i in a_lo..a_hi {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(a[i].as_ref()) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let len = if j == 0 {
                    1
                } else {
                    run_len.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next.insert(j, len);
                if len > best.len {
                    best = MatchingRun {
                        a_start: i + 1 - len,
                        b_start: j + 1 - len,
                        len,
                    };
                }
            }
        }
        run_len = next;
    }
    best
}

/// All maximal matching runs between `a` and `b`.
///
/// Runs are non-overlapping, strictly increasing on both sides, and
/// adjacent runs are merged, so the total matched length is the sum of the
/// run lengths.
pub fn matching_runs<S: AsRef<str>>(a: &[S], b: &[S]) -> Vec<MatchingRun> {
    let mut b2j: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, token) in b.iter().enumerate() {
        b2j.entry(token.as_ref()).or_default().push(j);
    }

    let mut queue = vec![(0, a.len(), 0, b.len())];
    let mut raw: Vec<MatchingRun> = Vec::new();
    while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
        let run = find_longest_run(a, &b2j, a_lo, a_hi, b_lo, b_hi);
        if run.len == 0 {
            continue;
        }
        if a_lo < run.a_start && b_lo < run.b_start {
            queue.push((a_lo, run.a_start, b_lo, run.b_start));
        }
        if run.a_end() < a_hi && run.b_end() < b_hi {
            queue.push((run.a_end(), a_hi, run.b_end(), b_hi));
        }
        raw.push(run);
    }
    raw.sort_unstable_by_key(|run| (run.a_start, run.b_start));

    let mut merged: Vec<MatchingRun> = Vec::new();
    for run in raw {
        match merged.last_mut() {
            Some(last) if last.a_end() == run.a_start && last.b_end() == run.b_start => {
                last.len += run.len;
            }
            _ => merged.push(run),
        }
    }
    merged
}

/// Similarity ratio in [0, 1]: twice the total matched token count over the
/// combined length. Symmetric in value; 1.0 for equal sequences; 0.0 when
/// either side is empty.
pub fn similarity_ratio<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let matched: usize = matching_runs(a, b).iter().map(|run| run.len).sum();
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Similarity of two token slices, with the self-comparison sentinel.
///
/// An empty side scores 0.0 unconditionally. Otherwise, when both arguments
/// are literally the same slice (same address and length) the result is
/// [`SELF_COMPARISON_SCORE`]; two distinct slices with equal content score
/// 1.0 like any other pair.
pub fn score<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if std::ptr::eq(a, b) {
        return SELF_COMPARISON_SCORE;
    }
    similarity_ratio(a, b)
}

/// All-pairs score matrix for a set of sequences.
///
/// Every diagonal cell holds the sentinel (by index, so empty sequences are
/// excluded from ranking too); off-diagonal cells hold [`score`].
pub fn score_matrix<S, T>(sequences: &[T]) -> Vec<Vec<f64>>
where
    S: AsRef<str>,
    T: AsRef<[S]>,
{
    sequences
        .iter()
        .enumerate()
        .map(|(i, row)| {
            sequences
                .iter()
                .enumerate()
                .map(|(j, column)| {
                    if i == j {
                        SELF_COMPARISON_SCORE
                    } else {
                        score(row.as_ref(), column.as_ref())
                    }
                })
                .collect()
        })
        .collect()
}
