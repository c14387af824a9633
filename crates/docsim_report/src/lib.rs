//! docsim_report: on-disk artifact layout for comparison runs.
//!
//! A run's artifacts live in one directory under the caller's output root,
//! keyed by a lexicographically-sortable timestamp. Inside it, one JSON
//! file per pair named by the pair's 0-based index, plus one aggregate
//! summary file. Downstream retrieval-by-index and retrieval-by-timestamp
//! rely on those names matching the indices and run id in the summary, so
//! the naming here is a contract, not a convention.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use docsim_compare::BlockAlignment;

/// Timestamp format of a run's directory key. Lexicographic order equals
/// chronological order.
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File name of the aggregate summary inside a run directory.
pub const SUMMARY_FILE_NAME: &str = "_results.json";

/// Upper bound on collision-retry suffixes for one timestamp.
const MAX_RUN_ID_ATTEMPTS: usize = 1000;

/// Artifact file name for a pair, from its 0-based index.
pub fn pair_artifact_name(index: usize) -> String {
    format!("{index}.json")
}

/// A created run directory: its key and its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    pub run_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create run directory under {}: {source}", root.display())]
    CreateDir {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no free run directory name for {run_id} after {attempts} attempts")]
    RunIdExhausted { run_id: String, attempts: usize },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Create the artifact directory for a run starting at `created_at`.
///
/// The directory name is the formatted timestamp; when a directory of that
/// name already exists (another run within the same second), `_1`, `_2`, …
/// suffixes disambiguate. `create_dir` is the atomicity point: two
/// concurrent runs can never end up sharing a directory.
pub fn create_run_dir(
    output_root: &Path,
    created_at: DateTime<Utc>,
) -> Result<RunDirectory, ReportError> {
    fs::create_dir_all(output_root).map_err(|source| ReportError::CreateDir {
        root: output_root.to_path_buf(),
        source,
    })?;

    let base = created_at.format(RUN_ID_FORMAT).to_string();
    for attempt in 0..MAX_RUN_ID_ATTEMPTS {
        let run_id = if attempt == 0 {
            base.clone()
        } else {
            format!("{base}_{attempt}")
        };
        let path = output_root.join(&run_id);
        match fs::create_dir(&path) {
            Ok(()) => {
                debug!(run_id = %run_id, "run_directory_created");
                return Ok(RunDirectory { run_id, path });
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(ReportError::CreateDir {
                    root: output_root.to_path_buf(),
                    source,
                })
            }
        }
    }
    Err(ReportError::RunIdExhausted {
        run_id: base,
        attempts: MAX_RUN_ID_ATTEMPTS,
    })
}

/// One pair's row in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairSummary {
    pub source_name: String,
    pub score: f64,
    pub run_id: String,
    pub index: usize,
    /// Artifact file name inside the run directory.
    pub artifact: String,
}

/// Aggregate outcome of one comparison run. Returned to the caller and
/// serialized as the run's summary file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRun {
    pub run_id: String,
    pub target_name: String,
    pub created_at: DateTime<Utc>,
    pub pairs: Vec<PairSummary>,
}

/// One block of a rendered document: its tokens plus match data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedBlock {
    pub index: usize,
    pub tokens: Vec<String>,
    pub matched: bool,
    /// Index of the matching block on the other side, when matched.
    pub counterpart: Option<usize>,
}

/// One document's partition, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedDocument {
    pub name: String,
    pub blocks: Vec<RenderedBlock>,
}

/// Per-pair artifact payload: everything a renderer needs to highlight
/// matched passages on both sides of one target/source comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairReport {
    pub run_id: String,
    pub index: usize,
    pub score: f64,
    pub target: RenderedDocument,
    pub source: RenderedDocument,
}

impl PairReport {
    /// Assemble the artifact payload for one pair from its alignment.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: &str,
        index: usize,
        score: f64,
        target_name: &str,
        target_tokens: &[String],
        source_name: &str,
        source_tokens: &[String],
        alignment: &BlockAlignment,
    ) -> Self {
        let target_blocks = alignment
            .entries
            .iter()
            .zip(&alignment.a_blocks)
            .map(|(entry, block)| RenderedBlock {
                index: block.index,
                tokens: block.slice(target_tokens).to_vec(),
                matched: entry.matched,
                counterpart: entry.b_index,
            })
            .collect();

        let b_counterparts = alignment.b_counterparts();
        let source_blocks = alignment
            .b_blocks
            .iter()
            .map(|block| RenderedBlock {
                index: block.index,
                tokens: block.slice(source_tokens).to_vec(),
                matched: b_counterparts[block.index].is_some(),
                counterpart: b_counterparts[block.index],
            })
            .collect();

        Self {
            run_id: run_id.to_string(),
            index,
            score,
            target: RenderedDocument {
                name: target_name.to_string(),
                blocks: target_blocks,
            },
            source: RenderedDocument {
                name: source_name.to_string(),
                blocks: source_blocks,
            },
        }
    }
}

/// Persist one pair's artifact; returns its path.
pub fn write_pair_report(dir: &RunDirectory, report: &PairReport) -> Result<PathBuf, ReportError> {
    let path = dir.path.join(pair_artifact_name(report.index));
    write_json(&path, report)?;
    Ok(path)
}

/// Persist the aggregate summary; returns its path.
pub fn write_run_summary(dir: &RunDirectory, run: &ComparisonRun) -> Result<PathBuf, ReportError> {
    let path = dir.path.join(SUMMARY_FILE_NAME);
    write_json(&path, run)?;
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docsim_compare::align;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(|s| s.to_string()).collect()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 10, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_run_dir_keyed_by_timestamp() {
        let root = tempfile::tempdir().expect("create temp dir");
        let dir = create_run_dir(root.path(), fixed_time()).expect("create run dir");
        assert_eq!(dir.run_id, "20240517_103000");
        assert_eq!(dir.path, root.path().join("20240517_103000"));
        assert!(dir.path.is_dir());
    }

    #[test]
    fn test_run_dir_collision_appends_suffix() {
        let root = tempfile::tempdir().expect("create temp dir");
        let first = create_run_dir(root.path(), fixed_time()).expect("create run dir");
        let second = create_run_dir(root.path(), fixed_time()).expect("create run dir");
        let third = create_run_dir(root.path(), fixed_time()).expect("create run dir");

        assert_eq!(first.run_id, "20240517_103000");
        assert_eq!(second.run_id, "20240517_103000_1");
        assert_eq!(third.run_id, "20240517_103000_2");
        assert!(second.path.is_dir());
        assert!(third.path.is_dir());
        // Suffixed keys still sort between their second and the next one.
        assert!(first.run_id < second.run_id);
        assert!(second.run_id.as_str() < "20240517_103001");
    }

    #[test]
    fn test_pair_artifact_names_are_indices() {
        assert_eq!(pair_artifact_name(0), "0.json");
        assert_eq!(pair_artifact_name(12), "12.json");
    }

    #[test]
    fn test_pair_report_mirrors_alignment() {
        let target = toks("the quick brown fox");
        let source = toks("the quick brown fox jumps");
        let alignment = align(&target, &source, 2).expect("align succeeds");
        let report = PairReport::new(
            "20240517_103000",
            0,
            0.88,
            "target",
            &target,
            "source",
            &source,
            &alignment,
        );

        assert_eq!(report.target.blocks.len(), 2);
        assert!(report.target.blocks.iter().all(|b| b.matched));
        assert_eq!(report.target.blocks[0].tokens, vec!["the", "quick"]);
        assert_eq!(report.target.blocks[1].counterpart, Some(1));

        assert_eq!(report.source.blocks.len(), 3);
        assert!(report.source.blocks[0].matched);
        assert!(report.source.blocks[1].matched);
        assert!(!report.source.blocks[2].matched);
        assert_eq!(report.source.blocks[2].tokens, vec!["jumps"]);
        assert_eq!(report.source.blocks[0].counterpart, Some(0));
    }

    #[test]
    fn test_artifacts_written_and_readable() {
        let root = tempfile::tempdir().expect("create temp dir");
        let dir = create_run_dir(root.path(), fixed_time()).expect("create run dir");

        let target = toks("alpha beta gamma");
        let source = toks("alpha beta delta");
        let alignment = align(&target, &source, 2).expect("align succeeds");
        let report = PairReport::new(
            &dir.run_id,
            0,
            0.5,
            "target",
            &target,
            "source",
            &source,
            &alignment,
        );
        let pair_path = write_pair_report(&dir, &report).expect("write pair report");
        assert_eq!(pair_path, dir.path.join("0.json"));

        let run = ComparisonRun {
            run_id: dir.run_id.clone(),
            target_name: "target".to_string(),
            created_at: fixed_time(),
            pairs: vec![PairSummary {
                source_name: "source".to_string(),
                score: 0.5,
                run_id: dir.run_id.clone(),
                index: 0,
                artifact: pair_artifact_name(0),
            }],
        };
        let summary_path = write_run_summary(&dir, &run).expect("write summary");
        assert_eq!(summary_path, dir.path.join(SUMMARY_FILE_NAME));

        let raw = fs::read_to_string(&pair_path).expect("read pair report");
        let parsed: PairReport = serde_json::from_str(&raw).expect("parse pair report");
        assert_eq!(parsed, report);

        let raw = fs::read_to_string(&summary_path).expect("read summary");
        let parsed: ComparisonRun = serde_json::from_str(&raw).expect("parse summary");
        assert_eq!(parsed, run);
    }
}
