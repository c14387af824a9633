//! Run orchestration: validate, extract, compare, persist, aggregate.
//!
//! A run moves through a linear state machine. Validation checks the inputs
//! before any file is opened; extraction turns the target and every source
//! into token sequences; comparison scores and aligns one pair at a time,
//! writing that pair's artifact before moving on; aggregation assembles the
//! summary and persists it last. Any failure aborts the run with no summary
//! written. Pair artifacts already on disk at that point are kept: partial
//! output is diagnosable, a summary over missing pairs is not.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn, Level};

use docsim_compare::{align, score, validate_block_size, CompareError};
use docsim_extract::{
    extract, is_supported_path, DocumentFormat, ExtractError, TokenSequence, TokenizeConfig,
};
use docsim_report::{
    create_run_dir, pair_artifact_name, write_pair_report, write_run_summary, ComparisonRun,
    PairReport, PairSummary, ReportError,
};

use crate::metrics::metrics_recorder;

/// Inputs for one comparison run.
///
/// Everything the engine needs arrives through this struct; it reads no
/// process-wide state, so two runs with equal options behave identically.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Document every source is compared against.
    pub target_path: PathBuf,
    /// Directory whose supported files form the source corpus.
    pub source_dir: PathBuf,
    /// Root under which the run's artifact directory is created.
    pub output_root: PathBuf,
    /// Tokens per alignment block.
    pub block_size: usize,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl EngineError {
    /// Stable machine-readable code for boundary layers.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::Extract(ExtractError::UnsupportedFormat { .. }) => "UNSUPPORTED_FORMAT",
            EngineError::Extract(ExtractError::InvalidConfig(_)) => "INVALID_CONFIGURATION",
            EngineError::Extract(_) => "EXTRACTION_ERROR",
            EngineError::Compare(_) => "INVALID_CONFIGURATION",
            EngineError::Report(_) => "REPORT_ERROR",
        }
    }

    fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation {
            reason: reason.into(),
        }
    }
}

/// List the supported documents of a source directory, sorted by path.
///
/// Subdirectories and files with unsupported extensions are skipped, not
/// rejected: directory contents are uploads, and upload filtering belongs to
/// the boundary that accepted them. An explicit source list passed to
/// [`run_with_sources`] gets the opposite treatment.
pub fn list_source_files(source_dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let read_failure = |err: std::io::Error| {
        EngineError::validation(format!(
            "source directory {} is not readable: {err}",
            source_dir.display()
        ))
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(read_failure)? {
        let path = entry.map_err(read_failure)?.path();
        if path.is_file() && is_supported_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run one comparison over a source directory.
///
/// Directory form of [`run_with_sources`]: the directory's supported files,
/// in sorted order, become the source list. A directory with no supported
/// files fails validation the same way an empty explicit list does.
pub fn run_comparison(
    options: &RunOptions,
    tokenize: &TokenizeConfig,
) -> Result<ComparisonRun, EngineError> {
    let sources = list_source_files(&options.source_dir)?;
    run_with_sources(
        &options.target_path,
        &sources,
        &options.output_root,
        options.block_size,
        tokenize,
    )
}

/// Run one comparison over an explicit, ordered source list.
///
/// Every path in `source_paths` must extract cleanly; one unreadable or
/// unsupported source aborts the whole run. Pair indices follow list order,
/// so reordering the list permutes indices but never changes scores.
pub fn run_with_sources(
    target_path: &Path,
    source_paths: &[PathBuf],
    output_root: &Path,
    block_size: usize,
    tokenize: &TokenizeConfig,
) -> Result<ComparisonRun, EngineError> {
    let start = Instant::now();
    let span = tracing::span!(
        Level::INFO,
        "docsim.run",
        target = %target_path.display(),
        source_count = source_paths.len(),
        block_size
    );
    let _guard = span.enter();

    match run_inner(target_path, source_paths, output_root, block_size, tokenize) {
        Ok(run) => {
            info!(
                run_id = %run.run_id,
                target = %run.target_name,
                pair_count = run.pairs.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "run_success"
            );
            if let Some(metrics) = metrics_recorder() {
                metrics.record_run(&run.target_name, start.elapsed(), run.pairs.len());
            }
            Ok(run)
        }
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "run_failure");
            Err(err)
        }
    }
}

fn run_inner(
    target_path: &Path,
    source_paths: &[PathBuf],
    output_root: &Path,
    block_size: usize,
    tokenize: &TokenizeConfig,
) -> Result<ComparisonRun, EngineError> {
    validate_block_size(block_size)?;
    if !target_path.is_file() {
        return Err(EngineError::validation(format!(
            "target {} does not exist",
            target_path.display()
        )));
    }
    if let Err(err) = DocumentFormat::from_path(target_path) {
        return Err(EngineError::validation(format!("target rejected: {err}")));
    }
    if source_paths.is_empty() {
        return Err(EngineError::validation(
            "at least one source document is required",
        ));
    }

    // Extraction order is fixed: target first, then sources in list order.
    let target_name = display_name(target_path);
    let target = extract(target_path, tokenize)?;
    let mut sources: Vec<(String, TokenSequence)> = Vec::with_capacity(source_paths.len());
    for path in source_paths {
        sources.push((display_name(path), extract(path, tokenize)?));
    }

    // The run gains an identity only once every input has extracted; a
    // failed extraction leaves nothing on disk.
    let created_at = Utc::now();
    let run_dir = create_run_dir(output_root, created_at)?;

    let mut pairs = Vec::with_capacity(sources.len());
    for (index, (source_name, source)) in sources.iter().enumerate() {
        let pair_score = score(target.as_slice(), source.as_slice());
        let alignment = align(target.as_slice(), source.as_slice(), block_size)?;
        let report = PairReport::new(
            &run_dir.run_id,
            index,
            pair_score,
            &target_name,
            target.as_slice(),
            source_name,
            source.as_slice(),
            &alignment,
        );
        write_pair_report(&run_dir, &report)?;
        debug!(index, source = %source_name, score = pair_score, "pair_complete");
        if let Some(metrics) = metrics_recorder() {
            metrics.record_pair(index, pair_score);
        }
        pairs.push(PairSummary {
            source_name: source_name.clone(),
            score: pair_score,
            run_id: run_dir.run_id.clone(),
            index,
            artifact: pair_artifact_name(index),
        });
    }

    let run = ComparisonRun {
        run_id: run_dir.run_id.clone(),
        target_name,
        created_at,
        pairs,
    };
    write_run_summary(&run_dir, &run)?;
    Ok(run)
}

/// Display name of a document: its file stem.
fn display_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).expect("write fixture");
        path
    }

    #[test]
    fn test_missing_target_is_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_doc(dir.path(), "a.txt", "alpha beta");

        let err = run_with_sources(
            &dir.path().join("absent.txt"),
            &[dir.path().join("a.txt")],
            &dir.path().join("out"),
            2,
            &TokenizeConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Validation { .. }));
        assert_eq!(err.kind(), "VALIDATION_ERROR");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_unsupported_target_extension_is_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = write_doc(dir.path(), "payload.exe", "not a document");
        write_doc(dir.path(), "a.txt", "alpha beta");

        let err = run_with_sources(
            &target,
            &[dir.path().join("a.txt")],
            &dir.path().join("out"),
            2,
            &TokenizeConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Validation { reason } if reason.contains("exe")));
    }

    #[test]
    fn test_empty_source_list_fails_before_extraction() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The target is a real file but unreadable as UTF-8; validation has
        // to reject the empty list before extraction would touch it.
        let target = dir.path().join("t.txt");
        fs::write(&target, [0xff, 0xfe, 0x00]).expect("write fixture");

        let err = run_with_sources(
            &target,
            &[],
            &dir.path().join("out"),
            2,
            &TokenizeConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Validation { .. }));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_zero_block_size_rejected_eagerly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = write_doc(dir.path(), "t.txt", "alpha beta");

        let err = run_with_sources(
            &target,
            &[target.clone()],
            &dir.path().join("out"),
            0,
            &TokenizeConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), "INVALID_CONFIGURATION");
        assert!(matches!(
            err,
            EngineError::Compare(CompareError::InvalidBlockSize { block_size: 0 })
        ));
    }

    #[test]
    fn test_unsupported_source_aborts_without_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = write_doc(dir.path(), "t.txt", "alpha beta gamma");
        write_doc(dir.path(), "ok.txt", "alpha beta");
        let bad = write_doc(dir.path(), "tool.exe", "binary");
        let out = dir.path().join("out");

        let err = run_with_sources(
            &target,
            &[dir.path().join("ok.txt"), bad],
            &out,
            2,
            &TokenizeConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), "UNSUPPORTED_FORMAT");
        // All extraction precedes the first write, so the failed run left
        // no artifact directory at all.
        assert!(!out.exists());
    }

    #[test]
    fn test_list_source_files_filters_and_sorts() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_doc(dir.path(), "b.txt", "b");
        write_doc(dir.path(), "a.txt", "a");
        write_doc(dir.path(), "skip.exe", "x");
        fs::create_dir(dir.path().join("nested.txt")).expect("mkdir");

        let files = list_source_files(dir.path()).expect("list");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().and_then(|n| n.to_str()).expect("name"))
            .collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_missing_source_dir_is_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = list_source_files(&dir.path().join("nowhere")).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn test_run_writes_summary_and_pair_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = write_doc(dir.path(), "essay.txt", "the quick brown fox");
        let sources = dir.path().join("sources");
        fs::create_dir(&sources).expect("mkdir");
        write_doc(&sources, "close.txt", "the quick brown fox jumps");
        write_doc(&sources, "far.txt", "unrelated words entirely");
        let out = dir.path().join("out");

        let options = RunOptions {
            target_path: target,
            source_dir: sources,
            output_root: out.clone(),
            block_size: 2,
        };
        let run = run_comparison(&options, &TokenizeConfig::default()).expect("run");

        assert_eq!(run.target_name, "essay");
        assert_eq!(run.pairs.len(), 2);
        assert_eq!(run.pairs[0].source_name, "close");
        assert_eq!(run.pairs[0].index, 0);
        assert!(run.pairs[0].score > 0.8);
        assert_eq!(run.pairs[1].source_name, "far");
        assert_eq!(run.pairs[1].score, 0.0);

        let run_dir = out.join(&run.run_id);
        assert!(run_dir.join("0.json").is_file());
        assert!(run_dir.join("1.json").is_file());
        assert!(run_dir.join(docsim_report::SUMMARY_FILE_NAME).is_file());
    }

    #[test]
    fn test_display_name_strips_extension() {
        assert_eq!(display_name(Path::new("/tmp/run/thesis.docx")), "thesis");
        assert_eq!(display_name(Path::new("notes.txt")), "notes");
    }
}
