//! Workspace umbrella crate for document similarity screening.
//!
//! This crate stitches together text extraction, pairwise comparison, and
//! artifact reporting so callers can screen one target document against a
//! corpus of sources with a single API entry point.
//!
//! ```no_run
//! use docsim::{run_comparison, RunOptions, TokenizeConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RunOptions {
//!         target_path: "target_files/thesis.pdf".into(),
//!         source_dir: "source_files".into(),
//!         output_root: "results".into(),
//!         block_size: 2,
//!     };
//!     let run = run_comparison(&options, &TokenizeConfig::default())?;
//!     for pair in &run.pairs {
//!         println!("{}  {:.3}", pair.source_name, pair.score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod metrics;

pub use config::{
    ComparisonYamlConfig, ConfigLoadError, DocsimConfig, OutputYamlConfig, TokenizeYamlConfig,
};
pub use engine::{list_source_files, run_comparison, run_with_sources, EngineError, RunOptions};
pub use metrics::{set_engine_metrics, EngineMetrics};

pub use docsim_compare::{
    align, matching_runs, partition, score, score_matrix, similarity_ratio, validate_block_size,
    AlignedBlock, Block, BlockAlignment, CompareError, MatchingRun, BLOCK_MATCH_THRESHOLD,
    SELF_COMPARISON_SCORE,
};
pub use docsim_extract::{
    extract, is_supported_path, tokenize, DocumentFormat, ExtractError, FormatReader,
    TokenSequence, TokenizeConfig, SUPPORTED_EXTENSIONS,
};
pub use docsim_report::{
    create_run_dir, pair_artifact_name, write_pair_report, write_run_summary, ComparisonRun,
    PairReport, PairSummary, RenderedBlock, RenderedDocument, ReportError, RunDirectory,
    RUN_ID_FORMAT, SUMMARY_FILE_NAME,
};
