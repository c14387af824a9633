//! docsim_extract: heterogeneous document extraction into token sequences.
//!
//! The extractor turns an on-disk document into a [`TokenSequence`] in two
//! steps: a format-specific reader produces plain text, then a single
//! tokenizer splits it into word tokens. Format dispatch is by file
//! extension (case-insensitive) over four supported types: `txt`, `pdf`,
//! `docx` and `odt`.
//!
//! Readers are polymorphic over one capability, [`FormatReader`]: adding a
//! format means adding a [`DocumentFormat`] variant and a reader, with no
//! change to callers.
//!
//! Extraction failures are fatal to the comparison run that requested them.
//! A run over documents that partially failed to extract cannot be
//! meaningfully summarized, so callers abort instead of skipping.

mod readers;
mod tokenize;

pub use readers::{DocxReader, OdtReader, PdfReader, PlainTextReader};
pub use tokenize::{tokenize, TokenSequence, TokenizeConfig};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// File extensions the extractor accepts, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["txt", "pdf", "docx", "odt"];

/// Format tag inferred from a document's extension. The document itself is
/// ephemeral; this tag only lives for the duration of one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Docx,
    Odt,
}

impl DocumentFormat {
    /// Infer the format from a path's extension, case-insensitive.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "txt" => Ok(Self::PlainText),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "odt" => Ok(Self::Odt),
            _ => Err(ExtractError::UnsupportedFormat { extension }),
        }
    }

    /// The reader backend for this format.
    pub fn reader(&self) -> &'static dyn FormatReader {
        match self {
            Self::PlainText => &PlainTextReader,
            Self::Pdf => &PdfReader,
            Self::Docx => &DocxReader,
            Self::Odt => &OdtReader,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Odt => "odt",
        }
    }
}

/// True when the extension is one the extractor can handle. Directory
/// listings use this to keep unsupported uploads out of a run.
pub fn is_supported_path(path: &Path) -> bool {
    DocumentFormat::from_path(path).is_ok()
}

/// Capability interface for format backends: produce the document's text
/// given its path.
pub trait FormatReader: Send + Sync {
    fn read_text(&self, path: &Path) -> Result<String, ExtractError>;
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported document format: \"{extension}\"")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract text from {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },
}

/// Extract one document into a token sequence.
///
/// Dispatches on the file extension, reads the text through the format's
/// reader, then tokenizes under `cfg`. The same `cfg` must be used for
/// every document of one run.
pub fn extract(path: &Path, cfg: &TokenizeConfig) -> Result<TokenSequence, ExtractError> {
    if cfg.version == 0 {
        return Err(ExtractError::InvalidConfig(
            "config version must be >= 1".into(),
        ));
    }

    let format = DocumentFormat::from_path(path)?;
    let text = format.reader().read_text(path)?;
    let sequence = tokenize(&text, cfg);
    debug!(
        path = %path.display(),
        format = format.as_str(),
        token_count = sequence.len(),
        "extract_complete"
    );
    Ok(sequence)
}
