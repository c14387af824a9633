//! Tokenization of extracted document text.

use serde::{Deserialize, Serialize};
use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

/// Options applied to every document of one comparison run.
///
/// Similarity scores are only comparable when all sequences in a run went
/// through the same options, so the run owns one of these and reuses it for
/// the target and every source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizeConfig {
    /// Semantic version of the tokenizer configuration.
    pub version: u32,
    /// If true, apply Unicode NFKC normalization before tokenizing.
    pub normalize_unicode: bool,
    /// If true, strip punctuation characters before tokenizing.
    pub strip_punctuation: bool,
    /// If true, lowercase the text.
    pub lowercase: bool,
}

impl Default for TokenizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            strip_punctuation: false,
            lowercase: true,
        }
    }
}

/// Ordered word tokens extracted from one document.
///
/// Immutable once produced; a run reads the target's sequence for every
/// pair without mutating it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSequence {
    pub tokens: Vec<String>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token slice view for the scorer and aligner.
    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }
}

impl AsRef<[String]> for TokenSequence {
    fn as_ref(&self) -> &[String] {
        &self.tokens
    }
}

/// Split extracted text into word tokens under `cfg`.
///
/// Whitespace of any kind delimits tokens; runs of delimiters collapse, so
/// line endings and indentation never produce empty tokens.
pub fn tokenize(text: &str, cfg: &TokenizeConfig) -> TokenSequence {
    let mut tokens = Vec::new();
    if cfg.normalize_unicode {
        collect_tokens(text.nfkc(), cfg, &mut tokens);
    } else {
        collect_tokens(text.chars(), cfg, &mut tokens);
    }
    TokenSequence { tokens }
}

fn collect_tokens<I>(iter: I, cfg: &TokenizeConfig, tokens: &mut Vec<String>)
where
    I: Iterator<Item = char>,
{
    let mut current = String::new();
    for ch in iter {
        let is_delimiter = ch.is_whitespace() || (cfg.strip_punctuation && ch.is_punctuation());
        if is_delimiter {
            flush_token(&mut current, tokens);
        } else if cfg.lowercase {
            // Lowercasing can expand one character into several (e.g. ß).
            current.extend(ch.to_lowercase());
        } else {
            current.push(ch);
        }
    }
    flush_token(&mut current, tokens);
}

fn flush_token(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
