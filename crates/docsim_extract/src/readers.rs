//! Format reader backends.
//!
//! Each reader turns one on-disk document into plain text; tokenization is
//! a separate step so every format feeds the same tokenizer.

use std::fs;
use std::io::Read;
use std::panic;
use std::path::Path;

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};

use crate::{ExtractError, FormatReader};

fn read_bytes(path: &Path) -> Result<Vec<u8>, ExtractError> {
    fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_error(path: &Path, detail: impl ToString) -> ExtractError {
    ExtractError::Parse {
        path: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Reads plain UTF-8 text files.
pub struct PlainTextReader;

impl FormatReader for PlainTextReader {
    fn read_text(&self, path: &Path) -> Result<String, ExtractError> {
        let text = fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(text.replace("\r\n", "\n"))
    }
}

/// Extracts text from PDF documents, all pages concatenated.
pub struct PdfReader;

impl FormatReader for PdfReader {
    fn read_text(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = read_bytes(path)?;
        // The PDF parser panics on some malformed font tables; contain the
        // panic and surface it as a parse failure for this document.
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(parse_error(path, err)),
            Err(_) => Err(parse_error(path, "parser panicked")),
        }
    }
}

/// Extracts text from DOCX documents: paragraph runs and table cells, in
/// document order.
pub struct DocxReader;

impl FormatReader for DocxReader {
    fn read_text(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = read_bytes(path)?;
        let docx = docx_rs::read_docx(&bytes).map_err(|err| parse_error(path, err))?;
        let mut text = String::new();
        for child in &docx.document.children {
            collect_document_child(child, &mut text);
        }
        Ok(text)
    }
}

fn collect_document_child(child: &DocumentChild, out: &mut String) {
    match child {
        DocumentChild::Paragraph(paragraph) => {
            for child in &paragraph.children {
                collect_paragraph_child(child, out);
            }
            out.push('\n');
        }
        DocumentChild::Table(table) => {
            for row in &table.rows {
                if let TableChild::TableRow(row) = row {
                    for cell in &row.cells {
                        if let TableRowChild::TableCell(cell) = cell {
                            for content in &cell.children {
                                if let TableCellContent::Paragraph(paragraph) = content {
                                    for child in &paragraph.children {
                                        collect_paragraph_child(child, out);
                                    }
                                    out.push('\n');
                                }
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn collect_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for child in &run.children {
                if let RunChild::Text(text) = child {
                    out.push_str(&text.text);
                    out.push(' ');
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for child in &link.children {
                collect_paragraph_child(child, out);
            }
        }
        _ => {}
    }
}

/// Extracts text from ODT documents: unzips the archive, reads the body
/// from `content.xml` and strips the markup.
pub struct OdtReader;

impl FormatReader for OdtReader {
    fn read_text(&self, path: &Path) -> Result<String, ExtractError> {
        let file = fs::File::open(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|err| parse_error(path, err))?;
        let mut content = String::new();
        archive
            .by_name("content.xml")
            .map_err(|err| parse_error(path, err))?
            .read_to_string(&mut content)
            .map_err(|err| parse_error(path, err))?;
        Ok(strip_markup(&content))
    }
}

/// Strip XML tags from document content, decoding the predefined and
/// numeric entities. Tag boundaries become spaces so adjacent elements
/// never fuse into one token.
fn strip_markup(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut chars = xml.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                for ch in chars.by_ref() {
                    if ch == '>' {
                        break;
                    }
                }
                out.push(' ');
            }
            '&' => {
                let mut entity = String::new();
                let mut terminated = false;
                for ch in chars.by_ref() {
                    if ch == ';' {
                        terminated = true;
                        break;
                    }
                    entity.push(ch);
                    // Longest legal reference body is 8 chars (&#1114111;).
                    if entity.len() > 8 {
                        break;
                    }
                }
                match decode_entity(&entity) {
                    Some(decoded) if terminated => out.push(decoded),
                    _ => {
                        // Unknown or unterminated reference: keep it verbatim.
                        out.push('&');
                        out.push_str(&entity);
                        if terminated {
                            out.push(';');
                        }
                    }
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let code = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))?;
            char::from_u32(code)
        }
    }
}
