use std::path::Path;

use crate::errors::DocumentError;

// @module: Document-to-text conversion seam

/// Converts an input document into Markdown-like text for translation.
///
/// PDF/DOCX conversion is an external capability; the pipeline only depends
/// on this narrow interface, so converters can be swapped without touching
/// the orchestration core. Conversion failures happen before any chunking
/// begins and abort the run.
pub trait DocumentConverter: Send + Sync {
    /// Whether this converter can handle the given path
    fn supports(&self, path: &Path) -> bool;

    /// Convert the document at `path` into text
    fn convert(&self, path: &Path) -> Result<String, DocumentError>;
}

// @const: Extensions readable without external tooling
const SUPPORTED_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// Converter for documents that are already text: Markdown and plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextConverter;

impl DocumentConverter for PlainTextConverter {
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|s| ext.eq_ignore_ascii_case(s))
            })
    }

    fn convert(&self, path: &Path) -> Result<String, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::NotFound(path.display().to_string()));
        }
        if !self.supports(path) {
            return Err(DocumentError::UnsupportedFormat(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        if text.trim().is_empty() {
            return Err(DocumentError::EmptyDocument(path.display().to_string()));
        }
        Ok(text)
    }
}
