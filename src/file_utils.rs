use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::document::DocumentConverter;
use crate::language_utils;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }

    // @generates: Path of the converted source text for a document
    // @layout: <output_dir>/converted/<stem>.md
    pub fn converted_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
    ) -> PathBuf {
        Self::keyed_output_path(input_file, output_dir, "converted")
    }

    // @generates: Path of the translated text for a document
    // @layout: <output_dir>/translated/<stem>.md
    pub fn translated_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
    ) -> PathBuf {
        Self::keyed_output_path(input_file, output_dir, "translated")
    }

    fn keyed_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        subdir: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        let mut filename = stem.to_string_lossy().to_string();
        filename.push_str(".md");
        output_dir.as_ref().join(subdir).join(filename)
    }
}

// @struct: Document found by a folder scan
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    // @field: File name for display
    pub name: String,

    // @field: Full path
    pub path: PathBuf,

    // @field: Detected language code
    pub language: String,
}

/// Recursively scan a folder for supported documents that are not already in
/// the target language. Unreadable documents are skipped with a warning
/// rather than failing the whole scan.
pub fn scan_foreign_documents(
    dir: &Path,
    target_language: &str,
    converter: &dyn DocumentConverter,
) -> Result<Vec<ScannedDocument>> {
    let mut result = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();
        if !path.is_file() || !converter.supports(path) {
            continue;
        }

        let text = match converter.convert(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("skipping {:?}: {}", path, e);
                continue;
            }
        };

        let (language, confidence) = language_utils::detect_language(&text);
        debug!(
            "scanned {:?}: language {} (confidence {:.2})",
            path, language, confidence
        );
        if language_utils::language_codes_match(&language, target_language) {
            continue;
        }

        result.push(ScannedDocument {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            language,
        });
    }

    Ok(result)
}
