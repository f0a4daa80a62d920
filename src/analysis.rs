use log::info;
use serde::{Deserialize, Serialize};

use crate::app_config::ModeConfig;

// @module: Document statistics and translation mode selection

// @const: Keywords marking dense legal/contract prose
pub const LEGAL_KEYWORDS: [&str; 9] = [
    "agreement",
    "consultant",
    "commission",
    "shall",
    "liability",
    "insurance",
    "pursuant",
    "herein",
    "thereof",
];

// @enum: Translation strategy for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    // @variant: Header-anchored chunks, one backend call per chunk (fast)
    Chunk,
    // @variant: Sentence-by-sentence translation (highest fidelity)
    Sentence,
    // @variant: Per-chunk adaptive strategy between the two
    Hybrid,
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Chunk => "chunk",
            Self::Sentence => "sentence",
            Self::Hybrid => "hybrid",
        };
        write!(f, "{}", name)
    }
}

// @struct: Line-level statistics of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    // @field: Non-blank line count
    pub total_lines: usize,

    // @field: Lines longer than the configured long-line threshold
    pub long_lines: usize,

    // @field: Lines containing at least one legal keyword
    pub legal_lines: usize,

    // @field: Bullet-point lines
    pub bullet_lines: usize,

    // @field: Header lines
    pub header_lines: usize,
}

impl DocumentStats {
    pub fn legal_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.legal_lines as f64 / self.total_lines as f64
        }
    }

    pub fn long_line_ratio(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.long_lines as f64 / self.total_lines as f64
        }
    }
}

/// Collect line-level statistics used by mode selection.
pub fn analyze(text: &str, config: &ModeConfig) -> DocumentStats {
    let mut stats = DocumentStats::default();

    for raw_line in text.lines() {
        let line = raw_line.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }
        stats.total_lines += 1;

        if line.starts_with('#') {
            stats.header_lines += 1;
            continue;
        }
        if line.starts_with("- ") || line.starts_with("* ") {
            stats.bullet_lines += 1;
        }
        if line.chars().count() > config.long_line_chars {
            stats.long_lines += 1;
        }
        if LEGAL_KEYWORDS.iter().any(|kw| line.contains(kw)) {
            stats.legal_lines += 1;
        }
    }

    info!(
        "document analysis: {} lines, {} long, {} legal, {} bullets, {} headers",
        stats.total_lines, stats.long_lines, stats.legal_lines, stats.bullet_lines, stats.header_lines
    );
    stats
}

/// Pick a translation strategy from document statistics.
///
/// Rules are evaluated in order, first match wins. This is a coarse,
/// explainable policy that trades speed against fidelity; every threshold
/// comes from configuration rather than being an empirical constant.
pub fn select_mode(stats: &DocumentStats, config: &ModeConfig) -> TranslationMode {
    if stats.total_lines > config.long_document_lines {
        if stats.legal_ratio() > config.legal_term_ratio {
            // Long legal document: chunking alone loses too much nuance
            return TranslationMode::Hybrid;
        }
        return TranslationMode::Chunk;
    }
    if stats.long_line_ratio() > config.long_line_ratio {
        return TranslationMode::Hybrid;
    }
    if stats.total_lines < config.short_document_lines {
        return TranslationMode::Sentence;
    }
    TranslationMode::Hybrid
}
