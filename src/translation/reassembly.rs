use std::time::Duration;

use crate::analysis::TranslationMode;
use crate::segmenter::TranslationUnit;

// @module: Order-preserving reassembly of translated output

// @const: First line of the metadata footer block
const FOOTER_MARKER: &str = "\n\n---\n**Translation info**";

// @struct: Metadata appended to a finished translation
#[derive(Debug, Clone)]
pub struct FooterInfo {
    // @field: Backend identity
    pub engine: String,

    // @field: Strategy that produced the document
    pub mode: TranslationMode,

    // @field: Wall-clock duration of the run
    pub elapsed: Duration,

    // @field: Number of translated parts
    pub part_count: usize,
}

impl FooterInfo {
    fn part_label(&self) -> &'static str {
        match self.mode {
            TranslationMode::Chunk => "Chunks",
            TranslationMode::Sentence => "Sentences",
            TranslationMode::Hybrid => "Sections",
        }
    }
}

/// Join translated chunks in their original order. Chunk boundaries were cut
/// at (or trimmed to) paragraph breaks, so a blank line restores the
/// separation the splitter removed.
pub fn join_chunks(parts: &[String]) -> String {
    parts.join("\n\n")
}

/// Join per-line output back into a document, preserving line structure.
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Rebuild a document from segmented units in their original order. Every
/// unit owns its source lines and empty units stand in for blank lines, so
/// the concatenation reproduces the segmented text exactly.
pub fn join_units(units: &[TranslationUnit]) -> String {
    units
        .iter()
        .map(|u| u.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append the informational metadata footer as a `---` fenced trailing block.
/// The footer is not document content; strip it with [`strip_footer`] before
/// comparing a translation against the source structure.
pub fn append_footer(body: String, info: &FooterInfo) -> String {
    format!(
        "{}{}\n- Engine: {}\n- Mode: {}\n- Elapsed: {:.2}s\n- {}: {}\n---",
        body,
        FOOTER_MARKER,
        info.engine,
        info.mode,
        info.elapsed.as_secs_f64(),
        info.part_label(),
        info.part_count,
    )
}

/// Document content without the trailing metadata footer.
pub fn strip_footer(text: &str) -> &str {
    match text.rfind(FOOTER_MARKER) {
        Some(idx) => &text[..idx],
        None => text,
    }
}
