use serde::{Deserialize, Serialize};

// @module: Markdown segmentation into translation units

// @enum: Kind of an atomic translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    // @variant: Markdown header line
    Header,
    // @variant: Block of consecutive non-blank text lines
    Paragraph,
    // @variant: Single sentence extracted from a paragraph
    Sentence,
    // @variant: Fenced code block, fences included
    Code,
    // @variant: Table row line
    TableRow,
    // @variant: Blank line, preserved for vertical spacing
    Empty,
}

// @struct: Atomic unit of a segmented document
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    // @field: Raw text of the unit
    pub content: String,

    // @field: Unit kind
    pub kind: UnitKind,

    // @field: Whether this unit should be sent to the backend
    pub translatable: bool,

    // @field: Header level (number of leading '#'), 0 for non-headers
    pub level: usize,

    // @field: Number of source lines covered by this unit
    pub line_count: usize,
}

impl TranslationUnit {
    pub fn new(content: impl Into<String>, kind: UnitKind, translatable: bool) -> Self {
        let content = content.into();
        let line_count = if content.is_empty() { 1 } else { content.lines().count() };
        TranslationUnit {
            content,
            kind,
            translatable,
            level: 0,
            line_count,
        }
    }

    fn header(line: &str, level: usize, translatable: bool) -> Self {
        let mut unit = Self::new(line, UnitKind::Header, translatable);
        unit.level = level;
        unit
    }
}

/// Split document text into an ordered sequence of atomic units.
///
/// Lines are scanned once while an open-paragraph buffer accumulates plain
/// text. A fence marker opens a code unit spanning to the matching closing
/// fence, or to end of input when the fence is unterminated. Header lines,
/// table rows and blank lines flush the buffer and become units of their own.
/// Blank lines are kept as empty units so reassembly can restore vertical
/// spacing verbatim.
pub fn segment(text: &str) -> Vec<TranslationUnit> {
    segment_inner(text, false)
}

/// Like [`segment`], but paragraph buffers are further split into sentence
/// units for sentence-level translation.
pub fn segment_sentences(text: &str) -> Vec<TranslationUnit> {
    segment_inner(text, true)
}

fn segment_inner(text: &str, split_by_sentence: bool) -> Vec<TranslationUnit> {
    let mut units = Vec::new();
    let lines: Vec<&str> = text.split('\n').collect();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let stripped = line.trim();

        if stripped.starts_with("```") {
            flush_paragraph(&mut units, &mut paragraph, split_by_sentence);
            let mut code_block = vec![line];
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("```") {
                code_block.push(lines[i]);
                i += 1;
            }
            // Unterminated fences run to end of input instead of hanging
            if i < lines.len() {
                code_block.push(lines[i]);
            }
            units.push(TranslationUnit::new(
                code_block.join("\n"),
                UnitKind::Code,
                false,
            ));
        } else if stripped.starts_with('#') {
            flush_paragraph(&mut units, &mut paragraph, split_by_sentence);
            let level = stripped.chars().take_while(|&c| c == '#').count();
            let header_text = stripped[level..].trim();
            units.push(TranslationUnit::header(line, level, !header_text.is_empty()));
        } else if stripped.starts_with('|') {
            flush_paragraph(&mut units, &mut paragraph, split_by_sentence);
            units.push(TranslationUnit::new(line, UnitKind::TableRow, false));
        } else if stripped.is_empty() {
            flush_paragraph(&mut units, &mut paragraph, split_by_sentence);
            // Keep the raw line so whitespace-only lines survive reassembly
            units.push(TranslationUnit::new(line, UnitKind::Empty, false));
        } else {
            paragraph.push(line);
        }
        i += 1;
    }

    flush_paragraph(&mut units, &mut paragraph, split_by_sentence);
    units
}

fn flush_paragraph(units: &mut Vec<TranslationUnit>, paragraph: &mut Vec<&str>, split_by_sentence: bool) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join("\n");
    paragraph.clear();
    if text.trim().is_empty() {
        return;
    }
    if split_by_sentence {
        for sentence in split_sentences(&text) {
            units.push(TranslationUnit::new(sentence, UnitKind::Sentence, true));
        }
    } else {
        units.push(TranslationUnit::new(text, UnitKind::Paragraph, true));
    }
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace and an
/// uppercase letter.
///
/// The uppercase requirement avoids splitting inside decimal numbers and most
/// mid-sentence constructs, at the cost of false negatives on abbreviations
/// ("Dr. Smith" stays in one sentence). Known limitation, kept deliberately.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_at_boundaries(text, true)
}

/// Split text into sentences after any `.`, `!` or `?` followed by whitespace,
/// with no requirement on the following character. Used where recall matters
/// more than precision: repetition cleanup and per-line sentence translation.
pub fn split_sentences_loose(text: &str) -> Vec<String> {
    split_at_boundaries(text, false)
}

fn split_at_boundaries(text: &str, require_uppercase: bool) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if matches!(c, '.' | '!' | '?') {
            // Look past the whitespace run that follows the terminator
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            let has_whitespace = j > i + 1;
            let boundary = has_whitespace
                && (!require_uppercase || chars.get(j).is_some_and(|&(_, n)| n.is_uppercase()));
            if boundary {
                let end = pos + c.len_utf8();
                let piece = text[start..end].trim();
                if !piece.is_empty() {
                    sentences.push(piece.to_string());
                }
                start = chars.get(j).map_or(text.len(), |&(k, _)| k);
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
