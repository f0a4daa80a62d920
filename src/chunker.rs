use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @module: Size-bounded chunk assembly along structural boundaries

// @const: Markdown header line pattern
static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s.+$").unwrap());

// @enum: Processing status of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

// @struct: Contiguous span of document text sent to the backend as one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    // @field: Chunk text
    pub text: String,

    // @field: Header label for progress display
    pub header: String,

    // @field: Header level, 0 for headerless chunks
    pub level: usize,

    // @field: Size in characters of the content that went into the chunk
    pub size: usize,

    // @field: Processing status
    pub status: ChunkStatus,
}

impl Chunk {
    fn new(text: impl Into<String>, header: impl Into<String>, level: usize, size: usize) -> Self {
        Chunk {
            text: text.into(),
            header: header.into(),
            level,
            size,
            status: ChunkStatus::Pending,
        }
    }
}

/// Byte ranges of fenced code blocks, including the fence lines themselves.
/// An unterminated fence extends to the end of the text.
fn fenced_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().starts_with("```") {
            match open.take() {
                None => open = Some(pos),
                Some(start) => ranges.push((start, pos + line.len())),
            }
        }
        pos += line.len();
    }
    if let Some(start) = open {
        ranges.push((start, text.len()));
    }
    ranges
}

fn inside_fence(fences: &[(usize, usize)], pos: usize) -> Option<(usize, usize)> {
    fences
        .iter()
        .copied()
        .find(|&(start, end)| pos > start && pos < end)
}

/// Split text into size-bounded chunks, preferring natural boundaries.
///
/// Each window is cut at the nearest preceding paragraph break, falling back
/// to sentence-ending punctuation (including CJK terminators), and only then
/// to a hard cut. A cut that would land inside a fenced code block is moved to
/// the fence edge; a fence longer than `max_size` stays in one piece, which is
/// the only size overage this splitter produces. Concatenating the returned
/// chunks reproduces the input exactly.
pub fn split_text_by_size(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }
    let max_size = max_size.max(1);
    let fences = fenced_ranges(text);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = start + max_size;
        if end >= text.len() {
            chunks.push(text[start..].to_string());
            break;
        }
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            // Window smaller than one character; take the next whole character
            end = start + 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }

        let window = &text[start..end];
        if let Some(p) = window.rfind("\n\n").filter(|&p| p > 0) {
            end = start + p + 2;
        } else if let Some(s) = sentence_cut(window) {
            end = start + s;
        }

        // Never cut inside a fenced block: back off to the fence start when we
        // can, otherwise swallow the whole fence
        if let Some((fence_start, fence_end)) = inside_fence(&fences, end) {
            end = if fence_start > start { fence_start } else { fence_end };
        }

        chunks.push(text[start..end].to_string());
        start = end;
    }
    chunks
}

/// Rightmost sentence-terminator cut position within the window, measured in
/// bytes past the terminator itself.
fn sentence_cut(window: &str) -> Option<usize> {
    let ascii = [". ", "! ", "? "]
        .iter()
        .filter_map(|pat| window.rfind(pat).map(|i| i + 1));
    let cjk = ['。', '！', '？']
        .iter()
        .filter_map(|&c| window.rfind(c).map(|i| i + c.len_utf8()));
    ascii.chain(cjk).filter(|&cut| cut > 0).max()
}

/// Split Markdown text into chunks anchored at header lines.
///
/// Each section spans from one header to the next. Sections smaller than
/// `min_chunk_size` are merged forward while the merged size stays within
/// `max_chunk_size`; oversized sections are re-split by size. Headerless text
/// falls back entirely to size-based splitting. Output is deterministic for a
/// given input and limits.
pub fn split_by_headers(text: &str, max_chunk_size: usize, min_chunk_size: usize) -> Vec<Chunk> {
    let fences = fenced_ranges(text);
    let headers: Vec<(usize, &str)> = HEADER_PATTERN
        .find_iter(text)
        .filter(|m| inside_fence(&fences, m.start() + 1).is_none())
        .map(|m| (m.start(), m.as_str()))
        .collect();

    if headers.is_empty() {
        return split_text_by_size(text, max_chunk_size)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let size = chunk.len();
                Chunk::new(chunk, format!("Section {}", i + 1), 0, size)
            })
            .collect();
    }

    // Each section runs from its header to the start of the next one
    let mut sections: Vec<Chunk> = Vec::with_capacity(headers.len());
    for (i, &(start, header_line)) in headers.iter().enumerate() {
        let end = headers.get(i + 1).map_or(text.len(), |&(next, _)| next);
        let header = header_line.trim();
        let level = header.chars().take_while(|&c| c == '#').count();
        let section_text = text[start..end].trim();
        sections.push(Chunk::new(section_text, header, level, section_text.len()));
    }

    // Merge undersized sections forward while the budget allows
    let mut merged: Vec<Chunk> = Vec::new();
    let mut current: Option<Chunk> = None;
    for section in sections {
        let absorb = current
            .as_ref()
            .is_some_and(|acc| section.size < min_chunk_size && acc.size + section.size <= max_chunk_size);
        if absorb {
            // Header label stays with the first section of the merge
            let acc = current.as_mut().unwrap();
            acc.text.push_str("\n\n");
            acc.text.push_str(&section.text);
            acc.size += section.size;
        } else {
            if let Some(done) = current.take() {
                merged.push(done);
            }
            current = Some(section);
        }
    }
    if let Some(done) = current {
        merged.push(done);
    }

    // Re-split anything that still exceeds the budget
    let mut chunks = Vec::with_capacity(merged.len());
    for section in merged {
        if section.size > max_chunk_size {
            let parts = split_text_by_size(&section.text, max_chunk_size);
            debug!(
                "section '{}' ({} chars) re-split into {} parts",
                section.header,
                section.size,
                parts.len()
            );
            for (j, part) in parts.into_iter().enumerate() {
                let size = part.len();
                chunks.push(Chunk::new(
                    part,
                    format!("{} (part {})", section.header, j + 1),
                    section.level,
                    size,
                ));
            }
        } else {
            chunks.push(section);
        }
    }

    let covered: usize = chunks.iter().map(|c| c.size).sum();
    if covered > text.len() {
        error!(
            "chunk sizes exceed document length: {} > {}",
            covered,
            text.len()
        );
    }
    chunks
}
