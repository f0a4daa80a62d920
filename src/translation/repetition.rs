use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::segmenter::split_sentences_loose;

// @module: Repetition cleanup for degenerate small-model output

// @struct: Thresholds controlling repetition detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionConfig {
    /// Words at or below this length are ignored by frequency checks
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,

    /// Consecutive identical words collapse once a run reaches this length
    #[serde(default = "default_run_length")]
    pub run_length: usize,

    /// Input word count below which the dominant-word check is skipped
    #[serde(default = "default_input_word_floor")]
    pub input_word_floor: usize,

    /// Share of meaningful words one word may take before input is truncated
    #[serde(default = "default_input_ratio")]
    pub input_ratio: f64,

    /// Output word count below which the dominant-word check is skipped
    #[serde(default = "default_output_word_floor")]
    pub output_word_floor: usize,

    /// Share of meaningful words one word may take before output is rejected
    #[serde(default = "default_output_ratio")]
    pub output_ratio: f64,

    /// Absolute repeat count that rejects output regardless of ratio
    #[serde(default = "default_output_count")]
    pub output_count: usize,

    /// Sentence prefix length compared when removing duplicate sentences
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,

    /// Hard cap on cleaned output length, applied at sentence granularity
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
}

fn default_min_word_len() -> usize {
    2
}

fn default_run_length() -> usize {
    3
}

fn default_input_word_floor() -> usize {
    10
}

fn default_input_ratio() -> f64 {
    0.3
}

fn default_output_word_floor() -> usize {
    20
}

fn default_output_ratio() -> f64 {
    0.2
}

fn default_output_count() -> usize {
    10
}

fn default_dedup_prefix_chars() -> usize {
    50
}

fn default_max_output_chars() -> usize {
    2000
}

impl Default for RepetitionConfig {
    fn default() -> Self {
        RepetitionConfig {
            min_word_len: default_min_word_len(),
            run_length: default_run_length(),
            input_word_floor: default_input_word_floor(),
            input_ratio: default_input_ratio(),
            output_word_floor: default_output_word_floor(),
            output_ratio: default_output_ratio(),
            output_count: default_output_count(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            max_output_chars: default_max_output_chars(),
        }
    }
}

/// Detects and collapses the pathological repetition artifacts that small and
/// quantized models produce: walls of one repeated word, comma-separated
/// phrase loops, and duplicated sentences. All thresholds come from
/// [`RepetitionConfig`] so the policy is tunable and testable in isolation
/// from any network-calling code.
#[derive(Debug, Clone, Default)]
pub struct RepetitionFilter {
    config: RepetitionConfig,
}

impl RepetitionFilter {
    pub fn new(config: RepetitionConfig) -> Self {
        RepetitionFilter { config }
    }

    /// Clean text before it is sent to the backend. When a single word
    /// dominates the input the text is truncated to its first sentence rather
    /// than feeding the model a degenerate wall of tokens.
    pub fn preprocess(&self, text: &str) -> String {
        let text = text.trim();
        let collapsed = collapse_word_runs(text, self.config.run_length);
        let collapsed = collapse_comma_runs(&collapsed, 2);

        let words: Vec<&str> = collapsed.split_whitespace().collect();
        if words.len() > self.config.input_word_floor {
            let ratio = self.config.input_ratio;
            if let Some((word, count, total)) = self.dominant_word(&words, false, |count, total| {
                count as f64 > (3.0f64).max(total as f64 * ratio)
            }) {
                warn!(
                    "repeated word '{}' detected in input: {}/{} occurrences, truncating",
                    word, count, total
                );
                return first_sentence(text).unwrap_or_else(|| {
                    text.chars().take(100).collect()
                });
            }
        }
        collapsed
    }

    /// Clean text returned by the backend. Returns `None` when the output is
    /// degenerate beyond repair and should be reported as a failure instead
    /// of silently shipping repeated tokens.
    pub fn postprocess(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let collapsed = collapse_word_runs(text, self.config.run_length);
        let collapsed = collapse_comma_runs(&collapsed, 3);

        let words: Vec<&str> = collapsed.split_whitespace().collect();
        if words.len() > self.config.output_word_floor {
            let (min_count, ratio) = (self.config.output_count, self.config.output_ratio);
            if let Some((word, count, total)) = self.dominant_word(&words, true, |count, total| {
                count >= min_count || count as f64 / total as f64 >= ratio
            }) {
                warn!(
                    "repeated word '{}' detected in output: {}/{} occurrences",
                    word, count, total
                );
                // Salvage the first sentence when there is a usable one
                return first_sentence(&collapsed)
                    .filter(|s| s.chars().count() > 10);
            }
        }

        let deduped = self.dedup_sentences(&collapsed);
        let capped = self.cap_length(&deduped);
        if capped.trim().is_empty() {
            None
        } else {
            Some(capped)
        }
    }

    /// Whether a single translated sentence is dominated by one repeated word.
    /// Used by sentence-level translation, where the right recovery is to keep
    /// the original sentence instead of truncating.
    pub fn is_degenerate_sentence(&self, text: &str) -> bool {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= 5 {
            return false;
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &word in &words {
            if word.chars().count() > self.config.min_word_len {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        counts.values().any(|&count| count >= self.config.run_length)
    }

    /// First word (in appearance order) whose frequency satisfies `trigger`,
    /// with its count and the meaningful-word total.
    fn dominant_word(
        &self,
        words: &[&str],
        alphabetic_only: bool,
        trigger: impl Fn(usize, usize) -> bool,
    ) -> Option<(String, usize, usize)> {
        let meaningful: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| {
                w.chars().count() > self.config.min_word_len
                    && (!alphabetic_only || w.chars().all(char::is_alphabetic))
            })
            .collect();
        if meaningful.is_empty() {
            return None;
        }
        let total = meaningful.len();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for &word in &meaningful {
            *counts.entry(word).or_insert(0) += 1;
        }
        // Scan in appearance order so the result is deterministic
        for &word in &meaningful {
            let count = counts[word];
            if trigger(count, total) {
                return Some((word.to_string(), count, total));
            }
        }
        None
    }

    /// Remove sentences whose normalized prefix was already seen earlier.
    /// Text without duplicates passes through byte-for-byte so clean Markdown
    /// keeps its line structure.
    fn dedup_sentences(&self, text: &str) -> String {
        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::new();
        let mut dropped = 0usize;
        for sentence in split_sentences_loose(text) {
            if sentence.chars().count() <= 5 {
                continue;
            }
            let key: String = sentence
                .chars()
                .take(self.config.dedup_prefix_chars)
                .collect::<String>()
                .to_lowercase();
            if seen.insert(key) {
                kept.push(sentence);
            } else {
                dropped += 1;
            }
        }
        if kept.is_empty() {
            return String::new();
        }
        if dropped == 0 {
            text.to_string()
        } else {
            kept.join(" ")
        }
    }

    /// Cap output length without cutting a sentence in half.
    fn cap_length(&self, text: &str) -> String {
        if text.chars().count() <= self.config.max_output_chars {
            return text.to_string();
        }
        let mut result = String::new();
        for sentence in split_sentences_loose(text) {
            if result.chars().count() + sentence.chars().count() > self.config.max_output_chars {
                break;
            }
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(&sentence);
        }
        result
    }
}

/// Collapse runs of the same word (compared case-insensitively) down to one
/// occurrence once the run reaches `run_length`. Shorter runs and all
/// surrounding whitespace are preserved byte-for-byte.
fn collapse_word_runs(text: &str, run_length: usize) -> String {
    let tokens = token_ranges(text);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut i = 0;
    while i < tokens.len() {
        let (start, end) = tokens[i];
        let word = &text[start..end];
        let mut j = i + 1;
        while j < tokens.len() {
            let (s, e) = tokens[j];
            if text[s..e].eq_ignore_ascii_case(word) {
                j += 1;
            } else {
                break;
            }
        }
        if j - i >= run_length {
            out.push_str(&text[cursor..end]);
            cursor = tokens[j - 1].1;
            i = j;
        } else {
            i += 1;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

/// Collapse consecutive identical comma-separated segments, per line.
fn collapse_comma_runs(text: &str, min_repeats: usize) -> String {
    text.lines()
        .map(|line| collapse_comma_runs_in_line(line, min_repeats))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_comma_runs_in_line(line: &str, min_repeats: usize) -> String {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < min_repeats {
        return line.to_string();
    }
    let mut kept: Vec<&str> = Vec::with_capacity(parts.len());
    let mut collapsed = false;
    let mut i = 0;
    while i < parts.len() {
        let current = parts[i].trim();
        let mut j = i + 1;
        while j < parts.len() && !current.is_empty() && parts[j].trim() == current {
            j += 1;
        }
        kept.push(parts[i]);
        if j - i >= min_repeats {
            collapsed = true;
            i = j;
        } else {
            i += 1;
        }
    }
    if collapsed {
        kept.join(",")
    } else {
        line.to_string()
    }
}

/// Byte ranges of whitespace-separated tokens.
fn token_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                ranges.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }
    ranges
}

/// Text up to and including the first sentence terminator, with a trailing
/// period added when the cut produced none.
fn first_sentence(text: &str) -> Option<String> {
    let first = text
        .split(|c| matches!(c, '.' | '!' | '?'))
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    if first.ends_with(['.', '!', '?']) {
        Some(first.to_string())
    } else {
        Some(format!("{}.", first))
    }
}
