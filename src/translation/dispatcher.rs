use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::timeout;

use crate::analysis::TranslationMode;
use crate::app_config::{ChunkingConfig, HybridConfig};
use crate::chunker::{self, Chunk, ChunkStatus};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::progress::{ChunkProgress, ProgressTracker};
use crate::providers::TranslationBackend;
use crate::segmenter::{self, TranslationUnit, UnitKind};
use crate::translation::reassembly::{self, FooterInfo};
use crate::translation::repetition::RepetitionFilter;

// @module: Per-chunk translation dispatch and strategy drivers

// @const: Blank-line paragraph separator
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

// @struct: Dispatch tuning knobs
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Upper bound on a single backend call
    pub request_timeout: Duration,

    /// Retry attempts after a failed backend call
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    pub backoff_base_ms: u64,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(120),
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// Translates chunks, sentences and units against a backend without ever
/// failing: backend errors, timeouts and degenerate output are converted into
/// visibly tagged strings so one bad chunk never aborts a document run.
pub struct TranslationDispatcher {
    /// The backend every request goes to
    backend: Arc<dyn TranslationBackend>,

    /// Repetition cleanup applied before and after each call
    filter: RepetitionFilter,

    /// Timeout and retry settings
    options: DispatchOptions,
}

impl TranslationDispatcher {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        filter: RepetitionFilter,
        options: DispatchOptions,
    ) -> Self {
        Self {
            backend,
            filter,
            options,
        }
    }

    /// Identity of the underlying backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Translate one chunk of text. Never fails: any backend error, timeout,
    /// empty response, silent pass-through or unrecoverable repetition becomes
    /// a tagged error string so the assembled document stays reviewable.
    pub async fn translate_chunk(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        if language_utils::language_codes_match(source_language, target_language) {
            return text.to_string();
        }

        let prepared = self.filter.preprocess(text);

        match self.call_backend(&prepared, source_language, target_language).await {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return tagged_error("empty response", text);
                }
                if trimmed == prepared.trim() || trimmed == text.trim() {
                    return tagged_error("output identical to input", text);
                }
                match self.filter.postprocess(trimmed) {
                    Some(cleaned) => cleaned,
                    None => tagged_error("degenerate repetition in output", text),
                }
            }
            Err(e) => {
                warn!("chunk translation failed: {}", e);
                format!("[translation error: {}]", e)
            }
        }
    }

    /// Translate a single sentence. On any failure the original sentence is
    /// returned unchanged; a sentence is too small to be worth an inline tag.
    pub async fn translate_sentence(
        &self,
        sentence: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        if sentence.trim().is_empty() {
            return sentence.to_string();
        }
        if language_utils::language_codes_match(source_language, target_language) {
            return sentence.to_string();
        }

        match self.call_backend(sentence, source_language, target_language).await {
            Ok(raw) => {
                let cleaned = raw.trim();
                if cleaned.is_empty() {
                    return sentence.to_string();
                }
                if self.filter.is_degenerate_sentence(cleaned) {
                    warn!("repetition in translated sentence, keeping original");
                    return sentence.to_string();
                }
                cleaned.to_string()
            }
            Err(e) => {
                warn!("sentence translation failed, keeping original: {}", e);
                sentence.to_string()
            }
        }
    }

    /// Translate a segmented unit, honoring its translatable flag.
    pub async fn translate_unit(
        &self,
        unit: &TranslationUnit,
        source_language: &str,
        target_language: &str,
    ) -> String {
        if !unit.translatable {
            return unit.content.clone();
        }
        match unit.kind {
            UnitKind::Sentence => {
                self.translate_sentence(&unit.content, source_language, target_language)
                    .await
            }
            _ => {
                self.translate_chunk(&unit.content, source_language, target_language)
                    .await
            }
        }
    }

    /// Invoke the backend with a bounded timeout, retrying failed calls with
    /// a growing delay.
    async fn call_backend(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let mut attempt = 0u32;
        loop {
            let call = self.backend.translate(text, source_language, target_language);
            let outcome = match timeout(self.options.request_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "no response within {}s",
                    self.options.request_timeout.as_secs()
                ))),
            };

            match outcome {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.options.max_retries => {
                    attempt += 1;
                    warn!(
                        "backend call failed (attempt {}/{}): {}",
                        attempt,
                        self.options.max_retries + 1,
                        e
                    );
                    let delay_ms = self.options.backoff_base_ms * attempt as u64;
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Translate a document chunk by chunk along its header structure,
    /// recording per-chunk progress under `id`.
    pub async fn translate_chunked(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        id: &str,
        tracker: &ProgressTracker,
        chunking: &ChunkingConfig,
    ) -> String {
        let started = Instant::now();
        let chunks = chunker::split_by_headers(text, chunking.max_chunk_size, chunking.min_chunk_size);
        info!("split into {} chunks", chunks.len());
        tracker.set_total_chunks(id, chunks.len(), chunk_descriptors(&chunks));

        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracker.update_chunk_progress(id, i, ChunkStatus::Processing);
            debug!(
                "translating chunk {}/{} ({} chars)",
                i + 1,
                chunks.len(),
                chunk.size
            );
            let output = self
                .translate_chunk(&chunk.text, source_language, target_language)
                .await;
            tracker.add_chunk_result(id, i, &output);
            translated.push(output);
        }

        let body = reassembly::join_chunks(&translated);
        reassembly::append_footer(
            body,
            &FooterInfo {
                engine: self.backend_name().to_string(),
                mode: TranslationMode::Chunk,
                elapsed: started.elapsed(),
                part_count: chunks.len(),
            },
        )
    }

    /// Translate a document sentence by sentence, preserving headers, code,
    /// tables and blank lines verbatim. Slowest mode, highest fidelity.
    pub async fn translate_by_sentences(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        id: &str,
        tracker: &ProgressTracker,
    ) -> String {
        let started = Instant::now();
        let units = segmenter::segment(text);

        // The chunk plan is one entry per sentence, so count them up front
        let total_sentences: usize = units
            .iter()
            .filter(|u| u.kind == UnitKind::Paragraph)
            .map(|u| {
                u.content
                    .lines()
                    .map(|line| segmenter::split_sentences_loose(line).len())
                    .sum::<usize>()
            })
            .sum();
        info!("translating {} sentences", total_sentences);

        let descriptors = (0..total_sentences)
            .map(|i| ChunkProgress::new(i, format!("Sentence {}", i + 1), 1))
            .collect();
        tracker.set_total_chunks(id, total_sentences, descriptors);

        let mut out_lines: Vec<String> = Vec::new();
        let mut done = 0usize;

        for unit in &units {
            match unit.kind {
                UnitKind::Empty | UnitKind::Header | UnitKind::Code | UnitKind::TableRow => {
                    out_lines.push(unit.content.clone());
                }
                _ => {
                    for line in unit.content.lines() {
                        let mut parts = Vec::new();
                        for sentence in segmenter::split_sentences_loose(line) {
                            tracker.update_chunk_progress(id, done, ChunkStatus::Processing);
                            let translated = self
                                .translate_sentence(&sentence, source_language, target_language)
                                .await;
                            tracker.add_chunk_result(id, done, &translated);
                            parts.push(translated);
                            done += 1;
                            if done % 10 == 0 {
                                info!("sentence progress: {}/{}", done, total_sentences);
                            }
                        }
                        out_lines.push(parts.join(" "));
                    }
                }
            }
        }

        let body = reassembly::join_lines(&out_lines);
        reassembly::append_footer(
            body,
            &FooterInfo {
                engine: self.backend_name().to_string(),
                mode: TranslationMode::Sentence,
                elapsed: started.elapsed(),
                part_count: done,
            },
        )
    }

    /// Translate a document with the per-chunk adaptive strategy: small
    /// chunks go sentence by sentence, large chunks split into paragraphs
    /// first, everything else goes to the backend whole.
    pub async fn translate_hybrid(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        id: &str,
        tracker: &ProgressTracker,
        chunking: &ChunkingConfig,
        hybrid: &HybridConfig,
    ) -> String {
        let started = Instant::now();
        let chunks = chunker::split_by_headers(text, chunking.max_chunk_size, chunking.min_chunk_size);
        info!("hybrid mode: {} sections", chunks.len());
        tracker.set_total_chunks(id, chunks.len(), chunk_descriptors(&chunks));

        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            tracker.update_chunk_progress(id, i, ChunkStatus::Processing);
            let output = if chunk.size < hybrid.small_chunk_size {
                debug!("section {}: sentence-level ({} chars)", i + 1, chunk.size);
                self.translate_text_by_sentences(&chunk.text, source_language, target_language)
                    .await
            } else if chunk.size > hybrid.large_chunk_size {
                debug!("section {}: paragraph split ({} chars)", i + 1, chunk.size);
                self.translate_large_chunk(&chunk.text, source_language, target_language, hybrid)
                    .await
            } else {
                debug!("section {}: direct ({} chars)", i + 1, chunk.size);
                self.translate_chunk(&chunk.text, source_language, target_language)
                    .await
            };
            tracker.add_chunk_result(id, i, &output);
            translated.push(output);
        }

        let body = reassembly::join_chunks(&translated);
        reassembly::append_footer(
            body,
            &FooterInfo {
                engine: self.backend_name().to_string(),
                mode: TranslationMode::Hybrid,
                elapsed: started.elapsed(),
                part_count: chunks.len(),
            },
        )
    }

    /// Sentence-by-sentence translation of one span of text.
    async fn translate_text_by_sentences(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> String {
        let mut parts = Vec::new();
        for sentence in segmenter::split_sentences_loose(text) {
            parts.push(
                self.translate_sentence(&sentence, source_language, target_language)
                    .await,
            );
        }
        parts.join(" ")
    }

    /// Split an oversized chunk into paragraphs and translate each one,
    /// falling back to sentence level for paragraphs that are themselves
    /// oversized. Recursion stops here: a paragraph without sentence
    /// boundaries goes to the backend whole.
    async fn translate_large_chunk(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        hybrid: &HybridConfig,
    ) -> String {
        let mut translated = Vec::new();
        for paragraph in PARAGRAPH_BREAK.split(text) {
            if paragraph.trim().is_empty() {
                translated.push(String::new());
                continue;
            }
            let output = if paragraph.len() > hybrid.large_paragraph_size {
                self.translate_text_by_sentences(paragraph, source_language, target_language)
                    .await
            } else {
                self.translate_chunk(paragraph, source_language, target_language)
                    .await
            };
            translated.push(output);
        }
        translated.join("\n\n")
    }
}

/// Progress descriptors for a chunk plan.
fn chunk_descriptors(chunks: &[Chunk]) -> Vec<ChunkProgress> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| ChunkProgress::new(i, chunk.header.clone(), chunk.size))
        .collect()
}

/// Tagged failure string embedding a short preview of the offending input,
/// so no content is ever silently dropped.
fn tagged_error(reason: &str, input: &str) -> String {
    let preview: String = input.trim().chars().take(30).collect::<String>().replace('\n', " ");
    format!("[translation error: {} for '{}...']", reason, preview)
}
