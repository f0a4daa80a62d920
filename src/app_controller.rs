use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use log::{error, info};

use crate::analysis::{self, TranslationMode};
use crate::app_config::{Config, TranslationBackendKind};
use crate::document::{DocumentConverter, PlainTextConverter};
use crate::errors::AppError;
use crate::file_utils::{self, FileManager, ScannedDocument};
use crate::language_utils;
use crate::progress::{ProgressRecord, ProgressTracker, RunStatus};
use crate::providers::mock::MockBackend;
use crate::providers::ollama::Ollama;
use crate::providers::TranslationBackend;
use crate::translation::dispatcher::{DispatchOptions, TranslationDispatcher};
use crate::translation::repetition::RepetitionFilter;

// @module: Pipeline entry point tying the stages together

// @struct: Result of one document run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    // @field: Document identifier (the source path)
    pub document_id: String,

    // @field: Final run status
    pub status: RunStatus,

    // @field: Where the converted source text was written
    pub original_path: PathBuf,

    // @field: Where the translation was written
    pub translated_path: PathBuf,

    // @field: Strategy used for the run
    pub mode: TranslationMode,
}

/// Main application controller.
///
/// Owns the translation services and drives the full pipeline for each
/// document: convert, detect language, select a strategy, translate with
/// progress tracking, reassemble and persist. Everything is injected, so a
/// test can construct a controller around a stub backend and a fresh tracker
/// with no shared state between tests.
#[derive(Clone)]
pub struct Controller {
    /// Application configuration
    config: Config,

    /// Translation backend shared by all runs
    backend: Arc<dyn TranslationBackend>,

    /// Document conversion seam
    converter: Arc<dyn DocumentConverter>,

    /// Per-chunk translation dispatch
    dispatcher: Arc<TranslationDispatcher>,

    /// Shared progress ledger
    tracker: ProgressTracker,
}

impl Controller {
    /// Create a controller with services built from configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let backend: Arc<dyn TranslationBackend> = match config.translation.backend {
            TranslationBackendKind::Ollama => Arc::new(Ollama::from_config(&config.translation)),
            TranslationBackendKind::Mock => Arc::new(MockBackend::uppercase()),
        };
        Ok(Self::with_parts(
            config,
            backend,
            Arc::new(PlainTextConverter),
            ProgressTracker::new(),
        ))
    }

    /// Create a controller from explicit parts
    pub fn with_parts(
        config: Config,
        backend: Arc<dyn TranslationBackend>,
        converter: Arc<dyn DocumentConverter>,
        tracker: ProgressTracker,
    ) -> Self {
        let options = DispatchOptions {
            request_timeout: Duration::from_secs(config.translation.get_timeout_secs()),
            max_retries: config.translation.common.retry_count,
            backoff_base_ms: config.translation.common.retry_backoff_ms,
        };
        let dispatcher = Arc::new(TranslationDispatcher::new(
            Arc::clone(&backend),
            RepetitionFilter::new(config.repetition.clone()),
            options,
        ));
        Self {
            config,
            backend,
            converter,
            dispatcher,
            tracker,
        }
    }

    /// Shared progress ledger
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Progress snapshot for a document
    pub fn get_progress(&self, document_id: &str) -> Option<ProgressRecord> {
        self.tracker.get(document_id)
    }

    /// Joined partial results for a document, for live preview
    pub fn get_partial_results(&self, document_id: &str) -> String {
        self.tracker.get_partial_results(document_id)
    }

    /// Verify the backend is reachable before starting a run
    pub async fn test_connection(&self) -> Result<()> {
        self.backend
            .test_connection()
            .await
            .map_err(|e| anyhow!("Backend '{}' is not reachable: {}", self.backend.name(), e))
    }

    /// Run the full translation pipeline for one document.
    ///
    /// The source path doubles as the document identifier in the progress
    /// ledger. Input and conversion failures abort the run with an error
    /// status; anything after the chunk plan exists degrades to inline error
    /// tags and the run still finishes.
    pub async fn run_translation(&self, path: &Path) -> Result<RunOutcome, AppError> {
        let document_id = path.to_string_lossy().to_string();
        self.tracker.start(&document_id);

        let text = match self.converter.convert(path) {
            Ok(text) => text,
            Err(e) => {
                self.tracker.error(&document_id, &e.to_string());
                return Err(e.into());
            }
        };

        let source_language = self.resolve_source_language(&text);
        let target_language = self.config.target_language.clone();
        if language_utils::language_codes_match(&source_language, &target_language) {
            info!(
                "document {:?} already appears to be {}; content will pass through",
                path, target_language
            );
        }

        let mode = if self.config.translation.force_sentence_mode {
            info!("sentence mode forced by configuration");
            TranslationMode::Sentence
        } else {
            let stats = analysis::analyze(&text, &self.config.mode);
            analysis::select_mode(&stats, &self.config.mode)
        };
        info!(
            "translating {:?} ({} -> {}, {} mode)",
            path, source_language, target_language, mode
        );

        let translated = match mode {
            TranslationMode::Chunk => {
                self.dispatcher
                    .translate_chunked(
                        &text,
                        &source_language,
                        &target_language,
                        &document_id,
                        &self.tracker,
                        &self.config.chunking,
                    )
                    .await
            }
            TranslationMode::Sentence => {
                self.dispatcher
                    .translate_by_sentences(
                        &text,
                        &source_language,
                        &target_language,
                        &document_id,
                        &self.tracker,
                    )
                    .await
            }
            TranslationMode::Hybrid => {
                self.dispatcher
                    .translate_hybrid(
                        &text,
                        &source_language,
                        &target_language,
                        &document_id,
                        &self.tracker,
                        &self.config.chunking,
                        &self.config.hybrid,
                    )
                    .await
            }
        };

        // Persist the converted source next to the translation so repeated
        // runs are discoverable and comparable by stem
        let original_path = FileManager::converted_output_path(path, &self.config.output_dir);
        let translated_path = FileManager::translated_output_path(path, &self.config.output_dir);
        if let Err(e) = FileManager::write_to_file(&original_path, &text)
            .and_then(|_| FileManager::write_to_file(&translated_path, &translated))
        {
            self.tracker.error(&document_id, &e.to_string());
            return Err(AppError::File(e.to_string()));
        }

        self.tracker.finish(&document_id);
        info!("finished {:?} -> {:?}", path, translated_path);

        Ok(RunOutcome {
            document_id,
            status: RunStatus::Done,
            original_path,
            translated_path,
            mode,
        })
    }

    /// Launch a fire-and-forget worker for one document. Callers observe the
    /// run through the progress ledger instead of awaiting the handle.
    pub fn spawn_translation(&self, path: PathBuf) -> tokio::task::JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.run_translation(&path).await {
                error!("translation run failed for {:?}: {}", path, e);
            }
        })
    }

    /// Translate every foreign-language document under a folder, a bounded
    /// number of documents at a time. Per-document failures are recorded in
    /// the ledger and do not stop the other documents.
    pub async fn run_folder(&self, dir: &Path) -> Result<Vec<RunOutcome>> {
        let documents = self.scan_documents(dir)?;
        info!(
            "found {} foreign document(s) under {:?}",
            documents.len(),
            dir
        );

        let outcomes: Vec<Option<RunOutcome>> = stream::iter(documents)
            .map(|doc| {
                let controller = self.clone();
                async move {
                    match controller.run_translation(&doc.path).await {
                        Ok(outcome) => Some(outcome),
                        Err(e) => {
                            error!("failed to translate {:?}: {}", doc.path, e);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.config.translation.concurrent_documents)
            .collect()
            .await;

        Ok(outcomes.into_iter().flatten().collect())
    }

    /// List supported documents under a folder that are not already in the
    /// target language.
    pub fn scan_documents(&self, dir: &Path) -> Result<Vec<ScannedDocument>> {
        file_utils::scan_foreign_documents(dir, &self.config.target_language, self.converter.as_ref())
    }

    fn resolve_source_language(&self, text: &str) -> String {
        if self.config.source_language == "auto" {
            let (code, confidence) = language_utils::detect_language(text);
            info!(
                "detected source language: {} (confidence {:.2})",
                code, confidence
            );
            code
        } else {
            self.config.source_language.clone()
        }
    }
}
