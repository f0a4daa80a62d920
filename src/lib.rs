/*!
 * # doctrans - Document Translator
 *
 * A Rust library for translating long structured documents with local LLMs.
 *
 * ## Features
 *
 * - Markdown-aware segmentation that never splits fenced code or tables
 * - Header-anchored chunking under a size budget, with small-section merging
 *   and size-based fallback at paragraph/sentence boundaries
 * - Adaptive translation strategies (chunk, sentence, hybrid) selected from
 *   document statistics
 * - Partial-failure tolerance: failed chunks become inline error tags, never
 *   aborted runs
 * - Thread-safe progress ledger with partial results for live preview
 * - Pluggable translation backends (Ollama, deterministic mock)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmenter`: Splitting document text into atomic translation units
 * - `chunker`: Assembling units into size-bounded chunks
 * - `analysis`: Document statistics and translation mode selection
 * - `translation`: Dispatch, repetition cleanup and reassembly:
 *   - `translation::dispatcher`: per-chunk dispatch and strategy drivers
 *   - `translation::repetition`: degenerate-output cleanup
 *   - `translation::reassembly`: joins and the metadata footer
 * - `progress`: Thread-safe per-document progress ledger
 * - `providers`: Translation backend implementations:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: deterministic behaviors for tests
 * - `document`: Document-to-text conversion seam
 * - `file_utils`: File system operations and output layout
 * - `language_utils`: Language detection and ISO code utilities
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod analysis;
pub mod app_config;
pub mod app_controller;
pub mod chunker;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod progress;
pub mod providers;
pub mod segmenter;
pub mod translation;

// Re-export main types for easier usage
pub use analysis::TranslationMode;
pub use app_config::Config;
pub use app_controller::{Controller, RunOutcome};
pub use chunker::{Chunk, ChunkStatus};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
pub use progress::{ChunkProgress, ProgressRecord, ProgressTracker, RunStatus};
pub use providers::TranslationBackend;
pub use segmenter::{TranslationUnit, UnitKind};
pub use translation::{RepetitionConfig, RepetitionFilter, TranslationDispatcher};
