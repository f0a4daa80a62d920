/*!
 * Translation orchestration built on top of a pluggable backend.
 *
 * This module contains the core functionality for translating a document
 * chunk by chunk. It is split into several submodules:
 *
 * - `dispatcher`: never-failing per-chunk dispatch and the strategy drivers
 * - `repetition`: cleanup of degenerate small-model output
 * - `reassembly`: order-preserving joins and the metadata footer
 */

// Re-export main types for easier usage
pub use self::dispatcher::{DispatchOptions, TranslationDispatcher};
pub use self::repetition::{RepetitionConfig, RepetitionFilter};

// Submodules
pub mod dispatcher;
pub mod reassembly;
pub mod repetition;
