/*!
 * Backend implementations for translation services.
 *
 * This module defines the single polymorphic capability the orchestration
 * core depends on, plus its implementations:
 * - Ollama: local LLM server over HTTP
 * - Mock: deterministic behaviors for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// The orchestration core is written against this trait only, so backends can
/// be swapped by configuration and the whole pipeline can run against a
/// deterministic stub in tests.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate text from the source language to the target language
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - ISO code of the source language
    /// * `target_language` - ISO code of the target language
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the backend
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the backend is reachable
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short backend identity used in logs and the metadata footer
    fn name(&self) -> &str;
}

pub mod mock;
pub mod ollama;
