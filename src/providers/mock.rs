/*!
 * Mock backend implementations for testing.
 *
 * This module provides deterministic backends that simulate different
 * behaviors:
 * - `MockBackend::uppercase()` - always succeeds, uppercases the input
 * - `MockBackend::echo()` - returns the input verbatim (silent failure mode)
 * - `MockBackend::failing()` - always fails with an API error
 * - `MockBackend::failing_when(pred)` - fails only for matching input
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::TranslationBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, returning the uppercased input
    Uppercase,
    /// Returns the input unchanged (simulates a backend that silently passes
    /// through text it cannot translate)
    Echo,
    /// Always returns an empty response
    Empty,
    /// Always fails with an API error
    Failing,
    /// Fails for inputs matching the predicate, uppercases the rest
    FailingWhen(fn(&str) -> bool),
    /// Fails the first request of every cycle of N (so a retry succeeds)
    Intermittent {
        /// Cycle length
        fail_every: usize,
    },
    /// Simulates a slow response (for timeout testing)
    Slow {
        /// Delay before responding, in milliseconds
        delay_ms: u64,
    },
}

/// Mock backend for testing translation behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &str, &str) -> String>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a mock that uppercases every input
    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    /// Create a mock that returns input verbatim
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that errors only for matching input
    pub fn failing_when(predicate: fn(&str) -> bool) -> Self {
        Self::new(MockBehavior::FailingWhen(predicate))
    }

    /// Create an intermittently failing mock
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that responds after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&str, &str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls observed so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(generator) = self.custom_response {
            return Ok(generator(text, source_language, target_language));
        }

        match self.behavior {
            MockBehavior::Uppercase => Ok(text.to_uppercase()),

            MockBehavior::Echo => Ok(text.to_string()),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::FailingWhen(predicate) => {
                if predicate(text) {
                    Err(ProviderError::ConnectionError(
                        "Simulated connection failure".to_string(),
                    ))
                } else {
                    Ok(text.to_uppercase())
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(text.to_uppercase())
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(text.to_uppercase())
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated backend failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
