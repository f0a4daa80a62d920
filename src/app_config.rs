use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::translation::repetition::RepetitionConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), or "auto" for detection
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Chunk assembly limits
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Translation mode selection thresholds
    #[serde(default)]
    pub mode: ModeConfig,

    /// Hybrid strategy thresholds
    #[serde(default)]
    pub hybrid: HybridConfig,

    /// Repetition cleanup thresholds
    #[serde(default)]
    pub repetition: RepetitionConfig,

    /// Directory receiving converted/ and translated/ output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationBackendKind {
    // @backend: Ollama local LLM server
    #[default]
    Ollama,
    // @backend: Deterministic stub for tests and dry runs
    Mock,
}

impl TranslationBackendKind {
    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Backend configuration entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    // @field: Backend type identifier
    #[serde(rename = "type")]
    pub backend_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    // @param kind: Backend enum
    // @returns: Backend config with defaults
    pub fn new(kind: TranslationBackendKind) -> Self {
        match kind {
            TranslationBackendKind::Ollama => Self {
                backend_type: "ollama".to_string(),
                model: default_ollama_model(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationBackendKind::Mock => Self {
                backend_type: "mock".to_string(),
                model: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Settings shared by all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template; {source_language} and {target_language} are
    /// replaced before each request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry attempts per failed backend call
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Translation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Selected backend
    #[serde(default)]
    pub backend: TranslationBackendKind,

    /// Bypass mode selection and translate sentence by sentence
    #[serde(default)]
    pub force_sentence_mode: bool,

    /// Maximum documents translated concurrently in folder runs
    #[serde(default = "default_concurrent_documents")]
    pub concurrent_documents: usize,

    /// Settings shared by all backends
    #[serde(default)]
    pub common: TranslationCommonConfig,

    /// Configured backend entries
    #[serde(default = "default_backends")]
    pub available_backends: Vec<BackendConfig>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backend: TranslationBackendKind::default(),
            force_sentence_mode: false,
            concurrent_documents: default_concurrent_documents(),
            common: TranslationCommonConfig::default(),
            available_backends: default_backends(),
        }
    }
}

impl TranslationConfig {
    /// Config entry for the selected backend
    pub fn active_backend(&self) -> Option<&BackendConfig> {
        let wanted = self.backend.to_lowercase_string();
        self.available_backends
            .iter()
            .find(|b| b.backend_type == wanted)
    }

    /// Model name for the selected backend
    pub fn get_model(&self) -> String {
        self.active_backend()
            .map(|b| b.model.clone())
            .unwrap_or_default()
    }

    /// Endpoint URL for the selected backend
    pub fn get_endpoint(&self) -> String {
        self.active_backend()
            .map(|b| b.endpoint.clone())
            .unwrap_or_default()
    }

    /// Request timeout for the selected backend
    pub fn get_timeout_secs(&self) -> u64 {
        self.active_backend()
            .map(|b| b.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }
}

/// Chunk assembly limits. The merge threshold may exceed the size budget;
/// that simply merges every undersized section the budget allows.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Size budget per chunk in characters
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Sections smaller than this merge into their neighbor
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            min_chunk_size: default_min_chunk_size(),
        }
    }
}

/// Mode selection thresholds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModeConfig {
    /// Non-blank line count above which a document counts as long
    #[serde(default = "default_long_document_lines")]
    pub long_document_lines: usize,

    /// Non-blank line count below which a document counts as short
    #[serde(default = "default_short_document_lines")]
    pub short_document_lines: usize,

    /// Character count above which a line counts as a long sentence
    #[serde(default = "default_long_line_chars")]
    pub long_line_chars: usize,

    /// Legal-keyword line share that marks a legal document
    #[serde(default = "default_legal_term_ratio")]
    pub legal_term_ratio: f64,

    /// Long-line share that pushes a document to hybrid mode
    #[serde(default = "default_long_line_ratio")]
    pub long_line_ratio: f64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            long_document_lines: default_long_document_lines(),
            short_document_lines: default_short_document_lines(),
            long_line_chars: default_long_line_chars(),
            legal_term_ratio: default_legal_term_ratio(),
            long_line_ratio: default_long_line_ratio(),
        }
    }
}

/// Hybrid strategy thresholds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HybridConfig {
    /// Chunks below this size translate sentence by sentence
    #[serde(default = "default_small_chunk_size")]
    pub small_chunk_size: usize,

    /// Chunks above this size split into paragraphs first
    #[serde(default = "default_large_chunk_size")]
    pub large_chunk_size: usize,

    /// Paragraphs above this size translate sentence by sentence
    #[serde(default = "default_large_paragraph_size")]
    pub large_paragraph_size: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            small_chunk_size: default_small_chunk_size(),
            large_chunk_size: default_large_chunk_size(),
            large_paragraph_size: default_large_paragraph_size(),
        }
    }
}

/// Log level setting
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            chunking: ChunkingConfig::default(),
            mode: ModeConfig::default(),
            hybrid: HybridConfig::default(),
            repetition: RepetitionConfig::default(),
            output_dir: default_output_dir(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e))?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }
        if self.target_language == "auto" {
            return Err(anyhow!("Target language cannot be 'auto'"));
        }
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty (use 'auto')"));
        }
        if self.chunking.max_chunk_size == 0 {
            return Err(anyhow!("max_chunk_size must be greater than zero"));
        }
        if self.translation.concurrent_documents == 0 {
            return Err(anyhow!("concurrent_documents must be greater than zero"));
        }
        if self.translation.active_backend().is_none() {
            return Err(anyhow!(
                "No configuration entry for backend '{}'",
                self.translation.backend
            ));
        }
        Ok(())
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_ollama_model() -> String {
    "gemma3:4b".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.1
}

fn default_concurrent_documents() -> usize {
    2
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the user's text from {source_language} to \
     {target_language}. Preserve Markdown structure, inline formatting and line breaks. Return \
     only the translated text with no commentary."
        .to_string()
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig::new(TranslationBackendKind::Ollama),
        BackendConfig::new(TranslationBackendKind::Mock),
    ]
}

fn default_max_chunk_size() -> usize {
    1000
}

fn default_min_chunk_size() -> usize {
    500
}

fn default_long_document_lines() -> usize {
    200
}

fn default_short_document_lines() -> usize {
    50
}

fn default_long_line_chars() -> usize {
    150
}

fn default_legal_term_ratio() -> f64 {
    0.3
}

fn default_long_line_ratio() -> f64 {
    0.4
}

fn default_small_chunk_size() -> usize {
    200
}

fn default_large_chunk_size() -> usize {
    1000
}

fn default_large_paragraph_size() -> usize {
    500
}
