// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]
// Parts of the module tree are library API surface, only exercised through
// the lib target and its tests
#![allow(dead_code)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::{Config, LogLevel, TranslationBackendKind};
use crate::app_controller::{Controller, RunOutcome};
use crate::progress::RunStatus;

mod analysis;
mod app_config;
mod app_controller;
mod chunker;
mod document;
mod errors;
mod file_utils;
mod language_utils;
mod progress;
mod providers;
mod segmenter;
mod translation;

/// CLI wrapper for TranslationBackendKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Ollama,
    Mock,
}

impl From<CliBackend> for TranslationBackendKind {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Ollama => TranslationBackendKind::Ollama,
            CliBackend::Mock => TranslationBackendKind::Mock,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document or folder of documents (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// List foreign-language documents under a folder
    Scan {
        /// Folder to scan
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g. 'en', 'ja'), or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ko', 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output directory for converted and translated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force sentence-level translation regardless of document statistics
    #[arg(long)]
    sentence_mode: bool,

    /// Override the chunk size budget in characters
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Override the small-section merge threshold in characters
    #[arg(long)]
    min_chunk_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctrans - Document Translator
///
/// Translates long structured documents (Markdown or converted PDF/DOCX text)
/// into a target language using a local LLM backend, chunk by chunk, with
/// live progress and partial-failure tolerance.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "1.0.0")]
#[command(about = "Local-LLM document translation tool")]
#[command(long_about = "doctrans splits a document along its structure, translates each chunk with a
local LLM backend and reassembles a faithful translated document. Failed
chunks are tagged inline so a partially failed run still produces a complete,
reviewable file.

EXAMPLES:
    doctrans document.md                      # Translate using default config
    doctrans -t en -s ko document.md          # Explicit language pair
    doctrans -b mock document.md              # Dry run with the stub backend
    doctrans --sentence-mode short-note.md    # Force sentence-level mode
    doctrans ./inbox                          # Translate a whole folder
    doctrans scan ./inbox                     # List foreign documents only
    doctrans completions bash                 # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different file with --config-path. If the config file doesn't exist, a
    default one is created automatically.

SUPPORTED BACKENDS:
    ollama - Local Ollama server (default: gemma3:4b)
    mock   - Deterministic stub backend for tests and dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g. 'en', 'ja'), or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'ko', 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Output directory for converted and translated files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force sentence-level translation regardless of document statistics
    #[arg(long)]
    sentence_mode: bool,

    /// Override the chunk size budget in characters
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Override the small-section merge threshold in characters
    #[arg(long)]
    min_chunk_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default; the level is
    // updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Scan {
            folder,
            config_path,
        }) => run_scan(&folder, &config_path).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                backend: cli.backend,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                output_dir: cli.output_dir,
                sentence_mode: cli.sentence_mode,
                max_chunk_size: cli.max_chunk_size,
                min_chunk_size: cli.min_chunk_size,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

/// Load the configuration file, creating a default one when missing.
fn load_config(config_path: &str) -> Result<Config> {
    if file_utils::FileManager::file_exists(config_path) {
        Config::from_file(config_path)
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .to_file(config_path)
            .context("Failed to write default config")?;
        Ok(config)
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(cmd_log_level.clone().into()));
    }

    let mut config = load_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(backend) = &options.backend {
        config.translation.backend = backend.clone().into();
    }
    if let Some(model) = &options.model {
        let backend_str = config.translation.backend.to_lowercase_string();
        if let Some(backend_config) = config
            .translation
            .available_backends
            .iter_mut()
            .find(|b| b.backend_type == backend_str)
        {
            backend_config.model = model.clone();
        }
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if options.sentence_mode {
        config.translation.force_sentence_mode = true;
    }
    if let Some(max_chunk_size) = options.max_chunk_size {
        config.chunking.max_chunk_size = max_chunk_size;
    }
    if let Some(min_chunk_size) = options.min_chunk_size {
        config.chunking.min_chunk_size = min_chunk_size;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(config.log_level));
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;

    // Surface an unreachable backend before any chunking work starts
    controller
        .test_connection()
        .await
        .context("Backend connection test failed")?;

    if options.input_path.is_file() {
        let outcome = run_with_progress(&controller, &options.input_path).await?;
        report_outcome(&outcome);
        Ok(())
    } else if options.input_path.is_dir() {
        let outcomes = controller.run_folder(&options.input_path).await?;
        info!("translated {} document(s)", outcomes.len());
        for outcome in &outcomes {
            report_outcome(outcome);
        }
        Ok(())
    } else {
        Err(anyhow!("Input path does not exist: {:?}", options.input_path))
    }
}

/// Run one document while rendering a progress bar fed by polling the
/// progress ledger, the same way an API caller would.
async fn run_with_progress(controller: &Controller, path: &Path) -> Result<RunOutcome> {
    let document_id = path.to_string_lossy().to_string();
    let tracker = controller.tracker().clone();

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let poll_bar = bar.clone();
    let poller = tokio::spawn(async move {
        loop {
            if let Some(record) = tracker.get(&document_id) {
                if record.total_chunks > 0 {
                    poll_bar.set_length(record.total_chunks as u64);
                    poll_bar.set_position(record.chunks_completed as u64);
                    if let Some(current) = record.chunks_info.get(record.current_chunk) {
                        poll_bar.set_message(current.header.clone());
                    }
                }
                if record.status != RunStatus::Running {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    let outcome = controller.run_translation(path).await;
    let _ = poller.await;
    bar.finish_and_clear();

    outcome.map_err(|e| anyhow!(e))
}

fn report_outcome(outcome: &RunOutcome) {
    info!(
        "{} [{} mode] -> {:?}",
        outcome.document_id, outcome.mode, outcome.translated_path
    );
}

async fn run_scan(folder: &Path, config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate().context("Configuration validation failed")?;
    let controller = Controller::with_config(config)?;

    let documents = controller.scan_documents(folder)?;
    if documents.is_empty() {
        info!("no foreign-language documents found under {:?}", folder);
        return Ok(());
    }
    for document in &documents {
        println!("{}\t{}\t{}", document.language, document.name, document.path.display());
    }
    Ok(())
}
