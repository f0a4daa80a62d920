/*!
 * End-to-end pipeline tests against the mock backend
 */

use std::sync::Arc;
use std::time::Duration;

use doctrans::analysis::TranslationMode;
use doctrans::errors::AppError;
use doctrans::progress::RunStatus;
use doctrans::providers::mock::MockBackend;
use doctrans::translation::reassembly::strip_footer;

use crate::common;

#[tokio::test]
async fn test_runTranslation_withSmallDocument_shouldUseSentenceModeAndPersist() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "note.md",
        "Hello world. This is fine.\n\nBye.",
    )
    .unwrap();

    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let outcome = controller.run_translation(&input).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Done);
    assert_eq!(outcome.mode, TranslationMode::Sentence);
    assert!(outcome.original_path.ends_with("converted/note.md"));
    assert!(outcome.translated_path.ends_with("translated/note.md"));

    let converted = std::fs::read_to_string(&outcome.original_path).unwrap();
    assert_eq!(converted, "Hello world. This is fine.\n\nBye.");

    let translated = std::fs::read_to_string(&outcome.translated_path).unwrap();
    assert_eq!(
        strip_footer(&translated),
        "HELLO WORLD. THIS IS FINE.\n\nBYE."
    );

    let record = controller.get_progress(&outcome.document_id).unwrap();
    assert_eq!(record.status, RunStatus::Done);
    assert_eq!(record.total_chunks, 3);
    assert_eq!(record.chunks_completed, 3);
}

#[tokio::test]
async fn test_runTranslation_withFailingChunk_shouldStillFinishWithTaggedOutput() {
    let temp_dir = common::create_temp_dir().unwrap();
    let names = ["alpha", "beta", "gamma", "delta", "epsilon"];
    let text = names
        .iter()
        .map(|n| format!("# {}\n\nSection about {} with enough text to stand alone.", n, n))
        .collect::<Vec<_>>()
        .join("\n\n");
    let input = common::create_test_file(temp_dir.path(), "doc.md", &text).unwrap();

    let mut config = common::fast_test_config(temp_dir.path().join("out"));
    // Thresholds are policy: shrink the long-document limit so this small
    // fixture goes through chunk mode
    config.mode.long_document_lines = 2;
    config.chunking.min_chunk_size = 10;

    let controller = common::controller_with_backend(
        config,
        Arc::new(MockBackend::failing_when(|t| t.contains("gamma"))),
    );

    let outcome = controller.run_translation(&input).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Done);
    assert_eq!(outcome.mode, TranslationMode::Chunk);

    let record = controller.get_progress(&outcome.document_id).unwrap();
    assert_eq!(record.status, RunStatus::Done);
    assert_eq!(record.total_chunks, 5);
    assert_eq!(record.chunks_completed, 5);
    assert!(record.partial_results[2].starts_with("[translation error:"));

    // The file on disk carries the failure inline, everything else translated
    let translated = std::fs::read_to_string(&outcome.translated_path).unwrap();
    assert!(translated.contains("[translation error:"));
    assert!(translated.contains("# ALPHA"));
    assert!(translated.contains("# EPSILON"));
}

#[tokio::test]
async fn test_runTranslation_withMissingFile_shouldRecordErrorStatus() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let missing = temp_dir.path().join("absent.md");
    let result = controller.run_translation(&missing).await;
    assert!(matches!(result, Err(AppError::Document(_))));

    let record = controller
        .get_progress(&missing.to_string_lossy())
        .unwrap();
    assert_eq!(record.status, RunStatus::Error);
    assert!(record.error.is_some());
    // The run failed before any chunk plan existed
    assert_eq!(record.total_chunks, 0);
}

#[tokio::test]
async fn test_runTranslation_withUnsupportedFormat_shouldFailFast() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "scan.pdf", "%PDF-1.4").unwrap();

    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let result = controller.run_translation(&input).await;
    assert!(matches!(result, Err(AppError::Document(_))));
}

#[tokio::test]
async fn test_spawnTranslation_shouldBeObservableThroughPolling() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(
        temp_dir.path(),
        "spawned.md",
        "One sentence here. Another follows.",
    )
    .unwrap();
    let document_id = input.to_string_lossy().to_string();

    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let handle = controller.spawn_translation(input.clone());

    // Poll the ledger the way an API caller would
    let mut finished = false;
    for _ in 0..100 {
        if let Some(record) = controller.get_progress(&document_id) {
            if record.status == RunStatus::Done {
                finished = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.await.unwrap();

    assert!(finished, "run never reached done status");
    assert!(!controller.get_partial_results(&document_id).is_empty());
}

#[tokio::test]
async fn test_getPartialResults_shouldJoinChunkResultsInOrder() {
    let temp_dir = common::create_temp_dir().unwrap();
    let text = "# One\n\nfirst section body text.\n\n# Two\n\nsecond section body text.";
    let input = common::create_test_file(temp_dir.path(), "grow.md", text).unwrap();

    let mut config = common::fast_test_config(temp_dir.path().join("out"));
    config.mode.long_document_lines = 1;
    config.chunking.min_chunk_size = 10;
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let outcome = controller.run_translation(&input).await.unwrap();
    let preview = controller.get_partial_results(&outcome.document_id);
    assert_eq!(
        preview,
        "# ONE\n\nFIRST SECTION BODY TEXT.\n\n# TWO\n\nSECOND SECTION BODY TEXT."
    );
}

#[tokio::test]
async fn test_scanDocuments_shouldListOnlyForeignLanguageFiles() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        temp_dir.path(),
        "english.md",
        "This document is written in English and needs translating.",
    )
    .unwrap();
    common::create_test_file(
        temp_dir.path(),
        "korean.md",
        "안녕하세요. 이 문서는 이미 한국어로 작성되어 있습니다.",
    )
    .unwrap();
    common::create_test_file(temp_dir.path(), "ignored.bin", "binary-ish").unwrap();

    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let documents = controller.scan_documents(temp_dir.path()).unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "english.md");
    assert_eq!(documents[0].language, "en");
}

#[tokio::test]
async fn test_runFolder_shouldTranslateEveryForeignDocument() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "a.md", "First document body. Short one.").unwrap();
    common::create_test_file(temp_dir.path(), "b.md", "Second document body. Also short.").unwrap();

    let config = common::fast_test_config(temp_dir.path().join("out"));
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let outcomes = controller.run_folder(temp_dir.path()).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert_eq!(outcome.status, RunStatus::Done);
        assert!(outcome.translated_path.exists());
    }
}

#[tokio::test]
async fn test_forcedSentenceMode_shouldBypassModeSelection() {
    let temp_dir = common::create_temp_dir().unwrap();
    // Long enough that mode selection would normally pick chunk mode
    let text = (0..60)
        .map(|i| format!("Plain filler line number {} with ordinary words.", i))
        .collect::<Vec<_>>()
        .join("\n");
    let input = common::create_test_file(temp_dir.path(), "forced.md", &text).unwrap();

    let mut config = common::fast_test_config(temp_dir.path().join("out"));
    config.mode.long_document_lines = 10;
    config.translation.force_sentence_mode = true;
    let controller = common::controller_with_backend(config, Arc::new(MockBackend::uppercase()));

    let outcome = controller.run_translation(&input).await.unwrap();
    assert_eq!(outcome.mode, TranslationMode::Sentence);
}
