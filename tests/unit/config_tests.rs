/*!
 * Tests for app configuration
 */

use doctrans::app_config::{Config, TranslationBackendKind};

use crate::common;

#[test]
fn test_defaultConfig_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "ko");
    assert_eq!(config.translation.backend, TranslationBackendKind::Ollama);
    assert_eq!(config.chunking.max_chunk_size, 1000);
    assert_eq!(config.chunking.min_chunk_size, 500);
}

#[test]
fn test_validate_withAutoTarget_shouldFail() {
    let mut config = Config::default();
    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroChunkBudget_shouldFail() {
    let mut config = Config::default();
    config.chunking.max_chunk_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withMissingBackendEntry_shouldFail() {
    let mut config = Config::default();
    config.translation.available_backends.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_activeBackend_shouldFollowSelectedKind() {
    let mut config = Config::default();
    assert_eq!(config.translation.get_model(), "gemma3:4b");
    assert_eq!(
        config.translation.get_endpoint(),
        "http://localhost:11434"
    );

    config.translation.backend = TranslationBackendKind::Mock;
    assert_eq!(config.translation.get_model(), "");
}

#[test]
fn test_parse_withEmptyJson_shouldFillDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.target_language, "ko");
    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.mode.long_document_lines, 200);
    assert_eq!(config.hybrid.small_chunk_size, 200);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_withPartialOverrides_shouldKeepRestDefault() {
    let json = r#"{
        "target_language": "en",
        "chunking": { "max_chunk_size": 3000 },
        "translation": { "backend": "mock" }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.target_language, "en");
    assert_eq!(config.chunking.max_chunk_size, 3000);
    assert_eq!(config.chunking.min_chunk_size, 500);
    assert_eq!(config.translation.backend, TranslationBackendKind::Mock);
    assert!(config.validate().is_ok());
}

#[test]
fn test_fileRoundTrip_shouldPreserveValues() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.chunking.max_chunk_size = 1500;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.chunking.max_chunk_size, 1500);
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    assert!(Config::from_file("definitely/not/here.json").is_err());
}
