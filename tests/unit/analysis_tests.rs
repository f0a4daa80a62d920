/*!
 * Tests for document analysis and mode selection
 */

use doctrans::analysis::{analyze, select_mode, TranslationMode};
use doctrans::app_config::ModeConfig;

fn lines(count: usize, line: &str) -> String {
    vec![line.to_string(); count].join("\n")
}

#[test]
fn test_analyze_shouldCountLineCategories() {
    let text = "# Header\n\n- bullet one\n* bullet two\nplain prose line\nthis line mentions the agreement terms\n";
    let stats = analyze(text, &ModeConfig::default());
    assert_eq!(stats.total_lines, 5);
    assert_eq!(stats.header_lines, 1);
    assert_eq!(stats.bullet_lines, 2);
    assert_eq!(stats.legal_lines, 1);
    assert_eq!(stats.long_lines, 0);
}

#[test]
fn test_selectMode_withLongPlainDocument_shouldPickChunk() {
    let text = lines(300, "a regular line of prose without keywords.");
    let config = ModeConfig::default();
    let stats = analyze(&text, &config);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Chunk);
}

#[test]
fn test_selectMode_withLongLegalDocument_shouldPickHybrid() {
    let text = lines(250, "the agreement binds each consultant pursuant to its terms.");
    let config = ModeConfig::default();
    let stats = analyze(&text, &config);
    assert!(stats.legal_ratio() > 0.3);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Hybrid);
}

#[test]
fn test_selectMode_withManyLongLines_shouldPickHybrid() {
    let long_line = "x".repeat(180);
    let mut text = lines(60, &long_line);
    text.push('\n');
    text.push_str(&lines(40, "short line"));
    let config = ModeConfig::default();
    let stats = analyze(&text, &config);
    assert!(stats.long_line_ratio() > 0.4);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Hybrid);
}

#[test]
fn test_selectMode_withShortDocument_shouldPickSentence() {
    let text = lines(30, "a short document line.");
    let config = ModeConfig::default();
    let stats = analyze(&text, &config);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Sentence);
}

#[test]
fn test_selectMode_withMediumDocument_shouldDefaultToHybrid() {
    let text = lines(100, "an ordinary line of medium-length text.");
    let config = ModeConfig::default();
    let stats = analyze(&text, &config);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Hybrid);
}

#[test]
fn test_selectMode_withCustomThresholds_shouldFollowConfiguration() {
    // Thresholds are policy, not constants: shrinking the long-document limit
    // reroutes even a tiny document to chunk mode
    let config = ModeConfig {
        long_document_lines: 2,
        ..ModeConfig::default()
    };
    let text = lines(10, "plain text line.");
    let stats = analyze(&text, &config);
    assert_eq!(select_mode(&stats, &config), TranslationMode::Chunk);
}
