/*!
 * Tests for reassembly and the metadata footer
 */

use std::time::Duration;

use doctrans::analysis::TranslationMode;
use doctrans::segmenter::segment;
use doctrans::translation::reassembly::{
    append_footer, join_chunks, join_units, strip_footer, FooterInfo,
};

use crate::common::SAMPLE_DOCUMENT;

fn footer() -> FooterInfo {
    FooterInfo {
        engine: "mock".to_string(),
        mode: TranslationMode::Chunk,
        elapsed: Duration::from_millis(1234),
        part_count: 3,
    }
}

#[test]
fn test_joinUnits_withHeaderlessText_shouldRoundTripExactly() {
    let text = "plain paragraph line one\nline two\n\nanother paragraph\n\n\nlast";
    assert_eq!(join_units(&segment(text)), text);
}

#[test]
fn test_joinUnits_withFullMarkdown_shouldRoundTripExactly() {
    let text = "# Title\n\nIntro text.\n\n```rust\nlet x = 1;\n\n# inside fence\n```\n\n| a | b |\n| 1 | 2 |\n\nClosing.";
    assert_eq!(join_units(&segment(text)), text);
}

#[test]
fn test_joinUnits_withTrailingNewline_shouldRoundTripExactly() {
    let text = "one paragraph\n";
    assert_eq!(join_units(&segment(text)), text);
}

#[test]
fn test_joinUnits_withWhitespaceOnlyLine_shouldRoundTripExactly() {
    let text = "above\n  \nbelow";
    assert_eq!(join_units(&segment(text)), text);
}

#[test]
fn test_joinUnits_withSampleDocument_shouldRoundTripExactly() {
    assert_eq!(join_units(&segment(SAMPLE_DOCUMENT)), SAMPLE_DOCUMENT);
}

#[test]
fn test_joinChunks_shouldSeparateWithBlankLine() {
    let parts = vec!["first".to_string(), "second".to_string()];
    assert_eq!(join_chunks(&parts), "first\n\nsecond");
}

#[test]
fn test_appendFooter_shouldProduceFencedTrailingBlock() {
    let output = append_footer("translated body".to_string(), &footer());
    assert!(output.starts_with("translated body\n\n---\n"));
    assert!(output.contains("**Translation info**"));
    assert!(output.contains("- Engine: mock"));
    assert!(output.contains("- Mode: chunk"));
    assert!(output.contains("- Elapsed: 1.23s"));
    assert!(output.contains("- Chunks: 3"));
    assert!(output.ends_with("---"));
}

#[test]
fn test_stripFooter_shouldRecoverBodyExactly() {
    let body = "line one\n\nline two";
    let output = append_footer(body.to_string(), &footer());
    assert_eq!(strip_footer(&output), body);
    // Text without a footer passes through untouched
    assert_eq!(strip_footer(body), body);
}

#[test]
fn test_footerPartLabel_shouldFollowMode() {
    let sentence_footer = FooterInfo {
        mode: TranslationMode::Sentence,
        part_count: 12,
        ..footer()
    };
    let output = append_footer(String::new(), &sentence_footer);
    assert!(output.contains("- Sentences: 12"));

    let hybrid_footer = FooterInfo {
        mode: TranslationMode::Hybrid,
        ..footer()
    };
    let output = append_footer(String::new(), &hybrid_footer);
    assert!(output.contains("- Sections: 3"));
}
