/*!
 * Tests for the repetition filter
 */

use doctrans::translation::repetition::{RepetitionConfig, RepetitionFilter};

#[test]
fn test_preprocess_withCleanMarkdown_shouldPassThroughUnchanged() {
    let filter = RepetitionFilter::default();
    let text = "# Title\n\nA normal paragraph with varied words in it.\n\n- a bullet";
    assert_eq!(filter.preprocess(text), text);
}

#[test]
fn test_preprocess_withDominantWord_shouldTruncateToFirstSentence() {
    let filter = RepetitionFilter::default();
    // Alternating repeats dodge the run collapse but one word still takes far
    // more than 30% of the meaningful words
    let text = format!("The topic applies here. {}", "levy tax ".repeat(15));
    let cleaned = filter.preprocess(&text);
    assert_eq!(cleaned, "The topic applies here.");
}

#[test]
fn test_preprocess_withConsecutiveRepeats_shouldCollapseRun() {
    let filter = RepetitionFilter::default();
    let cleaned = filter.preprocess("fees fees fees apply to the account");
    assert_eq!(cleaned, "fees apply to the account");
}

#[test]
fn test_postprocess_withCleanOutput_shouldKeepLineStructure() {
    let filter = RepetitionFilter::default();
    let text = "# TITLE\n\nHELLO WORLD.\n\n## SUB\n\nBYE.";
    assert_eq!(filter.postprocess(text).as_deref(), Some(text));
}

#[test]
fn test_postprocess_withConsecutiveRepeats_shouldCollapseRun() {
    let filter = RepetitionFilter::default();
    // A consecutive run collapses to one occurrence before anything else
    let cleaned = filter.postprocess("the result is is is is ready now").unwrap();
    assert_eq!(cleaned, "the result is ready now");
}

#[test]
fn test_postprocess_withRepeatedWordWall_shouldRejectOrSalvage() {
    let filter = RepetitionFilter::default();
    // Alternating repeats survive run collapsing; with no usable first
    // sentence the whole output is rejected
    let wall = format!("no. {}", "alpha beta ".repeat(30));
    assert_eq!(filter.postprocess(&wall), None);

    // With a real leading sentence, that sentence is salvaged
    let salvageable = format!("The first sentence is fine. {}", "alpha beta ".repeat(30));
    let cleaned = filter.postprocess(&salvageable).unwrap();
    assert_eq!(cleaned, "The first sentence is fine.");
}

#[test]
fn test_postprocess_withDuplicateSentences_shouldDropLaterCopies() {
    let filter = RepetitionFilter::default();
    let text = "This sentence repeats itself verbatim. This sentence repeats itself verbatim. A different closing thought.";
    let cleaned = filter.postprocess(text).unwrap();
    assert_eq!(
        cleaned,
        "This sentence repeats itself verbatim. A different closing thought."
    );
}

#[test]
fn test_postprocess_withEmptyInput_shouldReturnNone() {
    let filter = RepetitionFilter::default();
    assert_eq!(filter.postprocess(""), None);
    assert_eq!(filter.postprocess("   \n  "), None);
}

#[test]
fn test_postprocess_withOverlongOutput_shouldCapAtSentenceBoundary() {
    let config = RepetitionConfig {
        max_output_chars: 60,
        ..RepetitionConfig::default()
    };
    let filter = RepetitionFilter::new(config);
    let text = "First unique sentence goes here. Second unique sentence follows now. Third unique sentence arrives late.";
    let cleaned = filter.postprocess(text).unwrap();
    assert!(cleaned.chars().count() <= 60);
    assert!(cleaned.ends_with('.'));
    assert!(cleaned.starts_with("First unique sentence"));
}

#[test]
fn test_isDegenerateSentence_shouldFlagHeavyRepeats() {
    let filter = RepetitionFilter::default();
    assert!(filter.is_degenerate_sentence("value value value value value value"));
    assert!(!filter.is_degenerate_sentence("a perfectly ordinary translated sentence here"));
    // Too short to judge
    assert!(!filter.is_degenerate_sentence("ok ok ok"));
}
