/*!
 * Tests for language detection and code utilities
 */

use doctrans::language_utils::{
    detect_language, language_codes_match, language_name, normalize_code,
};

#[test]
fn test_detectLanguage_withKoreanText_shouldReturnKo() {
    let (code, confidence) = detect_language("안녕하세요. 오늘 날씨가 정말 좋습니다.");
    assert_eq!(code, "ko");
    assert!(confidence > 0.1);
}

#[test]
fn test_detectLanguage_withJapaneseText_shouldReturnJa() {
    let (code, _) = detect_language("これはとても良い天気ですね。ありがとうございます。");
    assert_eq!(code, "ja");
}

#[test]
fn test_detectLanguage_withChineseText_shouldReturnZh() {
    let (code, _) = detect_language("今天天气很好我们一起去公园散步吧");
    assert_eq!(code, "zh");
}

#[test]
fn test_detectLanguage_withEnglishText_shouldFallBackToEn() {
    let (code, confidence) = detect_language("The weather is lovely today, isn't it?");
    assert_eq!(code, "en");
    assert_eq!(confidence, 0.5);
}

#[test]
fn test_languageCodesMatch_withEquivalentForms_shouldMatch() {
    assert!(language_codes_match("ko", "ko"));
    assert!(language_codes_match("ko", "kor"));
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("EN", "en"));
}

#[test]
fn test_languageCodesMatch_withDifferentLanguages_shouldNotMatch() {
    assert!(!language_codes_match("ko", "ja"));
    assert!(!language_codes_match("en", "fr"));
    // "auto" is a placeholder, never a match
    assert!(!language_codes_match("auto", "auto"));
    assert!(!language_codes_match("auto", "en"));
}

#[test]
fn test_normalizeCode_shouldPreferTwoLetterForm() {
    assert_eq!(normalize_code("kor").unwrap(), "ko");
    assert_eq!(normalize_code("en").unwrap(), "en");
    assert!(normalize_code("not-a-code").is_err());
}

#[test]
fn test_languageName_shouldResolveKnownCodes() {
    assert_eq!(language_name("ko"), "Korean");
    assert_eq!(language_name("en"), "English");
    // Unknown codes fall back to the code itself
    assert_eq!(language_name("xx"), "xx");
}
