use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling and script-based
/// language detection.
///
/// Detection is a character-class heuristic, not a statistical model: it
/// looks at which scripts dominate a sample of the text. That is enough to
/// route CJK/Korean documents correctly and to skip translating documents
/// already in the target language.
/// Detect the language of a text sample.
///
/// Returns the ISO 639-1 code and a confidence in [0, 1]. Only Korean,
/// Japanese and Chinese are detected by script; everything else falls back to
/// English with low confidence.
pub fn detect_language(text: &str) -> (String, f32) {
    let sample: Vec<char> = text.chars().take(1000).collect();
    let total = sample.len().max(1);

    let hangul = sample
        .iter()
        .filter(|&&c| ('\u{AC00}'..='\u{D7AF}').contains(&c))
        .count();
    let hiragana = sample
        .iter()
        .filter(|&&c| ('\u{3040}'..='\u{309F}').contains(&c))
        .count();
    let katakana = sample
        .iter()
        .filter(|&&c| ('\u{30A0}'..='\u{30FF}').contains(&c))
        .count();
    let han = sample
        .iter()
        .filter(|&&c| ('\u{4E00}'..='\u{9FAF}').contains(&c))
        .count();

    if hangul as f32 > total as f32 * 0.1 {
        return ("ko".to_string(), (hangul as f32 / total as f32).min(1.0));
    }
    // Kana is unambiguous for Japanese even in Han-heavy text
    if hiragana > 5 || katakana > 5 {
        let score = (hiragana + katakana + han) as f32 / total as f32;
        return ("ja".to_string(), score.min(1.0));
    }
    if han as f32 > total as f32 * 0.1 {
        return ("zh".to_string(), (han as f32 / total as f32).min(1.0));
    }

    ("en".to_string(), 0.5)
}

/// Look up an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) code.
fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    }
}

/// Whether two language codes refer to the same language, tolerating mixed
/// 2-letter/3-letter forms. "auto" never matches anything.
pub fn language_codes_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == "auto" || b == "auto" {
        return false;
    }
    if a == b {
        return true;
    }
    match (lookup(&a), lookup(&b)) {
        (Some(lang_a), Some(lang_b)) => lang_a == lang_b,
        _ => false,
    }
}

/// Normalize a language code to its ISO 639-1 form when one exists,
/// otherwise to ISO 639-3.
pub fn normalize_code(code: &str) -> Result<String> {
    let language = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(language
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| language.to_639_3().to_string()))
}

/// English name of a language for use in prompts, falling back to the code
/// itself for anything unknown.
pub fn language_name(code: &str) -> String {
    match lookup(code) {
        Some(language) => language.to_name().to_string(),
        None => code.to_string(),
    }
}
