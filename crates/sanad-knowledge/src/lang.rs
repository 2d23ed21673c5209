//! Arabic / English language detection.

use sanad_core::types::LanguageTag;

/// Arabic, Arabic Supplement, Arabic Extended-A, Presentation Forms A and B.
const ARABIC_RANGES: &[(char, char)] = &[
    ('\u{0600}', '\u{06FF}'),
    ('\u{0750}', '\u{077F}'),
    ('\u{08A0}', '\u{08FF}'),
    ('\u{FB50}', '\u{FDFF}'),
    ('\u{FE70}', '\u{FEFF}'),
];

fn is_arabic_char(c: char) -> bool {
    ARABIC_RANGES.iter().any(|&(lo, hi)| c >= lo && c <= hi)
}

/// Whether `text` contains at least one Arabic-script character.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Classify `text` as Arabic or English.
///
/// Any Arabic-script character is authoritative. Otherwise a statistical
/// pass runs and only a positive Arabic identification wins; everything
/// else, including an inconclusive pass, is English.
pub fn detect(text: &str) -> LanguageTag {
    if text.trim().is_empty() {
        return LanguageTag::En;
    }
    if contains_arabic(text) {
        return LanguageTag::Ar;
    }
    match whatlang::detect(text) {
        Some(info) if info.lang() == whatlang::Lang::Ara => LanguageTag::Ar,
        _ => LanguageTag::En,
    }
}
