/*!
 * Supported language codes.
 *
 * The engine operates over a fixed, enumerated set of language codes rather
 * than free-form strings. Backend-specific detection tags (including regional
 * Chinese variants) are normalized onto this canonical set.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical language code set supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[serde(rename = "en")]
    En,
    /// Spanish
    #[serde(rename = "es")]
    Es,
    /// French
    #[serde(rename = "fr")]
    Fr,
    /// German
    #[serde(rename = "de")]
    De,
    /// Italian
    #[serde(rename = "it")]
    It,
    /// Portuguese
    #[serde(rename = "pt")]
    Pt,
    /// Russian
    #[serde(rename = "ru")]
    Ru,
    /// Japanese
    #[serde(rename = "ja")]
    Ja,
    /// Korean
    #[serde(rename = "ko")]
    Ko,
    /// Arabic
    #[serde(rename = "ar")]
    Ar,
    /// Thai
    #[serde(rename = "th")]
    Th,
    /// Vietnamese
    #[serde(rename = "vi")]
    Vi,
    /// Indonesian
    #[serde(rename = "id")]
    Id,
    /// Simplified Chinese
    #[serde(rename = "zh-CN")]
    ZhCn,
    /// Traditional Chinese (Taiwan)
    #[serde(rename = "zh-TW")]
    ZhTw,
    /// Traditional Chinese (Hong Kong)
    #[serde(rename = "zh-HK")]
    ZhHk,
}

/// All supported languages in canonical order
pub const ALL_LANGUAGES: [Language; 16] = [
    Language::En,
    Language::Es,
    Language::Fr,
    Language::De,
    Language::It,
    Language::Pt,
    Language::Ru,
    Language::Ja,
    Language::Ko,
    Language::Ar,
    Language::Th,
    Language::Vi,
    Language::Id,
    Language::ZhCn,
    Language::ZhTw,
    Language::ZhHk,
];

impl Language {
    /// Canonical code string for this language
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Ru => "ru",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Ar => "ar",
            Language::Th => "th",
            Language::Vi => "vi",
            Language::Id => "id",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
            Language::ZhHk => "zh-HK",
        }
    }

    /// English name of the language, used in logs and provider prompts
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::Ru => "Russian",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Ar => "Arabic",
            Language::Th => "Thai",
            Language::Vi => "Vietnamese",
            Language::Id => "Indonesian",
            Language::ZhCn => "Chinese (Simplified)",
            Language::ZhTw => "Chinese (Traditional)",
            Language::ZhHk => "Chinese (Hong Kong)",
        }
    }

    /// Whether translations into this language are written in Chinese script
    pub fn is_chinese_script(&self) -> bool {
        matches!(self, Language::ZhCn | Language::ZhTw | Language::ZhHk)
    }

    /// Normalize a backend detection tag onto the canonical code set.
    ///
    /// Backends report language tags in their own dialects ("EN", "zh-Hant",
    /// "yue"); regional Chinese variants collapse onto the three canonical
    /// Chinese codes.
    pub fn from_detection_tag(tag: &str) -> Result<Self> {
        let normalized = tag.trim().to_lowercase();

        let language = match normalized.as_str() {
            "en" | "en-us" | "en-gb" => Language::En,
            "es" => Language::Es,
            "fr" => Language::Fr,
            "de" => Language::De,
            "it" => Language::It,
            "pt" | "pt-br" | "pt-pt" => Language::Pt,
            "ru" => Language::Ru,
            "ja" => Language::Ja,
            "ko" => Language::Ko,
            "ar" => Language::Ar,
            "th" => Language::Th,
            "vi" => Language::Vi,
            "id" => Language::Id,
            "zh" | "zh-cn" | "zh-hans" | "zh-sg" => Language::ZhCn,
            "zh-tw" | "zh-hant" => Language::ZhTw,
            "zh-hk" | "zh-mo" | "yue" => Language::ZhHk,
            _ => return Err(anyhow!("Unrecognized language tag: {}", tag)),
        };

        Ok(language)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        ALL_LANGUAGES
            .iter()
            .find(|lang| lang.code().to_lowercase() == normalized)
            .copied()
            .ok_or_else(|| anyhow!("Unsupported language code: {}", s))
    }
}

/// Check whether a string contains at least one CJK code point.
///
/// Covers the unified ideograph blocks plus the extension A block, which is
/// sufficient for detecting the presence of Chinese text in a translation.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
            | '\u{3400}'..='\u{4DBF}'   // Extension A
            | '\u{F900}'..='\u{FAFF}'   // Compatibility Ideographs
            | '\u{3000}'..='\u{303F}'   // CJK punctuation
        )
    })
}
