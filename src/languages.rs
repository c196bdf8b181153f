use std::fmt;

use lazy_regex::regex_captures;
use strum::EnumIter;

/// The languages the platform translates games into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Language {
    English,
    Japanese,
    Chinese,
    German,
    French,
    Spanish,
}

/// How urgently a market's translation is wanted when a game goes through the
/// translation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslationPriority {
    High,
    Normal,
}

impl Language {
    /// ISO 639-1 code, also the persisted form.
    pub fn code(&self) -> &'static str {
        use Language::*;

        match self {
            English => "en",
            Japanese => "ja",
            Chinese => "zh",
            German => "de",
            French => "fr",
            Spanish => "es",
        }
    }

    pub fn display_name(&self) -> &'static str {
        use Language::*;

        match self {
            English => "English",
            Japanese => "Japanese",
            Chinese => "Chinese",
            German => "German",
            French => "French",
            Spanish => "Spanish",
        }
    }

    pub fn priority(&self) -> TranslationPriority {
        use Language::*;

        match self {
            English | Japanese => TranslationPriority::High,
            Chinese | German | French | Spanish => TranslationPriority::Normal,
        }
    }

    /// Parses a language code, accepting region-qualified tags such as
    /// `en-US` or `ja_JP` and normalizing them down to the base language.
    pub fn from_code(code: &str) -> Option<Language> {
        use Language::*;

        let (_whole, base) =
            regex_captures!(r"^([A-Za-z]{2})(?:[-_][A-Za-z0-9]{2,4})?$", code.trim())?;

        match base.to_ascii_lowercase().as_str() {
            "en" => Some(English),
            "ja" => Some(Japanese),
            "zh" => Some(Chinese),
            "de" => Some(German),
            "fr" => Some(French),
            "es" => Some(Spanish),

            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use crate::languages::{Language, TranslationPriority};

    #[test]
    fn codes_round_trip() {
        for language in Language::iter() {
            assert_eq!(Language::from_code(language.code()), Some(language));
        }
    }

    #[test]
    fn region_qualified_tags_normalize() {
        assert_eq!(Language::from_code("en-US"), Some(Language::English));
        assert_eq!(Language::from_code("ja_JP"), Some(Language::Japanese));
        assert_eq!(Language::from_code("zh-Hans"), Some(Language::Chinese));
    }

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(Language::from_code("DE"), Some(Language::German));
        assert_eq!(Language::from_code("Fr"), Some(Language::French));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Language::from_code(" es "), Some(Language::Spanish));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(Language::from_code("ko"), None);
        assert_eq!(Language::from_code("klingon"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn malformed_tags_are_rejected() {
        assert_eq!(Language::from_code("en-"), None);
        assert_eq!(Language::from_code("-US"), None);
        assert_eq!(Language::from_code("e n"), None);
    }

    #[test]
    fn display_names_differ_from_codes() {
        for language in Language::iter() {
            assert_ne!(language.display_name(), language.code());
        }
        assert_eq!(Language::Japanese.display_name(), "Japanese");
    }

    #[test]
    fn launch_markets_are_high_priority() {
        assert_eq!(Language::English.priority(), TranslationPriority::High);
        assert_eq!(Language::Japanese.priority(), TranslationPriority::High);
        assert_eq!(Language::German.priority(), TranslationPriority::Normal);
    }
}
