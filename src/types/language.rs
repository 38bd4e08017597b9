use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language of the chat widget.
///
/// The language selects intent keywords, hint templates, the persona prompt,
/// and the wording of user-facing failure notices.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`).
    #[default]
    #[serde(rename = "en")]
    English,

    /// Spanish (`es`).
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::English, Language::Spanish];

    /// Returns the two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when parsing an unsupported language string.
#[derive(Debug)]
pub struct LanguageParseError {
    /// The value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for LanguageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.invalid_value)
    }
}

impl std::error::Error for LanguageParseError {}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "es" | "spanish" | "español" | "espanol" => Ok(Language::Spanish),
            _ => Err(LanguageParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!(" Español ".parse::<Language>().unwrap(), Language::Spanish);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Language::Spanish).unwrap(), r#""es""#);
        let lang: Language = serde_json::from_str(r#""en""#).unwrap();
        assert_eq!(lang, Language::English);
    }

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::default().to_string(), "en");
    }
}
