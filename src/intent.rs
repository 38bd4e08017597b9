//! Keyword heuristic that labels a user message as casual or work talk.
//!
//! First match wins:
//! 1. any work keyword occurs as a substring → [`Intent::Work`];
//! 2. any greeting occurs and the message is short → [`Intent::Casual`];
//! 3. otherwise → [`Intent::Casual`].
//!
//! This only chooses a hint template. Mixed-language or multi-topic input can
//! be mislabeled and that is acceptable.

use tracing::trace;

use crate::types::{Intent, Language};

/// Greetings only count for messages shorter than this many characters.
pub const SHORT_MESSAGE_CHARS: usize = 120;

const WORK_EN: &[&str] = &[
    "project",
    "portfolio",
    "resume",
    "résumé",
    "cv",
    "experience",
    "skill",
    "technolog",
    "tech stack",
    "framework",
    "language",
    "rust",
    "react",
    "backend",
    "frontend",
    "developer",
    "hire",
    "hiring",
    "freelance",
    "job",
    "service",
    "client",
    "contact",
];

const WORK_ES: &[&str] = &[
    "proyecto",
    "portafolio",
    "portfolio",
    "currículum",
    "curriculum",
    "cv",
    "experiencia",
    "habilidad",
    "tecnolog",
    "framework",
    "lenguaje",
    "rust",
    "react",
    "backend",
    "frontend",
    "desarrollador",
    "contratar",
    "trabajo",
    "empleo",
    "servicio",
    "cliente",
    "contacto",
];

const GREETING_EN: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "how are you",
    "how's it going",
    "good morning",
    "good afternoon",
    "good evening",
    "what's up",
    "thanks",
];

const GREETING_ES: &[&str] = &[
    "hola",
    "buenas",
    "buenos días",
    "buenos dias",
    "qué tal",
    "que tal",
    "cómo estás",
    "como estas",
    "saludos",
    "gracias",
];

/// Returns the work keywords for a language.
pub fn work_keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => WORK_EN,
        Language::Spanish => WORK_ES,
    }
}

/// Returns the greeting phrases for a language.
pub fn greeting_keywords(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => GREETING_EN,
        Language::Spanish => GREETING_ES,
    }
}

/// Classifies `text` for the given display language. Never fails.
pub fn classify(text: &str, language: Language) -> Intent {
    let lowered = text.to_lowercase();
    if let Some(keyword) = find_keyword(&lowered, work_keywords(language)) {
        trace!(%language, keyword, "work keyword matched");
        return Intent::Work;
    }
    if lowered.chars().count() < SHORT_MESSAGE_CHARS {
        if let Some(keyword) = find_keyword(&lowered, greeting_keywords(language)) {
            trace!(%language, keyword, "short greeting matched");
            return Intent::Casual;
        }
    }
    Intent::Casual
}

/// Like [`classify`], but a missing message classifies as casual.
pub fn classify_opt(text: Option<&str>, language: Language) -> Intent {
    text.map(|t| classify(t, language)).unwrap_or_default()
}

fn find_keyword(lowered: &str, keywords: &'static [&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|k| lowered.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_work_keyword_classifies_as_work_in_any_case() {
        for language in Language::ALL {
            for keyword in work_keywords(language) {
                let text = format!("Tell me about the {} please", keyword.to_uppercase());
                assert_eq!(classify(&text, language), Intent::Work, "{keyword}");
            }
        }
    }

    #[test]
    fn projects_question_is_work() {
        assert_eq!(
            classify("What projects have you built?", Language::English),
            Intent::Work
        );
        assert_eq!(
            classify("¿Qué PROYECTOS has hecho?", Language::Spanish),
            Intent::Work
        );
    }

    #[test]
    fn short_greetings_are_casual() {
        assert_eq!(classify("Hello!", Language::English), Intent::Casual);
        assert_eq!(classify("hey, how are you?", Language::English), Intent::Casual);
        assert_eq!(classify("hola", Language::Spanish), Intent::Casual);
        assert_eq!(classify("¿Qué tal?", Language::Spanish), Intent::Casual);
    }

    #[test]
    fn work_wins_over_greeting() {
        assert_eq!(
            classify("Hi! Can I see your resume?", Language::English),
            Intent::Work
        );
    }

    #[test]
    fn unmatched_and_empty_default_to_casual() {
        assert_eq!(classify("", Language::English), Intent::Casual);
        assert_eq!(classify("the weather is nice", Language::English), Intent::Casual);
        assert_eq!(classify_opt(None, Language::Spanish), Intent::Casual);
        let long = "x".repeat(SHORT_MESSAGE_CHARS * 2);
        assert_eq!(classify(&long, Language::English), Intent::Casual);
    }

    #[test]
    fn keywords_are_per_language() {
        assert_eq!(classify("adiós", Language::Spanish), Intent::Casual);
        assert_eq!(classify("busco empleo", Language::English), Intent::Casual);
        assert_eq!(classify("busco empleo", Language::Spanish), Intent::Work);
    }
}
