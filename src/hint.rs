//! Hidden instruction blocks carried on outgoing user messages.
//!
//! A hint block steers the tone and length of the assistant's reply. It is
//! prepended to the user's text before sending and stripped again whenever
//! that text is shown back as history:
//!
//! ```text
//! [[PORTFOLIO_HINT]]
//! <template for the (intent, language) pair>
//! [[/PORTFOLIO_HINT]]
//! <trimmed user text>
//! ```
//!
//! Scanning is plain substring search. Anything that does not carry a
//! complete block decodes to itself.

use crate::types::{Intent, Language};

/// Marker that opens a hint block.
pub const HINT_START: &str = "[[PORTFOLIO_HINT]]";

/// Marker that closes a hint block.
pub const HINT_END: &str = "[[/PORTFOLIO_HINT]]";

/// Returns the instruction template for an intent in a language.
pub fn template(intent: Intent, language: Language) -> &'static str {
    match (intent, language) {
        (Intent::Casual, Language::English) => {
            "Casual message. Reply in English, warmly and briefly (one or two sentences). \
             Do not list projects unless asked."
        }
        (Intent::Casual, Language::Spanish) => {
            "Mensaje casual. Responde en español, con calidez y brevedad (una o dos frases). \
             No enumeres proyectos salvo que te lo pidan."
        }
        (Intent::Work, Language::English) => {
            "Work question. Reply in English with concrete details about projects, \
             technologies and experience. Keep it under 120 words."
        }
        (Intent::Work, Language::Spanish) => {
            "Pregunta profesional. Responde en español con detalles concretos sobre \
             proyectos, tecnologías y experiencia. Máximo 120 palabras."
        }
    }
}

/// Builds the complete hint block for an intent in a language.
pub fn block(intent: Intent, language: Language) -> String {
    format!("{HINT_START}\n{}\n{HINT_END}", template(intent, language))
}

/// Wraps `raw` with the hint block for `(intent, language)`.
///
/// The user text is trimmed. Empty text still encodes (block plus an empty
/// body); callers are expected not to send it.
pub fn encode(raw: &str, intent: Intent, language: Language) -> String {
    format!("{}\n{}", block(intent, language), raw.trim())
}

/// Strips a leading hint block from stored text.
///
/// Text that does not start with [`HINT_START`], or that lacks a matching
/// [`HINT_END`], is returned unchanged. After the end marker at most one line
/// break is removed.
pub fn decode(stored: &str) -> &str {
    match split_block(stored) {
        Some((_, body)) => strip_one_line_break(body),
        None => stored,
    }
}

/// Like [`decode`], but a missing entry decodes to the empty string.
pub fn decode_opt(stored: Option<&str>) -> &str {
    stored.map(decode).unwrap_or("")
}

/// Returns true if `stored` begins with a complete hint block.
pub fn is_encoded(stored: &str) -> bool {
    split_block(stored).is_some()
}

/// Returns the instruction text inside a leading hint block, if present.
pub fn instruction(stored: &str) -> Option<&str> {
    split_block(stored).map(|(inner, _)| inner.trim())
}

fn split_block(stored: &str) -> Option<(&str, &str)> {
    let rest = stored.strip_prefix(HINT_START)?;
    let end = rest.find(HINT_END)?;
    Some((&rest[..end], &rest[end + HINT_END.len()..]))
}

fn strip_one_line_break(body: &str) -> &str {
    body.strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTENTS: [Intent; 2] = [Intent::Casual, Intent::Work];

    #[test]
    fn decode_inverts_encode_modulo_trim() {
        let samples = [
            "What projects have you built?",
            "  hola  ",
            "",
            "line one\nline two",
            "\n\nleading breaks",
            "mentions [[/PORTFOLIO_HINT]] inside",
        ];
        for language in Language::ALL {
            for intent in INTENTS {
                for sample in samples {
                    let wire = encode(sample, intent, language);
                    assert_eq!(decode(&wire), sample.trim(), "{intent} {language} {sample:?}");
                }
            }
        }
    }

    #[test]
    fn encode_leaves_input_alone() {
        let raw = String::from("  Tell me about Rust  ");
        let wire = encode(&raw, Intent::Work, Language::English);
        assert_eq!(raw, "  Tell me about Rust  ");
        assert!(wire.starts_with(HINT_START));
        assert!(wire.ends_with("\nTell me about Rust"));
    }

    #[test]
    fn four_distinct_templates() {
        let mut seen = Vec::new();
        for language in Language::ALL {
            for intent in INTENTS {
                let t = template(intent, language);
                assert!(!t.contains(HINT_START));
                assert!(!t.contains(HINT_END));
                assert!(!seen.contains(&t));
                seen.push(t);
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(decode("Just a message"), "Just a message");
        assert_eq!(decode(""), "");
        assert_eq!(decode(" [[PORTFOLIO_HINT]]x[[/PORTFOLIO_HINT]]y"), " [[PORTFOLIO_HINT]]x[[/PORTFOLIO_HINT]]y");
        assert_eq!(decode("[[/PORTFOLIO_HINT]] end first"), "[[/PORTFOLIO_HINT]] end first");
    }

    #[test]
    fn missing_end_marker_is_untouched() {
        let text = "[[PORTFOLIO_HINT]]\nno closing marker\nhello";
        assert_eq!(decode(text), text);
        assert!(!is_encoded(text));
    }

    #[test]
    fn only_one_line_break_is_stripped() {
        assert_eq!(decode("[[PORTFOLIO_HINT]]x[[/PORTFOLIO_HINT]]\n\nbody"), "\nbody");
        assert_eq!(decode("[[PORTFOLIO_HINT]]x[[/PORTFOLIO_HINT]]\r\nbody"), "body");
        assert_eq!(decode("[[PORTFOLIO_HINT]]x[[/PORTFOLIO_HINT]]body"), "body");
    }

    #[test]
    fn missing_entry_decodes_to_empty() {
        assert_eq!(decode_opt(None), "");
        assert_eq!(decode_opt(Some("hi")), "hi");
    }

    #[test]
    fn instruction_extraction() {
        let wire = encode("hi", Intent::Casual, Language::Spanish);
        assert_eq!(
            instruction(&wire),
            Some(template(Intent::Casual, Language::Spanish))
        );
        assert_eq!(instruction("hi"), None);
    }
}
