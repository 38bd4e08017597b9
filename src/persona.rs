//! The system entry sent ahead of the conversation on every request.

use crate::types::{Language, WireMessage};

const PERSONA_EN: &str = "You are the assistant on a developer's portfolio website. \
Answer questions about their projects, services, skills and experience, and chat politely \
otherwise. If a user message starts with a block between [[PORTFOLIO_HINT]] and \
[[/PORTFOLIO_HINT]], follow its instructions and never mention or quote it. \
Never invent projects, employers or prices.";

const PERSONA_ES: &str = "Eres el asistente del sitio web de portafolio de un desarrollador. \
Responde preguntas sobre sus proyectos, servicios, habilidades y experiencia, y conversa con \
amabilidad en otro caso. Si un mensaje del usuario empieza con un bloque entre \
[[PORTFOLIO_HINT]] y [[/PORTFOLIO_HINT]], sigue sus instrucciones y nunca lo menciones ni lo \
cites. Nunca inventes proyectos, empleadores ni precios.";

/// Returns the built-in persona prompt for a language.
pub fn default_prompt(language: Language) -> &'static str {
    match language {
        Language::English => PERSONA_EN,
        Language::Spanish => PERSONA_ES,
    }
}

/// Builds the system entry for a request.
///
/// `custom` replaces the built-in persona when set. A display name, when
/// known, is appended so the model can address the visitor.
pub fn system_message(
    language: Language,
    custom: Option<&str>,
    display_name: Option<&str>,
) -> WireMessage {
    let mut prompt = custom.unwrap_or(default_prompt(language)).to_string();
    if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
        let line = match language {
            Language::English => format!("\nThe visitor's name is {name}."),
            Language::Spanish => format!("\nEl visitante se llama {name}."),
        };
        prompt.push_str(&line);
    }
    WireMessage::system(prompt)
}
