use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::core::prompts::{persona_prompt, PERSONA_SYSTEM_PROMPT};
use crate::core::scoring::strip_code_fence;
use crate::models::{BuyerProfile, Persona};
use crate::services::ReasoningProvider;

/// Personas used when the reasoning service is unavailable
pub const CANNED_PERSONAS: &[(&str, &str, &str)] = &[
    ("🏡", "The Nest Builder", "You want a place that feels like home from the first night."),
    ("🌳", "The Green Seeker", "Fresh air, a bit of garden and a park around the corner."),
    ("🏙️", "The City Sprinter", "Short commutes and good coffee within walking distance."),
    ("🧭", "The Explorer", "You are open to new neighbourhoods if the home is right."),
    ("🛠️", "The Visionary", "You see potential where others see a project."),
];

#[derive(Debug, Deserialize)]
struct RawPersona {
    emoji: String,
    title: String,
    description: String,
}

/// Pick one of the canned personas uniformly at random
pub fn canned_persona() -> Persona {
    let (emoji, title, description) = CANNED_PERSONAS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CANNED_PERSONAS[0]);

    Persona {
        emoji: emoji.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn parse_persona(text: &str) -> Option<Persona> {
    let raw: RawPersona = serde_json::from_str(strip_code_fence(text)).ok()?;
    let persona = Persona {
        emoji: raw.emoji.trim().to_string(),
        title: raw.title.trim().to_string(),
        description: raw.description.trim().to_string(),
    };

    if persona.emoji.is_empty() || persona.title.is_empty() || persona.description.is_empty() {
        return None;
    }
    Some(persona)
}

/// Produces the cosmetic buyer persona shown with the matches
#[derive(Debug, Clone)]
pub struct PersonaGenerator {
    reasoning: ReasoningProvider,
}

impl PersonaGenerator {
    pub fn new(reasoning: ReasoningProvider) -> Self {
        Self { reasoning }
    }

    /// Always returns a persona; any failure yields a canned one
    pub async fn generate(&self, profile: &BuyerProfile) -> Persona {
        if !self.reasoning.is_enabled() {
            return canned_persona();
        }

        match self.reasoning.complete(PERSONA_SYSTEM_PROMPT, &persona_prompt(profile)).await {
            Ok(text) => parse_persona(&text).unwrap_or_else(|| {
                tracing::warn!("Unparseable persona reply, using canned persona");
                canned_persona()
            }),
            Err(e) => {
                tracing::warn!("Persona generation failed, using canned persona: {}", e);
                canned_persona()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAnswers;

    fn is_canned(persona: &Persona) -> bool {
        CANNED_PERSONAS
            .iter()
            .any(|(e, t, d)| persona.emoji == *e && persona.title == *t && persona.description == *d)
    }

    #[test]
    fn test_parse_persona_fenced() {
        let persona = parse_persona("```json\n{\"emoji\":\"🐶\",\"title\":\"Dog Parent\",\"description\":\"Needs a yard.\"}\n```")
            .expect("persona");

        assert_eq!(persona.title, "Dog Parent");
    }

    #[test]
    fn test_parse_persona_rejects_blank_fields() {
        assert!(parse_persona(r#"{"emoji":"","title":"x","description":"y"}"#).is_none());
        assert!(parse_persona("not json").is_none());
    }

    #[tokio::test]
    async fn test_disabled_generator_uses_canned() {
        let generator = PersonaGenerator::new(ReasoningProvider::disabled());
        let persona = generator.generate(&crate::core::profile::build_profile(&RawAnswers::new())).await;

        assert!(is_canned(&persona));
    }
}
