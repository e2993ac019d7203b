//! Fixed prompt templates for both endpoints.

use crate::models::{PlantQuestion, SpeciesQuery};
use crate::services::providers::{ChatRequest, FunctionSpec};
use serde_json::json;

pub const SPECIES_FUNCTION_NAME: &str = "get_species_info";

const SPECIES_TEMPERATURE: f32 = 0.2;
const SPECIES_MAX_TOKENS: u32 = 200;
const QUESTION_TEMPERATURE: f32 = 0.0;
const QUESTION_MAX_TOKENS: u32 = 2;

const SPECIES_SYSTEM_PROMPT: &str = "You are a botanical assistant that gives concise ideal \
humidity numbers for plant species. Return only plausible numeric values between 0 and 100.";

const QUESTION_SYSTEM_PROMPT: &str = "Eres un asistente experto en plantas. Si la pregunta que \
te hacen está relacionada con plantas, jardinería, botánica, cuidados de plantas, especies \
vegetales, enfermedades de plantas, etc., responde solo con 'sí'. Si no tiene nada que ver con \
plantas, responde solo con 'no'. No añadas nada más.";

/// Schema of the `get_species_info` function the model must call.
pub fn species_function() -> FunctionSpec {
    FunctionSpec {
        name: SPECIES_FUNCTION_NAME,
        description: "Return ideal soil and ambient humidity and whether the species is indoor or outdoor",
        parameters: json!({
            "type": "object",
            "properties": {
                "humedad_tierra": {
                    "type": "integer",
                    "description": "Ideal soil humidity percentage 0-100"
                },
                "humedad_ambiente": {
                    "type": "integer",
                    "description": "Ideal ambient humidity percentage 0-100"
                },
                "tipo": {
                    "type": "string",
                    "enum": ["interior", "exterior"],
                    "description": "indoor or outdoor plant"
                }
            },
            "required": ["humedad_tierra", "humedad_ambiente", "tipo"]
        }),
    }
}

pub fn species_request(query: &SpeciesQuery) -> ChatRequest {
    let user = format!(
        "Give the ideal soil humidity (%) and ambient humidity (%) and whether the plant is \
         generally interior or exterior for the species: {}. Return via the function {} as \
         integers and the tipo as 'interior' or 'exterior'. If uncertain, choose a conservative \
         value and prefer to mark as 'interior' if ambiguous.",
        query.species, SPECIES_FUNCTION_NAME
    );

    ChatRequest {
        system: SPECIES_SYSTEM_PROMPT.to_string(),
        user,
        temperature: SPECIES_TEMPERATURE,
        max_tokens: SPECIES_MAX_TOKENS,
        function: Some(species_function()),
    }
}

pub fn question_request(question: &PlantQuestion) -> ChatRequest {
    ChatRequest {
        system: QUESTION_SYSTEM_PROMPT.to_string(),
        user: question.question.clone(),
        temperature: QUESTION_TEMPERATURE,
        max_tokens: QUESTION_MAX_TOKENS,
        function: None,
    }
}
