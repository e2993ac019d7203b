//! `POST /especie`: ideal humidity and indoor/outdoor type for a species.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::HeaderMap,
    Json,
};

use crate::error::PlantError;
use crate::models::{SpeciesQuery, SpeciesResponse};
use crate::services::input::{resolve_species, RawInput, SPECIES_FIELD};
use crate::services::parser::{extract_fallback, parse_species_arguments};
use crate::services::prompts::{species_request, SPECIES_FUNCTION_NAME};
use crate::services::providers::{ChatProvider, Completion};
use crate::startup::AppState;

pub async fn species(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<SpeciesResponse>, PlantError> {
    let input = RawInput::new(&headers, &body, query.as_deref());
    let response = lookup_species(state.chat_provider.as_ref(), &input).await?;
    Ok(Json(response))
}

/// Resolve the species, ask the model and normalize its answer.
///
/// A function-call reply goes through the strict parser; a plain-text reply
/// goes through the number heuristic and is marked as a fallback.
#[tracing::instrument(skip_all, fields(species = tracing::field::Empty))]
pub async fn lookup_species(
    provider: &dyn ChatProvider,
    input: &RawInput<'_>,
) -> Result<SpeciesResponse, PlantError> {
    let species = resolve_species(input).map_err(|e| {
        tracing::warn!("Rejected species request without '{}'", SPECIES_FIELD);
        e
    })?;
    let query = SpeciesQuery::new(&species).map_err(|_| PlantError::missing(SPECIES_FIELD))?;
    tracing::Span::current().record("species", query.species.as_str());

    let completion = provider
        .complete(&species_request(&query))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "OpenAI request failed");
            PlantError::from(e)
        })?;

    match completion {
        Completion::Structured { name, arguments } => {
            if name != SPECIES_FUNCTION_NAME {
                tracing::warn!(function = %name, "Model called an unexpected function");
            }
            let info = parse_species_arguments(&arguments).map_err(|e| {
                tracing::error!(error = %e, raw = %arguments, "Failed parsing model arguments");
                e
            })?;
            Ok(SpeciesResponse::structured(info))
        }
        Completion::Text(text) => {
            tracing::info!("Model answered without a function call, using text fallback");
            let info = extract_fallback(&text).into_info();
            Ok(SpeciesResponse::fallback(info, text))
        }
    }
}
