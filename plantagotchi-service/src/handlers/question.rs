//! `GET|POST /esplanta`: is a free-text question about plants?

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::HeaderMap,
    Json,
};

use crate::error::PlantError;
use crate::models::{PlantClassification, PlantQuestion};
use crate::services::input::{resolve_question, RawInput, QUESTION_FIELD};
use crate::services::parser::classify_answer;
use crate::services::prompts::question_request;
use crate::services::providers::{ChatProvider, Completion};
use crate::startup::AppState;

pub async fn is_plant(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<PlantClassification>, PlantError> {
    let input = RawInput::new(&headers, &body, query.as_deref());
    let classification = classify_question(state.chat_provider.as_ref(), &input).await?;
    Ok(Json(classification))
}

#[tracing::instrument(skip_all)]
pub async fn classify_question(
    provider: &dyn ChatProvider,
    input: &RawInput<'_>,
) -> Result<PlantClassification, PlantError> {
    let question = resolve_question(input).await.map_err(|e| {
        tracing::warn!("Rejected question request without '{}'", QUESTION_FIELD);
        e
    })?;
    let question =
        PlantQuestion::new(&question).map_err(|_| PlantError::missing(QUESTION_FIELD))?;

    let completion = provider
        .complete(&question_request(&question))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "OpenAI request failed");
            PlantError::from(e)
        })?;

    // A function call is not expected here; its arguments are read as text.
    let text = match completion {
        Completion::Text(text) => text,
        Completion::Structured { arguments, .. } => arguments,
    };

    let classification = classify_answer(&text);
    if classification.raw.is_some() {
        tracing::info!(answer = %text, "Ambiguous answer, defaulting to not plant-related");
    }
    Ok(classification)
}
