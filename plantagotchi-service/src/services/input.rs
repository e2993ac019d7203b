//! Tolerant extraction of the single input field each endpoint needs.
//!
//! Embedded clients post bodies with missing or wrong content types, so the
//! question endpoint tries several sources in a fixed order and keeps the
//! first non-blank value.

use crate::error::PlantError;
use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::{header::CONTENT_TYPE, HeaderMap, Request},
};
use serde_json::Value;
use std::collections::HashMap;

pub const SPECIES_FIELD: &str = "especie";
pub const QUESTION_FIELD: &str = "pregunta";

/// Raw pieces of a request the resolver looks at.
#[derive(Debug, Clone, Copy)]
pub struct RawInput<'a> {
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
    pub query: Option<&'a str>,
}

impl<'a> RawInput<'a> {
    pub fn new(headers: &'a HeaderMap, body: &'a [u8], query: Option<&'a str>) -> Self {
        Self {
            content_type: headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            body,
            query,
        }
    }

    fn media_type(&self) -> Option<String> {
        self.content_type.map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Where a field value may come from, in priority order for the question
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Body parsed as JSON when the request declares a JSON content type.
    JsonBody,
    /// Body bytes decoded as UTF-8 JSON whatever the content type says.
    RawBody,
    /// `application/x-www-form-urlencoded` or `multipart/form-data` body, or
    /// a body with no content type.
    FormField,
    /// URL query string.
    QueryParam,
}

pub const QUESTION_SOURCES: [FieldSource; 4] = [
    FieldSource::JsonBody,
    FieldSource::RawBody,
    FieldSource::FormField,
    FieldSource::QueryParam,
];

impl FieldSource {
    /// Trimmed, non-blank value of `field` from this source, if any.
    pub async fn extract(self, input: &RawInput<'_>, field: &str) -> Option<String> {
        let value = match self {
            FieldSource::JsonBody => {
                let media_type = input.media_type()?;
                if media_type == "application/json" || media_type.ends_with("+json") {
                    json_field(input.body, field)
                } else {
                    None
                }
            }
            FieldSource::RawBody => std::str::from_utf8(input.body)
                .ok()
                .and_then(|text| json_field(text.as_bytes(), field)),
            FieldSource::FormField => match input.media_type().as_deref() {
                None | Some("application/x-www-form-urlencoded") => {
                    urlencoded_field(input.body, field)
                }
                Some("multipart/form-data") => match input.content_type {
                    Some(content_type) => multipart_field(content_type, input.body, field).await,
                    None => None,
                },
                Some(_) => None,
            },
            FieldSource::QueryParam => input
                .query
                .and_then(|query| urlencoded_field(query.as_bytes(), field)),
        }?;

        non_blank(&value)
    }
}

/// `especie` from the body, parsed as JSON regardless of content type.
pub fn resolve_species(input: &RawInput<'_>) -> Result<String, PlantError> {
    json_field(input.body, SPECIES_FIELD)
        .as_deref()
        .and_then(non_blank)
        .ok_or_else(|| PlantError::missing(SPECIES_FIELD))
}

/// `pregunta` from the first source in `QUESTION_SOURCES` that has it.
pub async fn resolve_question(input: &RawInput<'_>) -> Result<String, PlantError> {
    for source in QUESTION_SOURCES {
        if let Some(value) = source.extract(input, QUESTION_FIELD).await {
            tracing::debug!(source = ?source, "Resolved question field");
            return Ok(value);
        }
    }
    Err(PlantError::missing(QUESTION_FIELD))
}

/// String value of `field` in a JSON object body. Malformed JSON, non-object
/// documents and non-string values all yield `None`.
fn json_field(body: &[u8], field: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(mut map) => match map.remove(field)? {
            Value::String(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn urlencoded_field(encoded: &[u8], field: &str) -> Option<String> {
    serde_urlencoded::from_bytes::<HashMap<String, String>>(encoded)
        .ok()?
        .remove(field)
}

/// Text of the first part named `field` in a multipart form body.
async fn multipart_field(content_type: &str, body: &[u8], field: &str) -> Option<String> {
    let request = Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.to_vec()))
        .ok()?;
    let mut multipart = Multipart::from_request(request, &()).await.ok()?;

    while let Ok(Some(part)) = multipart.next_field().await {
        if part.name() == Some(field) {
            return part.text().await.ok();
        }
    }
    None
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
