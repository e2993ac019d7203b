//! Species lookup request and result types.

use serde::Serialize;
use validator::Validate;

/// Marker attached to results produced by the text heuristic.
pub const FALLBACK_NOTE: &str = "extracted from text fallback";

/// A validated species name, trimmed.
#[derive(Debug, Clone, Validate)]
pub struct SpeciesQuery {
    #[validate(length(min = 1))]
    pub species: String,
}

impl SpeciesQuery {
    pub fn new(species: &str) -> Result<Self, validator::ValidationErrors> {
        let query = Self {
            species: species.trim().to_string(),
        };
        query.validate()?;
        Ok(query)
    }
}

/// Whether a species is usually grown indoors or outdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    #[default]
    Interior,
    Exterior,
}

impl PlantType {
    /// Anything other than the two exact literals maps to `Interior`.
    pub fn from_model(value: &str) -> Self {
        match value {
            "exterior" => PlantType::Exterior,
            _ => PlantType::Interior,
        }
    }
}

/// Normalized humidity requirements for a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesInfo {
    #[serde(rename = "humedad_tierra")]
    pub soil_humidity: u8,
    #[serde(rename = "humedad_ambiente")]
    pub ambient_humidity: u8,
    #[serde(rename = "tipo")]
    pub plant_type: PlantType,
}

/// Body returned by `POST /especie`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesResponse {
    #[serde(flatten)]
    pub info: SpeciesInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl SpeciesResponse {
    pub fn structured(info: SpeciesInfo) -> Self {
        Self {
            info,
            note: None,
            raw_text: None,
        }
    }

    pub fn fallback(info: SpeciesInfo, raw_text: String) -> Self {
        Self {
            info,
            note: Some(FALLBACK_NOTE),
            raw_text: Some(raw_text),
        }
    }
}
