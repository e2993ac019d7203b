//! Interpretation of model replies.
//!
//! The structured path reads `get_species_info` arguments; the text fallback
//! is a separate heuristic used only when the model ignored the function.

use crate::error::PlantError;
use crate::models::{PlantClassification, PlantType, SpeciesInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Stand-in for an absent humidity value; normalizes to `DEFAULT_HUMIDITY`.
pub const MISSING_HUMIDITY: i64 = -1;
pub const DEFAULT_HUMIDITY: u8 = 50;

static PERCENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})%?").expect("static regex is valid"));

/// Humidity values pulled out of free text, in order of appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallbackReading {
    pub soil_humidity: Option<i64>,
    pub ambient_humidity: Option<i64>,
}

impl FallbackReading {
    pub fn into_info(self) -> SpeciesInfo {
        SpeciesInfo {
            soil_humidity: normalize_humidity(self.soil_humidity.unwrap_or(MISSING_HUMIDITY)),
            ambient_humidity: normalize_humidity(
                self.ambient_humidity.unwrap_or(MISSING_HUMIDITY),
            ),
            plant_type: PlantType::Interior,
        }
    }
}

/// Sentinel becomes the default, everything else is clamped into [0, 100].
pub fn normalize_humidity(value: i64) -> u8 {
    if value == MISSING_HUMIDITY {
        return DEFAULT_HUMIDITY;
    }
    value.clamp(0, 100) as u8
}

/// Parse the serialized arguments of a `get_species_info` call.
pub fn parse_species_arguments(raw: &str) -> Result<SpeciesInfo, PlantError> {
    let parse_error = |detail: String| PlantError::Parse {
        detail,
        raw: raw.to_string(),
    };

    let value: Value = serde_json::from_str(raw).map_err(|e| parse_error(e.to_string()))?;
    let args = value
        .as_object()
        .ok_or_else(|| parse_error("arguments are not a JSON object".to_string()))?;

    let soil = humidity_field(args, "humedad_tierra").map_err(parse_error)?;
    let ambient = humidity_field(args, "humedad_ambiente").map_err(parse_error)?;
    let plant_type = args
        .get("tipo")
        .and_then(Value::as_str)
        .map(PlantType::from_model)
        .unwrap_or_default();

    Ok(SpeciesInfo {
        soil_humidity: normalize_humidity(soil),
        ambient_humidity: normalize_humidity(ambient),
        plant_type,
    })
}

/// Integers, floats (truncated) and numeric strings are accepted.
fn humidity_field(args: &Map<String, Value>, key: &str) -> Result<i64, String> {
    match args.get(key) {
        None => Ok(MISSING_HUMIDITY),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| format!("'{}' is not a representable integer: {}", key, n)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("'{}' is not an integer ({:?}): {}", key, s, e)),
        Some(other) => Err(format!("'{}' is not an integer: {}", key, other)),
    }
}

/// First two one-to-three digit numbers in the text, each optionally
/// followed by `%`.
pub fn extract_fallback(text: &str) -> FallbackReading {
    let mut numbers = PERCENT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse::<i64>().ok());

    FallbackReading {
        soil_humidity: numbers.next(),
        ambient_humidity: numbers.next(),
    }
}

/// Read a yes/no answer. Affirmatives win over "no"; anything else is a
/// negative carrying the normalized text.
pub fn classify_answer(text: &str) -> PlantClassification {
    let normalized = text.trim().to_lowercase();

    if ["sí", "si", "yes"]
        .iter()
        .any(|token| normalized.contains(token))
    {
        return PlantClassification {
            is_plant_related: true,
            raw: None,
        };
    }

    if normalized.contains("no") {
        return PlantClassification {
            is_plant_related: false,
            raw: None,
        };
    }

    PlantClassification {
        is_plant_related: false,
        raw: Some(normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_humidity() {
        assert_eq!(normalize_humidity(MISSING_HUMIDITY), 50);
        assert_eq!(normalize_humidity(-5), 0);
        assert_eq!(normalize_humidity(i64::MIN), 0);
        assert_eq!(normalize_humidity(150), 100);
        assert_eq!(normalize_humidity(i64::MAX), 100);
        assert_eq!(normalize_humidity(0), 0);
        assert_eq!(normalize_humidity(100), 100);
        assert_eq!(normalize_humidity(42), 42);
    }

    #[test]
    fn test_parse_structured_payload() {
        let info = parse_species_arguments(
            r#"{"humedad_tierra":30,"humedad_ambiente":70,"tipo":"exterior"}"#,
        )
        .unwrap();

        assert_eq!(
            info,
            SpeciesInfo {
                soil_humidity: 30,
                ambient_humidity: 70,
                plant_type: PlantType::Exterior,
            }
        );
    }

    #[test]
    fn test_parse_clamps_and_defaults() {
        let info = parse_species_arguments(r#"{"humedad_tierra":180,"tipo":"outdoor"}"#).unwrap();

        assert_eq!(info.soil_humidity, 100);
        assert_eq!(info.ambient_humidity, 50);
        assert_eq!(info.plant_type, PlantType::Interior);
    }

    #[test]
    fn test_parse_accepts_loose_numbers() {
        let info = parse_species_arguments(
            r#"{"humedad_tierra":"45","humedad_ambiente":62.8,"tipo":"interior"}"#,
        )
        .unwrap();

        assert_eq!(info.soil_humidity, 45);
        assert_eq!(info.ambient_humidity, 62);
    }

    #[test]
    fn test_parse_non_string_tipo_is_interior() {
        let info = parse_species_arguments(
            r#"{"humedad_tierra":10,"humedad_ambiente":20,"tipo":7}"#,
        )
        .unwrap();
        assert_eq!(info.plant_type, PlantType::Interior);
    }

    #[test]
    fn test_parse_malformed_json_keeps_raw() {
        let raw = r#"{"humedad_tierra":30,"#;
        match parse_species_arguments(raw) {
            Err(PlantError::Parse { raw: got, detail }) => {
                assert_eq!(got, raw);
                assert!(!detail.is_empty());
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_object_and_bad_numbers() {
        assert!(matches!(
            parse_species_arguments("[1, 2]"),
            Err(PlantError::Parse { .. })
        ));
        assert!(matches!(
            parse_species_arguments(r#"{"humedad_tierra":"wet"}"#),
            Err(PlantError::Parse { .. })
        ));
        assert!(matches!(
            parse_species_arguments(r#"{"humedad_ambiente":null}"#),
            Err(PlantError::Parse { .. })
        ));
    }

    #[test]
    fn test_extract_fallback_two_values() {
        let reading = extract_fallback("Needs about 40% soil and 60% ambient");
        assert_eq!(
            reading,
            FallbackReading {
                soil_humidity: Some(40),
                ambient_humidity: Some(60),
            }
        );
        assert_eq!(
            reading.into_info(),
            SpeciesInfo {
                soil_humidity: 40,
                ambient_humidity: 60,
                plant_type: PlantType::Interior,
            }
        );
    }

    #[test]
    fn test_extract_fallback_missing_values_default() {
        assert_eq!(extract_fallback("Keep it moist").into_info().soil_humidity, 50);

        let info = extract_fallback("Around 35 percent").into_info();
        assert_eq!(info.soil_humidity, 35);
        assert_eq!(info.ambient_humidity, 50);
    }

    #[test]
    fn test_extract_fallback_splits_long_runs() {
        let reading = extract_fallback("1234");
        assert_eq!(reading.soil_humidity, Some(123));
        assert_eq!(reading.ambient_humidity, Some(4));
    }

    #[test]
    fn test_extract_fallback_clamps() {
        let info = extract_fallback("soil 250%, air 999").into_info();
        assert_eq!(info.soil_humidity, 100);
        assert_eq!(info.ambient_humidity, 100);
    }

    #[test]
    fn test_classify_answer() {
        assert!(classify_answer("sí").is_plant_related);
        assert!(classify_answer("  Sí.  ").is_plant_related);
        assert!(classify_answer("Yes").is_plant_related);
        assert_eq!(
            classify_answer("no"),
            PlantClassification {
                is_plant_related: false,
                raw: None,
            }
        );
        assert_eq!(
            classify_answer("maybe"),
            PlantClassification {
                is_plant_related: false,
                raw: Some("maybe".to_string()),
            }
        );
    }

    #[test]
    fn test_classify_affirmative_takes_precedence() {
        assert!(classify_answer("sí, no hay duda").is_plant_related);
    }

    #[test]
    fn test_classify_ambiguous_keeps_normalized_text() {
        assert_eq!(classify_answer("  QUIZÁ ").raw.as_deref(), Some("quizá"));
        assert_eq!(classify_answer("").raw.as_deref(), Some(""));
    }
}
