use serde::Serialize;
use validator::Validate;

/// A free-text question, trimmed.
#[derive(Debug, Clone, Validate)]
pub struct PlantQuestion {
    #[validate(length(min = 1))]
    pub question: String,
}

impl PlantQuestion {
    pub fn new(question: &str) -> Result<Self, validator::ValidationErrors> {
        let question = Self {
            question: question.trim().to_string(),
        };
        question.validate()?;
        Ok(question)
    }
}

/// Body returned by `/esplanta`. `raw` is only present when the model's
/// answer could not be read as yes or no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantClassification {
    #[serde(rename = "es_planta")]
    pub is_plant_related: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_trims_and_rejects_blank() {
        assert_eq!(
            PlantQuestion::new(" ¿Cómo riego un cactus? ").unwrap().question,
            "¿Cómo riego un cactus?"
        );
        assert!(PlantQuestion::new(" \t ").is_err());
    }

    #[test]
    fn test_classification_serialization() {
        let sure = PlantClassification {
            is_plant_related: true,
            raw: None,
        };
        assert_eq!(serde_json::to_string(&sure).unwrap(), r#"{"es_planta":true}"#);

        let ambiguous = PlantClassification {
            is_plant_related: false,
            raw: Some("maybe".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&ambiguous).unwrap(),
            json!({"es_planta": false, "raw": "maybe"})
        );
    }
}
