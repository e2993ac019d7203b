use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct PlantConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    /// Chat model used for both endpoints (e.g., gpt-4o-mini)
    pub model: String,
    pub timeout_secs: u64,
}

impl PlantConfig {
    /// Read configuration once at startup. A missing `OPENAI_API_KEY` is fatal.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Set OPENAI_API_KEY environment variable"
                ))
            })?;

        Ok(PlantConfig {
            common: common_config,
            openai: OpenAiConfig {
                api_key: Secret::new(api_key),
                base_url: get_env("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
                model: get_env("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                timeout_secs: get_env(
                    "OPENAI_TIMEOUT_SECS",
                    &DEFAULT_OPENAI_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .unwrap_or(DEFAULT_OPENAI_TIMEOUT_SECS),
            },
        })
    }

    pub fn api_key(&self) -> &str {
        self.openai.api_key.expose_secret()
    }
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            tracing::debug!("{} not set, using default: {}", key, default);
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-wide environment is not mutated concurrently.
    #[test]
    fn test_load_requires_api_key_and_applies_defaults() {
        env::remove_var("OPENAI_API_KEY");
        assert!(matches!(
            PlantConfig::load(),
            Err(AppError::ConfigError(_))
        ));

        env::set_var("OPENAI_API_KEY", "   ");
        assert!(PlantConfig::load().is_err());

        env::set_var("OPENAI_API_KEY", "sk-test");
        env::remove_var("OPENAI_MODEL");
        env::remove_var("OPENAI_BASE_URL");
        env::set_var("OPENAI_TIMEOUT_SECS", "not-a-number");
        let config = PlantConfig::load().unwrap();
        assert_eq!(config.api_key(), "sk-test");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.timeout_secs, 60);

        env::remove_var("OPENAI_API_KEY");
        env::remove_var("OPENAI_TIMEOUT_SECS");
    }
}
