//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use learning_core::Difficulty;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Gemini's OpenAI-compatible endpoint, used when only a Gemini key is configured.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub ai_base_url: Option<String>,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub quiz_difficulty: Difficulty,
    /// Interests for the dashboard's first recommendation load.
    pub default_interests: Vec<String>,
    /// Interests used when a refresh request names none.
    pub refresh_interests: Vec<String>,
    pub cors_origin: String,
}

/// Credentials and endpoint for the generative text service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiEndpoint {
    pub api_key: String,
    pub base_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Load API Keys (as optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let ai_base_url = lookup("AI_BASE_URL").filter(|u| !u.trim().is_empty());

        // --- Generation Settings ---
        let default_model = if openai_api_key.is_none() && gemini_api_key.is_some() {
            "gemini-2.5-flash"
        } else {
            "gpt-4o-mini"
        };
        let ai_model = lookup("AI_MODEL").unwrap_or_else(|| default_model.to_string());

        let timeout_str = lookup("AI_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let ai_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "AI_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let quiz_difficulty = lookup("QUIZ_DIFFICULTY")
            .unwrap_or_else(|| Difficulty::Intermediate.to_string())
            .parse::<Difficulty>()
            .map_err(|e| ConfigError::InvalidValue("QUIZ_DIFFICULTY".to_string(), e.to_string()))?;

        let default_interests = interest_list(
            lookup("DEFAULT_INTERESTS"),
            "React, Java Spring Boot, Machine Learning",
        );
        let refresh_interests = interest_list(
            lookup("REFRESH_INTERESTS"),
            "System Design, Cloud Architecture, DevOps",
        );

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            gemini_api_key,
            ai_base_url,
            ai_model,
            ai_timeout,
            quiz_difficulty,
            default_interests,
            refresh_interests,
            cors_origin,
        })
    }

    /// Picks the credentials to talk to. An OpenAI key wins over a Gemini key.
    pub fn ai_endpoint(&self) -> Result<AiEndpoint, ConfigError> {
        match (&self.openai_api_key, &self.gemini_api_key) {
            (Some(key), _) => Ok(AiEndpoint {
                api_key: key.clone(),
                base_url: self.ai_base_url.clone(),
            }),
            (None, Some(key)) => Ok(AiEndpoint {
                api_key: key.clone(),
                base_url: Some(
                    self.ai_base_url
                        .clone()
                        .unwrap_or_else(|| GEMINI_OPENAI_BASE_URL.to_string()),
                ),
            }),
            (None, None) => Err(ConfigError::MissingVar(
                "OPENAI_API_KEY or GEMINI_API_KEY".to_string(),
            )),
        }
    }
}

/// Splits a comma-separated interest list, dropping blank entries.
fn interest_list(value: Option<String>, default: &str) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or(default)
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_any_variables() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.ai_timeout, Duration::from_secs(30));
        assert_eq!(config.quiz_difficulty, Difficulty::Intermediate);
        assert_eq!(
            config.default_interests,
            vec!["React", "Java Spring Boot", "Machine Learning"]
        );
        assert_eq!(
            config.refresh_interests,
            vec!["System Design", "Cloud Architecture", "DevOps"]
        );
        assert!(matches!(config.ai_endpoint(), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn gemini_key_alone_targets_gemini_endpoint() {
        let config = config(&[("GEMINI_API_KEY", "g-key")]).unwrap();
        assert_eq!(config.ai_model, "gemini-2.5-flash");
        assert_eq!(
            config.ai_endpoint().unwrap(),
            AiEndpoint {
                api_key: "g-key".to_string(),
                base_url: Some(GEMINI_OPENAI_BASE_URL.to_string()),
            }
        );
    }

    #[test]
    fn openai_key_wins() {
        let config = config(&[("GEMINI_API_KEY", "g"), ("OPENAI_API_KEY", "o")]).unwrap();
        assert_eq!(config.ai_model, "gpt-4o-mini");
        assert_eq!(config.ai_endpoint().unwrap().api_key, "o");
        assert_eq!(config.ai_endpoint().unwrap().base_url, None);
    }

    #[test]
    fn interest_lists_are_trimmed() {
        let config = config(&[("REFRESH_INTERESTS", " Rust ,, Tokio ")]).unwrap();
        assert_eq!(config.refresh_interests, vec!["Rust", "Tokio"]);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("AI_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "AI_TIMEOUT_SECS"
        ));
        assert!(matches!(
            config(&[("QUIZ_DIFFICULTY", "Expert")]),
            Err(ConfigError::InvalidValue(var, _)) if var == "QUIZ_DIFFICULTY"
        ));
        assert!(config(&[("RUST_LOG", "loud")]).is_err());
        assert!(config(&[("BIND_ADDRESS", "nowhere")]).is_err());
    }
}
