//! Configuration settings for Toolchat.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the chat model provider key.
pub const MODEL_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
/// Environment variable holding the weather provider key.
pub const WEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable holding the embedding provider key.
pub const EMBEDDING_API_KEY_ENV: &str = "EMBEDDING_API_KEY";
/// Fallback for the embedding key when the dedicated variable is unset.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub weather: WeatherSettings,
    pub knowledge: KnowledgeSettings,
    pub embedding: EmbeddingSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of the OpenAI-compatible chat endpoint.
    pub api_base: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature. Kept low so tool selection stays predictable.
    pub temperature: f32,
    /// Maximum model calls per user turn.
    pub max_iterations: usize,
    /// Feed malformed tool calls back to the model instead of failing the turn.
    pub handle_parsing_errors: bool,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// API key. Overridden by `DEEPSEEK_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.3,
            max_iterations: 10,
            handle_parsing_errors: true,
            timeout_secs: 300,
            api_key: None,
        }
    }
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Current-weather endpoint.
    pub base_url: String,
    /// Unit system requested from the provider.
    pub units: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// API key. Overridden by `OPENWEATHER_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            units: "metric".to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Knowledge base settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Document backing the knowledge base tool (PDF or plain text).
    pub document_path: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
    /// Number of chunks stuffed into the answer prompt.
    pub top_k: usize,
    /// Drop retrieved chunks scoring below this cosine similarity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    /// Replay the raw construction error instead of a failure category.
    pub expose_error_details: bool,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            document_path: "./docs/the_history_of_ship.pdf".to_string(),
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 4,
            min_score: None,
            expose_error_details: false,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of the OpenAI-compatible embeddings endpoint.
    pub api_base: String,
    /// Embedding model to use.
    pub model: String,
    /// Requested dimensions, if the provider supports truncation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    /// API key. Overridden by `EMBEDDING_API_KEY`, then `OPENAI_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            api_key: None,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Overlay API keys from the process environment.
    ///
    /// Called once at startup; nothing else in the crate reads credentials
    /// from the environment.
    pub fn with_env_keys(self) -> Self {
        self.with_keys_from(|name| std::env::var(name).ok())
    }

    /// Overlay API keys from an arbitrary lookup.
    pub fn with_keys_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key_for = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = key_for(MODEL_API_KEY_ENV) {
            self.model.api_key = Some(key);
        }
        if let Some(key) = key_for(WEATHER_API_KEY_ENV) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = key_for(EMBEDDING_API_KEY_ENV).or_else(|| key_for(OPENAI_API_KEY_ENV)) {
            self.embedding.api_key = Some(key);
        }
        self
    }

    /// Chat model key, if configured and non-empty.
    pub fn model_api_key(&self) -> Option<&str> {
        non_empty(&self.model.api_key)
    }

    /// Weather provider key, if configured and non-empty.
    pub fn weather_api_key(&self) -> Option<&str> {
        non_empty(&self.weather.api_key)
    }

    /// Embedding provider key, if configured and non-empty.
    pub fn embedding_api_key(&self) -> Option<&str> {
        non_empty(&self.embedding.api_key)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ToolchatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolchat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded knowledge document path.
    pub fn document_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge.document_path)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model.model, "deepseek-chat");
        assert!((settings.model.temperature - 0.3).abs() < f32::EPSILON);
        assert!(settings.model.handle_parsing_errors);
        assert_eq!(settings.knowledge.chunk_size, 1000);
        assert_eq!(settings.knowledge.chunk_overlap, 100);
        assert!(settings.model_api_key().is_none());
    }

    #[test]
    fn test_keys_from_lookup() {
        let env: HashMap<&str, &str> = [
            (MODEL_API_KEY_ENV, "sk-model"),
            (WEATHER_API_KEY_ENV, "  "),
            (OPENAI_API_KEY_ENV, "sk-embed"),
        ]
        .into_iter()
        .collect();

        let settings = Settings::default().with_keys_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.model_api_key(), Some("sk-model"));
        assert_eq!(settings.weather_api_key(), None);
        assert_eq!(settings.embedding_api_key(), Some("sk-embed"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\nmodel = \"deepseek-reasoner\"\n\n[knowledge]\ntop_k = 6\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.model.model, "deepseek-reasoner");
        assert_eq!(settings.model.api_base, "https://api.deepseek.com");
        assert_eq!(settings.knowledge.top_k, 6);
        assert_eq!(settings.knowledge.chunk_size, 1000);
    }

    #[test]
    fn test_save_round_trip_omits_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Settings::default().save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("api_key"));
        assert!(Settings::load_from(Some(&path)).is_ok());
    }
}
