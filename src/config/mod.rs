//! Configuration module for Toolchat.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, KnowledgePrompts, Prompts};
pub use settings::{
    EmbeddingSettings, GeneralSettings, KnowledgeSettings, ModelSettings, PromptSettings,
    Settings, WeatherSettings, EMBEDDING_API_KEY_ENV, MODEL_API_KEY_ENV, OPENAI_API_KEY_ENV,
    WEATHER_API_KEY_ENV,
};
