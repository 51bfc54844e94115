//! Prompt templates for Toolchat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use super::PromptSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub knowledge: KnowledgePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant with access to three tools.

- 'Calculator' performs arithmetic: add, subtract, multiply, divide, power, sqrt
- 'Weather' looks up the current weather for a city
- 'KnowledgeBaseQueryTool' answers questions from the user's reference document

Guidelines:
- Use a tool whenever the question needs exact arithmetic, live weather, or facts from the document
- Read each tool result carefully; if a tool reports an error, explain it or try a corrected call
- When a city is not found, retry with its romanized English name
- Do not invent tool results
- Remember earlier turns of the conversation for follow-up questions

Reply in the language the user writes in."#
                .to_string(),
        }
    }
}

/// Prompts for the knowledge base answer chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgePrompts {
    pub system: String,
    pub user: String,
}

impl Default for KnowledgePrompts {
    fn default() -> Self {
        Self {
            system: r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer."#
                .to_string(),
            user: r#"{{context}}

Question: {{question}}
Helpful Answer:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let knowledge_path = custom_path.join("knowledge.toml");
            if knowledge_path.exists() {
                let content = std::fs::read_to_string(&knowledge_path)?;
                prompts.knowledge = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Load prompts as configured, falling back to the defaults when a custom
    /// prompt file cannot be read or parsed.
    pub fn from_settings(settings: &PromptSettings) -> Self {
        match Self::load(settings.custom_dir.as_deref(), Some(&settings.variables)) {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("Failed to load custom prompts, using defaults: {}", e);
                let mut prompts = Prompts::default();
                prompts.variables = settings.variables.clone();
                prompts
            }
        }
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The agent system prompt with custom variables applied.
    pub fn agent_system(&self) -> String {
        Self::render(&self.agent.system, &self.variables)
    }
}
