//! Tool implementations and their advertised schemas.
//!
//! Each tool returns `Result<String, ToolError>`; the agent renders errors to
//! text so the model can narrate them.

pub mod calculator;
pub mod weather;

pub use calculator::{calculate, calculate_text, Operation};
pub use weather::{HttpReply, ReqwestTransport, WeatherClient, WeatherReport, WeatherTransport};

use serde_json::{json, Map, Value};

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
        }
    }
}

/// One argument in a tool's input schema.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub help: String,
    pub allowed: Option<Vec<&'static str>>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamType, help: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            required: true,
            help: help.into(),
            allowed: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamType, help: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, help)
        }
    }

    pub fn one_of(mut self, values: Vec<&'static str>) -> Self {
        self.allowed = Some(values);
        self
    }
}

/// Name, description and input schema of a callable tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    /// JSON Schema object describing the tool's arguments.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = json!({
                "type": param.kind.as_str(),
                "description": param.help,
            });
            if let Some(allowed) = &param.allowed {
                prop["enum"] = json!(allowed);
            }
            properties.insert(param.name.to_string(), prop);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
