//! Tool dispatch for the agent.
//!
//! Tool calls arrive from the model as a name plus JSON arguments. They are
//! parsed into [`ToolCall`] and validated before any tool runs.

use crate::error::ToolError;
use crate::knowledge::{KnowledgeBaseTool, KNOWLEDGE_TOOL_NAME};
use crate::tools::{calculate, Operation, ParamSpec, ParamType, ToolSpec, WeatherClient};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub const CALCULATOR_TOOL_NAME: &str = "Calculator";
pub const WEATHER_TOOL_NAME: &str = "Weather";

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    /// Arithmetic on one or two operands.
    Calculator {
        operation: String,
        a: f64,
        b: Option<f64>,
    },

    /// Current weather for a city.
    Weather { city: String },

    /// Question for the knowledge base.
    KnowledgeBase { query: String },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::Calculator { .. } => CALCULATOR_TOOL_NAME,
            ToolCall::Weather { .. } => WEATHER_TOOL_NAME,
            ToolCall::KnowledgeBase { .. } => KNOWLEDGE_TOOL_NAME,
        }
    }
}

#[derive(Deserialize)]
struct CalculatorArgs {
    operation: String,
    a: f64,
    #[serde(default)]
    b: Option<f64>,
}

#[derive(Deserialize)]
struct WeatherArgs {
    city: String,
}

#[derive(Deserialize)]
struct KnowledgeArgs {
    query: String,
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, ToolError> {
    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Parse a tool call from the model's name and JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall, ToolError> {
    let name = name.trim();

    if name.eq_ignore_ascii_case(CALCULATOR_TOOL_NAME) {
        let args: CalculatorArgs = parse_args(arguments)?;
        Ok(ToolCall::Calculator {
            operation: args.operation,
            a: args.a,
            b: args.b,
        })
    } else if name.eq_ignore_ascii_case(WEATHER_TOOL_NAME) {
        let args: WeatherArgs = parse_args(arguments)?;
        Ok(ToolCall::Weather { city: args.city })
    } else if name.eq_ignore_ascii_case(KNOWLEDGE_TOOL_NAME) {
        let args: KnowledgeArgs = parse_args(arguments)?;
        Ok(ToolCall::KnowledgeBase { query: args.query })
    } else {
        Err(ToolError::UnknownTool(name.to_string()))
    }
}

/// Calculator schema.
pub fn calculator_spec() -> ToolSpec {
    ToolSpec {
        name: CALCULATOR_TOOL_NAME,
        description: "Perform arithmetic: add, subtract, multiply, divide, power, square root."
            .to_string(),
        parameters: vec![
            ParamSpec::required(
                "operation",
                ParamType::String,
                "Operation: add, subtract, multiply, divide, power, sqrt",
            )
            .one_of(Operation::ALL.iter().map(|op| op.name()).collect()),
            ParamSpec::required("a", ParamType::Number, "The first number"),
            ParamSpec::optional(
                "b",
                ParamType::Number,
                "The second number (omit for sqrt)",
            ),
        ],
    }
}

/// Weather schema.
pub fn weather_spec() -> ToolSpec {
    ToolSpec {
        name: WEATHER_TOOL_NAME,
        description: "Look up the current weather for a city.".to_string(),
        parameters: vec![ParamSpec::required(
            "city",
            ParamType::String,
            "City name, preferably romanized (e.g. Beijing)",
        )],
    }
}

/// The fixed set of tools offered to the model.
pub struct ToolRegistry {
    weather: WeatherClient,
    knowledge: KnowledgeBaseTool,
}

impl ToolRegistry {
    pub fn new(weather: WeatherClient, knowledge: KnowledgeBaseTool) -> Self {
        Self { weather, knowledge }
    }

    /// Schemas of every registered tool, in a stable order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        vec![calculator_spec(), weather_spec(), self.knowledge.spec()]
    }

    pub fn knowledge(&self) -> &KnowledgeBaseTool {
        &self.knowledge
    }

    /// Execute a validated tool call.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String, ToolError> {
        match tool {
            ToolCall::Calculator { operation, a, b } => calculate(operation, *a, *b),
            ToolCall::Weather { city } => self.weather.get_weather(city).await,
            ToolCall::KnowledgeBase { query } => self.knowledge.answer(query).await,
        }
    }

    /// Parse and execute a raw tool call from the model.
    pub async fn run(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = parse_tool_call(name, arguments)?;
        debug!("Executing {:?}", tool);
        self.execute(&tool).await
    }
}
