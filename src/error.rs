//! Error types for Toolchat.

use thiserror::Error;

/// Library-level error type for Toolchat operations.
#[derive(Error, Debug)]
pub enum ToolchatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Toolchat operations.
pub type Result<T> = std::result::Result<T, ToolchatError>;

/// Error raised at a tool boundary.
///
/// The `Display` text of every variant is the observation handed back to the
/// model, so each message must read as a complete sentence on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("cannot divide by zero")]
    DivideByZero,

    #[error("cannot take square root of negative number")]
    NegativeSqrt,

    #[error("calculation error: {0}")]
    Calculation(String),

    #[error("missing API key: OPENWEATHER_API_KEY is not configured")]
    MissingWeatherKey,

    #[error("city not found: {0}. Try the romanized spelling, e.g. Beijing")]
    CityNotFound(String),

    #[error("weather query failed: {0}")]
    WeatherProvider(String),

    #[error("weather query error: {0}")]
    WeatherQuery(String),

    #[error("knowledge base document not found")]
    DocumentNotFound,

    #[error("knowledge base load failed: {0}")]
    KnowledgeBaseUnavailable(String),

    #[error("knowledge base query error: {0}")]
    Retrieval(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Whether the error comes from malformed tool-call syntax rather than
    /// from the tool itself.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ToolError::InvalidArguments(_) | ToolError::UnknownTool(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_messages() {
        assert_eq!(ToolError::DivideByZero.to_string(), "cannot divide by zero");
        assert_eq!(
            ToolError::Calculation("overflow".to_string()).to_string(),
            "calculation error: overflow"
        );
        assert!(ToolError::CityNotFound("Pekin".to_string())
            .to_string()
            .contains("romanized"));
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(ToolError::UnknownTool("x".to_string()).is_parse_error());
        assert!(ToolError::InvalidArguments("bad".to_string()).is_parse_error());
        assert!(!ToolError::DivideByZero.is_parse_error());
    }
}
