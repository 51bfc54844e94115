//! Pre-flight checks before starting a session.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, ToolchatError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat requires the model key; weather and knowledge base are optional.
    Chat,
}

/// A non-fatal problem found during pre-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    WeatherKeyMissing,
    DocumentMissing(String),
    EmbeddingKeyMissing,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::WeatherKeyMissing => {
                write!(f, "OPENWEATHER_API_KEY not set; weather lookups will fail")
            }
            Degradation::DocumentMissing(path) => {
                write!(f, "knowledge document not found at {}", path)
            }
            Degradation::EmbeddingKeyMissing => write!(
                f,
                "EMBEDDING_API_KEY (or OPENAI_API_KEY) not set; the knowledge base needs it to index the document and will be unavailable"
            ),
        }
    }
}

/// Run pre-flight checks for the given operation.
///
/// Returns the list of degraded tools, or an error if the operation cannot
/// run at all.
pub fn check(operation: Operation, settings: &Settings) -> Result<Vec<Degradation>> {
    let mut degraded = Vec::new();
    match operation {
        Operation::Chat => {
            check_model_key(settings)?;

            if settings.weather_api_key().is_none() {
                degraded.push(Degradation::WeatherKeyMissing);
            }
            let document = settings.document_path();
            if !document.exists() {
                degraded.push(Degradation::DocumentMissing(document.display().to_string()));
            } else if settings.embedding_api_key().is_none() {
                degraded.push(Degradation::EmbeddingKeyMissing);
            }
        }
    }
    Ok(degraded)
}

/// Check that the chat model key is configured.
fn check_model_key(settings: &Settings) -> Result<()> {
    match settings.model_api_key() {
        Some(_) => Ok(()),
        None => Err(ToolchatError::Config(
            "DEEPSEEK_API_KEY not set. Set it with: export DEEPSEEK_API_KEY='sk-...' or add it to .env"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_requires_model_key() {
        let settings = Settings::default();
        let err = check(Operation::Chat, &settings).unwrap_err();
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_chat_reports_degraded_tools() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("sk-test".to_string());
        settings.knowledge.document_path = "/nonexistent/path.pdf".to_string();

        let degraded = check(Operation::Chat, &settings).unwrap();
        assert_eq!(
            degraded,
            vec![
                Degradation::WeatherKeyMissing,
                Degradation::DocumentMissing("/nonexistent/path.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn test_chat_fully_configured() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("ships.txt");
        std::fs::write(&doc, "Ships float.").unwrap();

        let mut settings = Settings::default();
        settings.model.api_key = Some("sk-test".to_string());
        settings.weather.api_key = Some("w-key".to_string());
        settings.embedding.api_key = Some("e-key".to_string());
        settings.knowledge.document_path = doc.display().to_string();

        assert!(check(Operation::Chat, &settings).unwrap().is_empty());
    }

    #[test]
    fn test_document_without_embedding_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("ships.txt");
        std::fs::write(&doc, "Ships float.").unwrap();

        let mut settings = Settings::default();
        settings.model.api_key = Some("sk-test".to_string());
        settings.weather.api_key = Some("w-key".to_string());
        settings.knowledge.document_path = doc.display().to_string();

        let degraded = check(Operation::Chat, &settings).unwrap();
        assert_eq!(degraded, vec![Degradation::EmbeddingKeyMissing]);
        assert!(degraded[0].to_string().contains("OPENAI_API_KEY"));
    }
}
