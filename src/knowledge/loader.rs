//! Document loading for the knowledge base.
//!
//! Supports PDF files and plain-text documents.

use crate::error::{Result, ToolchatError};
use std::path::Path;
use tracing::{debug, instrument};

/// Plain-text file extensions read verbatim.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Kind of document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the document kind from a path.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext == "pdf" {
            Some(DocumentKind::Pdf)
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Some(DocumentKind::Text)
        } else {
            None
        }
    }
}

/// Load the full text of a document.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn load_document(path: &Path) -> Result<String> {
    let kind = DocumentKind::detect(path).ok_or_else(|| {
        ToolchatError::Document(format!("unsupported document type: {}", path.display()))
    })?;

    let text = match kind {
        DocumentKind::Pdf => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| ToolchatError::Document(format!("PDF extraction task failed: {}", e)))?
                .map_err(|e| ToolchatError::Document(format!("PDF extraction failed: {}", e)))?
        }
        DocumentKind::Text => tokio::fs::read_to_string(path).await?,
    };

    if text.trim().is_empty() {
        return Err(ToolchatError::Document(
            "document contains no extractable text".to_string(),
        ));
    }

    debug!("Loaded {} characters", text.chars().count());
    Ok(text)
}
