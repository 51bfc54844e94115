//! Knowledge base tool backed by a single document.
//!
//! The tool is built once at startup. A missing document or a failure while
//! building the index yields a stub that reports the problem on every call,
//! so the other tools stay usable.

pub mod loader;
pub mod splitter;

pub use loader::{load_document, DocumentKind};
pub use splitter::TextSplitter;

use crate::config::{KnowledgeSettings, Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, ToolError, ToolchatError};
use crate::llm::ChatModel;
use crate::rag::RetrievalQa;
use crate::tools::{ParamSpec, ParamType, ToolSpec};
use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Tool name advertised to the model.
pub const KNOWLEDGE_TOOL_NAME: &str = "KnowledgeBaseQueryTool";

/// Knowledge base tool in one of its three terminal states.
pub enum KnowledgeBaseTool {
    /// The document does not exist.
    Missing,
    /// Building the pipeline failed; `reason` is replayed on every call.
    Failed { reason: String },
    /// A working retrieval pipeline.
    Live { pipeline: RetrievalQa, chunks: usize },
}

impl KnowledgeBaseTool {
    /// Schema and description for the current state.
    pub fn spec(&self) -> ToolSpec {
        let description = match self {
            KnowledgeBaseTool::Live { .. } => {
                "Answer questions from the knowledge base PDF document."
            }
            KnowledgeBaseTool::Missing => {
                "Answer questions from the knowledge base PDF document (the document is currently missing)."
            }
            KnowledgeBaseTool::Failed { .. } => {
                "Knowledge base question answering (initialization failed)."
            }
        };

        ToolSpec {
            name: KNOWLEDGE_TOOL_NAME,
            description: description.to_string(),
            parameters: vec![ParamSpec::required(
                "query",
                ParamType::String,
                "The question or topic to look up in the knowledge base",
            )],
        }
    }

    /// Whether the tool can actually answer questions.
    pub fn is_live(&self) -> bool {
        matches!(self, KnowledgeBaseTool::Live { .. })
    }

    /// Answer a query. The query is forwarded verbatim.
    pub async fn answer(&self, query: &str) -> std::result::Result<String, ToolError> {
        match self {
            KnowledgeBaseTool::Missing => Err(ToolError::DocumentNotFound),
            KnowledgeBaseTool::Failed { reason } => {
                Err(ToolError::KnowledgeBaseUnavailable(reason.clone()))
            }
            KnowledgeBaseTool::Live { pipeline, .. } => pipeline
                .answer(query)
                .await
                .map_err(|e| ToolError::Retrieval(e.to_string())),
        }
    }
}

impl std::fmt::Debug for KnowledgeBaseTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeBaseTool::Missing => write!(f, "KnowledgeBaseTool::Missing"),
            KnowledgeBaseTool::Failed { reason } => {
                write!(f, "KnowledgeBaseTool::Failed({})", reason)
            }
            KnowledgeBaseTool::Live { chunks, .. } => {
                write!(f, "KnowledgeBaseTool::Live({} chunks)", chunks)
            }
        }
    }
}

/// Build the knowledge base tool for `path` using the configured embedder.
pub async fn setup_knowledge_base_tool(
    path: impl AsRef<Path>,
    settings: &Settings,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
) -> KnowledgeBaseTool {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Knowledge base document not found: {}", path.display());
        return KnowledgeBaseTool::Missing;
    }

    let embedder: Arc<dyn Embedder> = match OpenAIEmbedder::from_settings(&settings.embedding) {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => return failed(&e, &settings.knowledge),
    };

    KnowledgeBaseBuilder::new(&settings.knowledge, embedder, model)
        .with_prompts(prompts)
        .build(path)
        .await
}

/// Builds a knowledge base tool from explicit collaborators.
pub struct KnowledgeBaseBuilder {
    settings: KnowledgeSettings,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl KnowledgeBaseBuilder {
    pub fn new(
        settings: &KnowledgeSettings,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            settings: settings.clone(),
            embedder,
            model,
            prompts: Prompts::default(),
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the tool. Never fails; failures become stub states.
    pub async fn build(self, path: &Path) -> KnowledgeBaseTool {
        if !path.exists() {
            warn!("Knowledge base document not found: {}", path.display());
            return KnowledgeBaseTool::Missing;
        }

        let settings = self.settings.clone();
        match self.build_pipeline(path).await {
            Ok((pipeline, chunks)) => {
                info!("Knowledge base ready: {} chunks from {}", chunks, path.display());
                KnowledgeBaseTool::Live { pipeline, chunks }
            }
            Err(e) => failed(&e, &settings),
        }
    }

    async fn build_pipeline(self, path: &Path) -> Result<(RetrievalQa, usize)> {
        let text = load_document(path).await?;

        let splitter = TextSplitter::new(self.settings.chunk_size, self.settings.chunk_overlap)?;
        let chunks = splitter.split_text(&text);
        if chunks.is_empty() {
            return Err(ToolchatError::Document(
                "document produced no chunks".to_string(),
            ));
        }

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(ToolchatError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let source = path.display().to_string();
        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (content, embedding))| {
                Document::new(source.clone(), content, embedding, i as i32)
            })
            .collect();

        let store = Arc::new(MemoryVectorStore::new());
        let indexed = store.upsert_batch(&documents).await?;

        let mut pipeline = RetrievalQa::new(store, self.embedder, self.model, self.settings.top_k)
            .with_prompts(self.prompts);
        if let Some(min_score) = self.settings.min_score {
            pipeline = pipeline.with_min_score(min_score);
        }

        Ok((pipeline, indexed))
    }
}

fn failed(error: &ToolchatError, settings: &KnowledgeSettings) -> KnowledgeBaseTool {
    warn!("Knowledge base initialization failed: {}", error);
    let reason = if settings.expose_error_details {
        error.to_string()
    } else {
        failure_category(error).to_string()
    };
    KnowledgeBaseTool::Failed { reason }
}

/// Short description of a construction failure that reveals no paths or
/// provider responses.
fn failure_category(error: &ToolchatError) -> &'static str {
    match error {
        ToolchatError::Document(_) | ToolchatError::Io(_) => "the document could not be read",
        ToolchatError::Config(_) => "the embedding service is not configured",
        ToolchatError::Embedding(_) | ToolchatError::OpenAI(_) | ToolchatError::Http(_) => {
            "the embedding service is unavailable"
        }
        ToolchatError::VectorStore(_) => "the search index could not be built",
        _ => "the retrieval pipeline could not be initialized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ModelReply};
    use async_trait::async_trait;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("sail").count() as f32,
                lower.matches("engine").count() as f32,
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(ToolchatError::OpenAI("401 invalid key sk-secret".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(ToolchatError::OpenAI("401 invalid key sk-secret".to_string()))
        }
    }

    /// Echoes the stuffed user prompt back as the answer.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<ModelReply> {
            match messages.last() {
                Some(ChatMessage::User(text)) => Ok(ModelReply::Final(text.clone())),
                _ => Ok(ModelReply::Final("no prompt".to_string())),
            }
        }
    }

    fn write_doc(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("ships.txt");
        std::fs::write(
            &path,
            "Sailing ships used the wind to sail across oceans.\n\nThe steam engine freed ships from the wind; every engine burned coal.",
        )
        .unwrap();
        path
    }

    fn small_chunks() -> KnowledgeSettings {
        KnowledgeSettings {
            chunk_size: 80,
            chunk_overlap: 10,
            top_k: 1,
            ..KnowledgeSettings::default()
        }
    }

    #[tokio::test]
    async fn test_missing_document_stub() {
        let settings = Settings::default();
        let tool = setup_knowledge_base_tool(
            "/nonexistent/path.pdf",
            &settings,
            Arc::new(EchoModel),
            Prompts::default(),
        )
        .await;

        assert!(matches!(tool, KnowledgeBaseTool::Missing));
        assert!(tool.spec().description.contains("missing"));
        for query in ["ships", "", "who built the first galleon?"] {
            assert_eq!(
                tool.answer(query).await.unwrap_err().to_string(),
                "knowledge base document not found"
            );
        }
    }

    #[tokio::test]
    async fn test_live_tool_answers_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir);

        let tool = KnowledgeBaseBuilder::new(&small_chunks(), Arc::new(LengthEmbedder), Arc::new(EchoModel))
            .build(&path)
            .await;

        assert!(tool.is_live());
        match &tool {
            KnowledgeBaseTool::Live { chunks, .. } => assert_eq!(*chunks, 2),
            other => panic!("Expected live tool, got {:?}", other),
        }

        let answer = tool.answer("How does an engine work?").await.unwrap();
        assert!(answer.contains("steam engine"));
        assert!(answer.contains("Question: How does an engine work?"));
        assert!(!answer.contains("Sailing ships"));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir);

        let tool = KnowledgeBaseBuilder::new(&small_chunks(), Arc::new(FailingEmbedder), Arc::new(EchoModel))
            .build(&path)
            .await;

        let message = tool.answer("anything").await.unwrap_err().to_string();
        assert_eq!(
            message,
            "knowledge base load failed: the embedding service is unavailable"
        );
        assert!(!message.contains("sk-secret"));
        assert_eq!(tool.answer("again").await.unwrap_err().to_string(), message);
    }

    #[tokio::test]
    async fn test_failure_details_can_be_exposed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir);
        let settings = KnowledgeSettings {
            expose_error_details: true,
            ..small_chunks()
        };

        let tool = KnowledgeBaseBuilder::new(&settings, Arc::new(FailingEmbedder), Arc::new(EchoModel))
            .build(&path)
            .await;

        let message = tool.answer("anything").await.unwrap_err().to_string();
        assert!(message.starts_with("knowledge base load failed:"));
        assert!(message.contains("401 invalid key"));
    }

    #[tokio::test]
    async fn test_unsupported_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ships.docx");
        std::fs::write(&path, "binary").unwrap();

        let tool = KnowledgeBaseBuilder::new(&small_chunks(), Arc::new(LengthEmbedder), Arc::new(EchoModel))
            .build(&path)
            .await;

        assert!(matches!(tool, KnowledgeBaseTool::Failed { .. }));
        assert!(tool.spec().description.contains("initialization failed"));
        assert_eq!(
            tool.answer("q").await.unwrap_err().to_string(),
            "knowledge base load failed: the document could not be read"
        );
    }

    #[tokio::test]
    async fn test_missing_embedding_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir);

        let tool = setup_knowledge_base_tool(
            &path,
            &Settings::default(),
            Arc::new(EchoModel),
            Prompts::default(),
        )
        .await;
        assert_eq!(
            tool.answer("q").await.unwrap_err(),
            ToolError::KnowledgeBaseUnavailable("the embedding service is not configured".to_string())
        );
    }

    #[tokio::test]
    async fn test_min_score_setting_applies_to_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir);
        let settings = KnowledgeSettings {
            min_score: Some(0.5),
            ..small_chunks()
        };

        let tool = KnowledgeBaseBuilder::new(&settings, Arc::new(LengthEmbedder), Arc::new(EchoModel))
            .build(&path)
            .await;

        assert_eq!(
            tool.answer("Who paid the crew?").await.unwrap(),
            crate::rag::NO_CONTEXT_ANSWER
        );
        assert!(tool.answer("engine").await.unwrap().contains("steam engine"));
    }
}
