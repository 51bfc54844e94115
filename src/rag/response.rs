//! Answer generation from retrieved context.

use super::{context::format_context_for_prompt, ContextBuilder};
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{Result, ToolchatError};
use crate::llm::{ChatMessage, ChatModel, ModelReply};
use crate::vector_store::VectorStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answer returned when retrieval finds nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in the knowledge base for this question.";

/// Retrieval-answer pipeline: embed, search, stuff, generate.
pub struct RetrievalQa {
    model: Arc<dyn ChatModel>,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RetrievalQa {
    /// Create a new pipeline over an index.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        top_k: usize,
    ) -> Self {
        Self {
            model,
            context_builder: ContextBuilder::new(vector_store, embedder).with_max_chunks(top_k),
            prompts: Prompts::default(),
        }
    }

    /// Ignore chunks whose similarity is below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.context_builder = self.context_builder.with_min_score(min_score);
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer a question from the indexed document.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<String> {
        info!("Knowledge base question: {}", question);

        let context_chunks = self.context_builder.build(question).await?;
        if context_chunks.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(&context_chunks));

        let messages = vec![
            ChatMessage::System(
                self.prompts
                    .render_with_custom(&self.prompts.knowledge.system, &HashMap::new()),
            ),
            ChatMessage::User(
                self.prompts
                    .render_with_custom(&self.prompts.knowledge.user, &vars),
            ),
        ];

        let answer = match self.model.complete(&messages, &[]).await? {
            ModelReply::Final(answer) => answer,
            ModelReply::ToolCalls { content, .. } => content.unwrap_or_default(),
        };

        if answer.trim().is_empty() {
            return Err(ToolchatError::Rag("Empty response from LLM".to_string()));
        }

        debug!("Generated answer from {} chunks", context_chunks.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolSpec;
    use crate::vector_store::{Document, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embeds by counting a few keywords.
    struct KeywordEmbedder;

    fn keyword_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        ["viking", "steam", "container"]
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect()
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(keyword_vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| keyword_vector(t)).collect())
        }
    }

    /// Records the prompt and answers with a fixed string.
    struct RecordingModel {
        answer: String,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply> {
            assert!(tools.is_empty());
            self.prompts.lock().unwrap().push(messages.to_vec());
            Ok(ModelReply::Final(self.answer.clone()))
        }
    }

    async fn pipeline(answer: &str) -> (RetrievalQa, Arc<RecordingModel>) {
        let store = Arc::new(MemoryVectorStore::new());
        let docs = vec![
            Document::new("ships.txt".into(), "Viking longships were clinker built.".into(), vec![1.0, 0.0, 0.0], 0),
            Document::new("ships.txt".into(), "Steam power arrived in the 1800s.".into(), vec![0.0, 1.0, 0.0], 1),
            Document::new("ships.txt".into(), "Container ships carry boxes.".into(), vec![0.0, 0.0, 1.0], 2),
        ];
        store.upsert_batch(&docs).await.unwrap();

        let model = Arc::new(RecordingModel {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let qa = RetrievalQa::new(store, Arc::new(KeywordEmbedder), model.clone(), 1);
        (qa, model)
    }

    #[tokio::test]
    async fn test_answer_stuffs_closest_chunk() {
        let (qa, model) = pipeline("They were clinker built.").await;

        let answer = qa.answer("How were viking ships built?").await.unwrap();
        assert_eq!(answer, "They were clinker built.");

        let prompts = model.prompts.lock().unwrap();
        let user = match &prompts[0][1] {
            ChatMessage::User(text) => text.clone(),
            other => panic!("Expected user message, got {:?}", other),
        };
        assert!(user.contains("Viking longships were clinker built."));
        assert!(!user.contains("Steam power"));
        assert!(user.contains("Question: How were viking ships built?"));
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let (qa, _) = pipeline("   ").await;
        assert!(matches!(
            qa.answer("steam?").await,
            Err(ToolchatError::Rag(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_index_skips_model() {
        let model = Arc::new(RecordingModel {
            answer: "unused".to_string(),
            prompts: Mutex::new(Vec::new()),
        });
        let qa = RetrievalQa::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder),
            model.clone(),
            4,
        );

        assert_eq!(qa.answer("anything").await.unwrap(), NO_CONTEXT_ANSWER);
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_min_score_filters_weak_matches() {
        let (qa, model) = pipeline("unused").await;
        let qa = qa.with_min_score(0.5);

        assert_eq!(qa.answer("Who built galleons?").await.unwrap(), NO_CONTEXT_ANSWER);
        assert!(model.prompts.lock().unwrap().is_empty());
    }
}
