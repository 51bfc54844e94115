//! Retrieval-augmented question answering over the knowledge base.
//!
//! Retrieves the chunks closest to a question and "stuffs" them into a single
//! prompt for the chat model.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RetrievalQa, NO_CONTEXT_ANSWER};

use crate::vector_store::SearchResult;

/// A retrieved chunk ready to be placed in a prompt.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// Position of the chunk in its source document.
    pub chunk_order: i32,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            chunk_order: result.document.chunk_order,
            content: result.document.content,
            score: result.score,
        }
    }
}
