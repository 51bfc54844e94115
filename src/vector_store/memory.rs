//! In-memory vector store implementation.
//!
//! The knowledge base is built once per process, so an in-memory index is
//! all it needs.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::{Result, ToolchatError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E>(_: E) -> ToolchatError {
    ToolchatError::VectorStore("index lock poisoned".to_string())
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().map_err(poisoned)?;
        for doc in docs {
            store.insert(doc.id.to_string(), doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().map_err(poisoned)?;

        let mut results: Vec<SearchResult> = docs
            .values()
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.document.chunk_order.cmp(&b.document.chunk_order))
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, embedding: Vec<f32>, order: i32) -> Document {
        Document::new("ships.pdf".to_string(), content.to_string(), embedding, order)
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let docs = vec![
            doc("Galleons carried cargo", vec![1.0, 0.0, 0.0], 0),
            doc("Steamships replaced sail", vec![0.0, 1.0, 0.0], 1),
            doc("Container ships", vec![0.7, 0.7, 0.0], 2),
        ];

        assert_eq!(store.upsert_batch(&docs).await.unwrap(), 3);
        assert_eq!(store.document_count().await.unwrap(), 3);

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].document.content, "Galleons carried cargo");
        assert!(results[0].score > results[1].score);
        assert!(results[1].score > results[2].score);
    }

    #[tokio::test]
    async fn test_search_limit_and_threshold() {
        let store = MemoryVectorStore::new();
        store
            .upsert_batch(&[
                doc("a", vec![1.0, 0.0], 0),
                doc("b", vec![0.9, 0.1], 1),
                doc("c", vec![0.0, 1.0], 2),
            ])
            .await
            .unwrap();

        let top = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].document.content, "a");

        let close = store.search_with_threshold(&[1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(close.len(), 2);
    }
}
