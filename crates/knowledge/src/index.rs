//! The persisted vector index — chunk text, metadata and embeddings in one
//! JSON file, searched by cosine similarity.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use wingman_core::error::KnowledgeError;

/// One embedded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub text: String,
    pub source: String,
    pub category: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Embedding model the vectors were produced with. A model change
    /// means the index must be rebuilt, not reused.
    pub model: String,
    pub chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            chunks: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KnowledgeError::IndexUnavailable(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| KnowledgeError::IndexUnavailable(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), KnowledgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        }
        let content =
            serde_json::to_string(self).map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        info!(path = %path.display(), chunks = self.chunks.len(), "Vector index saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-k chunks by cosine similarity, best first. A category filter
    /// over-fetches 2x, filters, then truncates to k, so a mixed-category
    /// neighborhood still yields up to k in-category hits.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        category: Option<&str>,
    ) -> Vec<(&IndexedChunk, f32)> {
        let fetch = if category.is_some() { k * 2 } else { k };

        let mut scored: Vec<(&IndexedChunk, f32)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk, cosine_similarity(&chunk.embedding, query)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(fetch);

        if let Some(category) = category {
            scored.retain(|(chunk, _)| chunk.category == category);
        }
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity in [-1, 1]; 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, category: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            text: text.into(),
            source: "test.md".into(),
            category: category.into(),
            embedding,
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn search_ranks_by_similarity() {
        let mut index = VectorIndex::new("test-model");
        index.chunks.push(chunk("far", "general", vec![0.0, 1.0]));
        index.chunks.push(chunk("near", "general", vec![1.0, 0.1]));
        let hits = index.search(&[1.0, 0.0], 1, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.text, "near");
    }

    #[test]
    fn category_filter_overfetches_then_truncates() {
        let mut index = VectorIndex::new("test-model");
        // Two best hits are out of category; the in-category chunk ranks
        // third and only survives because of the 2x over-fetch.
        index.chunks.push(chunk("a", "general", vec![1.0, 0.0]));
        index.chunks.push(chunk("b", "general", vec![0.9, 0.1]));
        index.chunks.push(chunk("c", "tactics", vec![0.8, 0.2]));
        index.chunks.push(chunk("d", "tactics", vec![0.0, 1.0]));

        let hits = index.search(&[1.0, 0.0], 2, Some("tactics"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0.text, "c");
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store").join("index.json");

        let mut index = VectorIndex::new("text-embedding-v3");
        index.chunks.push(chunk("内容", "tactics", vec![0.1, 0.2]));
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.model, "text-embedding-v3");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.chunks[0].text, "内容");
    }

    #[test]
    fn load_missing_file_is_index_unavailable() {
        let err = VectorIndex::load(Path::new("/nonexistent/index.json")).unwrap_err();
        assert!(matches!(err, KnowledgeError::IndexUnavailable(_)));
    }
}
