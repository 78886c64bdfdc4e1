//! Tactical knowledge retrieval with a degraded path.
//!
//! The mission loop must never stall on knowledge: any failure in the
//! embedding or index layer drops retrieval down to keyword matching over
//! the raw documents, and an empty corpus yields the explicit
//! no-knowledge marker instead of an error.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use wingman_config::KnowledgeConfig;
use wingman_core::error::KnowledgeError;
use wingman_core::provider::Embedder;

use crate::chunk::Chunker;
use crate::docs::{Categorizer, load_documents};
use crate::index::{IndexedChunk, VectorIndex};

const INDEX_FILE: &str = "index.json";
const EMBED_BATCH: usize = 16;

/// One retrieved piece of knowledge.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub text: String,
    pub source: String,
    pub category: String,
    /// Cosine similarity for vector hits; 0.5 for degraded-path hits.
    pub score: f32,
}

/// The knowledge retriever. Builds (or loads) the vector index lazily on
/// first use; callers never see index failures, only degraded results.
pub struct TacticalKnowledge {
    config: KnowledgeConfig,
    embedder: Option<Arc<dyn Embedder>>,
    categorizer: Categorizer,
    chunker: Chunker,
    index: RwLock<Option<VectorIndex>>,
}

impl TacticalKnowledge {
    pub fn new(config: KnowledgeConfig, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let categorizer = match &config.categories_file {
            Some(path) => Categorizer::from_file(path),
            None => Categorizer::builtin(),
        };
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap);
        Self {
            config,
            embedder,
            categorizer,
            chunker,
            index: RwLock::new(None),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.config.index_dir.join(INDEX_FILE)
    }

    /// Load the persisted index, or build it from the knowledge dir.
    /// Returns false when no vector index is available (degraded mode).
    async fn ensure_index(&self) -> bool {
        if self.index.read().await.is_some() {
            return true;
        }

        let embedder = match &self.embedder {
            Some(e) => e.clone(),
            None => return false,
        };

        let path = self.index_path();
        if path.exists() {
            match VectorIndex::load(&path) {
                Ok(index) if index.model == self.config.embedding_model => {
                    info!(chunks = index.len(), "Loaded existing vector index");
                    *self.index.write().await = Some(index);
                    return true;
                }
                Ok(index) => {
                    warn!(
                        index_model = %index.model,
                        configured = %self.config.embedding_model,
                        "Vector index built with another model, rebuilding"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load vector index, rebuilding");
                }
            }
        }

        match self.build_index(embedder).await {
            Ok(index) => {
                *self.index.write().await = Some(index);
                true
            }
            Err(e) => {
                warn!(error = %e, "Vector index build failed, using degraded search");
                false
            }
        }
    }

    async fn build_index(
        &self,
        embedder: Arc<dyn Embedder>,
    ) -> Result<VectorIndex, KnowledgeError> {
        let docs = load_documents(&self.config.knowledge_dir, &self.categorizer);
        if docs.is_empty() {
            return Err(KnowledgeError::Storage(format!(
                "no knowledge documents under {}",
                self.config.knowledge_dir.display()
            )));
        }

        let mut texts = Vec::new();
        let mut meta = Vec::new();
        for doc in &docs {
            for chunk in self.chunker.split(&doc.content) {
                texts.push(chunk);
                meta.push((doc.source.clone(), doc.category.clone()));
            }
        }
        info!(documents = docs.len(), chunks = texts.len(), "Chunked knowledge corpus");

        let mut index = VectorIndex::new(self.config.embedding_model.clone());
        for (batch_texts, batch_meta) in texts.chunks(EMBED_BATCH).zip(meta.chunks(EMBED_BATCH)) {
            let embeddings = embedder
                .embed(batch_texts)
                .await
                .map_err(|e| KnowledgeError::EmbeddingFailed(e.to_string()))?;
            for ((text, (source, category)), embedding) in
                batch_texts.iter().zip(batch_meta).zip(embeddings)
            {
                index.chunks.push(IndexedChunk {
                    text: text.clone(),
                    source: source.clone(),
                    category: category.clone(),
                    embedding,
                });
            }
        }

        index.save(&self.index_path())?;
        Ok(index)
    }

    /// Retrieve up to `k` snippets for `query` (defaults to the configured
    /// top-k), optionally filtered by category.
    pub async fn retrieve(
        &self,
        query: &str,
        k: Option<usize>,
        category: Option<&str>,
    ) -> Vec<Snippet> {
        let k = k.unwrap_or(self.config.top_k);

        if self.ensure_index().await {
            if let Some(embedder) = &self.embedder {
                match embedder.embed(&[query.to_string()]).await {
                    Ok(embeddings) if !embeddings.is_empty() => {
                        let guard = self.index.read().await;
                        if let Some(index) = guard.as_ref() {
                            return index
                                .search(&embeddings[0], k, category)
                                .into_iter()
                                .map(|(chunk, score)| Snippet {
                                    text: chunk.text.clone(),
                                    source: chunk.source.clone(),
                                    category: chunk.category.clone(),
                                    score,
                                })
                                .collect();
                        }
                    }
                    Ok(_) => warn!("Query embedding came back empty, using degraded search"),
                    Err(e) => warn!(error = %e, "Query embedding failed, using degraded search"),
                }
            }
        }

        self.fallback_search(query, category)
    }

    /// Keyword-overlap search over the raw documents. Zero keyword hits
    /// fall back to an arbitrary prefix of the corpus, so the agent always
    /// gets something when documents exist at all.
    fn fallback_search(&self, query: &str, category: Option<&str>) -> Vec<Snippet> {
        let docs = load_documents(&self.config.knowledge_dir, &self.categorizer);
        if docs.is_empty() {
            warn!("Degraded search found no knowledge documents");
            return Vec::new();
        }

        let query_lower = query.to_lowercase().replace(['，', '、'], " ");
        let keywords: Vec<&str> = query_lower.split_whitespace().collect();

        let mut results: Vec<Snippet> = docs
            .iter()
            .filter(|doc| category.is_none_or(|c| doc.category == c))
            .filter(|doc| {
                let content = doc.content.to_lowercase();
                keywords.iter().any(|kw| content.contains(kw))
            })
            .map(|doc| Snippet {
                text: doc.content.clone(),
                source: doc.source.clone(),
                category: doc.category.clone(),
                score: 0.5,
            })
            .collect();

        if !results.is_empty() {
            results.truncate(5);
            return results;
        }

        docs.into_iter()
            .take(3)
            .map(|doc| Snippet {
                text: doc.content,
                source: doc.source,
                category: doc.category,
                score: 0.5,
            })
            .collect()
    }

    /// Formatted knowledge context for the commander prompt.
    pub async fn context_for_task(&self, query: &str) -> String {
        let snippets = self.retrieve(query, None, None).await;
        if snippets.is_empty() {
            return "（无相关战术知识）".to_string();
        }

        snippets
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[知识{}] ({} - {})\n{}", i + 1, s.category, s.source, s.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Wipe the persisted index and rebuild it from the knowledge dir.
    /// Returns the number of indexed chunks.
    pub async fn rebuild(&self) -> Result<usize, KnowledgeError> {
        let embedder = self.embedder.clone().ok_or_else(|| {
            KnowledgeError::EmbeddingFailed("no embedding backend configured".into())
        })?;

        let path = self.index_path();
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        }
        *self.index.write().await = None;

        let index = self.build_index(embedder).await?;
        let count = index.len();
        *self.index.write().await = Some(index);
        Ok(count)
    }
}
