//! Tactical knowledge retrieval.
//!
//! Markdown and JSON documents in the knowledge directory are categorized
//! by filename, chunked, embedded and persisted as a single JSON index.
//! Retrieval is cosine top-k; when no embedder is available (or the index
//! cannot be built) the retriever degrades to keyword matching over the
//! raw documents rather than failing the mission loop.

pub mod chunk;
pub mod docs;
pub mod index;
pub mod retriever;

pub use chunk::Chunker;
pub use docs::{Categorizer, KnowledgeDoc, load_documents};
pub use index::{IndexedChunk, VectorIndex, cosine_similarity};
pub use retriever::{Snippet, TacticalKnowledge};
