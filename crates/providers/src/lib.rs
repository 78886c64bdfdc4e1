//! LLM provider implementations for Wingman.
//!
//! The decision loop only needs two capabilities: chat completion
//! ([`wingman_core::Provider`]) and text embedding
//! ([`wingman_core::Embedder`]). Both are served by any OpenAI-compatible
//! endpoint; the default deployment points at DashScope's compatible mode.

pub mod openai_compat;
pub mod testing;

pub use openai_compat::{OpenAiCompatEmbedder, OpenAiCompatProvider};
