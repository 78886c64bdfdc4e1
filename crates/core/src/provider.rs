//! Provider trait — the abstraction over the LLM backend.
//!
//! The control loop only ever needs plain text completion: it sends a
//! system prompt plus a user prompt and gets text back. Structure is
//! recovered afterwards by [`crate::extract::extract_json`], which keeps
//! the parsing heuristics decoupled from any particular LLM binding.

use async_trait::async_trait;
use crate::error::ProviderError;

/// A text-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider name (e.g. "openai_compat").
    fn name(&self) -> &str;

    /// Generate a completion for the given system + user prompts.
    async fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> std::result::Result<String, ProviderError>;
}

/// A text-embedding backend, used by the knowledge index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name.
    fn name(&self) -> &str;

    /// Embed each input text; one vector per input, in order.
    async fn embed(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError>;
}
