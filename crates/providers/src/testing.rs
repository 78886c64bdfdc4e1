//! Deterministic provider doubles for exercising the loop and the
//! knowledge index without network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use wingman_core::error::ProviderError;
use wingman_core::provider::{Embedder, Provider};

/// Returns scripted responses in order; errors with `EmptyResponse` once
/// the script runs out. Every (system, user) prompt pair is kept for
/// assertions.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
    ) -> std::result::Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((system.to_string(), user.to_string()));
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or(ProviderError::EmptyResponse)
    }
}

/// Bag-of-words hashing embedder. Texts sharing words land close in
/// cosine space, which is all the retrieval tests need.
#[derive(Default)]
pub struct HashingEmbedder;

const DIM: usize = 64;

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(
        &self,
        texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; DIM];
                for token in text.split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    vector[(hasher.finish() as usize) % DIM] += 1.0;
                }
                // CJK text rarely has whitespace; fall back to characters.
                if text.split_whitespace().count() <= 1 {
                    for ch in text.chars() {
                        let mut hasher = DefaultHasher::new();
                        ch.hash(&mut hasher);
                        vector[(hasher.finish() as usize) % DIM] += 1.0;
                    }
                }
                vector
            })
            .collect())
    }
}

/// Always fails with a network error. For exercising degraded paths.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(
        &self,
        _texts: &[String],
    ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::Network("embedding backend offline".into()))
    }
}
