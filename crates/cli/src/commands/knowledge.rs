//! `wingman knowledge` — Manage the tactical knowledge index.

use anyhow::Context;
use std::sync::Arc;
use wingman_config::AppConfig;
use wingman_core::provider::Embedder;
use wingman_knowledge::TacticalKnowledge;
use wingman_providers::OpenAiCompatEmbedder;

pub async fn rebuild(config: AppConfig) -> anyhow::Result<()> {
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiCompatEmbedder::new(
        &config.llm.api_url,
        config.llm.api_key.clone(),
        &config.knowledge.embedding_model,
    ));
    let knowledge = TacticalKnowledge::new(config.knowledge.clone(), Some(embedder));

    println!(
        "Rebuilding index from {} ...",
        config.knowledge.knowledge_dir.display()
    );
    let count = knowledge
        .rebuild()
        .await
        .context("knowledge index rebuild failed")?;
    println!(
        "✅ Indexed {count} chunk(s) into {}",
        config.knowledge.index_dir.join("index.json").display()
    );

    Ok(())
}
