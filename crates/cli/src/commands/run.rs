//! `wingman run` — Execute one mission task through the decision loop.

use anyhow::bail;
use std::sync::Arc;
use wingman_agent::MissionLoop;
use wingman_config::AppConfig;
use wingman_core::provider::Embedder;
use wingman_engine::{EngineApi, HttpTransport, ReplayRecorder};
use wingman_knowledge::TacticalKnowledge;
use wingman_providers::{OpenAiCompatEmbedder, OpenAiCompatProvider};
use wingman_skills::build_registry;

pub async fn run(
    config: AppConfig,
    task: &str,
    max_iterations: Option<u32>,
) -> anyhow::Result<()> {
    // Check for API key early and give a clear error
    if config.llm.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No LLM API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export WINGMAN_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add llm.api_key to wingman.toml.");
        eprintln!();
        bail!("no API key found, see above for setup instructions");
    }

    let transport = Arc::new(HttpTransport::new(
        config.engine.base_url(),
        config.engine.timeout_secs,
    ));
    let engine = Arc::new(EngineApi::new(transport, Arc::new(ReplayRecorder::new())));

    if !engine.health_check().await {
        bail!(
            "simulation engine not reachable at {} (is it running?)",
            config.engine.base_url()
        );
    }

    let provider = Arc::new(OpenAiCompatProvider::new(
        &config.llm.api_url,
        config.llm.api_key.clone(),
        &config.llm.model,
        f64::from(config.llm.temperature),
        f64::from(config.llm.top_p),
    ));
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiCompatEmbedder::new(
        &config.llm.api_url,
        config.llm.api_key.clone(),
        &config.knowledge.embedding_model,
    ));
    let knowledge = Arc::new(TacticalKnowledge::new(
        config.knowledge.clone(),
        Some(embedder),
    ));
    let skills = Arc::new(build_registry(engine.clone()));

    let mission = MissionLoop::new(
        provider,
        engine,
        knowledge,
        skills,
        max_iterations.unwrap_or(config.agent.max_iterations),
        config.replay.dir.clone(),
    );

    let state = mission.run(task).await;

    println!();
    println!("=== 任务执行完毕 ===");
    println!("终止阶段: {}", state.phase);
    println!("迭代次数: {}/{}", state.iteration_count, state.max_iterations);
    if let Some(result) = &state.execution_result {
        println!("最终执行结果:\n{result}");
    }
    println!();
    println!("--- 决策轨迹 ---");
    for message in &state.messages {
        println!("{message}");
    }

    Ok(())
}
