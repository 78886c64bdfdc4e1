//! `wingman doctor` — Diagnose engine, LLM and knowledge health.

use std::path::PathBuf;
use std::sync::Arc;
use wingman_config::AppConfig;
use wingman_engine::{EngineApi, HttpTransport, ReplayRecorder};
use wingman_knowledge::{Categorizer, load_documents};
use wingman_providers::OpenAiCompatProvider;

pub async fn run(config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    println!("🩺 Wingman Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Config
    let load_result = match config_path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match load_result {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!();
            println!("  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    // API key
    if config.llm.api_key.is_some() {
        println!("  ✅ LLM API key configured");
    } else {
        println!("  ⚠️  No LLM API key — set WINGMAN_API_KEY or llm.api_key");
        issues += 1;
    }

    // Engine reachability
    let transport = Arc::new(HttpTransport::new(
        config.engine.base_url(),
        config.engine.timeout_secs,
    ));
    let engine = EngineApi::new(transport, Arc::new(ReplayRecorder::new()));
    if engine.health_check().await {
        println!("  ✅ Engine reachable at {}", config.engine.base_url());
        match engine.simulation_status().await {
            Ok(status) => println!(
                "  ✅ Simulation status: {} (sim_time {})",
                status.status, status.sim_time
            ),
            Err(e) => {
                println!("  ⚠️  Simulation status unavailable: {e}");
                issues += 1;
            }
        }
    } else {
        println!(
            "  ❌ Engine not reachable at {} — start the simulation first",
            config.engine.base_url()
        );
        issues += 1;
    }

    // LLM endpoint
    if config.llm.api_key.is_some() {
        let provider = OpenAiCompatProvider::new(
            &config.llm.api_url,
            config.llm.api_key.clone(),
            &config.llm.model,
            f64::from(config.llm.temperature),
            f64::from(config.llm.top_p),
        );
        if provider.health_check().await {
            println!("  ✅ LLM endpoint reachable ({})", config.llm.model);
        } else {
            println!("  ⚠️  LLM endpoint not reachable at {}", config.llm.api_url);
            issues += 1;
        }
    }

    // Knowledge corpus
    let categorizer = match &config.knowledge.categories_file {
        Some(path) => Categorizer::from_file(path),
        None => Categorizer::builtin(),
    };
    let docs = load_documents(&config.knowledge.knowledge_dir, &categorizer);
    if docs.is_empty() {
        println!(
            "  ⚠️  No knowledge documents under {} — retrieval will report none",
            config.knowledge.knowledge_dir.display()
        );
        issues += 1;
    } else {
        println!("  ✅ Knowledge corpus: {} document(s)", docs.len());
    }
    if config.knowledge.index_dir.join("index.json").exists() {
        println!("  ✅ Vector index present");
    } else {
        println!("  ⚠️  No vector index — run `wingman knowledge rebuild`");
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
