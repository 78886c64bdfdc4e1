//! `wingman replay` — Inspect saved replay logs.

use anyhow::{Context, bail};
use wingman_config::AppConfig;
use wingman_engine::ReplaySession;

pub fn list(config: &AppConfig) -> anyhow::Result<()> {
    let dir = &config.replay.dir;
    if !dir.exists() {
        println!("No replays under {} yet.", dir.display());
        return Ok(());
    }

    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(dir).context("failed to read replay directory")? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with("replay_") || !name.ends_with(".json") {
            continue;
        }
        match ReplaySession::load(&path) {
            Ok(session) => sessions.push(session),
            Err(e) => println!("  ⚠️  {name}: unreadable ({e})"),
        }
    }
    sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    if sessions.is_empty() {
        println!("No replays under {} yet.", dir.display());
        return Ok(());
    }

    println!("{:<20} {:<24} {:>8}", "SESSION", "STARTED", "CALLS");
    for session in sessions {
        println!(
            "{:<20} {:<24} {:>8}",
            session.session_id,
            session.start_time.format("%Y-%m-%d %H:%M:%S"),
            session.total_calls
        );
    }

    Ok(())
}

pub fn show(config: &AppConfig, session_id: &str) -> anyhow::Result<()> {
    let path = config.replay.dir.join(format!("replay_{session_id}.json"));
    if !path.exists() {
        bail!("no replay {} (looked for {})", session_id, path.display());
    }
    let session = ReplaySession::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    println!(
        "Session {} — started {}, {} call(s)",
        session.session_id,
        session.start_time.format("%Y-%m-%d %H:%M:%S"),
        session.total_calls
    );
    println!();
    for record in &session.records {
        let outcome = record
            .result
            .get("result")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        println!(
            "{:>4}  t+{:<8.2} sim {:<8.1} {:<28} {}",
            record.seq, record.timestamp, record.sim_time, record.tool, outcome
        );
        println!("      params: {}", record.params);
    }

    Ok(())
}
