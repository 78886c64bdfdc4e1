//! End-to-end loop tests over scripted LLM responses and a stubbed
//! engine transport. No network, no real model.

use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use wingman_agent::MissionLoop;
use wingman_config::KnowledgeConfig;
use wingman_core::state::Phase;
use wingman_engine::EngineApi;
use wingman_engine::replay::ReplayRecorder;
use wingman_engine::testing::StubTransport;
use wingman_knowledge::TacticalKnowledge;
use wingman_providers::testing::ScriptedProvider;
use wingman_skills::build_registry;

fn world() -> Value {
    json!({
        "sim_time": 42.0,
        "units": [{
            "unit_id": 1,
            "unit_name": "Alpha01",
            "forceside": "blue",
            "position": {"latitude": 30.0, "longitude": 120.0, "altitude": 5000.0},
            "orientation": {"heading": 90.0, "pitch": 0.0, "roll": 0.0},
            "speed": 250.0,
            "equipment": []
        }]
    })
}

fn empty_knowledge(dir: &Path) -> Arc<TacticalKnowledge> {
    Arc::new(TacticalKnowledge::new(
        KnowledgeConfig {
            embedding_model: "none".into(),
            chunk_size: 800,
            chunk_overlap: 100,
            top_k: 3,
            knowledge_dir: dir.join("knowledge_base"),
            index_dir: dir.join("vector_store"),
            categories_file: None,
        },
        None,
    ))
}

fn mission(
    stub: Arc<StubTransport>,
    provider: Arc<ScriptedProvider>,
    dir: &Path,
    max_iterations: u32,
) -> MissionLoop {
    let engine = Arc::new(EngineApi::new(
        stub,
        Arc::new(ReplayRecorder::with_session_id("itest")),
    ));
    let skills = Arc::new(build_registry(engine.clone()));
    MissionLoop::new(
        provider,
        engine,
        empty_knowledge(dir),
        skills,
        max_iterations,
        dir.join("replays"),
    )
}

fn patrol_decision() -> &'static str {
    r#"根据意图选择巡逻。
```json
{
    "analysis": "保持空域存在即可",
    "skills": [
        {"skill_name": "patrol_airspace", "params": {"unit_name": "Alpha01", "airspace_name": "PatrolA"}, "reason": "巡逻"}
    ]
}
```"#
}

#[tokio::test]
async fn patrol_task_runs_one_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    let provider = Arc::new(ScriptedProvider::new([
        "掌握空域，组织巡逻警戒。",
        patrol_decision(),
        r#"{"continue": false, "reason": "巡逻已部署"}"#,
    ]));
    let state = mission(stub.clone(), provider.clone(), dir.path(), 5)
        .run("在PatrolA空域组织巡逻")
        .await;

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.iteration_count, 1);
    assert!(!state.should_continue);
    let result = state.execution_result.as_deref().unwrap();
    assert!(result.contains("执行了 1 个技能，成功 1 个"), "{result}");
    assert!(result.contains("patrol_airspace"));

    // The engine actually received the patrol order.
    assert_eq!(stub.posts_to("/api/unit/Alpha01/platform/patrol").len(), 1);

    // One trace line per stage.
    for prefix in ["[Commander] ", "[Tactical] ", "[Executor] ", "[Observe] 完成: 巡逻已部署"] {
        assert!(
            state.messages.iter().any(|m| m.starts_with(prefix)),
            "missing trace line {prefix}"
        );
    }

    // Commander saw the situation and the no-knowledge marker.
    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].1.contains("仿真时间: 42"));
    assert!(calls[0].1.contains("Alpha01 [blue]"));
    assert!(calls[0].1.contains("（无相关战术知识）"));
    // Tactical got the live menu, not a placeholder.
    assert!(calls[1].0.contains("patrol_airspace"));
    assert!(!calls[1].0.contains("{skill_list}"));

    // Replay log written on the way out.
    assert!(dir.path().join("replays").join("replay_itest.json").exists());
}

#[tokio::test]
async fn iteration_ceiling_forces_termination() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    // No observe response scripted: the ceiling fires before the LLM is asked.
    let provider = Arc::new(ScriptedProvider::new(["意图", patrol_decision()]));
    let state = mission(stub, provider.clone(), dir.path(), 1)
        .run("巡逻")
        .await;

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.iteration_count, 1);
    assert!(
        state
            .messages
            .iter()
            .any(|m| m == "[Observe] 达到最大迭代次数，任务结束")
    );
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn unknown_skill_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    let decision = r#"```json
{
    "skills": [
        {"skill_name": "patrol_airspace", "params": {"unit_name": "Alpha01", "airspace_name": "A"}},
        {"skill_name": "warp_drive", "params": {}},
        {"skill_name": "fly_heading", "params": {"unit_name": "Alpha01", "heading": 90}}
    ]
}
```"#;
    let provider = Arc::new(ScriptedProvider::new([
        "意图",
        decision,
        r#"{"continue": false, "reason": "完成"}"#,
    ]));
    let state = mission(stub, provider, dir.path(), 5).run("巡逻").await;

    let result = state.execution_result.as_deref().unwrap();
    assert!(result.contains("执行了 3 个技能，成功 2 个"), "{result}");
    assert!(result.contains("  - warp_drive: 失败 - 未知技能: warp_drive"));
}

#[tokio::test]
async fn unparseable_decision_still_counts_an_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    let provider = Arc::new(ScriptedProvider::new([
        "意图",
        "我认为应该巡逻，但我拒绝输出JSON。",
        r#"{"continue": false, "reason": "放弃"}"#,
    ]));
    let state = mission(stub.clone(), provider, dir.path(), 5)
        .run("巡逻")
        .await;

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.iteration_count, 1);
    let result = state.execution_result.as_deref().unwrap();
    assert!(result.starts_with("无法解析技能决策: "), "{result}");
    assert!(
        state
            .messages
            .iter()
            .any(|m| m.starts_with("[Executor] 执行失败: 无法解析技能决策"))
    );
    assert!(stub.posts().is_empty());
}

#[tokio::test]
async fn observe_continue_loops_back_to_tactical() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    let provider = Arc::new(ScriptedProvider::new([
        "意图",
        patrol_decision(),
        r#"{"continue": true, "reason": "目标空域未覆盖", "next_action": "调整航线"}"#,
        patrol_decision(),
        r#"{"continue": false, "reason": "覆盖完成"}"#,
    ]));
    let state = mission(stub.clone(), provider.clone(), dir.path(), 5)
        .run("巡逻")
        .await;

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.iteration_count, 2);
    assert!(
        state
            .messages
            .iter()
            .any(|m| m == "[Observe] 继续: 目标空域未覆盖")
    );
    // Commander runs once; tactical twice.
    assert_eq!(provider.calls().len(), 5);
    assert_eq!(stub.posts_to("/api/unit/Alpha01/platform/patrol").len(), 2);
}

#[tokio::test]
async fn world_state_failure_ends_the_mission() {
    let dir = tempfile::tempdir().unwrap();
    // No routes: the world-state fetch comes back as an engine error.
    let stub = Arc::new(StubTransport::new());

    let provider = Arc::new(ScriptedProvider::new(["不应被调用"]));
    let state = mission(stub, provider.clone(), dir.path(), 5)
        .run("巡逻")
        .await;

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.iteration_count, 0);
    assert!(
        state
            .messages
            .iter()
            .any(|m| m.starts_with("[Commander] 无法获取战场态势"))
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn llm_failure_in_tactical_terminates_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let stub = Arc::new(StubTransport::new());
    stub.on_get("/api/world_state", world());

    // Script runs dry after the commander response.
    let provider = Arc::new(ScriptedProvider::new(["意图"]));
    let state = mission(stub, provider, dir.path(), 5).run("巡逻").await;

    assert_eq!(state.phase, Phase::Done);
    assert!(!state.should_continue);
    assert!(
        state
            .messages
            .iter()
            .any(|m| m.starts_with("[Tactical] 技能决策生成失败"))
    );
}
