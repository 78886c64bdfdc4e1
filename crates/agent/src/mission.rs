//! The mission loop itself.
//!
//! One `run` call drives a single task from commander analysis to
//! termination. Stages communicate only through [`AgentState`]; the loop
//! owns phase routing, so a stage can hand control anywhere by setting
//! `state.phase`. Termination paths: the observe stage decides the task
//! is done, the iteration ceiling is reached, or a stage hits an
//! unrecoverable failure (world state unavailable, LLM unreachable).
//! The replay log is saved on every path out.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use wingman_core::extract::extract_json;
use wingman_core::provider::Provider;
use wingman_core::skill::SkillRegistry;
use wingman_core::state::{AgentState, Phase, SkillDecision};
use wingman_engine::EngineApi;
use wingman_knowledge::TacticalKnowledge;

use crate::prompts;

pub struct MissionLoop {
    provider: Arc<dyn Provider>,
    engine: Arc<EngineApi>,
    knowledge: Arc<TacticalKnowledge>,
    skills: Arc<SkillRegistry>,
    max_iterations: u32,
    replay_dir: PathBuf,
}

impl MissionLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        engine: Arc<EngineApi>,
        knowledge: Arc<TacticalKnowledge>,
        skills: Arc<SkillRegistry>,
        max_iterations: u32,
        replay_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            engine,
            knowledge,
            skills,
            max_iterations,
            replay_dir: replay_dir.into(),
        }
    }

    /// Run one task to completion and return the final state.
    pub async fn run(&self, task: &str) -> AgentState {
        let mut state = AgentState::new(task, self.max_iterations);
        info!("[Agent] 开始执行任务: {task}");
        info!("[Agent] 最大迭代次数: {}", self.max_iterations);

        loop {
            match state.phase {
                Phase::Commander => self.commander(&mut state).await,
                Phase::Tactical => self.tactical(&mut state).await,
                Phase::Executor => self.executor(&mut state).await,
                Phase::Observe => self.observe(&mut state).await,
                Phase::Done => break,
            }
        }
        info!("[Agent] 任务执行完毕");

        match self.engine.recorder().save(&self.replay_dir) {
            Ok(path) => info!(path = %path.display(), "Replay saved"),
            Err(e) => warn!(error = %e, "Failed to save replay"),
        }

        state
    }

    fn finish(&self, state: &mut AgentState) {
        state.should_continue = false;
        state.phase = Phase::Done;
    }

    /// Commander stage: fetch the battlespace, retrieve tactical
    /// knowledge, and produce the tactical intent.
    async fn commander(&self, state: &mut AgentState) {
        info!("[Commander] 开始分析任务...");

        let world = match self.engine.world_state().await {
            Ok(world) => world,
            Err(e) => {
                let msg = format!("无法获取战场态势: {e}");
                error!("[Commander] {msg}");
                state.push_message(format!("[Commander] {msg}"));
                self.finish(state);
                return;
            }
        };
        let summary = prompts::situation_summary(&world);

        let knowledge = self.knowledge.context_for_task(&state.task).await;
        info!(
            "[Commander] 检索到 {} 字符战术知识",
            knowledge.chars().count()
        );

        let user = prompts::commander_user_prompt(&state.task, &summary, &knowledge);
        let intent = match self
            .provider
            .generate(prompts::COMMANDER_SYSTEM_PROMPT, &user)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                let msg = format!("战术意图生成失败: {e}");
                error!("[Commander] {msg}");
                state.push_message(format!("[Commander] {msg}"));
                self.finish(state);
                return;
            }
        };

        info!("[Commander] 战术意图已生成");
        state.push_message(format!("[Commander] {intent}"));
        state.tactical_intent = Some(intent);
        state.world_state_summary = Some(summary);
        state.phase = Phase::Tactical;
    }

    /// Tactical stage: present the skill menu and capture the decision.
    async fn tactical(&self, state: &mut AgentState) {
        info!("[Tactical] 开始战术决策...");

        let system =
            prompts::TACTICAL_SYSTEM_PROMPT_TEMPLATE.replace("{skill_list}", &self.skills.menu());
        let user = prompts::tactical_user_prompt(
            state.tactical_intent.as_deref().unwrap_or(""),
            state.world_state_summary.as_deref().unwrap_or(""),
        );

        let decision = match self.provider.generate(&system, &user).await {
            Ok(text) => text,
            Err(e) => {
                let msg = format!("技能决策生成失败: {e}");
                error!("[Tactical] {msg}");
                state.push_message(format!("[Tactical] {msg}"));
                self.finish(state);
                return;
            }
        };

        info!("[Tactical] 技能选择完成");
        state.push_message(format!("[Tactical] {decision}"));
        state.skill_decision = Some(decision);
        state.phase = Phase::Executor;
    }

    /// Executor stage: parse the decision and dispatch skills in order.
    /// An unparseable decision still counts as an iteration.
    async fn executor(&self, state: &mut AgentState) {
        info!("[Executor] 开始执行技能...");

        let decision_text = state.skill_decision.clone().unwrap_or_default();
        let decision = extract_json(&decision_text)
            .as_ref()
            .and_then(SkillDecision::from_value);

        let summary = match decision {
            None => {
                let preview: String = decision_text.chars().take(200).collect();
                let msg = format!("无法解析技能决策: {preview}");
                error!("[Executor] {msg}");
                state.push_message(format!("[Executor] 执行失败: {msg}"));
                msg
            }
            Some(decision) => {
                let summary = self.dispatch(&decision).await;
                info!("[Executor] {summary}");
                state.push_message(format!("[Executor] {summary}"));
                summary
            }
        };

        state.execution_result = Some(summary);
        state.iteration_count += 1;
        state.phase = Phase::Observe;
    }

    async fn dispatch(&self, decision: &SkillDecision) -> String {
        let mut lines = Vec::new();
        let mut success_count = 0usize;

        for invocation in &decision.skills {
            let name = &invocation.skill_name;
            let Some(skill) = self.skills.get(name) else {
                let err = format!("未知技能: {name}");
                warn!("[Executor] {err}");
                lines.push(format!("  - {name}: 失败 - {err}"));
                continue;
            };

            info!(
                "[Executor] 执行技能: {name}({}) - {}",
                serde_json::Value::Object(invocation.params.clone()),
                invocation.reason
            );
            let result = skill.execute(&Value::Object(invocation.params.clone())).await;
            info!(
                "[Executor] {name} -> {}: {}",
                if result.success { "成功" } else { "失败" },
                result.description
            );

            if result.success {
                success_count += 1;
                lines.push(format!("  - {name}: {}", result.description));
            } else {
                lines.push(format!("  - {name}: 失败 - {}", result.description));
            }
        }

        let mut summary = format!("执行了 {} 个技能，成功 {} 个", lines.len(), success_count);
        for line in lines {
            summary.push('\n');
            summary.push_str(&line);
        }
        summary
    }

    /// Observe stage: stop at the iteration ceiling, otherwise let the
    /// LLM judge completion. Anything unparseable terminates the loop;
    /// only an explicit `"continue": true` goes back to tactical.
    async fn observe(&self, state: &mut AgentState) {
        info!("[Observe] 评估执行结果...");

        if state.iteration_count >= state.max_iterations {
            warn!(
                "[Observe] 达到最大迭代次数 {}，强制结束",
                state.max_iterations
            );
            state.push_message("[Observe] 达到最大迭代次数，任务结束");
            self.finish(state);
            return;
        }

        let user = prompts::observe_user_prompt(
            &state.task,
            state.tactical_intent.as_deref().unwrap_or(""),
            state.execution_result.as_deref().unwrap_or(""),
            state.iteration_count,
            state.max_iterations,
        );
        let decision = match self
            .provider
            .generate(prompts::OBSERVE_SYSTEM_PROMPT, &user)
            .await
        {
            Ok(text) => extract_json(&text),
            Err(e) => {
                warn!("[Observe] 观察决策失败: {e}");
                None
            }
        };

        let should_continue = decision
            .as_ref()
            .and_then(|d| d.get("continue"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let reason = decision
            .as_ref()
            .and_then(|d| d.get("reason"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if should_continue {
            let reason = reason.unwrap_or_else(|| "需要继续执行".into());
            info!("[Observe] 继续执行: {reason}");
            state.push_message(format!("[Observe] 继续: {reason}"));
            state.should_continue = true;
            state.phase = Phase::Tactical;
        } else {
            let reason = reason.unwrap_or_else(|| "任务已完成".into());
            info!("[Observe] 任务结束: {reason}");
            state.push_message(format!("[Observe] 完成: {reason}"));
            self.finish(state);
        }
    }
}
