//! Prompt text and builders for the loop stages.
//!
//! All prompts are Chinese; the engine operators and the knowledge corpus
//! are Chinese-language and the models in use follow Chinese instructions
//! more reliably here than translated ones.

use wingman_core::schema::WorldState;

pub const COMMANDER_SYSTEM_PROMPT: &str = r#"你是一名经验丰富的空战指挥官AI。你的职责是：

1. **理解任务**: 分析下达的任务指令，明确作战目标
2. **态势分析**: 基于当前世界态势数据，评估敌我态势
3. **知识参考**: 参考战术知识库中的条令、手册和历史案例
4. **生成战术意图**: 输出清晰的战术意图，指导后续战术决策

你只负责决策层面，不直接执行任何控制操作。

## 输出格式
你必须以如下JSON格式输出战术意图：
```json
{
    "mission_understanding": "对任务的理解",
    "situation_assessment": "态势评估",
    "knowledge_reference": "参考的战术知识要点",
    "tactical_intent": "战术意图描述",
    "priority_targets": ["优先目标列表"],
    "constraints": ["行动约束"],
    "recommended_approach": "建议采用的战术方案",
    "phase_plan": ["阶段1:...", "阶段2:...", "阶段3:..."]
}
```

## 约束
- 你不能直接修改任何物理状态
- 你只能基于提供的态势信息进行分析
- 所有决策必须基于可观察的态势数据
- 参考战术知识但灵活应用，不要生搬硬套
"#;

/// Tactical stage system prompt. `{skill_list}` is substituted with the
/// menu rendered from the live registry, never a hand-written list.
pub const TACTICAL_SYSTEM_PROMPT_TEMPLATE: &str = r#"你是一名战术AI参谋。你的职责是根据指挥官的战术意图，选择最合适的战术技能（Skill）并确定参数。

## 可用技能列表

{skill_list}

## 输出格式
你必须以如下JSON格式输出（可以选择多个技能顺序执行）：
```json
{
    "analysis": "对当前态势的战术分析",
    "skills": [
        {
            "skill_name": "技能名称",
            "params": {"参数名": "参数值"},
            "reason": "选择此技能的理由"
        }
    ]
}
```

## 约束
- 只选择上述列表中的技能
- 参数必须基于当前态势中的实际数据（单元名称、位置等）
- 考虑执行顺序的合理性（如先开雷达再截击）
"#;

pub const OBSERVE_SYSTEM_PROMPT: &str =
    "你是任务观察者。根据以下执行结果，判断任务是否已完成。";

/// One-line-per-unit situation summary fed to the commander and tactical
/// prompts.
pub fn situation_summary(world: &WorldState) -> String {
    let mut parts = vec![format!("仿真时间: {}", world.sim_time)];
    for unit in &world.units {
        let status = if unit.alive && unit.active {
            "存活/激活"
        } else if unit.alive {
            "存活/未激活"
        } else {
            "已摧毁"
        };
        parts.push(format!(
            "  - {} [{}] 状态:{} 位置:({:.4}, {:.4}, {:.0}m) 速度:{:.1}m/s 装备:{}件",
            unit.unit_name,
            unit.forceside,
            status,
            unit.position.latitude,
            unit.position.longitude,
            unit.position.altitude,
            unit.speed,
            unit.equipment.len(),
        ));
    }
    parts.join("\n")
}

pub fn commander_user_prompt(task: &str, summary: &str, knowledge: &str) -> String {
    format!(
        "## 当前任务\n{task}\n\n\
         ## 当前战场态势\n{summary}\n\n\
         ## 相关战术知识（来自知识库）\n{knowledge}\n\n\
         请分析态势，参考战术知识，输出战术意图。"
    )
}

pub fn tactical_user_prompt(intent: &str, summary: &str) -> String {
    format!(
        "## 指挥官战术意图\n{intent}\n\n\
         ## 当前战场态势\n{summary}\n\n\
         请选择合适的技能并确定参数。"
    )
}

pub fn observe_user_prompt(
    task: &str,
    intent: &str,
    execution_result: &str,
    iteration: u32,
    max_iterations: u32,
) -> String {
    format!(
        "## 原始任务\n{task}\n\n\
         ## 战术意图\n{intent}\n\n\
         ## 最近执行结果\n{execution_result}\n\n\
         ## 当前迭代次数\n{iteration}/{max_iterations}\n\n\
         请判断:\n\
         1. 如果任务目标已达成或当前步骤执行成功且不需要后续操作，回复 JSON: {{\"continue\": false, \"reason\": \"完成原因\"}}\n\
         2. 如果需要继续执行（如需要调整参数、切换战术等），回复 JSON: {{\"continue\": true, \"reason\": \"继续原因\", \"next_action\": \"建议的下一步\"}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_covers_every_unit_status() {
        let world: WorldState = serde_json::from_value(json!({
            "sim_time": 42.5,
            "units": [
                {
                    "unit_id": 1, "unit_name": "Alpha01", "forceside": "blue",
                    "position": {"latitude": 30.1234, "longitude": 120.5678, "altitude": 5000.0},
                    "orientation": {"heading": 0.0, "pitch": 0.0, "roll": 0.0},
                    "speed": 250.0, "alive": true, "active": true,
                    "equipment": [
                        {"entity_name": "FireControlRadar", "type": "radar", "status": "OFF"}
                    ]
                },
                {
                    "unit_id": 2, "unit_name": "Bandit01", "forceside": "red",
                    "position": {"latitude": 31.0, "longitude": 121.0, "altitude": 8000.0},
                    "orientation": {"heading": 180.0, "pitch": 0.0, "roll": 0.0},
                    "speed": 300.0, "alive": false, "active": false,
                    "equipment": []
                }
            ]
        }))
        .unwrap();

        let summary = situation_summary(&world);
        assert!(summary.starts_with("仿真时间: 42.5"));
        assert!(summary.contains("Alpha01 [blue] 状态:存活/激活"));
        assert!(summary.contains("位置:(30.1234, 120.5678, 5000m)"));
        assert!(summary.contains("速度:250.0m/s 装备:1件"));
        assert!(summary.contains("Bandit01 [red] 状态:已摧毁"));
    }

    #[test]
    fn tactical_template_takes_the_menu() {
        let prompt = TACTICAL_SYSTEM_PROMPT_TEMPLATE.replace("{skill_list}", "### 机动技能\n1. x");
        assert!(prompt.contains("### 机动技能"));
        assert!(!prompt.contains("{skill_list}"));
        // The JSON example braces survive the substitution.
        assert!(prompt.contains("\"skill_name\": \"技能名称\""));
    }

    #[test]
    fn observe_prompt_shows_iteration_budget() {
        let prompt = observe_user_prompt("巡逻", "保持空域", "执行了 1 个技能，成功 1 个", 1, 5);
        assert!(prompt.contains("## 当前迭代次数\n1/5"));
        assert!(prompt.contains("\"continue\": false"));
        assert!(prompt.contains("\"continue\": true"));
    }
}
