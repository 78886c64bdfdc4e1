//! Weapon employment: BVR attack sequence and engagement abort.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};
use wingman_core::schema::{EquipmentStatus, EquipmentType, UnitState};
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::{EngineApi, EquipmentControl};

use crate::args::{require_str, str_arg, u32_arg};
use crate::support::{fetch_state, push_action};

fn first_weapon_system(state: &UnitState, unit_name: &str) -> Result<String, SkillResult> {
    state
        .equipment_by_type(EquipmentType::WeaponSystem)
        .first()
        .map(|w| w.entity_name.clone())
        .ok_or_else(|| SkillResult::failure(format!("{unit_name} 未找到武器系统")))
}

pub struct BvrAttack {
    engine: Arc<EngineApi>,
}

impl BvrAttack {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    /// Full sequence: confirm weapon, gate on availability and munitions,
    /// resolve target id, radar on, lock, launch.
    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let target_name = require_str(args, "target_name")?;
        let launch_num = u32_arg(args, "launch_num").unwrap_or(1).max(1);

        let state = fetch_state(&self.engine, &unit_name).await?;
        let weapon_name = match str_arg(args, "weapon_name") {
            Some(name) => name,
            None => first_weapon_system(&state, &unit_name)?,
        };

        let status = self
            .engine
            .weapon_status(&unit_name, &weapon_name)
            .await
            .map_err(|e| SkillResult::failure(format!("无法获取武器状态: {e}")))?;
        if !status.get("available").and_then(Value::as_bool).unwrap_or(false) {
            return Err(SkillResult::failure("武器系统不可用"));
        }
        if !status.get("has_munition").and_then(Value::as_bool).unwrap_or(false) {
            return Err(SkillResult::failure("弹药已耗尽"));
        }

        let world = self
            .engine
            .world_state()
            .await
            .map_err(|e| SkillResult::failure(format!("无法获取战场态势: {e}")))?;
        let target_id = world
            .unit_by_name(&target_name)
            .map(|u| u.unit_id)
            .ok_or_else(|| SkillResult::failure(format!("未找到目标: {target_name}")))?;

        let mut actions = Vec::new();

        // Radar on so the shot has guidance; launch proceeds regardless.
        for radar in state.equipment_by_type(EquipmentType::Radar) {
            if radar.status == EquipmentStatus::On {
                continue;
            }
            let outcome = self
                .engine
                .control_equipment(&unit_name, &radar.entity_name, &EquipmentControl::power(true))
                .await;
            push_action(
                &mut actions,
                "control_equipment",
                json!({"equipment": radar.entity_name, "power": true}),
                &outcome,
            );
        }

        let lock_outcome = self
            .engine
            .weapon_lock(&unit_name, &weapon_name, target_id)
            .await;
        push_action(
            &mut actions,
            "weapon_lock_target",
            json!({"weapon_name": weapon_name, "target_id": target_id}),
            &lock_outcome,
        );
        info!("[Weapon] 锁定目标: {target_name}(ID={target_id})");

        let launch_outcome = self
            .engine
            .weapon_launch(&unit_name, &weapon_name, target_id, launch_num)
            .await;
        let success = push_action(
            &mut actions,
            "weapon_launch",
            json!({"weapon_name": weapon_name, "target_id": target_id, "launch_num": launch_num}),
            &launch_outcome,
        );
        warn!("[Weapon] 发射武器: {unit_name} -> {target_name}, 弹数={launch_num}");

        let description =
            format!("BVR攻击执行完成: {unit_name} 向 {target_name} 发射 {launch_num} 枚导弹");

        let mut data = serde_json::Map::new();
        data.insert("attacker".into(), json!(unit_name));
        data.insert("target".into(), json!(target_name));
        data.insert("target_id".into(), json!(target_id));
        data.insert("weapon".into(), json!(weapon_name));
        data.insert("launch_num".into(), json!(launch_num));

        Ok(SkillResult {
            success,
            description,
            actions_taken: actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for BvrAttack {
    fn name(&self) -> &str {
        "bvr_attack"
    }
    fn description(&self) -> &str {
        "BVR超视距攻击：雷达锁定+发射中距弹"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Weapon
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "target_name", "weapon_name", "launch_num"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct AbortEngagement {
    engine: Arc<EngineApi>,
}

impl AbortEngagement {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let weapon_name = match str_arg(args, "weapon_name") {
            Some(name) => name,
            None => {
                let state = fetch_state(&self.engine, &unit_name).await?;
                first_weapon_system(&state, &unit_name)?
            }
        };

        let mut actions = Vec::new();
        let outcome = self.engine.weapon_abort(&unit_name, &weapon_name).await;
        let success = push_action(
            &mut actions,
            "weapon_abort",
            json!({"weapon_name": weapon_name}),
            &outcome,
        );

        let description = format!("已中止交战: {unit_name}/{weapon_name}");
        info!("[Skill] {description}");

        Ok(SkillResult {
            success,
            description,
            actions_taken: actions,
            data: serde_json::Map::new(),
        })
    }
}

#[async_trait]
impl Skill for AbortEngagement {
    fn name(&self) -> &str {
        "abort_engagement"
    }
    fn description(&self) -> &str {
        "中止当前武器交战"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Weapon
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "weapon_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_engine::replay::ReplayRecorder;
    use wingman_engine::testing::StubTransport;

    fn armed_state() -> Value {
        json!({
            "unit_id": 1,
            "unit_name": "Alpha01",
            "position": {"latitude": 30.0, "longitude": 120.0, "altitude": 8000.0},
            "orientation": {"heading": 90.0, "pitch": 0.0, "roll": 0.0},
            "speed": 300.0,
            "equipment": [
                {"entity_id": 10, "entity_name": "FireControlRadar", "type": "radar", "status": "OFF"},
                {"entity_id": 20, "entity_name": "MissileBay", "type": "weapon_system", "status": "ON"}
            ]
        })
    }

    fn world_with_bandit() -> Value {
        json!({
            "sim_time": 42.0,
            "units": [{
                "unit_id": 7,
                "unit_name": "Bandit01",
                "forceside": "red",
                "position": {"latitude": 30.5, "longitude": 120.5, "altitude": 9000.0},
                "orientation": {"heading": 270.0, "pitch": 0.0, "roll": 0.0},
                "speed": 280.0,
                "equipment": []
            }]
        })
    }

    fn engine(stub: Arc<StubTransport>) -> Arc<EngineApi> {
        Arc::new(EngineApi::new(
            stub,
            Arc::new(ReplayRecorder::with_session_id("test")),
        ))
    }

    #[tokio::test]
    async fn bvr_attack_runs_the_full_sequence() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get("/api/unit/Alpha01/state", armed_state());
        stub.on_get(
            "/api/unit/Alpha01/weapon/MissileBay/status",
            json!({"available": true, "has_munition": true}),
        );
        stub.on_get("/api/world_state", world_with_bandit());

        let result = BvrAttack::new(engine(stub.clone()))
            .execute(&json!({"unit_name": "Alpha01", "target_name": "Bandit01", "launch_num": 2}))
            .await;

        assert!(result.success);
        assert_eq!(result.data["target_id"], 7);
        assert_eq!(result.data["weapon"], "MissileBay");

        // radar on -> lock -> launch, in that order
        let posts = stub.posts();
        assert_eq!(posts.len(), 3);
        assert!(posts[0].0.ends_with("/equipment/FireControlRadar/control"));
        assert!(posts[1].0.ends_with("/weapon/MissileBay/lock"));
        assert_eq!(posts[1].1["target_id"], 7);
        assert!(posts[2].0.ends_with("/weapon/MissileBay/launch"));
        assert_eq!(posts[2].1["launch_num"], 2);
    }

    #[tokio::test]
    async fn bvr_attack_gates_on_munitions() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get("/api/unit/Alpha01/state", armed_state());
        stub.on_get(
            "/api/unit/Alpha01/weapon/MissileBay/status",
            json!({"available": true, "has_munition": false}),
        );

        let result = BvrAttack::new(engine(stub.clone()))
            .execute(&json!({"unit_name": "Alpha01", "target_name": "Bandit01"}))
            .await;

        assert!(!result.success);
        assert!(result.description.contains("弹药已耗尽"));
        assert!(stub.posts().is_empty());
    }

    #[tokio::test]
    async fn bvr_attack_requires_a_weapon_system() {
        let stub = Arc::new(StubTransport::new());
        let mut state = armed_state();
        state["equipment"] = json!([]);
        stub.on_get("/api/unit/Alpha01/state", state);

        let result = BvrAttack::new(engine(stub))
            .execute(&json!({"unit_name": "Alpha01", "target_name": "Bandit01"}))
            .await;
        assert!(!result.success);
        assert!(result.description.contains("未找到武器系统"));
    }

    #[tokio::test]
    async fn abort_engagement_resolves_weapon_from_state() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get("/api/unit/Alpha01/state", armed_state());

        let result = AbortEngagement::new(engine(stub.clone()))
            .execute(&json!({"unit_name": "Alpha01"}))
            .await;

        assert!(result.success);
        assert_eq!(
            stub.posts_to("/api/unit/Alpha01/weapon/MissileBay/abort").len(),
            1
        );
        assert!(result.description.contains("MissileBay"));
    }
}
