//! Radar operation: power on, power off (emission silence), search.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use wingman_core::schema::{EquipmentStatus, EquipmentType};
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::{EngineApi, EquipmentControl};

use crate::args::{require_str, str_arg};
use crate::support::{fetch_state, push_action, toggle_equipment};

pub struct RadarPowerOn {
    engine: Arc<EngineApi>,
}

impl RadarPowerOn {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let radar_name = str_arg(args, "radar_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            radar_name.as_deref(),
            EquipmentType::Radar,
            true,
            &format!("{unit_name} 没有装备雷达"),
        )
        .await?;

        let description = format!("{unit_name} 雷达开机: {}", outcome.changed.join(", "));
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("activated_radars".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for RadarPowerOn {
    fn name(&self) -> &str {
        "radar_power_on"
    }
    fn description(&self) -> &str {
        "开启雷达"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Sensor
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct RadarPowerOff {
    engine: Arc<EngineApi>,
}

impl RadarPowerOff {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let radar_name = str_arg(args, "radar_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            radar_name.as_deref(),
            EquipmentType::Radar,
            false,
            &format!("{unit_name} 没有装备雷达"),
        )
        .await?;

        let description = format!(
            "{unit_name} 雷达关机（静默模式）: {}",
            outcome.changed.join(", ")
        );
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("deactivated_radars".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for RadarPowerOff {
    fn name(&self) -> &str {
        "radar_power_off"
    }
    fn description(&self) -> &str {
        "关闭雷达（电磁静默）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Sensor
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct RadarSearch {
    engine: Arc<EngineApi>,
}

impl RadarSearch {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let radar_name = str_arg(args, "radar_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let radar = match &radar_name {
            Some(name) => state
                .equipment_by_name(name)
                .ok_or_else(|| SkillResult::failure(format!("未找到雷达: {name}")))?,
            None => *state
                .equipment_by_type(EquipmentType::Radar)
                .first()
                .ok_or_else(|| SkillResult::failure(format!("{unit_name} 没有装备雷达")))?,
        };
        let rname = radar.entity_name.clone();

        let mut actions = Vec::new();
        if radar.status != EquipmentStatus::On {
            let outcome = self
                .engine
                .control_equipment(&unit_name, &rname, &EquipmentControl::power(true))
                .await;
            push_action(
                &mut actions,
                "control_equipment",
                json!({"equipment": rname, "power": true}),
                &outcome,
            );
        }

        let query = self.engine.query_equipment(&unit_name, &rname).await;
        let (radar_state, query_status) = match query {
            Ok(value) => (value, "queried".to_string()),
            Err(e) => (json!({}), format!("error: {e}")),
        };
        actions.push(wingman_core::skill::ActionRecord {
            tool: "query_equipment".into(),
            params: json!({"equipment": rname}),
            result: query_status,
        });

        let description = format!("{unit_name} 雷达 {rname} 执行搜索");
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("radar_name".into(), json!(rname));
        data.insert("radar_state".into(), radar_state);

        Ok(SkillResult {
            success: true,
            description,
            actions_taken: actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for RadarSearch {
    fn name(&self) -> &str {
        "radar_search"
    }
    fn description(&self) -> &str {
        "雷达搜索（开启雷达并获取探测结果）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Sensor
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
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

    fn two_radar_state() -> Value {
        json!({
            "unit_id": 1,
            "unit_name": "Alpha01",
            "position": {"latitude": 30.0, "longitude": 120.0, "altitude": 5000.0},
            "orientation": {"heading": 0.0, "pitch": 0.0, "roll": 0.0},
            "speed": 250.0,
            "equipment": [
                {"entity_id": 10, "entity_name": "SearchRadar", "type": "radar", "status": "ON"},
                {"entity_id": 11, "entity_name": "FireControlRadar", "type": "radar", "status": "OFF"}
            ]
        })
    }

    fn engine(stub: Arc<StubTransport>) -> Arc<EngineApi> {
        Arc::new(EngineApi::new(
            stub,
            Arc::new(ReplayRecorder::with_session_id("test")),
        ))
    }

    #[tokio::test]
    async fn power_on_skips_already_running_radars() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get("/api/unit/Alpha01/state", two_radar_state());
        let result = RadarPowerOn::new(engine(stub.clone()))
            .execute(&json!({"unit_name": "Alpha01"}))
            .await;

        assert!(result.success);
        // Only the OFF radar gets a control call.
        assert_eq!(result.actions_taken.len(), 1);
        assert!(stub
            .posts_to("/api/unit/Alpha01/equipment/SearchRadar/control")
            .is_empty());
        assert_eq!(
            stub.posts_to("/api/unit/Alpha01/equipment/FireControlRadar/control")
                .len(),
            1
        );
        assert_eq!(
            result.data["activated_radars"],
            json!(["SearchRadar", "FireControlRadar"])
        );
    }

    #[tokio::test]
    async fn power_on_without_radar_fails() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get(
            "/api/unit/Alpha01/state",
            json!({
                "unit_id": 1,
                "unit_name": "Alpha01",
                "position": {"latitude": 0.0, "longitude": 0.0, "altitude": 0.0},
                "orientation": {"heading": 0.0, "pitch": 0.0, "roll": 0.0},
                "speed": 0.0,
                "equipment": []
            }),
        );
        let result = RadarPowerOn::new(engine(stub))
            .execute(&json!({"unit_name": "Alpha01"}))
            .await;
        assert!(!result.success);
        assert!(result.description.contains("没有装备雷达"));
    }

    #[tokio::test]
    async fn search_powers_on_then_queries() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get("/api/unit/Alpha01/state", two_radar_state());
        stub.on_get(
            "/api/unit/Alpha01/equipment/FireControlRadar/query",
            json!({"detections": []}),
        );

        let result = RadarSearch::new(engine(stub.clone()))
            .execute(&json!({"unit_name": "Alpha01", "radar_name": "FireControlRadar"}))
            .await;

        assert!(result.success);
        assert_eq!(result.actions_taken.len(), 2);
        assert_eq!(result.actions_taken[0].tool, "control_equipment");
        assert_eq!(result.actions_taken[1].tool, "query_equipment");
        assert_eq!(result.data["radar_name"], "FireControlRadar");
    }
}
