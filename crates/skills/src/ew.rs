//! Electronic warfare: jammer power management.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use wingman_core::schema::EquipmentType;
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::EngineApi;

use crate::args::{require_str, str_arg};
use crate::support::{fetch_state, toggle_equipment};

pub struct ActivateJammer {
    engine: Arc<EngineApi>,
}

impl ActivateJammer {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let jammer_name = str_arg(args, "jammer_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            jammer_name.as_deref(),
            EquipmentType::Jammer,
            true,
            &format!("{unit_name} 没有装备干扰机"),
        )
        .await?;

        let description = format!("{unit_name} 干扰机开启: {}", outcome.changed.join(", "));
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("activated_jammers".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for ActivateJammer {
    fn name(&self) -> &str {
        "activate_jammer"
    }
    fn description(&self) -> &str {
        "开启干扰机"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::ElectronicWarfare
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct DeactivateJammer {
    engine: Arc<EngineApi>,
}

impl DeactivateJammer {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let jammer_name = str_arg(args, "jammer_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            jammer_name.as_deref(),
            EquipmentType::Jammer,
            false,
            &format!("{unit_name} 没有装备干扰机"),
        )
        .await?;

        let description = format!("{unit_name} 干扰机关闭: {}", outcome.changed.join(", "));
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("deactivated_jammers".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for DeactivateJammer {
    fn name(&self) -> &str {
        "deactivate_jammer"
    }
    fn description(&self) -> &str {
        "关闭干扰机"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::ElectronicWarfare
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

    #[tokio::test]
    async fn named_jammer_must_exist() {
        let stub = Arc::new(StubTransport::new());
        stub.on_get(
            "/api/unit/Alpha01/state",
            json!({
                "unit_id": 1,
                "unit_name": "Alpha01",
                "position": {"latitude": 0.0, "longitude": 0.0, "altitude": 5000.0},
                "orientation": {"heading": 0.0, "pitch": 0.0, "roll": 0.0},
                "speed": 200.0,
                "equipment": [
                    {"entity_id": 11, "entity_name": "SelfDefenseJammer", "type": "jammer", "status": "OFF"}
                ]
            }),
        );
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        let result = ActivateJammer::new(engine.clone())
            .execute(&json!({"unit_name": "Alpha01", "jammer_name": "NoSuchPod"}))
            .await;
        assert!(!result.success);
        assert!(result.description.contains("未找到设备"));

        let result = ActivateJammer::new(engine)
            .execute(&json!({"unit_name": "Alpha01", "jammer_name": "SelfDefenseJammer"}))
            .await;
        assert!(result.success);
        assert_eq!(
            stub.posts_to("/api/unit/Alpha01/equipment/SelfDefenseJammer/control")
                .len(),
            1
        );
    }
}
