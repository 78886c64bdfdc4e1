//! Communication management: radio power and comm silence.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use wingman_core::schema::EquipmentType;
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::EngineApi;

use crate::args::{require_str, str_arg};
use crate::support::{fetch_state, toggle_equipment};

pub struct RadioPowerOn {
    engine: Arc<EngineApi>,
}

impl RadioPowerOn {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let radio_name = str_arg(args, "radio_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            radio_name.as_deref(),
            EquipmentType::Communication,
            true,
            &format!("{unit_name} 没有装备通信设备"),
        )
        .await?;

        let description = format!("{unit_name} 通信设备开机: {}", outcome.changed.join(", "));
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("activated_radios".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for RadioPowerOn {
    fn name(&self) -> &str {
        "radio_power_on"
    }
    fn description(&self) -> &str {
        "开启无线电通信"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Communication
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct RadioPowerOff {
    engine: Arc<EngineApi>,
}

impl RadioPowerOff {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let radio_name = str_arg(args, "radio_name");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let outcome = toggle_equipment(
            &self.engine,
            &state,
            radio_name.as_deref(),
            EquipmentType::Communication,
            false,
            &format!("{unit_name} 没有装备通信设备"),
        )
        .await?;

        let description = format!(
            "{unit_name} 通信设备关机（静默模式）: {}",
            outcome.changed.join(", ")
        );
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("deactivated_radios".into(), json!(outcome.changed));

        Ok(SkillResult {
            success: !outcome.changed.is_empty(),
            description,
            actions_taken: outcome.actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for RadioPowerOff {
    fn name(&self) -> &str {
        "radio_power_off"
    }
    fn description(&self) -> &str {
        "关闭无线电（通信静默）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Communication
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}
