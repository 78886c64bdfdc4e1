//! Platform flight control: waypoint flight, patrol, return, formation,
//! combat spread.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::{
    EngineApi, FormationOrder, MoveToDirection, MoveToPosition, PatrolOrder, ReturnLand,
};

use crate::args::{f64_arg, require_f64, require_str, str_arg};
use crate::support::{fetch_state, push_action};

const DEFAULT_ALTITUDE: f64 = 5000.0;
const DEFAULT_SPEED: f64 = 200.0;
const DEFAULT_TURN_G: f64 = 3.0;

pub struct FlyToPosition {
    engine: Arc<EngineApi>,
}

impl FlyToPosition {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let latitude = require_f64(args, "latitude")?;
        let longitude = require_f64(args, "longitude")?;
        let altitude = f64_arg(args, "altitude").unwrap_or(DEFAULT_ALTITUDE);
        let speed = f64_arg(args, "speed").unwrap_or(DEFAULT_SPEED);

        let order = MoveToPosition {
            latitude,
            longitude,
            altitude,
            speed,
            turn_g: f64_arg(args, "turn_g").unwrap_or(DEFAULT_TURN_G),
        };
        let mut actions = Vec::new();
        let outcome = self.engine.move_to_position(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_move_to_pos",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = format!(
            "{unit_name} 飞往 ({latitude:.4}, {longitude:.4}) 高度{altitude}m 速度{speed}m/s"
        );
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
impl Skill for FlyToPosition {
    fn name(&self) -> &str {
        "fly_to_position"
    }
    fn description(&self) -> &str {
        "飞往指定经纬度坐标点（直接平台控制）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "latitude", "longitude", "altitude", "speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct FlyHeading {
    engine: Arc<EngineApi>,
}

impl FlyHeading {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let heading = require_f64(args, "heading")?.rem_euclid(360.0);
        let altitude = f64_arg(args, "altitude").unwrap_or(DEFAULT_ALTITUDE);
        let speed = f64_arg(args, "speed").unwrap_or(DEFAULT_SPEED);

        let order = MoveToDirection {
            heading,
            altitude,
            speed,
            turn_g: f64_arg(args, "turn_g").unwrap_or(DEFAULT_TURN_G),
        };
        let mut actions = Vec::new();
        let outcome = self.engine.move_to_direction(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_move_to_direction",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = format!("{unit_name} 按航向 {heading}° 飞行");
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
impl Skill for FlyHeading {
    fn name(&self) -> &str {
        "fly_heading"
    }
    fn description(&self) -> &str {
        "按指定航向飞行（度，0=北）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "heading", "altitude", "speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct PatrolAirspace {
    engine: Arc<EngineApi>,
}

impl PatrolAirspace {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let airspace_name = require_str(args, "airspace_name")?;
        let altitude = f64_arg(args, "altitude").unwrap_or(DEFAULT_ALTITUDE);
        let speed = f64_arg(args, "speed").unwrap_or(DEFAULT_SPEED);

        let order = PatrolOrder {
            airspace_name: airspace_name.clone(),
            altitude,
            speed,
        };
        let mut actions = Vec::new();
        let outcome = self.engine.patrol(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_patrol",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = format!("{unit_name} 在空域 {airspace_name} 巡逻");
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
impl Skill for PatrolAirspace {
    fn name(&self) -> &str {
        "patrol_airspace"
    }
    fn description(&self) -> &str {
        "在指定空域巡逻飞行"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "airspace_name", "altitude", "speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct ReturnToBase {
    engine: Arc<EngineApi>,
}

impl ReturnToBase {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let airport_name = str_arg(args, "airport_name");

        let order = ReturnLand {
            airport_name: airport_name.clone(),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.return_land(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_return_land",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = match &airport_name {
            Some(airport) => format!("{unit_name} 返航至 {airport}"),
            None => format!("{unit_name} 返航"),
        };
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
impl Skill for ReturnToBase {
    fn name(&self) -> &str {
        "return_to_base"
    }
    fn description(&self) -> &str {
        "返航着陆到基地"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "airport_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct JoinFormation {
    engine: Arc<EngineApi>,
}

impl JoinFormation {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let leader_name = require_str(args, "leader_name")?;

        let order = FormationOrder {
            leader_name: leader_name.clone(),
            formation_name: str_arg(args, "formation_name"),
        };
        let mut actions = Vec::new();
        let outcome = self.engine.formation(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_formation",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = format!("{unit_name} 加入 {leader_name} 的编队");
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
impl Skill for JoinFormation {
    fn name(&self) -> &str {
        "join_formation"
    }
    fn description(&self) -> &str {
        "加入编队跟随长机飞行"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "leader_name", "formation_name"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct CombatSpread {
    engine: Arc<EngineApi>,
}

impl CombatSpread {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let threat_bearing = require_f64(args, "threat_bearing")?;

        let state = fetch_state(&self.engine, &unit_name).await?;

        // Turn perpendicular to the threat axis.
        let spread_heading = (threat_bearing + 90.0).rem_euclid(360.0);
        let order = MoveToDirection {
            heading: spread_heading,
            altitude: f64_arg(args, "altitude").unwrap_or(state.position.altitude),
            speed: f64_arg(args, "speed").unwrap_or(state.speed),
            turn_g: 4.0,
        };
        let mut actions = Vec::new();
        let outcome = self.engine.move_to_direction(&unit_name, &order).await;
        let success = push_action(
            &mut actions,
            "platform_move_to_direction",
            serde_json::to_value(&order).unwrap_or_default(),
            &outcome,
        );

        let description = format!(
            "{unit_name} 面对威胁方位 {threat_bearing}° 横向展开至 {spread_heading}°"
        );
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
impl Skill for CombatSpread {
    fn name(&self) -> &str {
        "combat_spread"
    }
    fn description(&self) -> &str {
        "面对威胁方向横向战斗展开"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Flight
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "threat_bearing", "altitude", "speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}
