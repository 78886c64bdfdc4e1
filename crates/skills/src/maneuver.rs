//! Basic flight maneuvers: climb, descend, turn, evade, intercept.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;
use wingman_core::schema::{EquipmentStatus, EquipmentType};
use wingman_core::skill::{Skill, SkillCategory, SkillResult};
use wingman_engine::{EngineApi, EquipmentControl, UnitAlteration};

use crate::args::{f64_arg, require_f64, require_str};
use crate::geo::{clamp, haversine_distance, initial_bearing};
use crate::support::{fetch_state, push_action};

pub struct ClimbAndAccelerate {
    engine: Arc<EngineApi>,
}

impl ClimbAndAccelerate {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let target_altitude = require_f64(args, "target_altitude")?;
        let target_speed = require_f64(args, "target_speed")?;
        let pitch_angle = f64_arg(args, "pitch_angle").unwrap_or(15.0);

        let state = fetch_state(&self.engine, &unit_name).await?;
        let current_alt = state.position.altitude;
        let current_speed = state.speed;

        let pitch_angle = clamp(pitch_angle, 0.0, 45.0);
        let target_speed = clamp(target_speed, 0.0, 1000.0);
        let target_altitude = clamp(target_altitude, 0.0, 30000.0);

        let alteration = UnitAlteration {
            altitude: Some(target_altitude),
            speed: Some(target_speed),
            pitch: Some(pitch_angle),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.alter_unit(&unit_name, &alteration).await;
        let success = push_action(
            &mut actions,
            "alter_unit",
            serde_json::to_value(&alteration).unwrap_or_default(),
            &outcome,
        );

        let description = format!(
            "{unit_name} 执行爬升加速: 高度 {current_alt:.0}m -> {target_altitude:.0}m, \
             速度 {current_speed:.1}m/s -> {target_speed:.1}m/s, 俯仰角 {pitch_angle:.1}°"
        );
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("target_altitude".into(), json!(target_altitude));
        data.insert("target_speed".into(), json!(target_speed));

        Ok(SkillResult {
            success,
            description,
            actions_taken: actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for ClimbAndAccelerate {
    fn name(&self) -> &str {
        "climb_and_accelerate"
    }
    fn description(&self) -> &str {
        "爬升并加速到指定高度和速度"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Maneuver
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "target_altitude", "target_speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct DescendAndDecelerate {
    engine: Arc<EngineApi>,
}

impl DescendAndDecelerate {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let target_altitude = require_f64(args, "target_altitude")?;
        let target_speed = require_f64(args, "target_speed")?;
        let pitch_angle = f64_arg(args, "pitch_angle").unwrap_or(-10.0);

        fetch_state(&self.engine, &unit_name).await?;

        let pitch_angle = clamp(pitch_angle, -45.0, 0.0);
        let target_speed = clamp(target_speed, 0.0, 1000.0);
        let target_altitude = clamp(target_altitude, 0.0, 30000.0);

        let alteration = UnitAlteration {
            altitude: Some(target_altitude),
            speed: Some(target_speed),
            pitch: Some(pitch_angle),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.alter_unit(&unit_name, &alteration).await;
        let success = push_action(
            &mut actions,
            "alter_unit",
            serde_json::to_value(&alteration).unwrap_or_default(),
            &outcome,
        );

        let description = format!(
            "{unit_name} 执行下降减速: 目标高度 {target_altitude:.0}m, 目标速度 {target_speed:.1}m/s"
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
impl Skill for DescendAndDecelerate {
    fn name(&self) -> &str {
        "descend_and_decelerate"
    }
    fn description(&self) -> &str {
        "下降并减速到指定高度和速度"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Maneuver
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "target_altitude", "target_speed"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct TurnToHeading {
    engine: Arc<EngineApi>,
}

impl TurnToHeading {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let target_heading = require_f64(args, "target_heading")?.rem_euclid(360.0);

        let state = fetch_state(&self.engine, &unit_name).await?;
        let current_heading = state.orientation.heading;

        let alteration = UnitAlteration {
            heading: Some(target_heading),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.alter_unit(&unit_name, &alteration).await;
        let success = push_action(
            &mut actions,
            "alter_unit",
            serde_json::to_value(&alteration).unwrap_or_default(),
            &outcome,
        );

        let description =
            format!("{unit_name} 转向: {current_heading:.1}° -> {target_heading:.1}°");
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
impl Skill for TurnToHeading {
    fn name(&self) -> &str {
        "turn_to_heading"
    }
    fn description(&self) -> &str {
        "转向到指定航向（度）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Maneuver
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "target_heading"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct EvadeMissile {
    engine: Arc<EngineApi>,
}

impl EvadeMissile {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let threat_bearing = f64_arg(args, "threat_bearing");

        let state = fetch_state(&self.engine, &unit_name).await?;
        let current_heading = state.orientation.heading;
        let current_alt = state.position.altitude;
        let current_speed = state.speed;

        // Turn roughly away from the threat; the asymmetric offset avoids a
        // pure tail chase. Without bearing information, break sideways.
        let evade_heading = match threat_bearing {
            Some(bearing) => (bearing + 150.0).rem_euclid(360.0),
            None => (current_heading + 90.0).rem_euclid(360.0),
        };
        let evade_alt = (current_alt - 1000.0).max(500.0);
        let evade_speed = (current_speed * 1.2).min(800.0);

        let alteration = UnitAlteration {
            heading: Some(evade_heading),
            altitude: Some(evade_alt),
            speed: Some(evade_speed),
            pitch: Some(-20.0),
            roll: Some(60.0),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.alter_unit(&unit_name, &alteration).await;
        let success = push_action(
            &mut actions,
            "alter_unit",
            serde_json::to_value(&alteration).unwrap_or_default(),
            &outcome,
        );

        // Best-effort: light up every jammer that is not already radiating.
        let jammers = state.equipment_by_type(EquipmentType::Jammer);
        for jammer in &jammers {
            if jammer.status == EquipmentStatus::On {
                continue;
            }
            let jammer_outcome = self
                .engine
                .control_equipment(&unit_name, &jammer.entity_name, &EquipmentControl::power(true))
                .await;
            push_action(
                &mut actions,
                "control_equipment",
                json!({"equipment": jammer.entity_name, "power": true}),
                &jammer_outcome,
            );
        }

        let description = format!(
            "{unit_name} 执行导弹规避: 航向 {current_heading:.1}° -> {evade_heading:.1}°, \
             高度 {current_alt:.0}m -> {evade_alt:.0}m, 速度 -> {evade_speed:.1}m/s, \
             干扰机已激活 {} 部",
            jammers.len()
        );
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("evade_heading".into(), json!(evade_heading));
        data.insert("jammers_activated".into(), json!(jammers.len()));

        Ok(SkillResult {
            success,
            description,
            actions_taken: actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for EvadeMissile {
    fn name(&self) -> &str {
        "evade_missile"
    }
    fn description(&self) -> &str {
        "规避来袭导弹（急转下降+开启干扰）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Maneuver
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "threat_bearing"]
    }
    async fn execute(&self, args: &Value) -> SkillResult {
        self.run(args).await.unwrap_or_else(|failure| failure)
    }
}

pub struct InterceptTarget {
    engine: Arc<EngineApi>,
}

impl InterceptTarget {
    pub fn new(engine: Arc<EngineApi>) -> Self {
        Self { engine }
    }

    async fn run(&self, args: &Value) -> Result<SkillResult, SkillResult> {
        let unit_name = require_str(args, "unit_name")?;
        let target_name = require_str(args, "target_name")?;
        let intercept_speed = f64_arg(args, "intercept_speed").unwrap_or(400.0);

        let state = fetch_state(&self.engine, &unit_name).await?;

        let world = self
            .engine
            .world_state()
            .await
            .map_err(|e| SkillResult::failure(format!("无法获取战场态势: {e}")))?;
        let target = world
            .unit_by_name(&target_name)
            .ok_or_else(|| SkillResult::failure(format!("未找到目标: {target_name}")))?;

        let intercept_heading = initial_bearing(
            state.position.latitude,
            state.position.longitude,
            target.position.latitude,
            target.position.longitude,
        );
        let distance = haversine_distance(
            state.position.latitude,
            state.position.longitude,
            target.position.latitude,
            target.position.longitude,
        );
        let target_alt = target.position.altitude;
        let intercept_speed = clamp(intercept_speed, 100.0, 800.0);

        let alteration = UnitAlteration {
            heading: Some(intercept_heading),
            altitude: Some(target_alt),
            speed: Some(intercept_speed),
            ..Default::default()
        };
        let mut actions = Vec::new();
        let outcome = self.engine.alter_unit(&unit_name, &alteration).await;
        let success = push_action(
            &mut actions,
            "alter_unit",
            serde_json::to_value(&alteration).unwrap_or_default(),
            &outcome,
        );

        // Radars on so the intercept geometry can be maintained.
        let radars = state.equipment_by_type(EquipmentType::Radar);
        for radar in &radars {
            if radar.status == EquipmentStatus::On {
                continue;
            }
            let radar_outcome = self
                .engine
                .control_equipment(&unit_name, &radar.entity_name, &EquipmentControl::power(true))
                .await;
            push_action(
                &mut actions,
                "control_equipment",
                json!({"equipment": radar.entity_name, "power": true}),
                &radar_outcome,
            );
        }

        let description = format!(
            "{unit_name} 执行截击: 航向 {intercept_heading:.1}°, 距离 {:.1}km, \
             速度 {intercept_speed:.1}m/s, 目标高度 {target_alt:.0}m",
            distance / 1000.0
        );
        info!("[Skill] {description}");

        let mut data = serde_json::Map::new();
        data.insert("intercept_heading".into(), json!(intercept_heading));
        data.insert("distance_m".into(), json!(distance));
        data.insert("radars_activated".into(), json!(radars.len()));

        Ok(SkillResult {
            success,
            description,
            actions_taken: actions,
            data,
        })
    }
}

#[async_trait]
impl Skill for InterceptTarget {
    fn name(&self) -> &str {
        "intercept_target"
    }
    fn description(&self) -> &str {
        "截击目标（调整航向+加速趋近）"
    }
    fn category(&self) -> SkillCategory {
        SkillCategory::Maneuver
    }
    fn param_names(&self) -> &[&str] {
        &["unit_name", "target_name"]
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

    fn alpha01_state() -> Value {
        json!({
            "unit_id": 1,
            "unit_name": "Alpha01",
            "forceside": "blue",
            "position": {"latitude": 30.0, "longitude": 120.0, "altitude": 5000.0},
            "orientation": {"heading": 90.0, "pitch": 0.0, "roll": 0.0},
            "speed": 300.0,
            "equipment": [
                {"entity_id": 10, "entity_name": "FireControlRadar", "type": "radar", "status": "OFF"},
                {"entity_id": 11, "entity_name": "SelfDefenseJammer", "type": "jammer", "status": "OFF"}
            ]
        })
    }

    fn engine_with(stub: StubTransport) -> Arc<EngineApi> {
        Arc::new(EngineApi::new(
            Arc::new(stub),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ))
    }

    #[tokio::test]
    async fn evade_missile_pins_the_evasion_numbers() {
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", alpha01_state());
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        let skill = EvadeMissile::new(engine);
        let result = skill
            .execute(&json!({"unit_name": "Alpha01", "threat_bearing": 300.0}))
            .await;

        assert!(result.success);
        // 300 + 150 wraps to 90; altitude 5000 - 1000; speed 300 * 1.2.
        assert_eq!(result.data["evade_heading"], json!(90.0));
        let alters = stub.posts_to("/api/unit/Alpha01/alter");
        assert_eq!(alters.len(), 1);
        assert_eq!(alters[0]["heading"], 90.0);
        assert_eq!(alters[0]["altitude"], 4000.0);
        assert_eq!(alters[0]["speed"], 360.0);
        assert_eq!(alters[0]["pitch"], -20.0);
        assert_eq!(alters[0]["roll"], 60.0);

        // The OFF jammer was powered on.
        let controls = stub.posts_to("/api/unit/Alpha01/equipment/SelfDefenseJammer/control");
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0]["power"], true);
        assert_eq!(result.actions_taken.len(), 2);
    }

    #[tokio::test]
    async fn evade_without_bearing_breaks_sideways() {
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", alpha01_state());
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        let result = EvadeMissile::new(engine)
            .execute(&json!({"unit_name": "Alpha01"}))
            .await;
        assert!(result.success);
        // current heading 90 + 90
        assert_eq!(result.data["evade_heading"], json!(180.0));
    }

    #[tokio::test]
    async fn evade_floors_altitude_at_500() {
        let mut state = alpha01_state();
        state["position"]["altitude"] = json!(1200.0);
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", state);
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        EvadeMissile::new(engine)
            .execute(&json!({"unit_name": "Alpha01"}))
            .await;
        let alters = stub.posts_to("/api/unit/Alpha01/alter");
        assert_eq!(alters[0]["altitude"], 500.0);
    }

    #[tokio::test]
    async fn climb_clamps_commanded_values() {
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", alpha01_state());
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        let result = ClimbAndAccelerate::new(engine)
            .execute(&json!({
                "unit_name": "Alpha01",
                "target_altitude": 99999,
                "target_speed": "2000",
                "pitch_angle": 80
            }))
            .await;

        assert!(result.success);
        let alters = stub.posts_to("/api/unit/Alpha01/alter");
        assert_eq!(alters[0]["altitude"], 30000.0);
        assert_eq!(alters[0]["speed"], 1000.0);
        assert_eq!(alters[0]["pitch"], 45.0);
    }

    #[tokio::test]
    async fn turn_normalizes_heading() {
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", alpha01_state());
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        TurnToHeading::new(engine)
            .execute(&json!({"unit_name": "Alpha01", "target_heading": 450.0}))
            .await;
        let alters = stub.posts_to("/api/unit/Alpha01/alter");
        assert_eq!(alters[0]["heading"], 90.0);
    }

    #[tokio::test]
    async fn intercept_resolves_target_from_world_state() {
        let stub = StubTransport::new();
        stub.on_get("/api/unit/Alpha01/state", alpha01_state());
        stub.on_get(
            "/api/world_state",
            json!({
                "sim_time": 10.0,
                "units": [
                    alpha01_state(),
                    {
                        "unit_id": 2,
                        "unit_name": "Bandit01",
                        "forceside": "red",
                        "position": {"latitude": 30.0, "longitude": 121.0, "altitude": 8000.0},
                        "orientation": {"heading": 270.0, "pitch": 0.0, "roll": 0.0},
                        "speed": 280.0,
                        "equipment": []
                    }
                ]
            }),
        );
        let stub = Arc::new(stub);
        let engine = Arc::new(EngineApi::new(
            stub.clone(),
            Arc::new(ReplayRecorder::with_session_id("test")),
        ));

        let result = InterceptTarget::new(engine)
            .execute(&json!({"unit_name": "Alpha01", "target_name": "Bandit01"}))
            .await;

        assert!(result.success);
        let alters = stub.posts_to("/api/unit/Alpha01/alter");
        // Target due east, same latitude: bearing ~90.
        let heading = alters[0]["heading"].as_f64().unwrap();
        assert!((heading - 90.0).abs() < 1.0, "heading was {heading}");
        assert_eq!(alters[0]["altitude"], 8000.0);
        assert_eq!(alters[0]["speed"], 400.0);
        // Radar powered on as part of the intercept.
        assert!(!stub
            .posts_to("/api/unit/Alpha01/equipment/FireControlRadar/control")
            .is_empty());
    }

    #[tokio::test]
    async fn intercept_unknown_target_fails() {
        let engine = engine_with({
            let s = StubTransport::new();
            s.on_get("/api/unit/Alpha01/state", alpha01_state());
            s.on_get("/api/world_state", json!({"sim_time": 1.0, "units": []}));
            s
        });

        let result = InterceptTarget::new(engine)
            .execute(&json!({"unit_name": "Alpha01", "target_name": "Ghost"}))
            .await;
        assert!(!result.success);
        assert!(result.description.contains("未找到目标"));
    }

    #[tokio::test]
    async fn unreachable_engine_fails_with_description() {
        let engine = engine_with(StubTransport::new());
        let result = TurnToHeading::new(engine)
            .execute(&json!({"unit_name": "Alpha01", "target_heading": 90.0}))
            .await;
        assert!(!result.success);
        assert!(result.description.contains("无法获取单元状态"));
    }
}
