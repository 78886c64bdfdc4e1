//! Typed engine API — the surface the skills and the control loop call.
//!
//! Wraps a transport with endpoint knowledge, replay recording, and the
//! error-object-to-`Result` translation. Every call made through this type
//! lands in the session's replay log, in call order, whether it succeeded
//! or not.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};
use wingman_core::error::EngineError;
use wingman_core::schema::{ActionResult, SimulationStatus, UnitState, UnitsList, WorldState};

use crate::replay::ReplayRecorder;
use crate::requests::{
    EquipmentControl, FormationOrder, JammerCommand, MissionOrder, MoveToDirection,
    MoveToPosition, PatrolOrder, ReturnLand, UnitAlteration,
};
use crate::transport::EngineTransport;

pub struct EngineApi {
    transport: Arc<dyn EngineTransport>,
    recorder: Arc<ReplayRecorder>,
}

impl EngineApi {
    pub fn new(transport: Arc<dyn EngineTransport>, recorder: Arc<ReplayRecorder>) -> Self {
        Self {
            transport,
            recorder,
        }
    }

    pub fn recorder(&self) -> &Arc<ReplayRecorder> {
        &self.recorder
    }

    async fn call_get(&self, tool: &str, path: &str, params: Value) -> Value {
        let result = self.transport.get(path, &[]).await;
        self.recorder.record(tool, params, &result);
        result
    }

    async fn call_post(&self, tool: &str, path: &str, params: Value, body: &Value) -> Value {
        let result = self.transport.post(path, body).await;
        self.recorder.record(tool, params, &result);
        result
    }

    /// Error-object payloads become `EngineError::Remote`; everything else
    /// must parse as `T`.
    fn parse<T: DeserializeOwned>(value: Value) -> Result<T, EngineError> {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(EngineError::Remote(message.to_string()));
        }
        serde_json::from_value(value).map_err(|e| EngineError::UnexpectedPayload(e.to_string()))
    }

    /// For endpoints whose payload shape varies: keep the raw value but
    /// still surface error objects as errors.
    fn ensure_ok(value: Value) -> Result<Value, EngineError> {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(EngineError::Remote(message.to_string()));
        }
        Ok(value)
    }

    // --- queries ---

    /// True only if the engine explicitly reports an "ok" status.
    /// Not recorded in the replay — it is liveness probing, not a command.
    pub async fn health_check(&self) -> bool {
        let result = self.transport.get("/api/health", &[]).await;
        result.get("status").and_then(Value::as_str) == Some("ok")
    }

    pub async fn simulation_status(&self) -> Result<SimulationStatus, EngineError> {
        let result = self
            .call_get("get_simulation_status", "/api/simulation/status", json!({}))
            .await;
        Self::parse(result)
    }

    pub async fn world_state(&self) -> Result<WorldState, EngineError> {
        let result = self
            .call_get("get_world_state", "/api/world_state", json!({}))
            .await;
        let world: Result<WorldState, _> = Self::parse(result);
        if let Ok(w) = &world {
            debug!(units = w.units.len(), sim_time = w.sim_time, "World state fetched");
        }
        world
    }

    pub async fn unit_state(&self, unit_name: &str) -> Result<UnitState, EngineError> {
        let result = self
            .call_get(
                "get_unit_state",
                &format!("/api/unit/{unit_name}/state"),
                json!({ "unit_name": unit_name }),
            )
            .await;
        Self::parse(result)
    }

    pub async fn units_list(&self) -> Result<UnitsList, EngineError> {
        let result = self.call_get("get_units_list", "/api/units", json!({})).await;
        Self::parse(result)
    }

    pub async fn query_equipment(
        &self,
        unit_name: &str,
        equipment_name: &str,
    ) -> Result<Value, EngineError> {
        let result = self
            .call_get(
                "query_equipment",
                &format!("/api/unit/{unit_name}/equipment/{equipment_name}/query"),
                json!({ "unit_name": unit_name, "equipment_name": equipment_name }),
            )
            .await;
        Self::ensure_ok(result)
    }

    // --- control ---

    pub async fn control_equipment(
        &self,
        unit_name: &str,
        equipment_name: &str,
        control: &EquipmentControl,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(control);
        let result = self
            .call_post(
                "control_equipment",
                &format!("/api/unit/{unit_name}/equipment/{equipment_name}/control"),
                merged(unit_name, Some(equipment_name), &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn alter_unit(
        &self,
        unit_name: &str,
        alteration: &UnitAlteration,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(alteration);
        let result = self
            .call_post(
                "alter_unit",
                &format!("/api/unit/{unit_name}/alter"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn assign_mission(
        &self,
        unit_name: &str,
        order: &MissionOrder,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "assign_mission",
                &format!("/api/unit/{unit_name}/mission"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    // --- platform flight control ---

    pub async fn move_to_position(
        &self,
        unit_name: &str,
        order: &MoveToPosition,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "platform_move_to_pos",
                &format!("/api/unit/{unit_name}/platform/move_to_pos"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn move_to_direction(
        &self,
        unit_name: &str,
        order: &MoveToDirection,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "platform_move_to_direction",
                &format!("/api/unit/{unit_name}/platform/move_to_dir"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn patrol(
        &self,
        unit_name: &str,
        order: &PatrolOrder,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "platform_patrol",
                &format!("/api/unit/{unit_name}/platform/patrol"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn return_land(
        &self,
        unit_name: &str,
        order: &ReturnLand,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "platform_return_land",
                &format!("/api/unit/{unit_name}/platform/return_land"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn formation(
        &self,
        unit_name: &str,
        order: &FormationOrder,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(order);
        let result = self
            .call_post(
                "platform_formation",
                &format!("/api/unit/{unit_name}/platform/formation"),
                merged(unit_name, None, &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    // --- radar / jammer ---

    pub async fn radar_detail(
        &self,
        unit_name: &str,
        radar_name: &str,
    ) -> Result<Value, EngineError> {
        let result = self
            .call_get(
                "get_radar_detail",
                &format!("/api/unit/{unit_name}/radar/{radar_name}/detail"),
                json!({ "unit_name": unit_name, "radar_name": radar_name }),
            )
            .await;
        Self::ensure_ok(result)
    }

    pub async fn jammer_detail(
        &self,
        unit_name: &str,
        jammer_name: &str,
    ) -> Result<Value, EngineError> {
        let result = self
            .call_get(
                "get_jammer_detail",
                &format!("/api/unit/{unit_name}/jammer/{jammer_name}/detail"),
                json!({ "unit_name": unit_name, "jammer_name": jammer_name }),
            )
            .await;
        Self::ensure_ok(result)
    }

    pub async fn jammer_command(
        &self,
        unit_name: &str,
        jammer_name: &str,
        command: &JammerCommand,
    ) -> Result<ActionResult, EngineError> {
        let body = to_body(command);
        let result = self
            .call_post(
                "jammer_command",
                &format!("/api/unit/{unit_name}/jammer/{jammer_name}/command"),
                merged(unit_name, Some(jammer_name), &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    // --- weapons ---

    pub async fn weapon_status(
        &self,
        unit_name: &str,
        weapon_name: &str,
    ) -> Result<Value, EngineError> {
        let result = self
            .call_get(
                "get_weapon_status",
                &format!("/api/unit/{unit_name}/weapon/{weapon_name}/status"),
                json!({ "unit_name": unit_name, "weapon_name": weapon_name }),
            )
            .await;
        Self::ensure_ok(result)
    }

    pub async fn weapon_lock(
        &self,
        unit_name: &str,
        weapon_name: &str,
        target_id: i64,
    ) -> Result<ActionResult, EngineError> {
        let body = json!({ "target_id": target_id });
        let result = self
            .call_post(
                "weapon_lock_target",
                &format!("/api/unit/{unit_name}/weapon/{weapon_name}/lock"),
                merged(unit_name, Some(weapon_name), &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn weapon_launch(
        &self,
        unit_name: &str,
        weapon_name: &str,
        target_id: i64,
        launch_num: u32,
    ) -> Result<ActionResult, EngineError> {
        let body = json!({ "target_id": target_id, "launch_num": launch_num });
        warn!(
            unit = unit_name,
            weapon = weapon_name,
            target_id,
            launch_num,
            "WEAPON LAUNCH"
        );
        let result = self
            .call_post(
                "weapon_launch",
                &format!("/api/unit/{unit_name}/weapon/{weapon_name}/launch"),
                merged(unit_name, Some(weapon_name), &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    pub async fn weapon_abort(
        &self,
        unit_name: &str,
        weapon_name: &str,
    ) -> Result<ActionResult, EngineError> {
        let body = json!({});
        let result = self
            .call_post(
                "weapon_abort",
                &format!("/api/unit/{unit_name}/weapon/{weapon_name}/abort"),
                merged(unit_name, Some(weapon_name), &body),
                &body,
            )
            .await;
        Self::parse(result)
    }

    // --- comms ---

    pub async fn comm_detail(
        &self,
        unit_name: &str,
        comm_name: &str,
    ) -> Result<Value, EngineError> {
        let result = self
            .call_get(
                "get_comm_detail",
                &format!("/api/unit/{unit_name}/comm/{comm_name}/detail"),
                json!({ "unit_name": unit_name, "comm_name": comm_name }),
            )
            .await;
        Self::ensure_ok(result)
    }
}

fn to_body<T: serde::Serialize>(request: &T) -> Value {
    serde_json::to_value(request).unwrap_or_else(|_| json!({}))
}

/// Replay params: the request body annotated with the target names.
fn merged(unit_name: &str, equipment_name: Option<&str>, body: &Value) -> Value {
    let mut params = body.as_object().cloned().unwrap_or_default();
    params.insert("unit_name".into(), json!(unit_name));
    if let Some(eq) = equipment_name {
        params.insert("equipment_name".into(), json!(eq));
    }
    Value::Object(params)
}
