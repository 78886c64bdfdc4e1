//! Shared plumbing for skill implementations.

use serde_json::{Value, json};
use wingman_core::error::EngineError;
use wingman_core::schema::{ActionResult, EquipmentStatus, EquipmentType, UnitState};
use wingman_core::skill::{ActionRecord, SkillResult};
use wingman_engine::{EngineApi, EquipmentControl};

/// Fetch a unit's state, converting an engine fault into the skill-level
/// failure result every skill starts with.
pub(crate) async fn fetch_state(
    engine: &EngineApi,
    unit_name: &str,
) -> Result<UnitState, SkillResult> {
    engine
        .unit_state(unit_name)
        .await
        .map_err(|e| SkillResult::failure(format!("无法获取单元状态: {e}")))
}

/// Append one call attempt to the audit trail; returns whether the engine
/// reported success.
pub(crate) fn push_action(
    actions: &mut Vec<ActionRecord>,
    tool: &str,
    params: Value,
    outcome: &Result<ActionResult, EngineError>,
) -> bool {
    let result = match outcome {
        Ok(r) if r.result.is_empty() => "unknown".to_string(),
        Ok(r) => r.result.clone(),
        Err(e) => format!("error: {e}"),
    };
    actions.push(ActionRecord {
        tool: tool.to_string(),
        params,
        result,
    });
    matches!(outcome, Ok(r) if r.is_success())
}

pub(crate) struct ToggleOutcome {
    /// Equipment now in the desired state (switched or already there).
    pub changed: Vec<String>,
    pub actions: Vec<ActionRecord>,
}

/// Power-toggle a unit's equipment of one kind, or one named piece.
///
/// Equipment already in the desired state counts as done without issuing
/// a call. Errors on a named lookup or an empty equipment set come back
/// as ready-made failure results.
pub(crate) async fn toggle_equipment(
    engine: &EngineApi,
    state: &UnitState,
    explicit_name: Option<&str>,
    kind: EquipmentType,
    on: bool,
    missing_message: &str,
) -> Result<ToggleOutcome, SkillResult> {
    let targets = match explicit_name {
        Some(name) => match state.equipment_by_name(name) {
            Some(info) => vec![info],
            None => return Err(SkillResult::failure(format!("未找到设备: {name}"))),
        },
        None => state.equipment_by_type(kind),
    };

    if targets.is_empty() {
        return Err(SkillResult::failure(missing_message.to_string()));
    }

    let desired = if on {
        EquipmentStatus::On
    } else {
        EquipmentStatus::Off
    };

    let mut changed = Vec::new();
    let mut actions = Vec::new();
    for info in targets {
        if info.status == desired {
            changed.push(info.entity_name.clone());
            continue;
        }
        let outcome = engine
            .control_equipment(&state.unit_name, &info.entity_name, &EquipmentControl::power(on))
            .await;
        let ok = push_action(
            &mut actions,
            "control_equipment",
            json!({"equipment": info.entity_name, "power": on}),
            &outcome,
        );
        if ok {
            changed.push(info.entity_name.clone());
        }
    }

    Ok(ToggleOutcome { changed, actions })
}
