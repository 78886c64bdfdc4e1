//! Request bodies for the engine's control endpoints.
//!
//! Optional fields are skipped when absent so the wire body only carries
//! what the caller actually set — the engine treats missing fields as
//! "leave unchanged".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/unit/{name}/equipment/{eq}/control`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentControl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_fault: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl EquipmentControl {
    pub fn power(on: bool) -> Self {
        Self {
            power: Some(on),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/unit/{name}/alter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitAlteration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Body of `POST /api/unit/{name}/mission`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionOrder {
    /// "add", "terminate", "postpone" or "adjust".
    pub action: String,
    /// "air", "sea", "adi", "ballistic", "sky_to_land" or "land_sea_to_sky".
    pub mission_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_old_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_time: Option<f64>,
}

/// Body of `POST /api/unit/{name}/platform/move_to_pos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub turn_g: f64,
}

/// Body of `POST /api/unit/{name}/platform/move_to_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToDirection {
    pub heading: f64,
    pub altitude: f64,
    pub speed: f64,
    pub turn_g: f64,
}

/// Body of `POST /api/unit/{name}/platform/patrol`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatrolOrder {
    pub airspace_name: String,
    pub altitude: f64,
    pub speed: f64,
}

/// Body of `POST /api/unit/{name}/platform/return_land`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLand {
    /// "直接返航" or "原路返航".
    pub land_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_name: Option<String>,
}

impl Default for ReturnLand {
    fn default() -> Self {
        Self {
            land_type: "直接返航".into(),
            airport_name: None,
        }
    }
}

/// Body of `POST /api/unit/{name}/platform/formation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationOrder {
    pub leader_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation_name: Option<String>,
}

/// Body of `POST /api/unit/{name}/jammer/{eq}/command`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JammerCommand {
    /// "SAECMCmd" (air-to-air) or "AGECMCmd" (air-to-ground).
    pub command: String,
    pub jam_type: i32,
    pub center_az: f64,
    pub center_el: f64,
    pub az_range: f64,
    pub el_range: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

impl Default for JammerCommand {
    fn default() -> Self {
        Self {
            command: "SAECMCmd".into(),
            jam_type: 1,
            center_az: 0.0,
            center_el: 0.0,
            az_range: 30.0,
            el_range: 15.0,
            duration: 60.0,
            target_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alteration_skips_unset_fields() {
        let body = serde_json::to_value(UnitAlteration {
            heading: Some(270.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_eq!(body["heading"], 270.0);
    }

    #[test]
    fn equipment_power_shorthand() {
        let body = serde_json::to_value(EquipmentControl::power(true)).unwrap();
        assert_eq!(body, serde_json::json!({"power": true}));
    }

    #[test]
    fn return_land_defaults_to_direct() {
        let body = serde_json::to_value(ReturnLand::default()).unwrap();
        assert_eq!(body["land_type"], "直接返航");
        assert!(body.get("airport_name").is_none());
    }
}
