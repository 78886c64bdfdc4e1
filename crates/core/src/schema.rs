//! Battlespace schema — the wire types of the remote simulation engine.
//!
//! These map the engine's JSON payloads to Rust types. Units are looked up
//! by `unit_name` throughout the system (the name is the natural key);
//! equipment by `entity_name` within a unit.

use serde::{Deserialize, Serialize};

/// Geographic position: latitude/longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Attitude angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Equipment subsystem kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Radar,
    Jammer,
    Communication,
    WeaponSystem,
    Sensor,
    Platform,
    /// Anything the engine reports that we don't model.
    #[serde(other)]
    Unknown,
}

/// Equipment power/fault state. Transitions only via explicit control
/// calls to the engine — never inferred locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentStatus {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "FAULT")]
    Fault,
}

/// A subsystem attached to a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentInfo {
    #[serde(default)]
    pub entity_id: i64,
    pub entity_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub status: EquipmentStatus,
}

/// Summary row from `GET /api/units`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub unit_id: i64,
    pub unit_name: String,
    #[serde(default)]
    pub unit_type: String,
    #[serde(default)]
    pub forceside: String,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Full unit state from `GET /api/unit/{name}/state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitState {
    pub unit_id: i64,
    pub unit_name: String,
    #[serde(default)]
    pub unit_type: String,
    #[serde(default)]
    pub forceside: String,
    pub position: Position,
    pub orientation: Orientation,
    /// Speed in m/s, non-negative.
    pub speed: f64,
    #[serde(default = "default_true")]
    pub alive: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_commander_id")]
    pub commander_id: i64,
    #[serde(default)]
    pub commander_name: String,
    #[serde(default)]
    pub equipment: Vec<EquipmentInfo>,
}

fn default_true() -> bool {
    true
}

fn default_commander_id() -> i64 {
    -1
}

impl UnitState {
    /// All equipment entries of the given type. A unit may carry 0, 1 or
    /// many of a given kind.
    pub fn equipment_by_type(&self, kind: EquipmentType) -> Vec<&EquipmentInfo> {
        self.equipment
            .iter()
            .filter(|e| e.equipment_type == kind)
            .collect()
    }

    /// Exact-name lookup; `entity_name` is unique within a unit.
    pub fn equipment_by_name(&self, name: &str) -> Option<&EquipmentInfo> {
        self.equipment.iter().find(|e| e.entity_name == name)
    }
}

/// Snapshot of the full battlespace. Produced fresh on each query and
/// never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub sim_time: f64,
    #[serde(default)]
    pub units: Vec<UnitState>,
}

impl WorldState {
    pub fn unit_by_name(&self, name: &str) -> Option<&UnitState> {
        self.units.iter().find(|u| u.unit_name == name)
    }
}

/// Response shape of `GET /api/units`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsList {
    pub count: usize,
    #[serde(default)]
    pub units: Vec<UnitSummary>,
}

/// Response shape of `GET /api/simulation/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub status: String,
    #[serde(default)]
    pub sim_time: f64,
    #[serde(default)]
    pub http_server_running: bool,
}

/// Generic result of a control/alteration call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(default)]
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_time: Option<f64>,
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}
