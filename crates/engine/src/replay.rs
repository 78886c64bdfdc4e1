//! Replay recording — the append-only log of every remote call in a
//! session, persisted at loop end for reproducibility and audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;

/// One recorded remote call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Position in the session's call order, starting at 0.
    pub seq: usize,
    /// Wall-clock seconds since session start.
    pub timestamp: f64,
    /// Simulation time reported by the engine in this call's result.
    pub sim_time: f64,
    pub tool: String,
    pub params: Value,
    pub result: Value,
}

/// The persisted session document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySession {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub total_calls: usize,
    pub records: Vec<ReplayRecord>,
}

impl ReplaySession {
    /// Load a previously saved session file.
    pub fn load(path: &Path) -> std::io::Result<ReplaySession> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }
}

/// Records the remote call sequence of one session. Append-only,
/// single writer.
pub struct ReplayRecorder {
    session_id: String,
    start_time: DateTime<Utc>,
    start: Instant,
    records: Mutex<Vec<ReplayRecord>>,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::with_session_id(Utc::now().format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: Utc::now(),
            start: Instant::now(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Record one call. `sim_time` is pulled from the result payload when
    /// the engine reports it.
    pub fn record(&self, tool: &str, params: Value, result: &Value) {
        let sim_time = result
            .get("sim_time")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let seq = records.len();
        records.push(ReplayRecord {
            seq,
            timestamp: self.start.elapsed().as_secs_f64(),
            sim_time,
            tool: tool.to_string(),
            params,
            result: result.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the session to `<dir>/replay_<session_id>.json`.
    ///
    /// The file is written once at session end and never mutated after.
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let records = self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let session = ReplaySession {
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            total_calls: records.len(),
            records,
        };

        let path = dir.join(format!("replay_{}.json", self.session_id));
        let content = serde_json::to_string_pretty(&session).map_err(std::io::Error::other)?;
        std::fs::write(&path, content)?;
        info!(path = %path.display(), calls = session.total_calls, "Replay saved");
        Ok(path)
    }
}

impl Default for ReplayRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_preserve_call_order_and_seq() {
        let recorder = ReplayRecorder::with_session_id("test");
        recorder.record("get_world_state", json!({}), &json!({"sim_time": 1.5}));
        recorder.record(
            "alter_unit",
            json!({"unit_name": "Alpha01", "heading": 90.0}),
            &json!({"result": "success"}),
        );

        assert_eq!(recorder.len(), 2);
        let dir = tempfile::tempdir().unwrap();
        let path = recorder.save(dir.path()).unwrap();
        let session = ReplaySession::load(&path).unwrap();

        assert_eq!(session.session_id, "test");
        assert_eq!(session.total_calls, 2);
        assert_eq!(session.records[0].seq, 0);
        assert_eq!(session.records[0].tool, "get_world_state");
        assert_eq!(session.records[0].sim_time, 1.5);
        assert_eq!(session.records[1].seq, 1);
        assert_eq!(session.records[1].tool, "alter_unit");
        // Not reported by the engine -> defaults to 0
        assert_eq!(session.records[1].sim_time, 0.0);
    }

    #[test]
    fn save_names_file_after_session() {
        let recorder = ReplayRecorder::with_session_id("20260830_120000");
        let dir = tempfile::tempdir().unwrap();
        let path = recorder.save(dir.path()).unwrap();
        assert!(path.ends_with("replay_20260830_120000.json"));
    }

    #[test]
    fn empty_session_saves_cleanly() {
        let recorder = ReplayRecorder::with_session_id("empty");
        let dir = tempfile::tempdir().unwrap();
        let path = recorder.save(dir.path()).unwrap();
        let session = ReplaySession::load(&path).unwrap();
        assert_eq!(session.total_calls, 0);
        assert!(session.records.is_empty());
    }
}
