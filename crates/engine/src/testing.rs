//! In-memory transport for exercising callers without a live engine.
//!
//! Used by this crate's tests and by downstream crates' dev-dependencies.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::transport::EngineTransport;

/// Canned-response transport. GETs answer from a route table and fall back
/// to an error object, matching how a real transport reports an engine that
/// is not there. POSTs answer `{"result": "success"}` unless a route is
/// registered, and every POST body is kept for assertions.
#[derive(Default)]
pub struct StubTransport {
    get_routes: Mutex<HashMap<String, Value>>,
    post_routes: Mutex<HashMap<String, Value>>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(&self, path: &str, response: Value) {
        self.get_routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), response);
    }

    pub fn on_post(&self, path: &str, response: Value) {
        self.post_routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), response);
    }

    /// All POSTs seen so far, in call order, as (path, body).
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The bodies POSTed to one path, in call order.
    pub fn posts_to(&self, path: &str) -> Vec<Value> {
        self.posts()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body)
            .collect()
    }
}

#[async_trait]
impl EngineTransport for StubTransport {
    async fn get(&self, path: &str, _query: &[(String, String)]) -> Value {
        self.get_routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({ "error": format!("connection refused: {path}") }))
    }

    async fn post(&self, path: &str, body: &Value) -> Value {
        self.posts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_string(), body.clone()));
        self.post_routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({ "result": "success" }))
    }
}
