//! Configuration loading and validation for Wingman.
//!
//! Loads `wingman.toml` (path overridable via `WINGMAN_CONFIG`) with
//! environment variable overrides for secrets. The configuration is an
//! explicit snapshot: it is loaded once per run and passed into
//! constructors — nothing re-reads files mid-task.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure. Maps directly to `wingman.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Simulation engine connection.
    #[serde(default)]
    pub engine: EngineConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent loop behaviour.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Tactical knowledge retrieval.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Replay persistence.
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_host")]
    pub host: String,

    #[serde(default = "default_engine_port")]
    pub port: u16,

    /// HTTP timeout in seconds for engine calls.
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: f64,
}

impl EngineConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: default_engine_host(),
            port: default_engine_port(),
            timeout_secs: default_engine_timeout(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint base URL.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// API key; `WINGMAN_API_KEY` overrides this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_top_p")]
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            top_p: default_llm_top_p(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("engine", &self.engine)
            .field("llm", &self.llm)
            .field("agent", &self.agent)
            .field("knowledge", &self.knowledge)
            .field("replay", &self.replay)
            .finish()
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Embedding model name passed to the embeddings endpoint.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Directory of .md/.json knowledge documents.
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,

    /// Where the vector index file is persisted.
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    /// Optional TOML file with the category -> filename-keyword table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories_file: Option<PathBuf>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            knowledge_dir: default_knowledge_dir(),
            index_dir: default_index_dir(),
            categories_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_replay_dir")]
    pub dir: PathBuf,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            dir: default_replay_dir(),
        }
    }
}

fn default_engine_host() -> String {
    "localhost".into()
}
fn default_engine_port() -> u16 {
    8080
}
fn default_engine_timeout() -> f64 {
    10.0
}
fn default_llm_api_url() -> String {
    // DashScope exposes an OpenAI-compatible surface
    "https://dashscope.aliyuncs.com/compatible-mode/v1".into()
}
fn default_llm_model() -> String {
    "qwen-plus".into()
}
fn default_llm_temperature() -> f32 {
    0.3
}
fn default_llm_top_p() -> f32 {
    0.8
}
fn default_max_iterations() -> u32 {
    50
}
fn default_embedding_model() -> String {
    "text-embedding-v3".into()
}
fn default_chunk_size() -> usize {
    800
}
fn default_chunk_overlap() -> usize {
    100
}
fn default_top_k() -> usize {
    3
}
fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("knowledge_base")
}
fn default_index_dir() -> PathBuf {
    PathBuf::from("vector_store")
}
fn default_replay_dir() -> PathBuf {
    PathBuf::from("replays")
}

impl AppConfig {
    /// Load from the default location: `$WINGMAN_CONFIG` if set, otherwise
    /// `wingman.toml` in the working directory. A missing file yields the
    /// built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WINGMAN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("wingman.toml"));
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file yields defaults; any
    /// other read error is surfaced.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<AppConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                AppConfig::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values for secrets.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WINGMAN_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.host.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.host must not be empty".into()));
        }
        if self.engine.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "engine.timeout_secs must be positive".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.knowledge.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "knowledge.chunk_size must be at least 1".into(),
            ));
        }
        if self.knowledge.chunk_overlap >= self.knowledge.chunk_size {
            return Err(ConfigError::Invalid(
                "knowledge.chunk_overlap must be smaller than chunk_size".into(),
            ));
        }
        if self.knowledge.top_k == 0 {
            return Err(ConfigError::Invalid(
                "knowledge.top_k must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.base_url(), "http://localhost:8080");
        assert_eq!(config.agent.max_iterations, 50);
        assert_eq!(config.knowledge.chunk_size, 800);
        assert_eq!(config.knowledge.top_k, 3);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load_from(Path::new("/definitely/not/here/wingman.toml")).unwrap();
        assert_eq!(config.llm.model, "qwen-plus");
    }

    #[test]
    fn load_from_file_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[engine]
host = "10.0.0.5"
port = 9090

[llm]
model = "qwen-max"
temperature = 0.1

[agent]
max_iterations = 8
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.engine.base_url(), "http://10.0.0.5:9090");
        assert_eq!(config.llm.model, "qwen-max");
        assert_eq!(config.agent.max_iterations, 8);
        // Untouched sections keep defaults
        assert_eq!(config.knowledge.chunk_overlap, 100);
    }

    #[test]
    fn invalid_overlap_rejected() {
        let mut config = AppConfig::default();
        config.knowledge.chunk_overlap = config.knowledge.chunk_size;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_iterations_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-secret".into());
        let out = format!("{config:?}");
        assert!(!out.contains("sk-secret"));
        assert!(out.contains("[REDACTED]"));
    }
}
