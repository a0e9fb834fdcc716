//! Configuration types for the Ngoma music generation service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the ACE-Step checkpoint.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,

    /// Directory the pipeline writes generated audio into. Served read-only
    /// under `/static`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Execution device preference, forwarded to the pipeline daemon.
    #[serde(default)]
    pub device: DevicePreference,

    /// Model dtype requested from the pipeline.
    #[serde(default = "default_dtype")]
    pub dtype: String,

    /// Python interpreter used to launch the pipeline daemon.
    #[serde(default = "default_python_cmd")]
    pub python_cmd: String,

    /// Path to the pipeline daemon script.
    #[serde(default = "default_daemon_script")]
    pub daemon_script: PathBuf,

    /// Unix socket the daemon listens on.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Per-call socket read timeout. Generation runs for minutes, so this
    /// must stay generous.
    #[serde(default = "default_generate_timeout_secs")]
    pub generate_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: default_checkpoint_dir(),
            output_dir: default_output_dir(),
            device: DevicePreference::default(),
            dtype: default_dtype(),
            python_cmd: default_python_cmd(),
            daemon_script: default_daemon_script(),
            socket_path: default_socket_path(),
            generate_timeout_secs: default_generate_timeout_secs(),
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => Some(PathBuf::from(raw.trim())),
        _ => None,
    }
}

fn default_checkpoint_dir() -> PathBuf {
    env_path("NGOMA_CHECKPOINT_DIR").unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ngoma")
            .join("checkpoints")
    })
}

fn default_output_dir() -> PathBuf {
    env_path("NGOMA_OUTPUT_DIR").unwrap_or_else(|| PathBuf::from("outputs"))
}

fn default_dtype() -> String {
    "bfloat16".to_string()
}

fn default_python_cmd() -> String {
    "python3".to_string()
}

fn default_daemon_script() -> PathBuf {
    PathBuf::from("scripts/acestep_daemon.py")
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/ngoma_acestep_daemon.sock")
}

fn default_generate_timeout_secs() -> u64 {
    600
}

/// Execution device preference. `Auto` picks CUDA when available and falls
/// back to CPU; the daemon reports the device it actually selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    #[default]
    Auto,
    Cuda,
    Cpu,
}

impl DevicePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePreference::Auto => "auto",
            DevicePreference::Cuda => "cuda",
            DevicePreference::Cpu => "cpu",
        }
    }

    pub fn from_env() -> Self {
        match std::env::var("NGOMA_DEVICE").as_deref() {
            Ok("cuda") => DevicePreference::Cuda,
            Ok("cpu") => DevicePreference::Cpu,
            _ => DevicePreference::Auto,
        }
    }
}

/// Shape of a successful `/generate_music` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// JSON body with static-asset and player URLs.
    #[default]
    Json,
    /// Raw audio bytes with a matching content type.
    File,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub response_mode: ResponseMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl ServerConfig {
    /// Build a config from `NGOMA_HOST` / `NGOMA_PORT` / `NGOMA_RESPONSE_MODE`,
    /// falling back to defaults on missing or unparseable values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("NGOMA_HOST") {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("NGOMA_PORT") {
            match raw.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => {
                    tracing::warn!("Invalid NGOMA_PORT='{}', falling back to {}", raw, config.port)
                }
            }
        }
        if let Ok(raw) = std::env::var("NGOMA_RESPONSE_MODE") {
            match raw.trim().to_lowercase().as_str() {
                "file" => config.response_mode = ResponseMode::File,
                "json" | "" => config.response_mode = ResponseMode::Json,
                other => tracing::warn!("Unknown NGOMA_RESPONSE_MODE='{}', using json", other),
            }
        }
        config
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}
