//! Bridge to the ACE-Step pipeline daemon.
//!
//! The diffusion model runs in a persistent Python process so the checkpoint
//! is loaded exactly once. The bridge speaks length-prefixed JSON frames over
//! a Unix socket: `check`, `load_checkpoint`, `generate`, `shutdown`.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::pipeline::{GenerationOutput, Pipeline, PipelineInfo};
use crate::resolver::ResolvedParameters;

/// Request frame sent to the daemon.
#[derive(Debug, Serialize)]
struct DaemonRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checkpoint_dir: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dtype: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a ResolvedParameters>,
}

impl<'a> DaemonRequest<'a> {
    fn command(command: &'a str) -> Self {
        Self {
            command,
            checkpoint_dir: None,
            output_dir: None,
            device: None,
            dtype: None,
            params: None,
        }
    }
}

/// Response frame received from the daemon.
#[derive(Debug, Deserialize)]
struct DaemonResponse {
    status: Option<String>,
    device: Option<String>,
    audio_path: Option<String>,
    metadata: Option<serde_json::Value>,
    error: Option<String>,
}

/// Pipeline implementation backed by the out-of-process ACE-Step daemon.
pub struct AceStepBridge {
    checkpoint_dir: PathBuf,
    output_dir: PathBuf,
    device: String,
    dtype: String,
    socket_path: PathBuf,
    daemon_script: PathBuf,
    python_cmd: String,
    generate_timeout: Duration,
    daemon_process: Mutex<Option<Child>>,
}

impl AceStepBridge {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            checkpoint_dir: config.checkpoint_dir.clone(),
            output_dir: config.output_dir.clone(),
            device: config.device.as_str().to_string(),
            dtype: config.dtype.clone(),
            socket_path: config.socket_path.clone(),
            daemon_script: config.daemon_script.clone(),
            python_cmd: config.python_cmd.clone(),
            generate_timeout: Duration::from_secs(config.generate_timeout_secs),
            daemon_process: Mutex::new(None),
        }
    }

    fn is_daemon_running(&self) -> bool {
        self.socket_path.exists() && self.connect().is_ok()
    }

    /// Start the daemon process if it is not already listening.
    fn ensure_daemon_running(&self) -> Result<()> {
        if self.is_daemon_running() {
            debug!("ACE-Step daemon already running");
            return Ok(());
        }

        info!("Starting ACE-Step daemon...");

        let child = Command::new(&self.python_cmd)
            .arg(&self.daemon_script)
            .arg("--socket")
            .arg(&self.socket_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Pipeline(format!("Failed to start daemon: {}", e)))?;

        {
            let mut guard = self.daemon_process.lock().unwrap();
            *guard = Some(child);
        }

        // Wait for the socket to come up (up to 30 seconds; the Python
        // runtime imports torch before listening).
        for _ in 0..300 {
            std::thread::sleep(Duration::from_millis(100));
            if self.socket_path.exists() {
                if let Ok(mut stream) = self.connect() {
                    if self
                        .send_request(&mut stream, &DaemonRequest::command("check"))
                        .is_ok()
                    {
                        info!("ACE-Step daemon started");
                        return Ok(());
                    }
                }
            }
        }

        Err(Error::Pipeline(
            "Daemon failed to start within 30 seconds".to_string(),
        ))
    }

    /// Stop the daemon and clean up its socket.
    pub fn stop_daemon(&self) -> Result<()> {
        if self.is_daemon_running() {
            info!("Stopping ACE-Step daemon...");
            if let Ok(mut stream) = self.connect() {
                let _ = self.send_request(&mut stream, &DaemonRequest::command("shutdown"));
            }
        }

        {
            let mut guard = self.daemon_process.lock().unwrap();
            if let Some(mut child) = guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }

        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }

        Ok(())
    }

    fn connect(&self) -> Result<UnixStream> {
        let stream = UnixStream::connect(&self.socket_path)
            .map_err(|e| Error::Pipeline(format!("Failed to connect to daemon: {}", e)))?;

        stream.set_read_timeout(Some(self.generate_timeout)).ok();
        stream.set_write_timeout(Some(Duration::from_secs(30))).ok();

        Ok(stream)
    }

    /// Send one length-prefixed JSON frame and read the reply frame.
    fn send_request(
        &self,
        stream: &mut UnixStream,
        request: &DaemonRequest<'_>,
    ) -> Result<DaemonResponse> {
        let request_json = serde_json::to_string(request)?;

        let data = request_json.as_bytes();
        let length = (data.len() as u32).to_be_bytes();

        stream
            .write_all(&length)
            .map_err(|e| Error::Pipeline(format!("Failed to write length: {}", e)))?;
        stream
            .write_all(data)
            .map_err(|e| Error::Pipeline(format!("Failed to write request: {}", e)))?;
        stream
            .flush()
            .map_err(|e| Error::Pipeline(format!("Failed to flush: {}", e)))?;

        let mut length_buf = [0u8; 4];
        stream
            .read_exact(&mut length_buf)
            .map_err(|e| Error::Pipeline(format!("Failed to read response length: {}", e)))?;
        let response_len = u32::from_be_bytes(length_buf) as usize;

        let mut response_buf = vec![0u8; response_len];
        stream
            .read_exact(&mut response_buf)
            .map_err(|e| Error::Pipeline(format!("Failed to read response body: {}", e)))?;

        serde_json::from_slice(&response_buf).map_err(|e| {
            Error::Pipeline(format!(
                "Failed to parse response: {} - {}",
                e,
                String::from_utf8_lossy(&response_buf)
            ))
        })
    }

    fn call(&self, request: &DaemonRequest<'_>) -> Result<DaemonResponse> {
        self.ensure_daemon_running()?;
        let mut stream = self.connect()?;
        let mut response = self.send_request(&mut stream, request)?;
        if let Some(err) = response.error.take() {
            return Err(Error::Pipeline(err));
        }
        Ok(response)
    }
}

impl Pipeline for AceStepBridge {
    fn load_checkpoint(&self) -> Result<PipelineInfo> {
        let checkpoint_dir = self.checkpoint_dir.to_string_lossy().to_string();
        let output_dir = self.output_dir.to_string_lossy().to_string();

        let request = DaemonRequest {
            checkpoint_dir: Some(&checkpoint_dir),
            output_dir: Some(&output_dir),
            device: Some(&self.device),
            dtype: Some(&self.dtype),
            ..DaemonRequest::command("load_checkpoint")
        };

        let response = self
            .call(&request)
            .map_err(|e| Error::Checkpoint(e.to_string()))?;

        if response.status.as_deref() != Some("ok") {
            return Err(Error::Checkpoint(format!(
                "unexpected daemon status: {:?}",
                response.status
            )));
        }

        let device = response.device.unwrap_or_else(|| "unknown".to_string());
        info!("ACE-Step checkpoint loaded on device: {}", device);

        Ok(PipelineInfo { device })
    }

    fn generate(&self, params: &ResolvedParameters) -> Result<GenerationOutput> {
        debug!(
            "Dispatching generation to daemon: {:.0}s of {}",
            params.audio_duration, params.format
        );

        let request = DaemonRequest {
            params: Some(params),
            ..DaemonRequest::command("generate")
        };

        let response = self.call(&request)?;

        let audio_path = response
            .audio_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Pipeline("No audio path in daemon response".to_string()))?;

        Ok(GenerationOutput {
            audio_path: PathBuf::from(audio_path),
            metadata: response.metadata,
        })
    }
}

impl Drop for AceStepBridge {
    fn drop(&mut self) {
        // The daemon persists across bridge lifetimes so the checkpoint stays
        // warm. Call stop_daemon() explicitly to tear it down.
    }
}
