//! The external generation pipeline, treated as an opaque collaborator.
//!
//! The engine only ever sees this trait; the real implementation bridges to
//! an out-of-process ACE-Step daemon, and tests substitute a fake.

mod bridge;

pub use bridge::AceStepBridge;

use std::path::PathBuf;

use crate::error::Result;
use crate::resolver::ResolvedParameters;

/// Reported by the pipeline once its checkpoint is loaded.
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    /// Device the pipeline actually selected (e.g. "cuda", "cpu").
    pub device: String,
}

/// One completed generation. The audio file is owned by the pipeline and the
/// filesystem; callers derive a public filename from the path but never move
/// or delete it.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub audio_path: PathBuf,
    /// Generation metadata echoed back by the pipeline, if any.
    pub metadata: Option<serde_json::Value>,
}

/// Text-to-music generation pipeline.
///
/// Both methods block: `load_checkpoint` runs once at startup before traffic
/// is accepted, and `generate` runs for tens of seconds to minutes. Callers
/// are responsible for serializing `generate` calls; the underlying model
/// holds exclusive access to its accelerator device.
pub trait Pipeline: Send + Sync {
    fn load_checkpoint(&self) -> Result<PipelineInfo>;

    fn generate(&self, params: &ResolvedParameters) -> Result<GenerationOutput>;
}
