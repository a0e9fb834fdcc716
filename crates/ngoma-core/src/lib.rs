//! Ngoma Core - Text-to-Music Generation Engine
//!
//! This crate provides the request-resolution and orchestration layer for an
//! ACE-Step based music generation service. The diffusion pipeline itself runs
//! out of process; this crate validates incoming requests, resolves the
//! prompt-vs-preset inputs, and serializes access to the shared pipeline.
//!
//! # Example
//!
//! ```ignore
//! use ngoma_core::{resolve, EngineConfig, GenerationRequest, MusicEngine};
//!
//! let engine = MusicEngine::new(EngineConfig::default())?;
//! engine.load_checkpoint().await?;
//!
//! let resolved = resolve(&request)?;
//! let result = engine.generate(resolved).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod resolver;

pub use catalog::{lookup, preset_names};
pub use config::{DevicePreference, EngineConfig, ResponseMode, ServerConfig};
pub use engine::{GenerationResult, MusicEngine};
pub use error::{Error, Result};
pub use pipeline::{AceStepBridge, GenerationOutput, Pipeline, PipelineInfo};
pub use resolver::{
    resolve, GenerationRequest, ResolveError, ResolvedParameters, INSTRUMENTAL_MARKER,
};
