//! Generation engine: the shared pipeline handle plus the serialization
//! guard around it.
//!
//! The pipeline holds exclusive access to its accelerator device, so even
//! though the HTTP layer handles requests concurrently, generation calls are
//! funneled through a single-permit semaphore and run one at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::pipeline::{AceStepBridge, Pipeline, PipelineInfo};
use crate::resolver::ResolvedParameters;

/// One completed generation, as seen by the HTTP layer.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub request_id: String,
    /// Pipeline-owned output file. Public URLs are derived from its basename.
    pub audio_path: PathBuf,
    pub format: String,
}

/// Process-wide music generation engine. Constructed once at startup and
/// shared by all requests; the pipeline is injected so tests can substitute
/// a fake.
pub struct MusicEngine {
    pipeline: Arc<dyn Pipeline>,
    output_dir: PathBuf,
    gpu_slot: Semaphore,
    ready: AtomicBool,
}

impl MusicEngine {
    /// Create an engine backed by the ACE-Step daemon bridge.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let bridge = AceStepBridge::new(&config);
        Ok(Self::with_pipeline(&config, Arc::new(bridge)))
    }

    /// Create an engine with an explicit pipeline implementation.
    pub fn with_pipeline(config: &EngineConfig, pipeline: Arc<dyn Pipeline>) -> Self {
        Self {
            pipeline,
            output_dir: config.output_dir.clone(),
            gpu_slot: Semaphore::new(1),
            ready: AtomicBool::new(false),
        }
    }

    /// Load the model checkpoint. Blocking and one-time; must complete before
    /// the server accepts traffic.
    pub async fn load_checkpoint(&self) -> Result<PipelineInfo> {
        std::fs::create_dir_all(&self.output_dir)?;

        let pipeline = self.pipeline.clone();
        let info = tokio::task::spawn_blocking(move || pipeline.load_checkpoint())
            .await
            .map_err(|e| Error::Checkpoint(format!("checkpoint task panicked: {}", e)))??;

        self.ready.store(true, Ordering::Release);
        Ok(info)
    }

    /// Whether startup has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Run one generation. Acquires the single pipeline slot, so concurrent
    /// callers queue here; no retries, pipeline failures propagate as-is.
    pub async fn generate(&self, params: ResolvedParameters) -> Result<GenerationResult> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let format = params.format.clone();

        let _permit = self
            .gpu_slot
            .acquire()
            .await
            .map_err(|_| Error::Pipeline("engine is shutting down".to_string()))?;

        info!(
            request_id = %request_id,
            duration = params.audio_duration,
            steps = params.infer_step,
            "Starting generation"
        );

        let pipeline = self.pipeline.clone();
        let output = tokio::task::spawn_blocking(move || pipeline.generate(&params))
            .await
            .map_err(|e| Error::Pipeline(format!("generation task panicked: {}", e)))??;

        info!(request_id = %request_id, path = %output.audio_path.display(), "Generation complete");

        Ok(GenerationResult {
            request_id,
            audio_path: output.audio_path,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GenerationOutput;
    use crate::resolver::{resolve, GenerationRequest};
    use std::sync::atomic::AtomicUsize;

    struct FakePipeline {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakePipeline {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl Pipeline for FakePipeline {
        fn load_checkpoint(&self) -> Result<PipelineInfo> {
            Ok(PipelineInfo {
                device: "cpu".to_string(),
            })
        }

        fn generate(&self, params: &ResolvedParameters) -> Result<GenerationOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Pipeline("device error".to_string()));
            }
            Ok(GenerationOutput {
                audio_path: PathBuf::from(format!("/tmp/out/track_0001.{}", params.format)),
                metadata: None,
            })
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            output_dir: std::env::temp_dir().join("ngoma-engine-tests"),
            ..EngineConfig::default()
        }
    }

    fn ambient_params() -> ResolvedParameters {
        let request = GenerationRequest {
            prompt: Some("ambient".to_string()),
            ..GenerationRequest::default()
        };
        resolve(&request).unwrap()
    }

    #[tokio::test]
    async fn engine_reports_ready_after_checkpoint_load() {
        let config = test_config();
        let engine = MusicEngine::with_pipeline(&config, Arc::new(FakePipeline::new(false)));

        assert!(!engine.is_ready());
        let info = engine.load_checkpoint().await.unwrap();
        assert_eq!(info.device, "cpu");
        assert!(engine.is_ready());
    }

    #[tokio::test]
    async fn generate_returns_pipeline_path_and_format() {
        let config = test_config();
        let engine = MusicEngine::with_pipeline(&config, Arc::new(FakePipeline::new(false)));

        let result = engine.generate(ambient_params()).await.unwrap();
        assert_eq!(result.audio_path, PathBuf::from("/tmp/out/track_0001.wav"));
        assert_eq!(result.format, "wav");
        assert!(!result.request_id.is_empty());
    }

    #[tokio::test]
    async fn pipeline_failure_propagates() {
        let config = test_config();
        let engine = MusicEngine::with_pipeline(&config, Arc::new(FakePipeline::new(true)));

        let err = engine.generate(ambient_params()).await.unwrap_err();
        assert!(matches!(err, Error::Pipeline(_)));
    }

    #[tokio::test]
    async fn concurrent_generations_all_complete() {
        let config = test_config();
        let fake = Arc::new(FakePipeline::new(false));
        let engine = Arc::new(MusicEngine::with_pipeline(&config, fake.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = engine.clone();
            handles.push(tokio::spawn(
                async move { engine.generate(ambient_params()).await },
            ));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 4);
    }
}
