//! Request validation and parameter resolution.
//!
//! Resolution is a pure function of the incoming request: it enforces the
//! prompt-vs-preset mutual exclusion, applies the instrumental override, and
//! produces the canonical parameter set handed to the pipeline. It never
//! touches the filesystem, the model, or process state, so every validation
//! failure is reported before any generation work starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog;

/// Lyrics marker the pipeline interprets as "no vocals".
pub const INSTRUMENTAL_MARKER: &str = "[instrumental]";

/// Client-supplied generation request, pre-validation.
///
/// Every knob carries its default at the deserialization boundary; the
/// resolver performs no further defaulting on them. Numeric bounds are the
/// pipeline's responsibility.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,

    /// Named genre preset; must be a catalog key if present.
    #[serde(default)]
    pub genre_preset: Option<String>,

    #[serde(default)]
    pub lyrics: Option<String>,

    /// When true, lyrics are forced to the instrumental marker.
    #[serde(default = "default_true")]
    pub instrumental_only: bool,

    /// Output length in seconds.
    #[serde(default = "default_audio_duration")]
    pub audio_duration: f64,

    /// Denoising step count.
    #[serde(default = "default_infer_step")]
    pub infer_step: u32,

    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,

    #[serde(default = "default_guidance_interval")]
    pub guidance_interval: f64,

    #[serde(default)]
    pub guidance_interval_decay: f64,

    #[serde(default = "default_min_guidance_scale")]
    pub min_guidance_scale: f64,

    #[serde(default = "default_omega_scale")]
    pub omega_scale: f64,

    #[serde(default = "default_true")]
    pub use_erg_tag: bool,

    #[serde(default = "default_true")]
    pub use_erg_lyric: bool,

    #[serde(default = "default_true")]
    pub use_erg_diffusion: bool,

    #[serde(default = "default_cfg_type")]
    pub cfg_type: String,

    #[serde(default = "default_scheduler_type")]
    pub scheduler_type: String,

    /// Output container (wav, mp3, ogg).
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_true() -> bool {
    true
}

fn default_audio_duration() -> f64 {
    60.0
}

fn default_infer_step() -> u32 {
    60
}

fn default_guidance_scale() -> f64 {
    15.0
}

fn default_guidance_interval() -> f64 {
    0.5
}

fn default_min_guidance_scale() -> f64 {
    3.0
}

fn default_omega_scale() -> f64 {
    10.0
}

fn default_cfg_type() -> String {
    "apg".to_string()
}

fn default_scheduler_type() -> String {
    "euler".to_string()
}

fn default_format() -> String {
    "wav".to_string()
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: None,
            genre_preset: None,
            lyrics: None,
            instrumental_only: default_true(),
            audio_duration: default_audio_duration(),
            infer_step: default_infer_step(),
            guidance_scale: default_guidance_scale(),
            guidance_interval: default_guidance_interval(),
            guidance_interval_decay: 0.0,
            min_guidance_scale: default_min_guidance_scale(),
            omega_scale: default_omega_scale(),
            use_erg_tag: default_true(),
            use_erg_lyric: default_true(),
            use_erg_diffusion: default_true(),
            cfg_type: default_cfg_type(),
            scheduler_type: default_scheduler_type(),
            format: default_format(),
        }
    }
}

/// Validation failure at the resolution boundary. All variants are user
/// errors and map to a 422 at the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("both 'prompt' and 'genre_preset' were provided; supply exactly one")]
    ConflictingInput,

    #[error("either 'prompt' or 'genre_preset' is required")]
    MissingInput,

    #[error("unknown genre preset '{name}'; valid presets: {valid}")]
    UnknownPreset { name: String, valid: String },
}

impl ResolveError {
    fn unknown_preset(name: &str) -> Self {
        Self::UnknownPreset {
            name: name.to_string(),
            valid: catalog::preset_names().collect::<Vec<_>>().join(", "),
        }
    }
}

/// Fully validated, conflict-free parameter set handed to the pipeline.
/// Constructed once per request, consumed once by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParameters {
    pub effective_prompt: String,
    pub effective_lyrics: String,
    pub audio_duration: f64,
    pub infer_step: u32,
    pub guidance_scale: f64,
    pub guidance_interval: f64,
    pub guidance_interval_decay: f64,
    pub min_guidance_scale: f64,
    pub omega_scale: f64,
    pub use_erg_tag: bool,
    pub use_erg_lyric: bool,
    pub use_erg_diffusion: bool,
    pub cfg_type: String,
    pub scheduler_type: String,
    pub format: String,
}

/// Treat blank and whitespace-only strings as absent.
fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate a request and resolve it into a canonical parameter set.
///
/// Exactly one of `prompt` and `genre_preset` must be effectively set; the
/// preset (when given) is expanded through the catalog. When
/// `instrumental_only` is true the lyrics are forced to
/// [`INSTRUMENTAL_MARKER`], overriding any client-supplied lyrics. This is a
/// deliberate override, not a default.
pub fn resolve(request: &GenerationRequest) -> Result<ResolvedParameters, ResolveError> {
    let prompt = non_blank(&request.prompt);
    let preset = non_blank(&request.genre_preset);

    let effective_prompt = match (prompt, preset) {
        (Some(_), Some(_)) => return Err(ResolveError::ConflictingInput),
        (None, None) => return Err(ResolveError::MissingInput),
        (Some(prompt), None) => prompt.to_string(),
        (None, Some(preset)) => catalog::lookup(preset)
            .ok_or_else(|| ResolveError::unknown_preset(preset))?
            .to_string(),
    };

    let effective_lyrics = if request.instrumental_only {
        INSTRUMENTAL_MARKER.to_string()
    } else {
        request.lyrics.clone().unwrap_or_default()
    };

    Ok(ResolvedParameters {
        effective_prompt,
        effective_lyrics,
        audio_duration: request.audio_duration,
        infer_step: request.infer_step,
        guidance_scale: request.guidance_scale,
        guidance_interval: request.guidance_interval,
        guidance_interval_decay: request.guidance_interval_decay,
        min_guidance_scale: request.min_guidance_scale,
        omega_scale: request.omega_scale,
        use_erg_tag: request.use_erg_tag,
        use_erg_lyric: request.use_erg_lyric,
        use_erg_diffusion: request.use_erg_diffusion,
        cfg_type: request.cfg_type.clone(),
        scheduler_type: request.scheduler_type.clone(),
        format: request.format.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_prompt(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: Some(prompt.to_string()),
            ..GenerationRequest::default()
        }
    }

    fn with_preset(preset: &str) -> GenerationRequest {
        GenerationRequest {
            genre_preset: Some(preset.to_string()),
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn both_inputs_conflict() {
        let request = GenerationRequest {
            genre_preset: Some("Rock".to_string()),
            ..with_prompt("lofi chill")
        };
        assert_eq!(resolve(&request), Err(ResolveError::ConflictingInput));
    }

    #[test]
    fn neither_input_is_missing() {
        let request = GenerationRequest::default();
        assert_eq!(resolve(&request), Err(ResolveError::MissingInput));
    }

    #[test]
    fn blank_strings_count_as_absent() {
        let request = GenerationRequest {
            prompt: Some("  ".to_string()),
            genre_preset: Some(String::new()),
            ..GenerationRequest::default()
        };
        assert_eq!(resolve(&request), Err(ResolveError::MissingInput));
    }

    #[test]
    fn unknown_preset_lists_every_valid_name() {
        let err = resolve(&with_preset("Pop Rock")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Pop Rock"));
        for name in crate::catalog::preset_names() {
            assert!(message.contains(name), "message missing preset {name}");
        }
    }

    #[test]
    fn preset_expands_to_catalog_prompt() {
        let resolved = resolve(&with_preset("Jazz")).unwrap();
        assert_eq!(
            resolved.effective_prompt,
            "jazz, saxophone, piano, double bass, 90 bpm, smooth, improvisational, soulful"
        );
        assert_eq!(resolved.effective_lyrics, INSTRUMENTAL_MARKER);
    }

    #[test]
    fn prompt_passes_through_verbatim() {
        let resolved = resolve(&with_prompt("ambient drone, slow")).unwrap();
        assert_eq!(resolved.effective_prompt, "ambient drone, slow");
    }

    #[test]
    fn instrumental_overrides_supplied_lyrics() {
        let request = GenerationRequest {
            lyrics: Some("la la la".to_string()),
            instrumental_only: true,
            ..with_prompt("ambient")
        };
        let resolved = resolve(&request).unwrap();
        assert_eq!(resolved.effective_lyrics, INSTRUMENTAL_MARKER);
    }

    #[test]
    fn lyrics_pass_through_when_not_instrumental() {
        let request = GenerationRequest {
            lyrics: Some("la la".to_string()),
            instrumental_only: false,
            ..with_prompt("ambient")
        };
        let resolved = resolve(&request).unwrap();
        assert_eq!(resolved.effective_lyrics, "la la");
    }

    #[test]
    fn missing_lyrics_resolve_empty_when_not_instrumental() {
        let request = GenerationRequest {
            instrumental_only: false,
            ..with_prompt("ambient")
        };
        let resolved = resolve(&request).unwrap();
        assert_eq!(resolved.effective_lyrics, "");
    }

    #[test]
    fn resolve_is_idempotent() {
        let request = GenerationRequest {
            lyrics: Some("verse one".to_string()),
            instrumental_only: false,
            ..with_preset("Metal")
        };
        assert_eq!(resolve(&request).unwrap(), resolve(&request).unwrap());
    }

    #[test]
    fn knobs_pass_through_unchanged() {
        let request = GenerationRequest {
            audio_duration: 12.5,
            infer_step: 27,
            guidance_scale: 7.0,
            scheduler_type: "heun".to_string(),
            format: "mp3".to_string(),
            ..with_prompt("ambient")
        };
        let resolved = resolve(&request).unwrap();
        assert_eq!(resolved.audio_duration, 12.5);
        assert_eq!(resolved.infer_step, 27);
        assert_eq!(resolved.guidance_scale, 7.0);
        assert_eq!(resolved.scheduler_type, "heun");
        assert_eq!(resolved.format, "mp3");
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"genre_preset": "Jazz"}"#).unwrap();
        assert!(request.instrumental_only);
        assert_eq!(request.audio_duration, 60.0);
        assert_eq!(request.infer_step, 60);
        assert_eq!(request.guidance_scale, 15.0);
        assert_eq!(request.guidance_interval, 0.5);
        assert_eq!(request.guidance_interval_decay, 0.0);
        assert_eq!(request.min_guidance_scale, 3.0);
        assert_eq!(request.omega_scale, 10.0);
        assert!(request.use_erg_tag);
        assert!(request.use_erg_lyric);
        assert!(request.use_erg_diffusion);
        assert_eq!(request.cfg_type, "apg");
        assert_eq!(request.scheduler_type, "euler");
        assert_eq!(request.format, "wav");
    }
}
