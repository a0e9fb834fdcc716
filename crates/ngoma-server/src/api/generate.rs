//! Music generation endpoint

use axum::{
    body::Body,
    extract::State,
    http::{header, Response},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use ngoma_core::{resolve, GenerationRequest, ResponseMode};

/// Successful generation response (JSON mode).
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub audio_url: String,
    pub player_url: String,
}

/// Generate a music track from a prompt or genre preset.
///
/// Validation failures are rejected with a 422 before any pipeline work
/// starts; pipeline failures surface as 500s. Generation is all-or-nothing.
pub async fn generate_music(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Response<Body>, ApiError> {
    let resolved = resolve(&request)?;

    info!(
        prompt = %resolved.effective_prompt,
        duration = resolved.audio_duration,
        "Music generation request"
    );

    let result = state.engine.generate(resolved).await?;

    // The path is pipeline-controlled; only its basename becomes public.
    let filename = result
        .audio_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ApiError::internal("pipeline returned a path without a file name"))?
        .to_string();

    match state.response_mode {
        ResponseMode::Json => {
            let (audio_url, player_url) = public_urls(&filename);
            let response = GenerateResponse {
                message: "Music generated successfully".to_string(),
                audio_url,
                player_url,
            };
            Ok(Json(response).into_response())
        }
        ResponseMode::File => {
            let bytes = tokio::fs::read(&result.audio_path)
                .await
                .map_err(|e| ApiError::internal(format!("failed to read output file: {}", e)))?;
            Ok(Response::builder()
                .header(header::CONTENT_TYPE, format!("audio/{}", result.format))
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"generated_music.{}\"", result.format),
                )
                .body(Body::from(bytes))
                .map_err(|e| ApiError::internal(format!("failed to build response: {}", e)))?)
        }
    }
}

/// Static-asset and playback-page URLs for a generated file.
fn public_urls(filename: &str) -> (String, String) {
    (
        format!("/static/{}", filename),
        format!("/audio_player/{}", filename),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_share_the_basename() {
        let (audio_url, player_url) = public_urls("track_0001.wav");
        assert_eq!(audio_url, "/static/track_0001.wav");
        assert_eq!(player_url, "/audio_player/track_0001.wav");
    }

    #[test]
    fn response_serializes_expected_fields() {
        let response = GenerateResponse {
            message: "Music generated successfully".to_string(),
            audio_url: "/static/a.wav".to_string(),
            player_url: "/audio_player/a.wav".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["audio_url"], "/static/a.wav");
        assert_eq!(value["player_url"], "/audio_player/a.wav");
        assert_eq!(value["message"], "Music generated successfully");
    }
}
