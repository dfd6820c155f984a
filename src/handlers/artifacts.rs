use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::storage::StorageError;
use crate::errors::app_error::AppResult;
use crate::state::AppState;

const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Response body for a stored artifact
#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    pub id: String,
    pub url: String,
    pub expires_in_minutes: u64,
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "wav" | "wave" => WAV_CONTENT_TYPE,
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Attach audio headers; `filename` adds a download disposition.
fn audio_headers(content_type: &'static str, len: usize, filename: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(len) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, len);
    }
    if let Some(name) = filename {
        if let Ok(disposition) = HeaderValue::from_str(&format!("attachment; filename={name}")) {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }
    }
    headers
}

/// Return WAV bytes inline, or park them in the artifact store when the
/// client asked for it.
///
/// A failed store is not fatal: the audio goes back inline instead.
pub(crate) async fn deliver_audio(
    state: &AppState,
    wav: Vec<u8>,
    store: bool,
    filename: Option<&str>,
) -> AppResult<Response> {
    if store {
        match state.artifacts.save(wav.clone()).await {
            Ok(id) => {
                let body = StoredArtifact {
                    url: state.artifacts.url_for(&id),
                    expires_in_minutes: state.artifacts.expiry().as_secs() / 60,
                    id,
                };
                return Ok((StatusCode::CREATED, Json(body)).into_response());
            }
            Err(StorageError::Write(e)) => {
                warn!("Could not store artifact, returning audio inline: {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let headers = audio_headers(WAV_CONTENT_TYPE, wav.len(), filename);
    Ok((StatusCode::OK, headers, wav).into_response())
}

/// Download a stored artifact by id
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let body = state.artifacts.read(&id).await?;

    info!("Artifact download - id={}, size={} bytes", id, body.len());

    let extension = state.artifacts.extension();
    let headers = audio_headers(content_type_for(extension), body.len(), None);
    Ok((StatusCode::OK, headers, body).into_response())
}

/// Delete a stored artifact ahead of its expiry
pub async fn delete_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.artifacts.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StorageError::NotFound(id).into())
    }
}
