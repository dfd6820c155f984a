//! `POST /stretch`: splice synthesized speech into an uploaded recording.
//!
//! Multipart fields:
//! - `audio`: the base recording; its filename extension is the format hint
//! - `placeholders`: JSON array of `{start_time, end_time, text_value}`
//! - `store` (optional): `true` to store the result instead of returning it

use axum::{
    extract::{Multipart, Query, State},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::artifacts::deliver_audio;
use crate::core::audio::normalize_format_hint;
use crate::core::splice::parse_placeholders;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

const OUTPUT_FILENAME: &str = "processed.wav";

#[derive(Debug, Default, Deserialize)]
pub struct StretchQuery {
    #[serde(default)]
    pub store: bool,
}

/// Fields collected from the multipart body
#[derive(Debug, Default)]
struct StretchForm {
    audio: Option<(Bytes, String)>,
    placeholders: Option<String>,
    store: Option<bool>,
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::BadRequest(message.into())
}

async fn read_form(mut multipart: Multipart) -> AppResult<StretchForm> {
    let mut form = StretchForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("audio") => {
                let format = normalize_format_hint(field.file_name().unwrap_or_default());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read audio upload: {e}")))?;
                if !data.is_empty() {
                    form.audio = Some((data, format));
                }
            }
            Some("placeholders") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read placeholders: {e}")))?;
                if !text.trim().is_empty() {
                    form.placeholders = Some(text);
                }
            }
            Some("store") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read store flag: {e}")))?;
                let store = text
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| bad_request(format!("Invalid store flag '{}'", text.trim())))?;
                form.store = Some(store);
            }
            other => {
                debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    Ok(form)
}

pub async fn stretch_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StretchQuery>,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = read_form(multipart).await?;

    let (audio, format) = form
        .audio
        .ok_or_else(|| bad_request("No audio file provided"))?;
    let placeholders = form
        .placeholders
        .ok_or_else(|| bad_request("No placeholders provided"))?;
    let placeholders = parse_placeholders(&placeholders)?;
    let store = form.store.unwrap_or(query.store);

    info!(
        "Stretch request: {} bytes of {} audio, {} placeholder(s)",
        audio.len(),
        format,
        placeholders.len()
    );

    let wav = state.splicer.splice(audio, &format, placeholders).await?;
    deliver_audio(&state, wav, store, Some(OUTPUT_FILENAME)).await
}
