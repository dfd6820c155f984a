//! Whole-text synthesis.
//!
//! `GET /?text=...` and `POST /` with the text as a UTF-8 body. Both return
//! `audio/wav`, or the stored-artifact JSON when `store=true` is passed.

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::artifacts::deliver_audio;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SpeakQuery {
    pub text: Option<String>,
    #[serde(default)]
    pub store: bool,
}

pub async fn speak_get(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpeakQuery>,
) -> AppResult<Response> {
    let text = query.text.unwrap_or_default();
    speak(&state, &text, query.store).await
}

/// The body is the text. A `text` query parameter is ignored here.
pub async fn speak_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpeakQuery>,
    body: String,
) -> AppResult<Response> {
    speak(&state, &body, query.store).await
}

async fn speak(state: &AppState, text: &str, store: bool) -> AppResult<Response> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("No text provided".to_string()));
    }

    info!("Synthesizing {} chars (store={})", text.chars().count(), store);

    let wav = state.splicer.synthesize_text(text).await?;
    deliver_audio(state, wav, store, None).await
}
