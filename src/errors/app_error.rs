//! HTTP-facing error type.
//!
//! Component errors convert into [`AppError`], which decides the status code
//! and renders `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::splice::SpliceError;
use crate::core::storage::StorageError;
use crate::core::tts::SynthesisError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Splice(#[from] SpliceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        AppError::Splice(SpliceError::Synthesis(err))
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Splice(err) => match err {
                SpliceError::Validation(_) | SpliceError::BaseDecode(_) => StatusCode::BAD_REQUEST,
                SpliceError::Synthesis(_) | SpliceError::SynthesizedDecode(_) => {
                    StatusCode::BAD_GATEWAY
                }
                SpliceError::Assembly(_) | SpliceError::Task(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Storage(err) => match err {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::Write(_)
                | StorageError::Io(_)
                | StorageError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status == StatusCode::BAD_GATEWAY {
            tracing::warn!("Voice engine failure: {}", message);
        } else if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
