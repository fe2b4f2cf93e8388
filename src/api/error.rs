// src/api/error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::model::InferenceError;
use crate::utils::constants::{INCOMPLETE_DATA_MESSAGE, NOT_READY_MESSAGE};

/// Every way a prediction request can fail. Each variant maps to one status code.
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    /// Artifacts failed to load at startup.
    #[error("{}", NOT_READY_MESSAGE)]
    NotReady,
    /// One or more of the six reading keys is absent.
    #[error("{}", INCOMPLETE_DATA_MESSAGE)]
    IncompleteData { missing: Vec<&'static str> },
    /// Bad body, non-numeric value, or an artifact error during scaling/prediction.
    #[error("{0}")]
    Inference(String),
}

impl PredictionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::NotReady => StatusCode::INTERNAL_SERVER_ERROR,
            PredictionError::IncompleteData { .. } => StatusCode::BAD_REQUEST,
            PredictionError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InferenceError> for PredictionError {
    fn from(e: InferenceError) -> Self {
        PredictionError::Inference(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            PredictionError::IncompleteData { missing } => {
                warn!("Rejected prediction request, missing keys: {:?}", missing)
            }
            other => warn!("Prediction request failed ({}): {}", status, other),
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
