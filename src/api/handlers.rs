// src/api/handlers.rs
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use log::debug;

use super::error::PredictionError;
use super::request::{round_to, ColorReading, PredictionResponse};
use super::AppState;
use crate::utils::constants::{HOME_MESSAGE, PREDICTION_DECIMALS};

/// GET / — liveness only, answers the same whether or not the artifacts loaded.
pub async fn home() -> &'static str {
    HOME_MESSAGE
}

/// POST /prediksi
pub async fn predict_ph(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, PredictionError> {
    let artifacts = state.artifacts().ok_or(PredictionError::NotReady)?;
    let reading = ColorReading::from_body(&body)?;
    let raw = artifacts.predict_one(&reading.features())?;
    let prediksi_ph = round_to(raw, PREDICTION_DECIMALS);
    debug!("Predicted pH {} (raw {}) for {:?}", prediksi_ph, raw, reading);
    Ok(Json(PredictionResponse { prediksi_ph }))
}
