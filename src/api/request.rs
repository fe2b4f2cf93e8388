// src/api/request.rs
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::str::FromStr;

use super::error::PredictionError;
use crate::utils::constants::{FEATURE_COUNT, FEATURE_KEYS};

/// Reference card and sample RGB intensities for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorReading {
    pub r_ref: f64,
    pub g_ref: f64,
    pub b_ref: f64,
    pub r_sample: f64,
    pub g_sample: f64,
    pub b_sample: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    pub prediksi_ph: f64,
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn numeric_field(
    obj: &Map<String, JsonValue>,
    key: &'static str,
) -> Result<f64, PredictionError> {
    let value = obj
        .get(key)
        .ok_or_else(|| PredictionError::IncompleteData { missing: vec![key] })?;
    value.as_f64().ok_or_else(|| {
        PredictionError::Inference(format!(
            "Field '{}' must be numeric, got {}: {}",
            key,
            json_kind(value),
            value
        ))
    })
}

impl ColorReading {
    pub fn from_features(f: [f64; FEATURE_COUNT]) -> Self {
        Self {
            r_ref: f[0],
            g_ref: f[1],
            b_ref: f[2],
            r_sample: f[3],
            g_sample: f[4],
            b_sample: f[5],
        }
    }

    /// Values in the column order of `FEATURE_KEYS`.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.r_ref,
            self.g_ref,
            self.b_ref,
            self.r_sample,
            self.g_sample,
            self.b_sample,
        ]
    }

    pub fn from_body(body: &[u8]) -> Result<Self, PredictionError> {
        let value: JsonValue = serde_json::from_slice(body)
            .map_err(|e| PredictionError::Inference(format!("Invalid JSON body: {}", e)))?;
        Self::from_json(&value)
    }

    /// Key presence is checked before value types, so an incomplete body is always a 400.
    pub fn from_json(value: &JsonValue) -> Result<Self, PredictionError> {
        let obj = value.as_object().ok_or_else(|| {
            PredictionError::Inference(format!(
                "Request body must be a JSON object, got {}",
                json_kind(value)
            ))
        })?;

        let missing: Vec<&'static str> = FEATURE_KEYS
            .iter()
            .copied()
            .filter(|key| !obj.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(PredictionError::IncompleteData { missing });
        }

        let mut features = [0.0; FEATURE_COUNT];
        for (slot, key) in features.iter_mut().zip(FEATURE_KEYS) {
            *slot = numeric_field(obj, key)?;
        }
        Ok(Self::from_features(features))
    }
}

/// Parses `r_ref,g_ref,b_ref,r_sample,g_sample,b_sample`.
impl FromStr for ColorReading {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .with_context(|| format!("'{}' is not a number", part.trim()))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        ensure!(
            values.len() == FEATURE_COUNT,
            "expected {} comma-separated values ({}), got {}",
            FEATURE_COUNT,
            FEATURE_KEYS.join(","),
            values.len()
        );
        let mut features = [0.0; FEATURE_COUNT];
        features.copy_from_slice(&values);
        Ok(Self::from_features(features))
    }
}

/// Rounds half-to-even at the given number of decimals.
///
/// Values too large to scale without overflowing have no fractional digits
/// left and come back unchanged.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / factor
}
