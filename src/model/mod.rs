//! Scaler and regression model artifacts used by the prediction endpoint.
//!
//! Both artifacts are loaded once at startup and then only read. Handlers see
//! them through the [`Transformer`] and [`Predictor`] traits so any backing
//! implementation can be swapped in.

pub mod loader;
pub mod regressor;
pub mod scaler;

use ndarray::{aview1, Array1, Array2, ArrayView2, Axis};
use thiserror::Error;

pub use loader::{load_artifacts, ArtifactPaths};
pub use regressor::Regressor;
pub use scaler::Scaler;

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("expected {expected} features per row, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("model returned no output for the input batch")]
    EmptyOutput,
    #[error("model produced a non-finite value: {0}")]
    NonFinite(f64),
}

/// Normalizes a raw batch (`rows x features`) into the range the model was trained on.
pub trait Transformer: Send + Sync {
    fn transform(&self, batch: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError>;
}

/// Maps a normalized batch to one output per row.
pub trait Predictor: Send + Sync {
    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError>;
}

pub(crate) fn check_width(
    batch: &ArrayView2<'_, f64>,
    expected: usize,
) -> Result<(), InferenceError> {
    if batch.ncols() != expected {
        return Err(InferenceError::FeatureCountMismatch {
            expected,
            actual: batch.ncols(),
        });
    }
    Ok(())
}

/// The scaler/model pair, immutable once loaded.
pub struct Artifacts {
    scaler: Box<dyn Transformer>,
    model: Box<dyn Predictor>,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts").finish_non_exhaustive()
    }
}

impl Artifacts {
    pub fn new(scaler: impl Transformer + 'static, model: impl Predictor + 'static) -> Self {
        Self {
            scaler: Box::new(scaler),
            model: Box::new(model),
        }
    }

    /// Scale then predict a single row, returning the raw (unrounded) output.
    pub fn predict_one(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let batch = aview1(features).insert_axis(Axis(0));
        let scaled = self.scaler.transform(batch)?;
        let output = self.model.predict(scaled.view())?;
        let value = output.get(0).copied().ok_or(InferenceError::EmptyOutput)?;
        if !value.is_finite() {
            return Err(InferenceError::NonFinite(value));
        }
        Ok(value)
    }
}
