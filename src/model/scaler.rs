// src/model/scaler.rs
use anyhow::{bail, Result};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{check_width, InferenceError, Transformer};

/// On-disk form of the scaler artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    /// `x' = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x' = x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scaler {
    Standard {
        mean: Array1<f64>,
        scale: Array1<f64>,
    },
    MinMax {
        min: Array1<f64>,
        scale: Array1<f64>,
    },
}

fn checked_params(name: &str, values: Vec<f64>) -> Result<Array1<f64>> {
    if values.is_empty() {
        bail!("scaler parameter '{}' is empty", name);
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        bail!("scaler parameter '{}' contains non-finite value {}", name, bad);
    }
    Ok(Array1::from(values))
}

fn check_same_len(a: &Array1<f64>, b: &Array1<f64>) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "scaler parameter lengths differ: {} vs {}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

impl Scaler {
    pub fn from_spec(spec: ScalerSpec) -> Result<Self> {
        match spec {
            ScalerSpec::Standard { mean, scale } => {
                let mean = checked_params("mean", mean)?;
                // Constant features are fitted with a zero scale; they pass through unscaled.
                let scale = checked_params("scale", scale)?
                    .mapv_into(|s| if s == 0.0 { 1.0 } else { s });
                check_same_len(&mean, &scale)?;
                Ok(Scaler::Standard { mean, scale })
            }
            ScalerSpec::MinMax { min, scale } => {
                let min = checked_params("min", min)?;
                let scale = checked_params("scale", scale)?;
                check_same_len(&min, &scale)?;
                Ok(Scaler::MinMax { min, scale })
            }
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Scaler::Standard { mean, scale } => format!(
                "StandardScaler ({} features)\n  mean:  {:.4}\n  scale: {:.4}",
                mean.len(),
                mean,
                scale
            ),
            Scaler::MinMax { min, scale } => format!(
                "MinMaxScaler ({} features)\n  min:   {:.4}\n  scale: {:.4}",
                min.len(),
                min,
                scale
            ),
        }
    }
}

impl Transformer for Scaler {
    fn transform(&self, batch: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        check_width(&batch, self.n_features())?;
        match self {
            Scaler::Standard { mean, scale } => {
                let mut out = &batch - mean;
                out /= scale;
                Ok(out)
            }
            Scaler::MinMax { min, scale } => {
                let mut out = &batch * scale;
                out += min;
                Ok(out)
            }
        }
    }
}
