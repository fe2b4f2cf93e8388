// src/model/regressor.rs
use anyhow::{bail, ensure, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_width, InferenceError, Predictor};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Logistic,
    Tanh,
    Relu,
}

impl Activation {
    fn apply(self, z: &mut Array2<f64>) {
        match self {
            Activation::Identity => {}
            Activation::Logistic => z.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => z.mapv_inplace(f64::tanh),
            Activation::Relu => z.mapv_inplace(|v| v.max(0.0)),
        }
    }
}

/// On-disk form of the model artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorSpec {
    /// Feed-forward network. `coefs[i]` is `n_in x n_out`, `intercepts[i]` has `n_out` entries.
    Mlp {
        activation: Activation,
        coefs: Vec<Vec<Vec<f64>>>,
        intercepts: Vec<Vec<f64>>,
    },
    Linear { coef: Vec<f64>, intercept: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Regressor {
    Mlp {
        activation: Activation,
        layers: Vec<Layer>,
    },
    Linear {
        coef: Array1<f64>,
        intercept: f64,
    },
}

fn ensure_finite<'a>(what: &str, values: impl IntoIterator<Item = &'a f64>) -> Result<()> {
    if let Some(bad) = values.into_iter().find(|v| !v.is_finite()) {
        bail!("{} contains non-finite value {}", what, bad);
    }
    Ok(())
}

fn build_layer(index: usize, rows: Vec<Vec<f64>>, bias: Vec<f64>) -> Result<Layer> {
    let n_in = rows.len();
    ensure!(n_in > 0, "layer {} has no weight rows", index);
    let n_out = rows[0].len();
    ensure!(n_out > 0, "layer {} has no outputs", index);
    if let Some(row) = rows.iter().find(|r| r.len() != n_out) {
        bail!(
            "layer {} weight rows are ragged: expected {} columns, found {}",
            index,
            n_out,
            row.len()
        );
    }
    ensure!(
        bias.len() == n_out,
        "layer {} intercept has {} entries, expected {}",
        index,
        bias.len(),
        n_out
    );

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    ensure_finite(&format!("layer {} weights", index), &flat)?;
    ensure_finite(&format!("layer {} intercept", index), &bias)?;
    let weights = Array2::from_shape_vec((n_in, n_out), flat)?;
    Ok(Layer {
        weights,
        bias: Array1::from(bias),
    })
}

impl Regressor {
    pub fn from_spec(spec: RegressorSpec) -> Result<Self> {
        match spec {
            RegressorSpec::Mlp {
                activation,
                coefs,
                intercepts,
            } => {
                ensure!(!coefs.is_empty(), "MLP has no layers");
                ensure!(
                    coefs.len() == intercepts.len(),
                    "MLP has {} weight matrices but {} intercept vectors",
                    coefs.len(),
                    intercepts.len()
                );
                let layers = coefs
                    .into_iter()
                    .zip(intercepts)
                    .enumerate()
                    .map(|(i, (rows, bias))| build_layer(i, rows, bias))
                    .collect::<Result<Vec<_>>>()?;

                for (i, pair) in layers.windows(2).enumerate() {
                    let (prev, next) = (&pair[0], &pair[1]);
                    ensure!(
                        prev.weights.ncols() == next.weights.nrows(),
                        "layer {} outputs {} values but layer {} expects {}",
                        i,
                        prev.weights.ncols(),
                        i + 1,
                        next.weights.nrows()
                    );
                }
                let out_width = layers.last().map(|l| l.weights.ncols()).unwrap_or(0);
                ensure!(
                    out_width == 1,
                    "MLP output layer must produce 1 value, produces {}",
                    out_width
                );
                Ok(Regressor::Mlp { activation, layers })
            }
            RegressorSpec::Linear { coef, intercept } => {
                ensure!(!coef.is_empty(), "linear model has no coefficients");
                ensure_finite("linear coefficients", &coef)?;
                ensure_finite("linear intercept", [intercept].iter())?;
                Ok(Regressor::Linear {
                    coef: Array1::from(coef),
                    intercept,
                })
            }
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Regressor::Mlp { layers, .. } => {
                layers.first().map(|l| l.weights.nrows()).unwrap_or(0)
            }
            Regressor::Linear { coef, .. } => coef.len(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Regressor::Mlp { activation, layers } => {
                let widths: Vec<String> = std::iter::once(self.n_features())
                    .chain(layers.iter().map(|l| l.weights.ncols()))
                    .map(|w| w.to_string())
                    .collect();
                let mut output = format!(
                    "MLP regressor ({:?} hidden activation)\n  layer widths: {}\n",
                    activation,
                    widths.join(" -> ")
                );
                for (i, layer) in layers.iter().enumerate() {
                    let norm = layer.weights.mapv(|w| w * w).sum().sqrt();
                    output.push_str(&format!(
                        "  layer {}: {}x{} weights, |W| = {:.4}, bias sample = {:.4}\n",
                        i,
                        layer.weights.nrows(),
                        layer.weights.ncols(),
                        norm,
                        layer.bias.iter().take(5).cloned().collect::<Array1<f64>>()
                    ));
                }
                output
            }
            Regressor::Linear { coef, intercept } => format!(
                "Linear regressor ({} features)\n  coef:      {:.4}\n  intercept: {:.4}\n",
                coef.len(),
                coef,
                intercept
            ),
        }
    }
}

impl Predictor for Regressor {
    fn predict(&self, batch: ArrayView2<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        check_width(&batch, self.n_features())?;
        match self {
            Regressor::Mlp { activation, layers } => {
                let last = layers.len().saturating_sub(1);
                let mut activations = batch.to_owned();
                for (i, layer) in layers.iter().enumerate() {
                    let mut z = activations.dot(&layer.weights);
                    z += &layer.bias;
                    if i != last {
                        activation.apply(&mut z);
                    }
                    activations = z;
                }
                Ok(activations.index_axis_move(Axis(1), 0))
            }
            Regressor::Linear { coef, intercept } => {
                Ok(batch.dot(coef).mapv_into(|v| v + intercept))
            }
        }
    }
}
