// src/model/loader.rs
use anyhow::{ensure, Context, Result};
use log::{error, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::regressor::{Regressor, RegressorSpec};
use super::scaler::{Scaler, ScalerSpec};
use super::Artifacts;
use crate::utils::constants::{FEATURE_COUNT, MODEL_FILE_NAME, SCALER_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE_NAME),
            scaler: dir.join(SCALER_FILE_NAME),
        }
    }

    /// Uses `dir` when given, otherwise the directory holding the running executable.
    pub fn resolve(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::in_dir(dir),
            None => Self::in_dir(executable_dir()),
        }
    }
}

/// Directory of the running executable, or `.` when it cannot be determined.
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse artifact file {}", path.display()))
}

/// Reads and validates both artifacts without wrapping them, so callers can inspect parameters.
pub fn load_components(paths: &ArtifactPaths) -> Result<(Scaler, Regressor)> {
    let scaler_spec: ScalerSpec = read_json(&paths.scaler)?;
    let scaler = Scaler::from_spec(scaler_spec)
        .with_context(|| format!("Invalid scaler in {}", paths.scaler.display()))?;
    ensure!(
        scaler.n_features() == FEATURE_COUNT,
        "Scaler in {} expects {} features, this service sends {}",
        paths.scaler.display(),
        scaler.n_features(),
        FEATURE_COUNT
    );

    let model_spec: RegressorSpec = read_json(&paths.model)?;
    let model = Regressor::from_spec(model_spec)
        .with_context(|| format!("Invalid model in {}", paths.model.display()))?;
    ensure!(
        model.n_features() == FEATURE_COUNT,
        "Model in {} expects {} features, this service sends {}",
        paths.model.display(),
        model.n_features(),
        FEATURE_COUNT
    );

    Ok((scaler, model))
}

pub fn load_artifacts(paths: &ArtifactPaths) -> Result<Artifacts> {
    let (scaler, model) = load_components(paths)?;
    Ok(Artifacts::new(scaler, model))
}

/// Startup load. A failure is logged once and leaves the service without artifacts
/// for the rest of the process lifetime.
pub fn load_or_degrade(paths: &ArtifactPaths) -> Option<Arc<Artifacts>> {
    match load_artifacts(paths) {
        Ok(artifacts) => {
            info!(
                "✅ Model ({}) and scaler ({}) loaded. Service ready.",
                paths.model.display(),
                paths.scaler.display()
            );
            Some(Arc::new(artifacts))
        }
        Err(e) => {
            error!(
                "Failed to load '{}' or '{}': {:#}",
                paths.model.display(),
                paths.scaler.display(),
                e
            );
            error!("Predictions will fail until the service is restarted with valid artifacts.");
            None
        }
    }
}
