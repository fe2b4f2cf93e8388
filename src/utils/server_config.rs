// src/utils/server_config.rs

use log::{info, warn};
use std::env;
use std::path::PathBuf;

use crate::utils::constants::{DEFAULT_HOST, DEFAULT_PORT};

/// Network binding and artifact location for the prediction server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to listen on
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
    /// Directory holding the model and scaler files. `None` means next to the executable.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            artifact_dir: None,
        }
    }
}

impl ServerConfig {
    /// Create server configuration from environment variables
    pub fn from_env() -> Self {
        let host = env::var("PH_SERVER_HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match env::var("PH_SERVER_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(
                    "Invalid PH_SERVER_PORT '{}', falling back to {}",
                    raw, DEFAULT_PORT
                );
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let artifact_dir = env::var("PH_ARTIFACT_DIR")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);

        Self {
            host,
            port,
            artifact_dir,
        }
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("🌐 Listening address: {}:{}", self.host, self.port);
        match &self.artifact_dir {
            Some(dir) => info!("   Artifact directory (PH_ARTIFACT_DIR): {}", dir.display()),
            None => info!("   Artifact directory: next to the executable"),
        }
    }
}
