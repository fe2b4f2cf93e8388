use anyhow::Result;
use log::info;
use ph_lib::api::{self, AppState};
use ph_lib::model::loader::load_or_degrade;
use ph_lib::model::ArtifactPaths;
use ph_lib::utils::{env::load_env, server_config::ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging and environment
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting pH prediction service");
    load_env();

    let config = ServerConfig::from_env();
    config.log_config();

    // Loaded exactly once; a failure leaves the service running but not ready.
    let paths = ArtifactPaths::resolve(config.artifact_dir.as_deref());
    info!(
        "Loading artifacts: model={}, scaler={}",
        paths.model.display(),
        paths.scaler.display()
    );
    let state = AppState::new(load_or_degrade(&paths));

    api::serve(&config, state).await
}
