// src/bin/report_model_weights.rs

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use ph_lib::api::request::round_to;
use ph_lib::api::ColorReading;
use ph_lib::model::loader::load_components;
use ph_lib::model::{ArtifactPaths, Artifacts};
use ph_lib::utils::constants::{FEATURE_KEYS, PREDICTION_DECIMALS};
use ph_lib::utils::env::load_env;
use ph_lib::utils::server_config::ServerConfig;

/// Print the scaler parameters and model weights the prediction server would load.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct ReportArgs {
    /// Directory containing pH_model.json and pH_scaler.json
    /// (defaults to PH_ARTIFACT_DIR, then the executable's directory)
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Run one prediction for "r_ref,g_ref,b_ref,r_sample,g_sample,b_sample"
    #[arg(long)]
    sample: Option<ColorReading>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    load_env();
    let args = ReportArgs::parse();

    let dir = args.artifact_dir.or(ServerConfig::from_env().artifact_dir);
    let paths = ArtifactPaths::resolve(dir.as_deref());
    info!(
        "Reading artifacts: model={}, scaler={}",
        paths.model.display(),
        paths.scaler.display()
    );

    let (scaler, model) = load_components(&paths).context("Artifacts failed validation")?;

    println!("\n=== pH ARTIFACT REPORT ===");
    println!("Feature order: {}", FEATURE_KEYS.join(", "));
    println!("\n--- Scaler ({}) ---", paths.scaler.display());
    println!("{}", scaler.describe());
    println!("\n--- Model ({}) ---", paths.model.display());
    print!("{}", model.describe());

    if let Some(reading) = args.sample {
        let artifacts = Artifacts::new(scaler, model);
        let raw = artifacts
            .predict_one(&reading.features())
            .context("Sample prediction failed")?;
        println!("\n=== SAMPLE PREDICTION ===");
        println!("Input: {:?}", reading);
        println!(
            "prediksi_ph: {} (raw {:.6})",
            round_to(raw, PREDICTION_DECIMALS),
            raw
        );
    }

    Ok(())
}
