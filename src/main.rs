use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use signals_lib::sector::load_intensity_map;
use signals_lib::snapshot::CommitmentSnapshot;
use signals_lib::utils::env::load_env;
use signals_lib::{
    EnrichmentConfig, EnrichmentRequest, EnrichmentService, HttpRegisterClient, ManualOverride,
};

/// Enrich an employer name with register, sector-intensity and
/// climate-commitment signals.
#[derive(Parser, Debug)]
#[command(name = "enrich", version, about)]
struct Cli {
    /// Free-text employer name to enrich
    #[arg(long)]
    name: String,

    /// Optional free-text location hint (e.g. the job listing's location)
    #[arg(long)]
    hint_location: Option<String>,

    /// Pin the selection to this company number instead of the ranked result
    #[arg(long)]
    company_number: Option<String>,

    /// Display name for the pinned company
    #[arg(long, requires = "company_number")]
    company_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();

    let cli = Cli::parse();
    info!("Starting employer enrichment at {}", Utc::now());

    let config = EnrichmentConfig::from_env();
    config.log_config();

    let api_key = config.require_register_api_key()?.to_string();
    let register = HttpRegisterClient::new(&api_key, config.register_base_url.as_deref())
        .context("Failed to construct register client")?;

    // Reference data is optional: a missing artifact degrades the matching
    // signal instead of failing the run.
    let sector_map = match load_intensity_map(&config.intensity_map_path) {
        Ok(map) => {
            info!(
                "Loaded sector intensity map ({} exact, {} group entries)",
                map.exact.len(),
                map.groups.len()
            );
            Some(map)
        }
        Err(error) => {
            warn!("Sector intensity map unavailable: {:#}", error);
            None
        }
    };

    let commitments =
        match CommitmentSnapshot::load(&config.sbti_records_path, &config.sbti_index_path) {
            Ok(snapshot) => {
                info!(
                    "Loaded commitment snapshot ({} records)",
                    snapshot.records.len()
                );
                Some(snapshot)
            }
            Err(error) => {
                warn!("Commitment snapshot unavailable: {:#}", error);
                None
            }
        };

    let service = EnrichmentService::new(config, Arc::new(register), sector_map, commitments);

    let request = EnrichmentRequest {
        employer_name: cli.name,
        hint_location: cli.hint_location,
        manual_override: cli.company_number.map(|company_number| ManualOverride {
            company_number,
            company_name: cli.company_name,
        }),
        caller_key: None,
    };

    let result = service.enrich(&request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
