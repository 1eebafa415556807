use clap::Parser;
use r2d2::Pool;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod db;
mod extract;
mod gazetteer;
mod llm;
mod reports;
mod sql;
mod util;
mod web;

use crate::config::{AppConfig, CliArgs};
use crate::db::db_pool::ReadOnlyDuckDbManager;
use crate::extract::EntityExtractionPipeline;
use crate::gazetteer::Gazetteer;
use crate::llm::LlmManager;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = CliArgs::parse();

    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Gazetteer tables are loaded once and shared read-only across requests
    let gazetteer = match &config.gazetteer_path {
        Some(path) => Gazetteer::from_file(path)?,
        None => Gazetteer::embedded()?,
    };
    info!(
        "Loaded gazetteer: {} states, {} diseases",
        gazetteer.state_count(),
        gazetteer.disease_count()
    );
    let gazetteer = Arc::new(gazetteer);

    // Regenerate the dashboard artifacts before serving them
    info!("Generating chart artifacts from {}", config.reports.input_dir);
    if let Err(e) = reports::run_all(&config.reports) {
        error!("Failed to generate chart artifacts: {}", e);
        // Continue anyway, stale artifacts keep being served
    }

    if args.refresh_only {
        info!("--refresh-only given, exiting after artifact generation");
        return Ok(());
    }

    info!(
        "Initializing read-only DuckDB pool at {}",
        config.database.connection_string
    );
    let db_manager = ReadOnlyDuckDbManager::new(config.database.connection_string.clone());
    let pool = Pool::builder()
        .max_size(config.database.pool_size as u32)
        .build(db_manager)?;

    info!("Initializing LLM manager with backend: {}", config.llm.backend);
    let llm_manager = LlmManager::new(&config.llm)?;

    let pipeline = EntityExtractionPipeline::new(Arc::clone(&gazetteer));
    let app_state = Arc::new(AppState::new(config.clone(), pool, llm_manager, pipeline));

    info!(
        "Starting careline server on {}:{}",
        config.web.host, config.web.port
    );
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
