use clap::Parser;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub pool_size: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "remote" or "ollama"
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory holding the source CSV snapshots
    pub input_dir: String,
    /// Directory the chart JSON artifacts are written into
    pub output_dir: String,
    /// CSV mapping tmc codes to display names
    pub state_mapping_file: String,
    /// Year the calendar aggregation is restricted to
    pub target_year: i32,
    /// Minimum inter-state transfer count kept in the sankey
    pub transfer_threshold: usize,
    /// Training/outbound tmc ids excluded from the call-flow funnel
    pub exclude_tmcs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub reports: ReportsConfig,
    /// Optional override for the embedded gazetteer asset
    pub gazetteer_path: Option<String>,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the source CSV snapshots
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Directory the chart JSON artifacts are written into
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Generate the chart artifacts and exit without serving
    #[arg(long, default_value_t = false)]
    pub refresh_only: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start from the built-in defaults so a partial file is enough
        let mut config_builder =
            Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/careline/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(input_dir) = &args.input_dir {
            config.reports.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            config.reports.output_dir = output_dir.clone();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: "careline.duckdb".to_string(),
                pool_size: 5,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            llm: LlmConfig {
                backend: "ollama".to_string(),
                model: "sqlcoder".to_string(),
                api_key: None,
                api_url: None,
            },
            reports: ReportsConfig::default(),
            gazetteer_path: None,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            input_dir: "database".to_string(),
            output_dir: "static".to_string(),
            state_mapping_file: "database/mapped_states.csv".to_string(),
            target_year: 2024,
            transfer_threshold: 5,
            exclude_tmcs: vec![
                "ML02_TMC".to_string(),
                "docutoroutboud".to_string(),
                "KIRAN".to_string(),
                "IIITB_OB".to_string(),
                "Training_TMC_UK".to_string(),
            ],
        }
    }
}
