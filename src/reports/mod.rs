//! Batch generation of the dashboard JSON artifacts from CSV snapshots.
//!
//! Each aggregator is a pure function over typed rows; this module wires
//! them to the configured input/output directories and overwrites every
//! artifact in full on each run.

pub mod calendar;
pub mod choropleth;
pub mod district_gender;
pub mod funnel;
pub mod mapper;
pub mod overview;
pub mod records;
pub mod sankey;
pub mod time_windows;
pub mod transfers;
pub mod violin;

use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ReportsConfig;
use mapper::DisplayNameMapper;
use records::{load_records, CallHandleRecord, ComplaintRecord, CounsellingRecord};

const CALL_HANDLE_CSV: &str = "Anonymized_Call_Handle_Data.csv";
const COUNSELLING_CSV: &str = "counselling_data.csv";
const COMPLAINTS_CSV: &str = "counselling_complaints.csv";

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Serialization(serde_json::Error),
    MissingInput(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(err) => write!(f, "IO error: {}", err),
            ReportError::Csv(err) => write!(f, "CSV error: {}", err),
            ReportError::Serialization(err) => write!(f, "Serialization error: {}", err),
            ReportError::MissingInput(path) => write!(f, "Missing input file: {}", path),
        }
    }
}

impl Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Csv(err)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err)
    }
}

/// Writes one artifact, creating the output directory if needed.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(path)
}

fn require(path: PathBuf) -> Result<PathBuf, ReportError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ReportError::MissingInput(path.display().to_string()))
    }
}

/// Regenerates every dashboard artifact, sequentially.
pub fn run_all(config: &ReportsConfig) -> Result<(), ReportError> {
    let input_dir = Path::new(&config.input_dir);
    let output_dir = Path::new(&config.output_dir);

    let display_mapper = DisplayNameMapper::from_file(require(
        PathBuf::from(&config.state_mapping_file),
    )?)?;

    let call_handle: Vec<CallHandleRecord> =
        load_records(require(input_dir.join(CALL_HANDLE_CSV))?)?;
    let counselling: Vec<CounsellingRecord> =
        load_records(require(input_dir.join(COUNSELLING_CSV))?)?;
    let complaints: Vec<ComplaintRecord> =
        load_records(require(input_dir.join(COMPLAINTS_CSV))?)?;
    info!(
        "Loaded report inputs: {} call-handle, {} counselling, {} complaint rows",
        call_handle.len(),
        counselling.len(),
        complaints.len()
    );

    write_json(
        output_dir,
        "question2_country.json",
        &time_windows::country(&call_handle),
    )?;
    write_json(
        output_dir,
        "question2_state.json",
        &time_windows::per_state(&call_handle),
    )?;

    write_json(
        output_dir,
        "question6_country.json",
        &choropleth::country(&counselling, &display_mapper),
    )?;
    write_json(
        output_dir,
        "question6_state.json",
        &choropleth::per_state(&counselling, &display_mapper),
    )?;

    write_json(
        output_dir,
        "question9_state.json",
        &transfers::build(&call_handle, config.transfer_threshold, &display_mapper),
    )?;

    write_json(
        output_dir,
        "question11_country.json",
        &sankey::country(&counselling),
    )?;
    write_json(
        output_dir,
        "question11_state.json",
        &sankey::per_state(&counselling, &display_mapper),
    )?;

    write_json(
        output_dir,
        "question12_country.json",
        &violin::country(&call_handle),
    )?;
    write_json(
        output_dir,
        "question12_state.json",
        &violin::per_state(&call_handle, &display_mapper),
    )?;

    write_json(
        output_dir,
        "question13_country.json",
        &calendar::country(&call_handle, config.target_year),
    )?;
    write_json(
        output_dir,
        "question13_state.json",
        &calendar::per_state(&call_handle, config.target_year, &display_mapper),
    )?;

    write_json(
        output_dir,
        "question14_state.json",
        &district_gender::per_state(&complaints),
    )?;

    write_json(
        output_dir,
        "question15_country.json",
        &funnel::country(&call_handle, &config.exclude_tmcs),
    )?;
    write_json(
        output_dir,
        "question15_state.json",
        &funnel::per_state(&call_handle, &config.exclude_tmcs),
    )?;

    write_json(
        output_dir,
        "states.json",
        &overview::build(
            &counselling,
            &call_handle,
            &config.exclude_tmcs,
            &display_mapper,
        ),
    )?;

    info!("Chart artifacts written to {}", output_dir.display());
    Ok(())
}
