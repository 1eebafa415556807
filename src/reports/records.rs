//! CSV row types for the three dashboard input snapshots.
//!
//! Every field is optional: the snapshots come out of an upstream export
//! with uneven headers, so missing columns deserialize to `None` and rows
//! that fail outright are dropped silently by the loaders. Aggregators
//! null-filter the fields they need.

use chrono::{NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use super::ReportError;

/// One row of the anonymized call-handle export.
#[derive(Debug, Clone, Deserialize)]
pub struct CallHandleRecord {
    #[serde(default)]
    pub tmcid: Option<String>,
    #[serde(default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub crt_object_id: Option<String>,
    #[serde(default)]
    pub callstatus: Option<String>,
    #[serde(default)]
    pub telemanas_id: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub createdtime: Option<String>,
    #[serde(default, rename = "usertmcmapping → statename", alias = "State_Name")]
    pub state_name: Option<String>,
    #[serde(default)]
    pub transferredto: Option<String>,
}

impl CallHandleRecord {
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.createdtime.as_deref().and_then(parse_datetime)
    }
}

/// One row of the counselling export.
#[derive(Debug, Clone, Deserialize)]
pub struct CounsellingRecord {
    #[serde(default)]
    pub tmcid: Option<String>,
    #[serde(default, rename = "Gender")]
    pub gender: Option<String>,
    #[serde(default, rename = "patient → age")]
    pub age_raw: Option<String>,
    #[serde(default, rename = "config_individual_calling → name")]
    pub called_by: Option<String>,
    #[serde(default, rename = "Patient_district")]
    pub patient_district: Option<String>,
    #[serde(default)]
    pub callstarttime: Option<String>,
    #[serde(default)]
    pub callendtime: Option<String>,
    #[serde(default)]
    pub customertalktime: Option<String>,
    #[serde(default)]
    pub call_type: Option<String>,
    #[serde(default)]
    pub triage: Option<String>,
}

impl CounsellingRecord {
    /// Age coerced to a number, `None` for missing or malformed values.
    pub fn age(&self) -> Option<f64> {
        self.age_raw.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn call_start(&self) -> Option<NaiveDateTime> {
        self.callstarttime.as_deref().and_then(parse_datetime)
    }

    pub fn call_end(&self) -> Option<NaiveDateTime> {
        self.callendtime.as_deref().and_then(parse_datetime)
    }

    /// Customer talk time as whole seconds. Stored as a clock-time string
    /// in the export, so the value is the offset from midnight.
    pub fn talk_seconds(&self) -> Option<i64> {
        self.customertalktime
            .as_deref()
            .and_then(parse_time)
            .map(|t| t.signed_duration_since(NaiveTime::MIN).num_seconds())
    }
}

/// One row of the complaints export.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplaintRecord {
    #[serde(default, rename = "Patient_State", alias = "Patient State")]
    pub patient_state: Option<String>,
    #[serde(default, rename = "Patient_District", alias = "Patient District")]
    pub patient_district: Option<String>,
    #[serde(default, rename = "Patient_Gender", alias = "Patient Gender")]
    pub patient_gender: Option<String>,
}

/// Reads a CSV into typed rows, silently dropping rows that fail to
/// deserialize. File-level errors still propagate.
pub fn load_records<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>, ReportError> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.deserialize().filter_map(Result::ok).collect())
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%d-%m-%Y %H:%M"))
        .ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Capitalizes the first letter of every alphabetic run and lowercases the
/// rest, like Python's `str.title()`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
