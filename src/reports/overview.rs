//! The per-state overview document behind the dashboard landing page:
//! volumes, demographics, durations, directions, triage and the call-flow
//! funnel, for India as a whole and for every tmcid.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::funnel::{self, FunnelResult};
use super::mapper::DisplayNameMapper;
use super::records::{CallHandleRecord, CounsellingRecord};

const TRACKED_GENDERS: [&str; 3] = ["Male", "Female", "Transgender"];
const AGE_LABELS: [&str; 6] = ["Under 18", "18-24", "25-34", "35-44", "45-54", "55+"];

#[derive(Debug, Serialize)]
pub struct TimePoint {
    pub date: String,
    pub calls: usize,
}

#[derive(Debug, Serialize)]
pub struct DurationPoint {
    pub date: String,
    pub minutes: f64,
}

#[derive(Debug, Serialize)]
pub struct StateOverview {
    pub state: String,
    #[serde(rename = "totalCalls")]
    pub total_calls: usize,
    #[serde(rename = "byGender")]
    pub by_gender: BTreeMap<String, usize>,
    pub timeseries: Vec<TimePoint>,
    #[serde(rename = "avgDuration")]
    pub avg_duration: Vec<DurationPoint>,
    #[serde(rename = "byWeekday")]
    pub by_weekday: BTreeMap<String, usize>,
    #[serde(rename = "byAgeGroup")]
    pub by_age_group: BTreeMap<String, usize>,
    #[serde(rename = "callsByDirection")]
    pub calls_by_direction: Vec<Value>,
    pub triage: BTreeMap<String, usize>,
    pub callflow: FunnelResult,
}

struct Row {
    tmcid: Option<String>,
    gender: String,
    end_date: NaiveDate,
    talk_seconds: i64,
    age: Option<f64>,
    call_type: Option<String>,
    triage: Option<String>,
}

/// Rows with a tracked gender, parsable start/end times and a talk time.
fn preprocess(records: &[CounsellingRecord]) -> Vec<Row> {
    records
        .iter()
        .filter_map(|r| {
            let gender = r.gender.as_deref()?;
            if !TRACKED_GENDERS.contains(&gender) {
                return None;
            }
            r.call_start()?;
            let end = r.call_end()?;
            let talk_seconds = r.talk_seconds()?;
            Some(Row {
                tmcid: r.tmcid.clone(),
                gender: gender.to_string(),
                end_date: end.date(),
                talk_seconds,
                age: r.age(),
                call_type: r.call_type.clone(),
                triage: r.triage.clone(),
            })
        })
        .collect()
}

fn age_label(age: f64) -> Option<&'static str> {
    if age < 0.0 {
        None
    } else if age < 18.0 {
        Some("Under 18")
    } else if age < 25.0 {
        Some("18-24")
    } else if age < 35.0 {
        Some("25-34")
    } else if age < 45.0 {
        Some("35-44")
    } else if age < 55.0 {
        Some("45-54")
    } else {
        Some("55+")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn summarize(state: String, rows: &[&Row], callflow: FunnelResult) -> StateOverview {
    let mut by_gender: BTreeMap<String, usize> = TRACKED_GENDERS
        .iter()
        .map(|g| (g.to_string(), 0))
        .collect();
    let mut by_date: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
    let mut by_weekday: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_age_group: BTreeMap<String, usize> = AGE_LABELS
        .iter()
        .map(|l| (l.to_string(), 0))
        .collect();
    let mut by_month: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut triage: BTreeMap<String, usize> = BTreeMap::new();

    for row in rows {
        *by_gender.entry(row.gender.clone()).or_default() += 1;

        let day = by_date.entry(row.end_date).or_default();
        day.0 += 1;
        day.1 += row.talk_seconds;

        *by_weekday
            .entry(row.end_date.format("%a").to_string())
            .or_default() += 1;

        if let Some(label) = row.age.and_then(age_label) {
            *by_age_group.entry(label.to_string()).or_default() += 1;
        }

        if let Some(call_type) = &row.call_type {
            *by_month
                .entry(row.end_date.format("%b").to_string())
                .or_default()
                .entry(call_type.clone())
                .or_default() += 1;
        }

        if let Some(t) = &row.triage {
            *triage.entry(t.clone()).or_default() += 1;
        }
    }

    let timeseries = by_date
        .iter()
        .map(|(date, (calls, _))| TimePoint {
            date: date.to_string(),
            calls: *calls,
        })
        .collect();

    let avg_duration = by_date
        .iter()
        .map(|(date, (calls, seconds))| DurationPoint {
            date: date.to_string(),
            minutes: round2(*seconds as f64 / *calls as f64 / 60.0),
        })
        .collect();

    let calls_by_direction = by_month
        .into_iter()
        .map(|(month, counts)| {
            let mut obj = Map::new();
            obj.insert("month".to_string(), Value::from(month));
            for (call_type, count) in counts {
                obj.insert(call_type, Value::from(count));
            }
            Value::Object(obj)
        })
        .collect();

    StateOverview {
        state,
        total_calls: rows.len(),
        by_gender,
        timeseries,
        avg_duration,
        by_weekday,
        by_age_group,
        calls_by_direction,
        triage,
        callflow,
    }
}

pub fn build(
    counselling: &[CounsellingRecord],
    call_handle: &[CallHandleRecord],
    exclude_tmcs: &[String],
    mapper: &DisplayNameMapper,
) -> Vec<StateOverview> {
    let rows = preprocess(counselling);
    let funnels: HashMap<String, FunnelResult> =
        funnel::overview_funnels(call_handle, exclude_tmcs)
            .into_iter()
            .collect();

    let empty_funnel = || funnel::compute(Vec::new(), &funnel::overview_stages());
    let india_funnel = funnels.get("India").cloned().unwrap_or_else(empty_funnel);

    let all: Vec<&Row> = rows.iter().collect();
    let mut out = vec![summarize("India".to_string(), &all, india_funnel)];

    let mut seen = HashSet::new();
    for row in &rows {
        let Some(tmcid) = &row.tmcid else { continue };
        if !seen.insert(tmcid.clone()) {
            continue;
        }
        let subset: Vec<&Row> = rows
            .iter()
            .filter(|r| r.tmcid.as_ref() == Some(tmcid))
            .collect();
        let callflow = funnels.get(tmcid).cloned().unwrap_or_else(empty_funnel);
        out.push(summarize(mapper.map(tmcid), &subset, callflow));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        tmcid: &str,
        gender: &str,
        end: &str,
        talk: &str,
        age: Option<&str>,
        call_type: &str,
    ) -> CounsellingRecord {
        CounsellingRecord {
            tmcid: Some(tmcid.to_string()),
            gender: Some(gender.to_string()),
            age_raw: age.map(str::to_string),
            called_by: None,
            patient_district: None,
            callstarttime: Some(end.to_string()),
            callendtime: Some(end.to_string()),
            customertalktime: Some(talk.to_string()),
            call_type: Some(call_type.to_string()),
            triage: Some("Normal".to_string()),
        }
    }

    #[test]
    fn untracked_genders_filtered_out() {
        let records = vec![
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:04:00", None, "Incoming"),
            record("KA01_TMC", "Unknown", "2024-01-01 10:00:00", "00:04:00", None, "Incoming"),
        ];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        assert_eq!(out[0].state, "India");
        assert_eq!(out[0].total_calls, 1);
    }

    #[test]
    fn gender_keys_always_present() {
        let records = vec![record(
            "KA01_TMC", "Male", "2024-01-01 10:00:00", "00:04:00", None, "Incoming",
        )];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        assert_eq!(out[0].by_gender["Male"], 1);
        assert_eq!(out[0].by_gender["Female"], 0);
        assert_eq!(out[0].by_gender["Transgender"], 0);
    }

    #[test]
    fn average_duration_is_mean_minutes() {
        let records = vec![
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:04:00", None, "Incoming"),
            record("KA01_TMC", "Female", "2024-01-01 12:00:00", "00:06:00", None, "Incoming"),
        ];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        assert_eq!(out[0].avg_duration.len(), 1);
        assert_eq!(out[0].avg_duration[0].date, "2024-01-01");
        assert_eq!(out[0].avg_duration[0].minutes, 5.0);
        assert_eq!(out[0].timeseries[0].calls, 2);
    }

    #[test]
    fn age_groups_use_half_open_bins() {
        let records = vec![
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", Some("17"), "Incoming"),
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", Some("18"), "Incoming"),
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", Some("55"), "Incoming"),
        ];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        assert_eq!(out[0].by_age_group["Under 18"], 1);
        assert_eq!(out[0].by_age_group["18-24"], 1);
        assert_eq!(out[0].by_age_group["55+"], 1);
        assert_eq!(out[0].by_age_group["25-34"], 0);
    }

    #[test]
    fn per_state_entries_follow_first_seen_order() {
        let records = vec![
            record("MH01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", None, "Incoming"),
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", None, "Incoming"),
            record("MH01_TMC", "Female", "2024-01-02 10:00:00", "00:01:00", None, "Outgoing"),
        ];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        let states: Vec<&str> = out.iter().map(|o| o.state.as_str()).collect();
        assert_eq!(states, vec!["India", "MH01_TMC", "KA01_TMC"]);
        assert_eq!(out[1].total_calls, 2);
    }

    #[test]
    fn calls_by_direction_groups_month_and_type() {
        let records = vec![
            record("KA01_TMC", "Male", "2024-01-01 10:00:00", "00:01:00", None, "Incoming"),
            record("KA01_TMC", "Male", "2024-01-02 10:00:00", "00:01:00", None, "Incoming"),
            record("KA01_TMC", "Male", "2024-02-01 10:00:00", "00:01:00", None, "Outgoing"),
        ];
        let out = build(&records, &[], &[], &DisplayNameMapper::default());
        assert_eq!(out[0].calls_by_direction.len(), 2);
        let feb = out[0]
            .calls_by_direction
            .iter()
            .find(|v| v["month"] == "Feb")
            .unwrap();
        assert_eq!(feb["Outgoing"], 1);
    }
}
