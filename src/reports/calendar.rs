//! Month by weekday call-count matrices for the calendar heatmap.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use super::mapper::DisplayNameMapper;
use super::records::CallHandleRecord;
use super::violin::MONTH_LABELS;

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Serialize)]
pub struct CountryCalendar {
    pub year: i32,
    pub months: Vec<String>,
    pub days: Vec<String>,
    pub values: Vec<Vec<usize>>,
}

#[derive(Debug, Serialize)]
pub struct StateCalendar {
    pub states: Vec<String>,
    pub year: i32,
    pub months: Vec<String>,
    pub days: Vec<String>,
    pub values: Vec<Vec<Vec<usize>>>,
}

/// (tmcid, month 1-12, weekday Mon=0) triples for the target year.
fn rows_for_year(records: &[CallHandleRecord], year: i32) -> Vec<(&str, u32, usize)> {
    records
        .iter()
        .filter_map(|r| {
            let tmcid = r.tmcid.as_deref()?;
            let created = r.created_at()?;
            if created.year() != year {
                return None;
            }
            Some((
                tmcid,
                created.month(),
                created.weekday().num_days_from_monday() as usize,
            ))
        })
        .collect()
}

fn matrix(rows: impl Iterator<Item = (u32, usize)>) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0usize; 7]; 12];
    for (month, weekday) in rows {
        matrix[(month - 1) as usize][weekday] += 1;
    }
    matrix
}

fn labels() -> (Vec<String>, Vec<String>) {
    (
        MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        DAY_LABELS.iter().map(|d| d.to_string()).collect(),
    )
}

pub fn country(records: &[CallHandleRecord], year: i32) -> CountryCalendar {
    let (months, days) = labels();
    CountryCalendar {
        year,
        months,
        days,
        values: matrix(rows_for_year(records, year).into_iter().map(|(_, m, w)| (m, w))),
    }
}

pub fn per_state(
    records: &[CallHandleRecord],
    year: i32,
    mapper: &DisplayNameMapper,
) -> StateCalendar {
    let rows = rows_for_year(records, year);

    let mut by_tmcid: BTreeMap<&str, Vec<(u32, usize)>> = BTreeMap::new();
    for (tmcid, month, weekday) in rows {
        by_tmcid.entry(tmcid).or_default().push((month, weekday));
    }

    let mut states = Vec::with_capacity(by_tmcid.len());
    let mut values = Vec::with_capacity(by_tmcid.len());
    for (tmcid, rows) in by_tmcid {
        states.push(mapper.map(tmcid));
        values.push(matrix(rows.into_iter()));
    }

    let (months, days) = labels();
    StateCalendar {
        states,
        year,
        months,
        days,
        values,
    }
}
