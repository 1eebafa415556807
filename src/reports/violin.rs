//! Five-number summaries of daily call volume per month, split into
//! begin/end-of-month days (day <= 5 or >= 25) versus mid-month days.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use super::mapper::DisplayNameMapper;
use super::records::{title_case, CallHandleRecord};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Serialize)]
pub struct FiveNumberSummary {
    pub min: Vec<i64>,
    pub q1: Vec<i64>,
    pub median: Vec<i64>,
    pub q3: Vec<i64>,
    pub max: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CountryViolin {
    pub months: Vec<String>,
    pub beg_end: FiveNumberSummary,
    pub middle: FiveNumberSummary,
}

#[derive(Debug, Serialize)]
pub struct StateViolin {
    pub states: Vec<String>,
    pub months: Vec<String>,
    pub beg_end: Vec<FiveNumberSummary>,
    pub middle: Vec<FiveNumberSummary>,
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[usize], q: f64) -> f64 {
    let idx = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = idx.floor() as usize;
    let frac = idx - lo as f64;
    let lo_v = sorted[lo] as f64;
    if frac == 0.0 {
        lo_v
    } else {
        lo_v + frac * (sorted[lo + 1] as f64 - lo_v)
    }
}

fn summarize(monthly: &[Vec<usize>; 12]) -> FiveNumberSummary {
    let mut out = FiveNumberSummary {
        min: Vec::with_capacity(12),
        q1: Vec::with_capacity(12),
        median: Vec::with_capacity(12),
        q3: Vec::with_capacity(12),
        max: Vec::with_capacity(12),
    };
    for values in monthly {
        if values.is_empty() {
            out.min.push(0);
            out.q1.push(0);
            out.median.push(0);
            out.q3.push(0);
            out.max.push(0);
            continue;
        }
        let mut sorted = values.clone();
        sorted.sort_unstable();
        out.min.push(sorted[0] as i64);
        out.q1.push(percentile(&sorted, 25.0) as i64);
        out.median.push(percentile(&sorted, 50.0) as i64);
        out.q3.push(percentile(&sorted, 75.0) as i64);
        out.max.push(sorted[sorted.len() - 1] as i64);
    }
    out
}

/// Splits the per-day counts of every year-month into the two day classes
/// and pools them per calendar month across years.
fn monthly_day_counts(times: &[NaiveDateTime]) -> ([Vec<usize>; 12], [Vec<usize>; 12]) {
    let mut per_period: BTreeMap<(i32, u32), BTreeMap<u32, usize>> = BTreeMap::new();
    for t in times {
        *per_period
            .entry((t.year(), t.month()))
            .or_default()
            .entry(t.day())
            .or_default() += 1;
    }

    let mut beg_end: [Vec<usize>; 12] = Default::default();
    let mut middle: [Vec<usize>; 12] = Default::default();
    for ((_, month), day_counts) in &per_period {
        let idx = (*month - 1) as usize;
        for (day, count) in day_counts {
            if *day <= 5 || *day >= 25 {
                beg_end[idx].push(*count);
            } else {
                middle[idx].push(*count);
            }
        }
    }
    (beg_end, middle)
}

fn month_labels() -> Vec<String> {
    MONTH_LABELS.iter().map(|m| m.to_string()).collect()
}

fn cleaned_rows(records: &[CallHandleRecord]) -> Vec<(String, NaiveDateTime)> {
    records
        .iter()
        .filter_map(|r| {
            let state = r.state_name.as_deref()?;
            let created = r.created_at()?;
            Some((title_case(state.trim()), created))
        })
        .collect()
}

pub fn country(records: &[CallHandleRecord]) -> CountryViolin {
    let times: Vec<NaiveDateTime> = cleaned_rows(records).into_iter().map(|(_, t)| t).collect();
    let (beg_end, middle) = monthly_day_counts(&times);
    CountryViolin {
        months: month_labels(),
        beg_end: summarize(&beg_end),
        middle: summarize(&middle),
    }
}

/// Per-state summaries, alphabetical, skipping the aggregate "India" rows.
pub fn per_state(records: &[CallHandleRecord], mapper: &DisplayNameMapper) -> StateViolin {
    let mut by_state: BTreeMap<String, Vec<NaiveDateTime>> = BTreeMap::new();
    for (state, created) in cleaned_rows(records) {
        if state == "India" {
            continue;
        }
        by_state.entry(state).or_default().push(created);
    }

    let mut states = Vec::with_capacity(by_state.len());
    let mut beg_end_all = Vec::with_capacity(by_state.len());
    let mut middle_all = Vec::with_capacity(by_state.len());
    for (state, times) in &by_state {
        let (beg_end, middle) = monthly_day_counts(times);
        states.push(mapper.map(state));
        beg_end_all.push(summarize(&beg_end));
        middle_all.push(summarize(&middle));
    }

    StateViolin {
        states,
        months: month_labels(),
        beg_end: beg_end_all,
        middle: middle_all,
    }
}
