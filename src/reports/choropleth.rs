//! Call volume per tmcid for the map widget, plus per-state top districts.

use serde::Serialize;
use std::collections::BTreeMap;

use super::mapper::DisplayNameMapper;
use super::records::CounsellingRecord;

#[derive(Debug, Serialize)]
pub struct CountryChoropleth {
    pub locations: Vec<String>,
    pub values: Vec<usize>,
    pub text: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StateTopDistricts {
    pub states: Vec<String>,
    pub values: Vec<Vec<usize>>,
    pub labels: Vec<Vec<String>>,
}

/// Row counts per tmcid, largest first, alphabetical within ties.
pub fn country(records: &[CounsellingRecord], mapper: &DisplayNameMapper) -> CountryChoropleth {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        if let Some(tmcid) = record.tmcid.as_deref() {
            *counts.entry(tmcid).or_default() += 1;
        }
    }

    let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let locations: Vec<String> = entries.iter().map(|(t, _)| mapper.map(t)).collect();
    CountryChoropleth {
        text: locations.clone(),
        values: entries.iter().map(|(_, c)| *c).collect(),
        locations,
    }
}

/// Top-5 districts by call volume inside each tmcid.
pub fn per_state(records: &[CounsellingRecord], mapper: &DisplayNameMapper) -> StateTopDistricts {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for record in records {
        if let (Some(tmcid), Some(district)) =
            (record.tmcid.as_deref(), record.patient_district.as_deref())
        {
            *grouped.entry(tmcid).or_default().entry(district).or_default() += 1;
        }
    }

    let mut states = Vec::with_capacity(grouped.len());
    let mut values = Vec::with_capacity(grouped.len());
    let mut labels = Vec::with_capacity(grouped.len());

    for (tmcid, district_counts) in &grouped {
        let mut entries: Vec<(&str, usize)> =
            district_counts.iter().map(|(d, c)| (*d, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(5);

        states.push(mapper.map(tmcid));
        values.push(entries.iter().map(|(_, c)| *c).collect());
        labels.push(entries.iter().map(|(d, _)| d.to_string()).collect());
    }

    StateTopDistricts {
        states,
        values,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tmcid: &str, district: Option<&str>) -> CounsellingRecord {
        CounsellingRecord {
            tmcid: Some(tmcid.to_string()),
            gender: None,
            age_raw: None,
            called_by: None,
            patient_district: district.map(str::to_string),
            callstarttime: None,
            callendtime: None,
            customertalktime: None,
            call_type: None,
            triage: None,
        }
    }

    #[test]
    fn country_sorted_by_count_descending() {
        let records = vec![
            record("MH01_TMC", None),
            record("KA01_TMC", None),
            record("MH01_TMC", None),
        ];
        let out = country(&records, &DisplayNameMapper::default());
        assert_eq!(out.locations, vec!["MH01_TMC", "KA01_TMC"]);
        assert_eq!(out.values, vec![2, 1]);
        assert_eq!(out.text, out.locations);
    }

    #[test]
    fn ties_break_alphabetically() {
        let records = vec![record("B_TMC", None), record("A_TMC", None)];
        let out = country(&records, &DisplayNameMapper::default());
        assert_eq!(out.locations, vec!["A_TMC", "B_TMC"]);
    }

    #[test]
    fn top_districts_capped_at_five() {
        let mut records = Vec::new();
        for (district, n) in [("D1", 6), ("D2", 5), ("D3", 4), ("D4", 3), ("D5", 2), ("D6", 1)] {
            for _ in 0..n {
                records.push(record("KA01_TMC", Some(district)));
            }
        }
        let out = per_state(&records, &DisplayNameMapper::default());
        assert_eq!(out.labels[0], vec!["D1", "D2", "D3", "D4", "D5"]);
        assert_eq!(out.values[0], vec![6, 5, 4, 3, 2]);
    }
}
