//! Top-5 districts with male/female call counts per state, for the
//! population-pyramid widget. States with fewer than five districts on
//! record are omitted.

use serde::Serialize;
use std::collections::BTreeMap;

use super::records::{title_case, ComplaintRecord};

#[derive(Debug, Serialize)]
pub struct DistrictGender {
    pub states: Vec<String>,
    pub districts: Vec<Vec<String>>,
    pub male: Vec<Vec<usize>>,
    pub female: Vec<Vec<usize>>,
}

pub fn per_state(records: &[ComplaintRecord]) -> DistrictGender {
    // state -> district -> (total, male, female)
    let mut grouped: BTreeMap<&str, BTreeMap<&str, (usize, usize, usize)>> = BTreeMap::new();
    for record in records {
        let (Some(state), Some(district)) = (
            record.patient_state.as_deref(),
            record.patient_district.as_deref(),
        ) else {
            continue;
        };
        let entry = grouped.entry(state).or_default().entry(district).or_default();
        entry.0 += 1;
        match record.patient_gender.as_deref() {
            Some("Male") => entry.1 += 1,
            Some("Female") => entry.2 += 1,
            _ => {}
        }
    }

    let mut out = DistrictGender {
        states: Vec::new(),
        districts: Vec::new(),
        male: Vec::new(),
        female: Vec::new(),
    };

    for (state, district_counts) in &grouped {
        if district_counts.len() < 5 {
            continue;
        }

        let mut entries: Vec<(&str, (usize, usize, usize))> = district_counts
            .iter()
            .map(|(d, c)| (*d, *c))
            .collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
        entries.truncate(5);

        out.states.push(title_case(state));
        out.districts
            .push(entries.iter().map(|(d, _)| title_case(d)).collect());
        out.male.push(entries.iter().map(|(_, c)| c.1).collect());
        out.female.push(entries.iter().map(|(_, c)| c.2).collect());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, district: &str, gender: &str) -> ComplaintRecord {
        ComplaintRecord {
            patient_state: Some(state.to_string()),
            patient_district: Some(district.to_string()),
            patient_gender: Some(gender.to_string()),
        }
    }

    fn state_with_districts(state: &str, n: usize) -> Vec<ComplaintRecord> {
        let mut records = Vec::new();
        for i in 0..n {
            // District i gets i+1 rows so the top-5 ordering is deterministic
            for _ in 0..=i {
                records.push(record(state, &format!("DISTRICT {}", i), "Male"));
            }
        }
        records
    }

    #[test]
    fn states_under_five_districts_skipped() {
        let out = per_state(&state_with_districts("KERALA", 4));
        assert!(out.states.is_empty());
    }

    #[test]
    fn top_five_districts_by_volume_title_cased() {
        let out = per_state(&state_with_districts("KERALA", 6));
        assert_eq!(out.states, vec!["Kerala"]);
        assert_eq!(
            out.districts[0],
            vec!["District 5", "District 4", "District 3", "District 2", "District 1"]
        );
        assert_eq!(out.male[0], vec![6, 5, 4, 3, 2]);
        assert_eq!(out.female[0], vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn gender_counts_split() {
        let records = vec![
            record("GOA", "D1", "Male"),
            record("GOA", "D1", "Female"),
            record("GOA", "D1", "Female"),
            record("GOA", "D2", "Male"),
            record("GOA", "D3", "Male"),
            record("GOA", "D4", "Male"),
            record("GOA", "D5", "Male"),
        ];
        let out = per_state(&records);
        assert_eq!(out.districts[0][0], "D1");
        assert_eq!(out.male[0][0], 1);
        assert_eq!(out.female[0][0], 2);
    }
}
