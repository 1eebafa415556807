//! Gender to age-group flows for the demographics sankey.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::mapper::DisplayNameMapper;
use super::records::CounsellingRecord;

const AGE_GROUPS: [&str; 3] = ["Adults", "Children", "Elders"];
const NODE_COLORS: [&str; 12] = [
    "#4f83cc", "#3498db", "#9b59b6", "#95a5a6", "#34495e", "#2ecc71", "#e74c3c", "#f1c40f",
    "#e67e22", "#8e44ad", "#16a085", "#7f8c8d",
];

fn age_group(age: f64) -> &'static str {
    if age <= 20.0 {
        "Children"
    } else if age <= 60.0 {
        "Adults"
    } else {
        "Elders"
    }
}

struct Row {
    tmcid: Option<String>,
    gender: String,
    age_group: &'static str,
}

/// Rows with a usable age; missing genders become "Prefer Not To Say".
fn usable_rows(records: &[CounsellingRecord]) -> Vec<Row> {
    records
        .iter()
        .filter_map(|r| {
            let age = r.age()?;
            Some(Row {
                tmcid: r.tmcid.clone(),
                gender: r
                    .gender
                    .clone()
                    .unwrap_or_else(|| "Prefer Not To Say".to_string()),
                age_group: age_group(age),
            })
        })
        .collect()
}

fn nodes_for(rows: &[Row]) -> Vec<String> {
    let genders: BTreeSet<&String> = rows.iter().map(|r| &r.gender).collect();
    let mut nodes: Vec<String> = genders.into_iter().cloned().collect();
    nodes.extend(AGE_GROUPS.iter().map(|g| g.to_string()));
    nodes
}

fn links(rows: impl Iterator<Item = (String, &'static str)>) -> BTreeMap<(String, &'static str), usize> {
    let mut counts = BTreeMap::new();
    for key in rows {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn node_colors() -> Vec<String> {
    NODE_COLORS.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Serialize)]
pub struct CountrySankey {
    pub nodes: Vec<String>,
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<usize>,
    #[serde(rename = "nodeColors")]
    pub node_colors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StateSankey {
    pub states: Vec<String>,
    pub nodes: Vec<String>,
    pub sources: Vec<Vec<usize>>,
    pub targets: Vec<Vec<usize>>,
    pub values: Vec<Vec<usize>>,
    #[serde(rename = "nodeColors")]
    pub node_colors: Vec<String>,
}

pub fn country(records: &[CounsellingRecord]) -> CountrySankey {
    let rows = usable_rows(records);
    let nodes = nodes_for(&rows);
    let index: BTreeMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let counts = links(rows.iter().map(|r| (r.gender.clone(), r.age_group)));

    let mut source = Vec::with_capacity(counts.len());
    let mut target = Vec::with_capacity(counts.len());
    let mut value = Vec::with_capacity(counts.len());
    for ((gender, group), count) in &counts {
        source.push(index[gender.as_str()]);
        target.push(index[group]);
        value.push(*count);
    }

    CountrySankey {
        nodes,
        source,
        target,
        value,
        node_colors: node_colors(),
    }
}

/// One link set per tmcid, tmcids alphabetical, display-mapped names.
pub fn per_state(records: &[CounsellingRecord], mapper: &DisplayNameMapper) -> StateSankey {
    let rows = usable_rows(records);
    let nodes = nodes_for(&rows);
    let index: BTreeMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let tmcids: BTreeSet<&String> = rows.iter().filter_map(|r| r.tmcid.as_ref()).collect();

    let mut states = Vec::with_capacity(tmcids.len());
    let mut sources = Vec::with_capacity(tmcids.len());
    let mut targets = Vec::with_capacity(tmcids.len());
    let mut values = Vec::with_capacity(tmcids.len());

    for tmcid in tmcids {
        let counts = links(
            rows.iter()
                .filter(|r| r.tmcid.as_ref() == Some(tmcid))
                .map(|r| (r.gender.clone(), r.age_group)),
        );

        let mut source = Vec::with_capacity(counts.len());
        let mut target = Vec::with_capacity(counts.len());
        let mut value = Vec::with_capacity(counts.len());
        for ((gender, group), count) in &counts {
            source.push(index[gender.as_str()]);
            target.push(index[group]);
            value.push(*count);
        }

        states.push(mapper.map(tmcid));
        sources.push(source);
        targets.push(target);
        values.push(value);
    }

    StateSankey {
        states,
        nodes,
        sources,
        targets,
        values,
        node_colors: node_colors(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tmcid: &str, gender: Option<&str>, age: Option<&str>) -> CounsellingRecord {
        CounsellingRecord {
            tmcid: Some(tmcid.to_string()),
            gender: gender.map(str::to_string),
            age_raw: age.map(str::to_string),
            called_by: None,
            patient_district: None,
            callstarttime: None,
            callendtime: None,
            customertalktime: None,
            call_type: None,
            triage: None,
        }
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(age_group(20.0), "Children");
        assert_eq!(age_group(21.0), "Adults");
        assert_eq!(age_group(60.0), "Adults");
        assert_eq!(age_group(61.0), "Elders");
    }

    #[test]
    fn total_flow_equals_usable_rows() {
        let records = vec![
            record("KA01_TMC", Some("Male"), Some("30")),
            record("KA01_TMC", Some("Female"), Some("15")),
            record("KA01_TMC", Some("Male"), Some("70")),
            record("KA01_TMC", Some("Male"), None), // no age, dropped
        ];
        let out = country(&records);
        let total: usize = out.value.iter().sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn nodes_are_sorted_genders_then_fixed_age_groups() {
        let records = vec![
            record("KA01_TMC", Some("Male"), Some("30")),
            record("KA01_TMC", Some("Female"), Some("15")),
            record("KA01_TMC", None, Some("40")),
        ];
        let out = country(&records);
        assert_eq!(
            out.nodes,
            vec!["Female", "Male", "Prefer Not To Say", "Adults", "Children", "Elders"]
        );
        assert_eq!(out.node_colors.len(), 12);
    }

    #[test]
    fn state_links_partition_country_flow() {
        let records = vec![
            record("KA01_TMC", Some("Male"), Some("30")),
            record("MH01_TMC", Some("Male"), Some("30")),
            record("MH01_TMC", Some("Female"), Some("65")),
        ];
        let out = per_state(&records, &DisplayNameMapper::default());
        assert_eq!(out.states, vec!["KA01_TMC", "MH01_TMC"]);
        let per_state_total: usize = out.values.iter().flatten().sum();
        assert_eq!(per_state_total, 3);
    }
}
