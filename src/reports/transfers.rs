//! Inter-state transfer flows for the sankey widget.
//!
//! A transfer is an adjacent pair of differing states within one call
//! chain (rows sharing a crt_object_id, ordered by creation time). Only
//! chains with more than one event and only initial transfers
//! (transferredto == "0") are considered.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::mapper::DisplayNameMapper;
use super::records::{title_case, CallHandleRecord};

#[derive(Debug, Serialize)]
pub struct TransferSankey {
    pub nodes: Vec<String>,
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<usize>,
}

struct Event {
    chain_id: String,
    state: Option<String>,
    created: NaiveDateTime,
}

pub fn build(
    records: &[CallHandleRecord],
    threshold: usize,
    mapper: &DisplayNameMapper,
) -> TransferSankey {
    // Chains with a single event cannot contain a transfer
    let mut chain_sizes: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(id) = record.crt_object_id.as_deref() {
            *chain_sizes.entry(id).or_default() += 1;
        }
    }

    let mut seen = HashSet::new();
    let mut events: Vec<Event> = records
        .iter()
        .filter_map(|record| {
            let chain_id = record.crt_object_id.as_deref()?;
            if chain_sizes.get(chain_id).copied().unwrap_or(0) <= 1 {
                return None;
            }
            let created = record.created_at()?;
            // Exact duplicate rows collapse to one event
            let key = (
                chain_id.to_string(),
                record.state_name.clone(),
                created,
                record.transferredto.clone(),
            );
            if !seen.insert(key) {
                return None;
            }
            if record.transferredto.as_deref() != Some("0") {
                return None;
            }
            Some(Event {
                chain_id: chain_id.to_string(),
                state: record
                    .state_name
                    .as_deref()
                    .map(|s| title_case(s.trim())),
                created,
            })
        })
        .collect();

    events.sort_by(|a, b| (a.chain_id.as_str(), a.created).cmp(&(b.chain_id.as_str(), b.created)));

    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut i = 0;
    while i < events.len() {
        let mut j = i;
        while j < events.len() && events[j].chain_id == events[i].chain_id {
            j += 1;
        }
        for pair in events[i..j].windows(2) {
            if let (Some(from), Some(to)) = (&pair[0].state, &pair[1].state) {
                if from != to {
                    *counts.entry((from.clone(), to.clone())).or_default() += 1;
                }
            }
        }
        i = j;
    }

    counts.retain(|_, count| *count > threshold);

    let node_set: BTreeSet<&String> = counts
        .keys()
        .flat_map(|(from, to)| [from, to])
        .collect();
    let node_names: Vec<&String> = node_set.into_iter().collect();
    let index: HashMap<&String, usize> = node_names
        .iter()
        .enumerate()
        .map(|(i, n)| (*n, i))
        .collect();

    let mut source = Vec::with_capacity(counts.len());
    let mut target = Vec::with_capacity(counts.len());
    let mut value = Vec::with_capacity(counts.len());
    for ((from, to), count) in &counts {
        source.push(index[from]);
        target.push(index[to]);
        value.push(*count);
    }

    TransferSankey {
        nodes: mapper.map_list(&node_names),
        source,
        target,
        value,
    }
}
