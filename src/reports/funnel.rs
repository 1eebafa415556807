//! Funnel computation over call-handle rows.
//!
//! A funnel is an ordered list of labelled predicates applied cumulatively:
//! each stage filters the survivors of the previous stage, so counts are
//! monotonically non-increasing. Drop-off percentages guard against empty
//! stages by reporting 0.0 instead of dividing by zero.

use serde::Serialize;

use super::records::CallHandleRecord;

const MASTER_INBOUND: &str = "TeleManas_Master_Inbound_DONOT_TOUCH";

pub struct FunnelStage<T> {
    pub label: &'static str,
    pub predicate: fn(&T) -> bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelResult {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub dropoffs: Vec<usize>,
    #[serde(rename = "dropoffPercentages")]
    pub dropoff_percentages: Vec<f64>,
}

pub fn compute<T>(rows: Vec<&T>, stages: &[FunnelStage<T>]) -> FunnelResult {
    let mut labels = Vec::with_capacity(stages.len());
    let mut values = Vec::with_capacity(stages.len());

    let mut current = rows;
    for stage in stages {
        current.retain(|row| (stage.predicate)(row));
        labels.push(stage.label.to_string());
        values.push(current.len());
    }

    let mut dropoffs = Vec::with_capacity(values.len().saturating_sub(1));
    let mut dropoff_percentages = Vec::with_capacity(dropoffs.capacity());
    for i in 0..values.len().saturating_sub(1) {
        let dropped = values[i] - values[i + 1];
        dropoffs.push(dropped);
        dropoff_percentages.push(if values[i] > 0 {
            (dropped as f64 / values[i] as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        });
    }

    FunnelResult {
        labels,
        values,
        dropoffs,
        dropoff_percentages,
    }
}

fn received(_: &CallHandleRecord) -> bool {
    true
}

fn chose_state(r: &CallHandleRecord) -> bool {
    r.tmcid.as_deref() != Some(MASTER_INBOUND)
}

fn chose_language(r: &CallHandleRecord) -> bool {
    // Dropped here: never reached a language menu and never connected
    !(r.crt_object_id.is_none() && r.callstatus.as_deref() != Some("CONNECTED"))
}

fn connected(r: &CallHandleRecord) -> bool {
    r.callstatus.as_deref() == Some("CONNECTED")
}

fn successful(r: &CallHandleRecord) -> bool {
    r.telemanas_id.is_some()
}

fn gave_rating(r: &CallHandleRecord) -> bool {
    matches!(
        r.rating.as_deref(),
        Some("1" | "2" | "3" | "4" | "5" | "No Input")
    )
}

/// Stage list for the standalone call-flow chart.
pub fn call_flow_stages() -> Vec<FunnelStage<CallHandleRecord>> {
    vec![
        FunnelStage { label: "Received", predicate: received },
        FunnelStage { label: "Chose State", predicate: chose_state },
        FunnelStage { label: "Chose Language", predicate: chose_language },
        FunnelStage { label: "Connected Calls", predicate: connected },
        FunnelStage { label: "Successful Calls", predicate: successful },
        FunnelStage { label: "Gave Rating", predicate: gave_rating },
    ]
}

/// Stage list embedded in the per-state overview, with its shorter labels.
pub fn overview_stages() -> Vec<FunnelStage<CallHandleRecord>> {
    vec![
        FunnelStage { label: "Received", predicate: received },
        FunnelStage { label: "Chose State", predicate: chose_state },
        FunnelStage { label: "Chose Language", predicate: chose_language },
        FunnelStage { label: "Connected", predicate: connected },
        FunnelStage { label: "Successful", predicate: successful },
        FunnelStage { label: "Gave Rating", predicate: gave_rating },
    ]
}

/// Applies the pre-filter shared by every funnel artifact: drops the
/// configured training/outbound tmc ids and keeps incoming calls only.
pub fn incoming_calls<'a>(
    records: &'a [CallHandleRecord],
    exclude_tmcs: &[String],
) -> Vec<&'a CallHandleRecord> {
    records
        .iter()
        .filter(|r| {
            !r.tmcid
                .as_deref()
                .is_some_and(|t| exclude_tmcs.iter().any(|e| e == t))
        })
        .filter(|r| r.call_type.as_deref() == Some("Incoming"))
        .collect()
}

fn first_seen_tmcids(rows: &[&CallHandleRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut order = Vec::new();
    for row in rows {
        if let Some(tmcid) = &row.tmcid {
            if seen.insert(tmcid.clone()) {
                order.push(tmcid.clone());
            }
        }
    }
    order
}

#[derive(Debug, Serialize)]
pub struct CountryCallFlow {
    #[serde(rename = "callFlow")]
    pub call_flow: FunnelResult,
}

#[derive(Debug, Serialize)]
pub struct StateCallFlow {
    pub state: String,
    #[serde(rename = "callFlow")]
    pub call_flow: FunnelResult,
}

/// Country artifact: a single-element array for the chart widget.
pub fn country(
    records: &[CallHandleRecord],
    exclude_tmcs: &[String],
) -> Vec<CountryCallFlow> {
    let incoming = incoming_calls(records, exclude_tmcs);
    vec![CountryCallFlow {
        call_flow: compute(incoming, &call_flow_stages()),
    }]
}

/// Per-tmcid artifact, tmcids in first-seen order.
pub fn per_state(records: &[CallHandleRecord], exclude_tmcs: &[String]) -> Vec<StateCallFlow> {
    let incoming = incoming_calls(records, exclude_tmcs);
    let stages = call_flow_stages();

    first_seen_tmcids(&incoming)
        .into_iter()
        .map(|tmcid| {
            let subset: Vec<&CallHandleRecord> = incoming
                .iter()
                .copied()
                .filter(|r| r.tmcid.as_deref() == Some(tmcid.as_str()))
                .collect();
            StateCallFlow {
                call_flow: compute(subset, &stages),
                state: tmcid,
            }
        })
        .collect()
}

/// Funnels for the overview artifact: the aggregate "India" entry first,
/// then one per tmcid surviving the Chose State stage, first-seen order.
pub fn overview_funnels(
    records: &[CallHandleRecord],
    exclude_tmcs: &[String],
) -> Vec<(String, FunnelResult)> {
    let incoming = incoming_calls(records, exclude_tmcs);
    let stages = overview_stages();

    let mut out = vec![(
        "India".to_string(),
        compute(incoming.clone(), &stages),
    )];

    let after_chose_state: Vec<&CallHandleRecord> = incoming
        .iter()
        .copied()
        .filter(|r| chose_state(r))
        .collect();
    for tmcid in first_seen_tmcids(&after_chose_state) {
        let subset: Vec<&CallHandleRecord> = incoming
            .iter()
            .copied()
            .filter(|r| r.tmcid.as_deref() == Some(tmcid.as_str()))
            .collect();
        out.push((tmcid, compute(subset, &stages)));
    }
    out
}
