//! De-jure graphs over the canonical pathway.
//!
//! The de-jure view keeps only the cases whose activity sequence is a
//! prefix of the canonical happy path. Three graph flavors share its
//! structure: remain (share of an activity's occurrences that proceed),
//! drop (share of traces terminating at an activity) and time (a duration
//! statistic per transition). Edges are emitted per disaggregation group
//! and labeled with the group value.

use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::mining::binning::{split_by_group, Grouping};
use crate::mining::dfg::{discover_dfg, discover_performance_dfg, TransitionTiming};
use crate::mining::event_log::{Activity, EventLog};
use crate::models::charts::{Edge, Graph, Node};
use crate::models::requests::DejureStatistic;

const DEJURE_GRAPH_NAME: &str = "Dejure-DFG";

/// Keep only the cases whose activity sequence is a prefix of the happy
/// path, including the full path itself.
pub fn dejure_view(log: &EventLog) -> EventLog {
    let conforming: std::collections::HashSet<String> = log
        .cases()
        .iter()
        .filter(|(_, events)| {
            let sequence: Vec<Activity> = events.iter().map(|event| event.activity).collect();
            Activity::HAPPY_PATH.starts_with(&sequence)
        })
        .map(|(case_id, _)| case_id.to_string())
        .collect();
    log.retain_view(|event| conforming.contains(&event.case_id))
}

/// Build the requested de-jure graph.
pub fn dejure_graph(
    log: &EventLog,
    grouping: &Grouping,
    statistic: DejureStatistic,
) -> Result<Graph, ConfigurationError> {
    match statistic {
        DejureStatistic::Remain => remain_graph(log, grouping),
        DejureStatistic::Drop => drop_graph(log, grouping),
        DejureStatistic::Min
        | DejureStatistic::Max
        | DejureStatistic::Mean
        | DejureStatistic::Median => time_graph(log, grouping, statistic),
    }
}

/// Occurrences of each activity among events carrying a grouping value.
fn activity_frequencies(log: &EventLog, grouping: &Grouping) -> BTreeMap<Activity, usize> {
    let mut frequencies = BTreeMap::new();
    for event in log.events() {
        if event.value(&grouping.column).is_some() {
            *frequencies.entry(event.activity).or_insert(0) += 1;
        }
    }
    frequencies
}

fn frequency_nodes(frequencies: &BTreeMap<Activity, usize>) -> Vec<Node> {
    frequencies
        .iter()
        .map(|(activity, count)| Node::new(activity.name(), activity.name(), Some(*count as f64)))
        .collect()
}

/// Per-group directly-follows transitions of the de-jure cases.
fn grouped_transitions(
    log: &EventLog,
    grouping: &Grouping,
) -> Vec<(String, BTreeMap<(Activity, Activity), usize>)> {
    let dejure = dejure_view(log);
    split_by_group(&dejure, grouping)
        .into_iter()
        .map(|(label, view)| (label, discover_dfg(&view).transitions))
        .collect()
}

/// The remain graph: nodes carry activity frequencies; each edge carries
/// the share of the source activity's occurrences that proceed along it
/// within the edge's group.
pub fn remain_graph(log: &EventLog, grouping: &Grouping) -> Result<Graph, ConfigurationError> {
    let frequencies = activity_frequencies(log, grouping);
    let nodes = frequency_nodes(&frequencies);

    let mut edges = Vec::new();
    for (label, transitions) in grouped_transitions(log, grouping) {
        for ((source, target), frequency) in transitions {
            let total = frequencies.get(&source).copied().unwrap_or(0);
            let value = if total == 0 {
                0.0
            } else {
                frequency as f64 / total as f64
            };
            edges.push(Edge::new(
                source.name(),
                target.name(),
                Some(label.clone()),
                Some(value),
            ));
        }
    }

    Graph::new(DEJURE_GRAPH_NAME, nodes, edges)
}

/// The drop graph: nodes carry end-activity counts; each edge carries the
/// share of traces in the edge's group that terminate at its source.
/// Happy-path activities that no case ends at still appear, at zero.
pub fn drop_graph(log: &EventLog, grouping: &Grouping) -> Result<Graph, ConfigurationError> {
    // end-activity counts, per group and overall
    let mut ends_by_group: BTreeMap<(String, Activity), usize> = BTreeMap::new();
    let mut end_totals: BTreeMap<Activity, usize> = BTreeMap::new();
    for (_, events) in log.cases() {
        let Some(last) = events.last() else { continue };
        *end_totals.entry(last.activity).or_insert(0) += 1;
        if let Some(value) = last.value(&grouping.column) {
            *ends_by_group
                .entry((value.label(), last.activity))
                .or_insert(0) += 1;
        }
    }

    let mut nodes: Vec<Node> = end_totals
        .iter()
        .map(|(activity, count)| Node::new(activity.name(), activity.name(), Some(*count as f64)))
        .collect();
    for activity in Activity::HAPPY_PATH {
        if !end_totals.contains_key(&activity) {
            nodes.push(Node::new(activity.name(), activity.name(), Some(0.0)));
        }
    }

    let mut edges = Vec::new();
    for (label, transitions) in grouped_transitions(log, grouping) {
        for ((source, target), _) in transitions {
            let total = end_totals.get(&source).copied().unwrap_or(0);
            let value = if total == 0 {
                0.0
            } else {
                let dropped = ends_by_group
                    .get(&(label.clone(), source))
                    .copied()
                    .unwrap_or(0);
                dropped as f64 / total as f64
            };
            edges.push(Edge::new(
                source.name(),
                target.name(),
                Some(label.clone()),
                Some(value),
            ));
        }
    }

    Graph::new(DEJURE_GRAPH_NAME, nodes, edges)
}

/// The time graph: nodes carry activity frequencies; each edge carries the
/// chosen duration statistic of its transition within the edge's group,
/// in minutes.
pub fn time_graph(
    log: &EventLog,
    grouping: &Grouping,
    statistic: DejureStatistic,
) -> Result<Graph, ConfigurationError> {
    let frequencies = activity_frequencies(log, grouping);
    let nodes = frequency_nodes(&frequencies);

    let dejure = dejure_view(log);
    let mut edges = Vec::new();
    for (label, view) in split_by_group(&dejure, grouping) {
        for ((source, target), timing) in discover_performance_dfg(&view) {
            let seconds = pick_statistic(&timing, statistic);
            edges.push(Edge::new(
                source.name(),
                target.name(),
                Some(label.clone()),
                Some(seconds / 60.0),
            ));
        }
    }

    Graph::new(DEJURE_GRAPH_NAME, nodes, edges)
}

fn pick_statistic(timing: &TransitionTiming, statistic: DejureStatistic) -> f64 {
    match statistic {
        DejureStatistic::Min => timing.min,
        DejureStatistic::Max => timing.max,
        DejureStatistic::Mean => timing.mean,
        DejureStatistic::Median => timing.median,
        DejureStatistic::Remain | DejureStatistic::Drop => 0.0,
    }
}
