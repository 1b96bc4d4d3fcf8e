//! Directly-follows graph discovery.
//!
//! A transition is a pair of consecutive events within one case. The
//! frequency graph reports how often each transition occurs; the
//! performance variant aggregates the elapsed time along each transition.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::ConfigurationError;
use crate::mining::event_log::{Activity, EventLog};
use crate::models::charts::{Edge, Graph, Node};

/// Frequency counts discovered from a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfgCounts {
    /// Occurrences of each directly-follows transition.
    pub transitions: BTreeMap<(Activity, Activity), usize>,
    /// How many cases start with each activity.
    pub start_activities: BTreeMap<Activity, usize>,
    /// How many cases end with each activity.
    pub end_activities: BTreeMap<Activity, usize>,
    /// Total occurrences of each activity.
    pub activity_counts: BTreeMap<Activity, usize>,
}

/// Count transitions, start/end activities and activity occurrences.
pub fn discover_dfg(log: &EventLog) -> DfgCounts {
    let mut counts = DfgCounts::default();
    for (_, events) in log.cases() {
        if let Some(first) = events.first() {
            *counts.start_activities.entry(first.activity).or_insert(0) += 1;
        }
        if let Some(last) = events.last() {
            *counts.end_activities.entry(last.activity).or_insert(0) += 1;
        }
        for event in &events {
            *counts.activity_counts.entry(event.activity).or_insert(0) += 1;
        }
        for pair in events.windows(2) {
            *counts
                .transitions
                .entry((pair[0].activity, pair[1].activity))
                .or_insert(0) += 1;
        }
    }
    counts
}

/// Elapsed-time statistics along one transition, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl TransitionTiming {
    fn from_durations(mut durations: Vec<f64>) -> Self {
        durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let count = durations.len();
        let min = durations.first().copied().unwrap_or(0.0);
        let max = durations.last().copied().unwrap_or(0.0);
        let mean = if count == 0 {
            0.0
        } else {
            durations.iter().sum::<f64>() / count as f64
        };
        let median = match count {
            0 => 0.0,
            n if n % 2 == 1 => durations[n / 2],
            n => (durations[n / 2 - 1] + durations[n / 2]) / 2.0,
        };
        Self {
            min,
            max,
            mean,
            median,
        }
    }
}

/// Aggregate the elapsed time of each directly-follows transition.
pub fn discover_performance_dfg(
    log: &EventLog,
) -> BTreeMap<(Activity, Activity), TransitionTiming> {
    let mut durations: BTreeMap<(Activity, Activity), Vec<f64>> = BTreeMap::new();
    for (_, events) in log.cases() {
        for pair in events.windows(2) {
            let elapsed = (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64;
            durations
                .entry((pair[0].activity, pair[1].activity))
                .or_default()
                .push(elapsed);
        }
    }
    durations
        .into_iter()
        .map(|(transition, samples)| (transition, TransitionTiming::from_durations(samples)))
        .collect()
}

/// The frequency directly-follows graph of the view. Nodes are the
/// activities appearing in any transition or as a case start or end; edges
/// carry the transition frequency.
pub fn frequency_graph(log: &EventLog) -> Result<Graph, ConfigurationError> {
    let counts = discover_dfg(log);

    let mut activities: Vec<Activity> = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    let candidates = counts
        .transitions
        .keys()
        .flat_map(|(source, target)| [*source, *target])
        .chain(counts.start_activities.keys().copied())
        .chain(counts.end_activities.keys().copied());
    for activity in candidates {
        if seen.insert(activity) {
            activities.push(activity);
        }
    }
    activities.sort();

    let nodes: Vec<Node> = activities
        .iter()
        .map(|activity| Node::new(activity.name(), activity.name(), None))
        .collect();
    let edges: Vec<Edge> = counts
        .transitions
        .iter()
        .map(|((source, target), frequency)| {
            Edge::new(source.name(), target.name(), None, Some(*frequency as f64))
        })
        .collect();

    Graph::new("DFG", nodes, edges)
}
