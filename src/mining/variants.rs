//! Variant discovery.
//!
//! A variant is a distinct ordered sequence of activities. Each variant
//! carries its case count, its share of all cases in the view, and the
//! distribution of a grouping attribute over its cases.

use std::collections::HashMap;

use crate::mining::binning::Grouping;
use crate::mining::event_log::{Activity, EventLog};
use crate::models::charts::{DataItem, DataSeries, Variant};

/// Distinct activity sequences in order of first appearance, each with the
/// ids of the cases that follow it.
pub fn variant_case_ids(log: &EventLog) -> Vec<(Vec<Activity>, Vec<String>)> {
    let mut order: Vec<Vec<Activity>> = Vec::new();
    let mut index: HashMap<Vec<Activity>, usize> = HashMap::new();
    let mut cases_by_variant: Vec<Vec<String>> = Vec::new();

    for (case_id, events) in log.cases() {
        let sequence: Vec<Activity> = events.iter().map(|event| event.activity).collect();
        let slot = *index.entry(sequence.clone()).or_insert_with(|| {
            order.push(sequence);
            cases_by_variant.push(Vec::new());
            order.len() - 1
        });
        cases_by_variant[slot].push(case_id.to_string());
    }

    order.into_iter().zip(cases_by_variant).collect()
}

/// Discover the variants of the view, most frequent first.
///
/// Each variant's distribution counts its cases per grouping value, zero
/// filled over the grouping domain and ordered by descending count. Cases
/// missing the grouping value fall into a `"None"` bucket.
pub fn variants_with_frequencies(log: &EventLog, grouping: &Grouping) -> Vec<Variant> {
    let total_cases = log.case_count();
    let group_of_case: HashMap<&str, Option<String>> = log
        .cases()
        .iter()
        .map(|(case_id, events)| {
            let label = events
                .first()
                .and_then(|event| event.value(&grouping.column))
                .map(|value| value.label());
            (*case_id, label)
        })
        .collect();

    let mut variants: Vec<Variant> = variant_case_ids(log)
        .into_iter()
        .map(|(activities, case_ids)| {
            let count = case_ids.len();
            let frequency = if total_cases == 0 {
                0.0
            } else {
                count as f64 / total_cases as f64
            };

            let mut counts: HashMap<String, usize> = grouping
                .domain
                .iter()
                .map(|label| (label.clone(), 0))
                .collect();
            let mut missing = 0usize;
            for case_id in &case_ids {
                match group_of_case.get(case_id.as_str()).and_then(Clone::clone) {
                    Some(label) => *counts.entry(label).or_insert(0) += 1,
                    None => missing += 1,
                }
            }

            let mut labels: Vec<String> = grouping.domain.clone();
            if missing > 0 {
                labels.push("None".to_string());
                counts.insert("None".to_string(), missing);
            }
            let mut data: Vec<DataItem> = labels
                .into_iter()
                .map(|x| {
                    let y = counts.get(&x).copied().unwrap_or(0) as f64;
                    DataItem { x, y }
                })
                .collect();
            data.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal));

            let distribution = DataSeries::new(grouping.column.clone(), data);
            Variant::new(activities, count, frequency, distribution)
        })
        .collect();

    variants.sort_by(|a, b| {
        b.frequency
            .partial_cmp(&a.frequency)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    variants
}
