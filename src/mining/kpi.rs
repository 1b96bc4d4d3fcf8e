//! The KPI catalog.
//!
//! Every KPI produces a [`MultiDataSeries`]: one series per legend value
//! when a legend grouping is given, a single series named after the KPI
//! otherwise. The x axis runs over the disaggregation domain and is zero
//! filled, except where a KPI documents otherwise.

use std::collections::HashMap;

use crate::mining::binning::Grouping;
use crate::mining::event_log::{Activity, Event, EventLog};
use crate::models::charts::{DataItem, DataSeries, MultiDataSeries};
use crate::models::requests::KpiType;

/// Compute the requested KPI over the view.
pub fn compute_kpi(
    log: &EventLog,
    kpi: KpiType,
    disaggregation: &Grouping,
    legend: Option<&Grouping>,
) -> MultiDataSeries {
    match kpi {
        KpiType::HappyPathAdherence => happy_path_adherence(log, disaggregation, legend),
        KpiType::DropOut => drop_out(log, disaggregation),
        KpiType::PermutedPathAdherence => permuted_path_adherence(log, disaggregation, legend),
        KpiType::BureaucraticDuration => activity_span_duration(
            log,
            kpi,
            Activity::Referral,
            Activity::Procurement,
            disaggregation,
            legend,
        ),
        KpiType::EvaluationToApproach => activity_span_duration(
            log,
            kpi,
            Activity::Evaluation,
            Activity::Approach,
            disaggregation,
            legend,
        ),
        KpiType::AuthorizationToProcurement => activity_span_duration(
            log,
            kpi,
            Activity::Authorization,
            Activity::Procurement,
            disaggregation,
            legend,
        ),
    }
}

/// The grouping value of a case, read off its first event.
fn case_group(events: &[&Event], column: &str) -> Option<String> {
    events
        .first()
        .and_then(|event| event.value(column))
        .map(|value| value.label())
}

fn is_happy_path(events: &[&Event]) -> bool {
    events.len() == Activity::HAPPY_PATH.len()
        && events
            .iter()
            .zip(Activity::HAPPY_PATH)
            .all(|(event, expected)| event.activity == expected)
}

/// Legend cells to iterate: the legend domain, or a single cell named
/// after the KPI when no legend grouping is given.
fn legend_cells(legend: Option<&Grouping>) -> Vec<Option<String>> {
    match legend {
        Some(grouping) => grouping.domain.iter().cloned().map(Some).collect(),
        None => vec![None],
    }
}

fn cell_name(kpi: KpiType, cell: &Option<String>) -> String {
    cell.clone().unwrap_or_else(|| kpi.title().to_string())
}

/// Share of cases following the happy path, per disaggregation value and
/// legend value. Cells with no cases chart as zero.
fn happy_path_adherence(
    log: &EventLog,
    disaggregation: &Grouping,
    legend: Option<&Grouping>,
) -> MultiDataSeries {
    // (legend value, disaggregation value) -> (happy cases, total cases)
    let mut cells: HashMap<(Option<String>, String), (usize, usize)> = HashMap::new();
    for (_, events) in log.cases() {
        let Some(group) = case_group(&events, &disaggregation.column) else {
            continue;
        };
        let legend_value = match legend {
            Some(grouping) => match case_group(&events, &grouping.column) {
                Some(value) => Some(value),
                None => continue,
            },
            None => None,
        };
        let entry = cells.entry((legend_value, group)).or_insert((0, 0));
        entry.1 += 1;
        if is_happy_path(&events) {
            entry.0 += 1;
        }
    }

    let series = legend_cells(legend)
        .into_iter()
        .map(|cell| {
            let data = disaggregation
                .domain
                .iter()
                .map(|x| {
                    let y = cells
                        .get(&(cell.clone(), x.clone()))
                        .map(|(happy, total)| {
                            if *total == 0 {
                                0.0
                            } else {
                                *happy as f64 / *total as f64
                            }
                        })
                        .unwrap_or(0.0);
                    DataItem { x: x.clone(), y }
                })
                .collect();
            DataSeries::new(cell_name(KpiType::HappyPathAdherence, &cell), data)
        })
        .collect();

    MultiDataSeries::new(KpiType::HappyPathAdherence.title(), series)
}

/// Where traces terminate: one series per disaggregation value, counting
/// case ends per activity. The x axis covers every end activity observed
/// in the view, in process order.
fn drop_out(log: &EventLog, disaggregation: &Grouping) -> MultiDataSeries {
    let mut ends: HashMap<(String, Activity), usize> = HashMap::new();
    let mut observed_ends: Vec<Activity> = Vec::new();
    for (_, events) in log.cases() {
        let Some(last) = events.last() else { continue };
        if !observed_ends.contains(&last.activity) {
            observed_ends.push(last.activity);
        }
        let Some(group) = case_group(&events, &disaggregation.column) else {
            continue;
        };
        *ends.entry((group, last.activity)).or_insert(0) += 1;
    }
    observed_ends.sort();

    let series = disaggregation
        .domain
        .iter()
        .map(|group| {
            let data = observed_ends
                .iter()
                .map(|activity| DataItem {
                    x: activity.name().to_string(),
                    y: ends
                        .get(&(group.clone(), *activity))
                        .copied()
                        .unwrap_or(0) as f64,
                })
                .collect();
            DataSeries::new(group.clone(), data)
        })
        .collect();

    MultiDataSeries::new(KpiType::DropOut.title(), series)
}

/// Count of cases deviating from the happy path, per disaggregation value
/// and legend value. Only observed combinations appear.
fn permuted_path_adherence(
    log: &EventLog,
    disaggregation: &Grouping,
    legend: Option<&Grouping>,
) -> MultiDataSeries {
    // disaggregation value -> legend value (or KPI title) -> deviating cases
    let mut counts: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for (_, events) in log.cases() {
        if is_happy_path(&events) {
            continue;
        }
        let Some(group) = case_group(&events, &disaggregation.column) else {
            continue;
        };
        let x = match legend {
            Some(grouping) => match case_group(&events, &grouping.column) {
                Some(value) => value,
                None => continue,
            },
            None => group.clone(),
        };
        *counts.entry(group).or_default().entry(x).or_insert(0) += 1;
    }

    let x_domain: Vec<String> = match legend {
        Some(grouping) => grouping.domain.clone(),
        None => disaggregation.domain.clone(),
    };
    let series = disaggregation
        .domain
        .iter()
        .filter_map(|group| {
            let observed = counts.get(group)?;
            let data: Vec<DataItem> = x_domain
                .iter()
                .filter_map(|x| {
                    observed.get(x).map(|count| DataItem {
                        x: x.clone(),
                        y: *count as f64,
                    })
                })
                .collect();
            Some(DataSeries::new(group.clone(), data))
        })
        .collect();

    MultiDataSeries::new(KpiType::PermutedPathAdherence.title(), series)
}

/// Mean minutes between the first occurrences of two activities, per
/// disaggregation value and legend value. Cases missing either anchor are
/// excluded; cells with no remaining cases chart as zero.
fn activity_span_duration(
    log: &EventLog,
    kpi: KpiType,
    from: Activity,
    to: Activity,
    disaggregation: &Grouping,
    legend: Option<&Grouping>,
) -> MultiDataSeries {
    let mut samples: HashMap<(Option<String>, String), Vec<f64>> = HashMap::new();
    for (_, events) in log.cases() {
        let start = events.iter().find(|event| event.activity == from);
        let end = events.iter().find(|event| event.activity == to);
        let (Some(start), Some(end)) = (start, end) else {
            continue;
        };
        let Some(group) = case_group(&events, &disaggregation.column) else {
            continue;
        };
        let legend_value = match legend {
            Some(grouping) => match case_group(&events, &grouping.column) {
                Some(value) => Some(value),
                None => continue,
            },
            None => None,
        };
        let minutes = (end.timestamp - start.timestamp).num_seconds() as f64 / 60.0;
        samples.entry((legend_value, group)).or_default().push(minutes);
    }

    let series = legend_cells(legend)
        .into_iter()
        .map(|cell| {
            let data = disaggregation
                .domain
                .iter()
                .map(|x| {
                    let y = samples
                        .get(&(cell.clone(), x.clone()))
                        .filter(|durations| !durations.is_empty())
                        .map(|durations| {
                            durations.iter().sum::<f64>() / durations.len() as f64
                        })
                        .unwrap_or(0.0);
                    DataItem { x: x.clone(), y }
                })
                .collect();
            DataSeries::new(cell_name(kpi, &cell), data)
        })
        .collect();

    MultiDataSeries::new(kpi.title(), series)
}
