//! Disaggregation and numeric binning.
//!
//! Turns a disaggregation attribute into a grouping usable by every
//! downstream analytic: categorical attributes group by their raw values
//! (no copy), numerical attributes get their column rewritten to bin labels
//! in a copy of the view. The caller's log is never mutated.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::error::ConfigurationError;
use crate::mining::event_log::{AttributeValue, EventLog};
use crate::models::attributes::{AttributeType, DisaggregationAttribute};
use crate::models::charts::sort_labels;

/// A grouping column together with the label domain used for zero-filling
/// chart output. For binned numerical attributes the domain is every bin
/// label, so empty bins still chart as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub column: String,
    pub domain: Vec<String>,
}

/// Resolve a disaggregation attribute against a view.
///
/// Categorical attributes reuse the existing column; numerical attributes
/// produce a copy whose column holds the label of the `[lo, hi)` interval
/// containing each raw value. Values outside all bins become missing.
pub fn create_bins<'a>(
    log: &'a EventLog,
    attribute: &DisaggregationAttribute,
) -> Result<(Cow<'a, EventLog>, Grouping), ConfigurationError> {
    match attribute.kind() {
        AttributeType::Categorical => {
            let observed: BTreeSet<String> = log
                .events()
                .iter()
                .filter_map(|event| event.value(attribute.name()))
                .map(|value| value.label())
                .collect();
            let mut domain: Vec<String> = observed.into_iter().collect();
            sort_labels(attribute.name(), &mut domain);
            Ok((
                Cow::Borrowed(log),
                Grouping {
                    column: attribute.name().to_string(),
                    domain,
                },
            ))
        }
        AttributeType::Numerical => {
            let bounds = attribute.bins(false)?;
            let labels = attribute.bin_labels(false)?;

            let mut binned = log.clone();
            binned.map_attribute(attribute.name(), |value| {
                value
                    .as_number()
                    .and_then(|number| bin_index(&bounds, number))
                    .map(|index| AttributeValue::Text(labels[index].clone()))
            });
            Ok((
                Cow::Owned(binned),
                Grouping {
                    column: attribute.name().to_string(),
                    domain: labels,
                },
            ))
        }
    }
}

/// Like [`create_bins`] but tolerating an absent attribute (identity).
pub fn bin_optional<'a>(
    log: &'a EventLog,
    attribute: Option<&DisaggregationAttribute>,
) -> Result<(Cow<'a, EventLog>, Option<Grouping>), ConfigurationError> {
    match attribute {
        None => Ok((Cow::Borrowed(log), None)),
        Some(attribute) => {
            let (view, grouping) = create_bins(log, attribute)?;
            Ok((view, Some(grouping)))
        }
    }
}

/// Split a view into per-group sub-logs by the grouping value at each
/// case's first event, in domain order. Cases with a missing grouping
/// value belong to no group.
pub fn split_by_group(log: &EventLog, grouping: &Grouping) -> Vec<(String, EventLog)> {
    grouping
        .domain
        .iter()
        .map(|label| {
            let view = log.retain_view(|event| {
                event
                    .value(&grouping.column)
                    .map(|value| value.label() == *label)
                    .unwrap_or(false)
            });
            (label.clone(), view)
        })
        .filter(|(_, view)| !view.is_empty())
        .collect()
}

/// Index of the half-open interval `[bounds[i], bounds[i + 1])` containing
/// the value, if any.
fn bin_index(bounds: &[f64], value: f64) -> Option<usize> {
    bounds
        .windows(2)
        .position(|window| window[0] <= value && value < window[1])
}
