//! The attribute filter engine.
//!
//! Filters are applied in sequence over the same view, so the net effect is
//! the logical AND of all predicates; an empty list is the identity. The
//! source log is never mutated.

use crate::mining::event_log::{AttributeValue, Event, EventLog};
use crate::models::filters::{AttributeFilter, CategoricalFilter, FilterOperator, NumericalFilter};

/// Filter the event log, producing a fresh view.
pub fn filter_log(log: &EventLog, filters: &[AttributeFilter]) -> EventLog {
    let mut view = log.clone();
    for filter in filters {
        view = view.retain_view(|event| matches(event, filter));
    }
    view
}

fn matches(event: &Event, filter: &AttributeFilter) -> bool {
    match filter {
        AttributeFilter::Categorical(f) => matches_categorical(event, f),
        AttributeFilter::Numerical(f) => matches_numerical(event, f),
    }
}

fn matches_categorical(event: &Event, filter: &CategoricalFilter) -> bool {
    let value = event.value(filter.attribute());
    match filter.operator() {
        FilterOperator::IsEmpty => value.is_none(),
        FilterOperator::IsNotEmpty => value.is_some(),
        // a missing value never equals anything, but always differs
        FilterOperator::Equals => {
            value.map(|v| v.label() == filter.values()[0]).unwrap_or(false)
        }
        FilterOperator::NotEquals => {
            value.map(|v| v.label() != filter.values()[0]).unwrap_or(true)
        }
        FilterOperator::Contains => value
            .map(|v| filter.values().contains(&v.label()))
            .unwrap_or(false),
        FilterOperator::NotContains => value
            .map(|v| !filter.values().contains(&v.label()))
            .unwrap_or(true),
        // ordering operators are rejected at construction time
        _ => false,
    }
}

fn matches_numerical(event: &Event, filter: &NumericalFilter) -> bool {
    let value = event
        .value(filter.attribute())
        .and_then(AttributeValue::as_number);
    match filter.operator() {
        FilterOperator::IsEmpty => value.is_none(),
        FilterOperator::IsNotEmpty => value.is_some(),
        _ => {
            let Some(comparand) = filter.value() else {
                return false;
            };
            match (filter.operator(), value) {
                (FilterOperator::NotEquals, None) => true,
                (_, None) => false,
                (FilterOperator::Equals, Some(v)) => v == comparand,
                (FilterOperator::NotEquals, Some(v)) => v != comparand,
                (FilterOperator::LessThan, Some(v)) => v < comparand,
                (FilterOperator::LessThanOrEquals, Some(v)) => v <= comparand,
                (FilterOperator::GreaterThan, Some(v)) => v > comparand,
                (FilterOperator::GreaterThanOrEquals, Some(v)) => v >= comparand,
                _ => false,
            }
        }
    }
}
