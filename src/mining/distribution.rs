//! Case-level attribute distributions.

use std::collections::HashMap;

use crate::mining::binning::Grouping;
use crate::mining::event_log::EventLog;
use crate::models::charts::DataSeries;

/// Count cases per grouping value, zero filled over the grouping domain.
/// Cases missing the value are counted under `"None"`.
pub fn attribute_distribution(log: &EventLog, grouping: &Grouping) -> DataSeries {
    let mut counts: HashMap<String, f64> = grouping
        .domain
        .iter()
        .map(|label| (label.clone(), 0.0))
        .collect();
    let mut missing = 0.0;

    for (_, events) in log.cases() {
        let label = events
            .first()
            .and_then(|event| event.value(&grouping.column))
            .map(|value| value.label());
        match label {
            Some(label) => *counts.entry(label).or_insert(0.0) += 1.0,
            None => missing += 1.0,
        }
    }
    if missing > 0.0 {
        counts.insert("None".to_string(), missing);
    }

    DataSeries::from_counts(
        grouping.column.clone(),
        counts.into_iter().collect(),
        Some(&grouping.column),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::binning::create_bins;
    use crate::mining::event_log::{Activity, AttributeValue, Event};
    use crate::models::attributes::DisaggregationAttribute;
    use chrono::{TimeZone, Utc};

    fn sample_log() -> EventLog {
        let t0 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        EventLog::from_events(vec![
            Event::new("C1", Activity::Referral, t0)
                .with_attribute("gender", AttributeValue::Text("F".into()))
                .with_attribute("age", AttributeValue::Number(39.0)),
            Event::new("C2", Activity::Referral, t0)
                .with_attribute("gender", AttributeValue::Text("M".into()))
                .with_attribute("age", AttributeValue::Number(15.0)),
            Event::new("C3", Activity::Referral, t0)
                .with_attribute("age", AttributeValue::Number(22.0)),
        ])
    }

    #[test]
    fn test_categorical_distribution_counts_cases() {
        let log = sample_log();
        let attribute = DisaggregationAttribute::categorical("gender");
        let (view, grouping) = create_bins(&log, &attribute).unwrap();

        let series = attribute_distribution(&view, &grouping);

        assert_eq!(series.name, "gender");
        let find = |x: &str| series.data.iter().find(|item| item.x == x).unwrap().y;
        assert_eq!(find("F"), 1.0);
        assert_eq!(find("M"), 1.0);
        assert_eq!(find("None"), 1.0);
    }

    #[test]
    fn test_numerical_distribution_includes_empty_bins() {
        let log = sample_log();
        let attribute =
            DisaggregationAttribute::numerical("age", vec![0.0, 30.0, 60.0, 90.0]).unwrap();
        let (view, grouping) = create_bins(&log, &attribute).unwrap();

        let series = attribute_distribution(&view, &grouping);

        let xs: Vec<&str> = series.data.iter().map(|item| item.x.as_str()).collect();
        assert_eq!(xs, vec!["0 - 30", "30 - 60", "60 - 90"]);
        let ys: Vec<f64> = series.data.iter().map(|item| item.y).collect();
        assert_eq!(ys, vec![2.0, 1.0, 0.0]);
    }
}
