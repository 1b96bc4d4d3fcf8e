//! Property-based checks of the engine invariants.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use orchid_analytics::mining::binning::create_bins;
use orchid_analytics::mining::event_log::{Activity, AttributeValue, Event, EventLog};
use orchid_analytics::mining::filter_log;
use orchid_analytics::mining::variants::variants_with_frequencies;
use orchid_analytics::models::{
    AttributeFilter, DisaggregationAttribute, FilterOperator, NumericalFilter,
};

#[derive(Debug, Clone)]
struct CaseSpec {
    age: f64,
    gender: Option<&'static str>,
    prefix_len: usize,
}

fn case_spec() -> impl Strategy<Value = CaseSpec> {
    (
        0.0f64..120.0,
        prop_oneof![Just(None), Just(Some("F")), Just(Some("M"))],
        1usize..=Activity::HAPPY_PATH.len(),
    )
        .prop_map(|(age, gender, prefix_len)| CaseSpec {
            age,
            gender,
            prefix_len,
        })
}

fn build_log(specs: &[CaseSpec]) -> EventLog {
    let t0 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    let mut events = Vec::new();
    for (case_index, spec) in specs.iter().enumerate() {
        for (step, activity) in Activity::HAPPY_PATH[..spec.prefix_len].iter().enumerate() {
            let mut event = Event::new(
                format!("C{case_index}"),
                *activity,
                t0 + Duration::hours(step as i64),
            )
            .with_attribute("age", AttributeValue::Number(spec.age));
            if let Some(gender) = spec.gender {
                event = event.with_attribute("gender", AttributeValue::Text(gender.into()));
            }
            events.push(event);
        }
    }
    EventLog::from_events(events)
}

fn age_filter(operator: FilterOperator, value: f64) -> AttributeFilter {
    NumericalFilter::new("age", operator, Some(value)).unwrap().into()
}

proptest! {
    #[test]
    fn filtering_never_grows_the_view(specs in prop::collection::vec(case_spec(), 0..20), threshold in 0.0f64..120.0) {
        let log = build_log(&specs);
        let filters = [age_filter(FilterOperator::LessThan, threshold)];

        let filtered = filter_log(&log, &filters);
        prop_assert!(filtered.len() <= log.len());
        prop_assert!(filtered.case_count() <= log.case_count());
    }

    #[test]
    fn filtering_is_idempotent(specs in prop::collection::vec(case_spec(), 0..20), threshold in 0.0f64..120.0) {
        let log = build_log(&specs);
        let filters = [age_filter(FilterOperator::GreaterThanOrEquals, threshold)];

        let once = filter_log(&log, &filters);
        let twice = filter_log(&once, &filters);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn binning_partitions_the_domain(specs in prop::collection::vec(case_spec(), 1..20)) {
        let log = build_log(&specs);
        let attribute =
            DisaggregationAttribute::numerical("age", vec![0.0, 40.0, 80.0, 120.0]).unwrap();

        let (view, grouping) = create_bins(&log, &attribute).unwrap();

        // ages lie in [0, 120), so every event lands in exactly one bin
        for event in view.events() {
            let label = event.value("age").map(|value| value.label());
            prop_assert!(label.is_some());
            prop_assert!(grouping.domain.contains(&label.unwrap()));
        }
    }

    #[test]
    fn variant_frequencies_sum_to_one(specs in prop::collection::vec(case_spec(), 1..20)) {
        let log = build_log(&specs);
        let attribute = DisaggregationAttribute::categorical("gender");
        let (view, grouping) = create_bins(&log, &attribute).unwrap();

        let variants = variants_with_frequencies(&view, &grouping);
        let total: f64 = variants.iter().map(|variant| variant.frequency).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);

        let counted: usize = variants.iter().map(|variant| variant.count).sum();
        prop_assert_eq!(counted, view.case_count());
    }

    #[test]
    fn variant_distribution_counts_match_variant_count(specs in prop::collection::vec(case_spec(), 1..20)) {
        let log = build_log(&specs);
        let attribute = DisaggregationAttribute::categorical("gender");
        let (view, grouping) = create_bins(&log, &attribute).unwrap();

        for variant in variants_with_frequencies(&view, &grouping) {
            let distributed: f64 = variant.distribution.data.iter().map(|item| item.y).sum();
            prop_assert_eq!(distributed, variant.count as f64);
        }
    }
}
