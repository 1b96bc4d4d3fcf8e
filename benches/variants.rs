use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use orchid_analytics::mining::binning::create_bins;
use orchid_analytics::mining::event_log::{Activity, AttributeValue, Event, EventLog};
use orchid_analytics::mining::variants::variants_with_frequencies;
use orchid_analytics::models::DisaggregationAttribute;

/// A synthetic log of `cases` referrals cycling through happy-path
/// prefixes of every length.
fn synthetic_log(cases: usize) -> EventLog {
    let t0 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    let mut events = Vec::new();
    for case_index in 0..cases {
        let prefix_len = case_index % Activity::HAPPY_PATH.len() + 1;
        let gender = if case_index % 2 == 0 { "F" } else { "M" };
        for (step, activity) in Activity::HAPPY_PATH[..prefix_len].iter().enumerate() {
            events.push(
                Event::new(
                    format!("C{case_index}"),
                    *activity,
                    t0 + Duration::hours(step as i64),
                )
                .with_attribute("gender", AttributeValue::Text(gender.to_string()))
                .with_attribute("age", AttributeValue::Number((case_index % 90) as f64)),
            );
        }
    }
    EventLog::from_events(events)
}

fn bench_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("variants");
    for cases in [100, 1_000, 10_000] {
        let log = synthetic_log(cases);
        let attribute = DisaggregationAttribute::categorical("gender");
        group.bench_with_input(BenchmarkId::from_parameter(cases), &log, |b, log| {
            b.iter(|| {
                let (view, grouping) = create_bins(log, &attribute).unwrap();
                variants_with_frequencies(&view, &grouping)
            })
        });
    }
    group.finish();
}

fn bench_binning(c: &mut Criterion) {
    let log = synthetic_log(1_000);
    let attribute =
        DisaggregationAttribute::numerical("age", vec![0.0, 18.0, 40.0, 65.0, 90.0]).unwrap();
    c.bench_function("bin_numerical_1k_cases", |b| {
        b.iter(|| create_bins(&log, &attribute).unwrap().1)
    });
}

criterion_group!(benches, bench_variants, bench_binning);
criterion_main!(benches);
