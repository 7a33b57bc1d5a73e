//! Criterion benchmarks for history reconstruction and flow reports
//!
//! These benchmarks measure:
//! - Building daily histories and cycle times for a batch
//! - Weekly throughput over a built batch
//! - Cumulative flow over a multi-week window

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lean_flow_metrics::analytics::{MetricsAggregator, ReportWindow, ThroughputOptions};
use lean_flow_metrics::config::FlowSettings;
use lean_flow_metrics::models::{CycleDefinition, RawWorkItem, StateTransition};

const WORKFLOW: [&str; 5] = ["Open", "queued", "In Progress", "pending", "Closed"];

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2012, 1, 2).unwrap()
}

fn until() -> NaiveDate {
    start() + Duration::days(365)
}

fn settings() -> FlowSettings {
    FlowSettings::new()
        .with_cycle("develop", CycleDefinition::between("In Progress", "Closed"))
        .with_cycle("waiting", CycleDefinition::include(["queued", "pending"]))
        .with_type_grouping("defects", ["Defect"])
        .with_counting_states(["Closed"])
        .with_state_order(WORKFLOW)
}

/// Items walking the workflow one step every few days
fn batch(size: usize) -> Vec<RawWorkItem> {
    (0..size)
        .map(|i| {
            let created = start() + Duration::days((i % 200) as i64);
            let at = |day: i64| {
                Utc.from_utc_datetime(
                    &(created + Duration::days(day)).and_hms_opt(9, 0, 0).unwrap(),
                )
                .fixed_offset()
            };
            let steps = 1 + i % (WORKFLOW.len() - 1);
            let state_transitions = (0..steps)
                .map(|s| {
                    StateTransition::new(
                        Some(WORKFLOW[s]),
                        WORKFLOW[s + 1],
                        at(1 + (s as i64) * (1 + (i % 7) as i64)),
                    )
                })
                .collect();

            RawWorkItem {
                id: format!("BENCH-{}", i),
                title: None,
                state: WORKFLOW[steps].to_string(),
                item_type: "Defect".to_string(),
                category: "Bench".to_string(),
                date_created: at(0),
                state_transitions,
            }
        })
        .collect()
}

/// Benchmark building histories and cycle times
fn bench_build_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_batch");

    for size in [100, 1_000, 10_000] {
        let raw = batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| MetricsAggregator::build(black_box(raw.clone()), settings(), Some(until())));
        });
    }

    group.finish();
}

/// Benchmark weekly throughput over a built batch
fn bench_throughput(c: &mut Criterion) {
    let aggregator = MetricsAggregator::build(batch(5_000), settings(), Some(until()));
    let window = ReportWindow::new(start(), until()).unwrap();

    c.bench_function("throughput_cumulative", |b| {
        b.iter(|| {
            aggregator
                .throughput(black_box(window), &ThroughputOptions::cumulative())
                .unwrap()
        });
    });
}

/// Benchmark cumulative flow over six weeks
fn bench_cumulative_flow(c: &mut Criterion) {
    let aggregator = MetricsAggregator::build(batch(1_000), settings(), Some(until()));
    let window = ReportWindow::ending(until(), 6).unwrap();

    c.bench_function("cfd_six_weeks", |b| {
        b.iter(|| aggregator.cfd(black_box(window), None).unwrap());
    });
}

criterion_group!(benches, bench_build_batch, bench_throughput, bench_cumulative_flow);
criterion_main!(benches);
