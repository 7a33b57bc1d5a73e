//! Cross-item reports over a small November 2012 batch

mod common;

use common::{date, november_aggregator, november_items, settings, ItemBuilder};
use lean_flow_metrics::analytics::*;
use lean_flow_metrics::config::FlowSettings;
use lean_flow_metrics::FlowError;
use std::collections::BTreeMap;

fn november() -> ReportWindow {
    ReportWindow::new(date("2012-11-01"), date("2012-11-30")).unwrap()
}

fn types(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_batch_builds_every_item() {
    let aggregator = november_aggregator();
    assert_eq!(aggregator.len(), 4);
    assert_eq!(aggregator.work_item("OPS-4").unwrap().category, "Other Software");
    assert!(matches!(
        aggregator.work_item("OPS-99"),
        Err(FlowError::UnknownWorkItem(_))
    ));
}

#[test]
fn test_incremental_throughput() {
    let table = november_aggregator()
        .throughput(november(), &ThroughputOptions::incremental())
        .unwrap();

    let weeks: Vec<_> = table.weeks().collect();
    assert_eq!(
        weeks,
        vec![
            date("2012-11-05"),
            date("2012-11-12"),
            date("2012-11-19"),
            date("2012-11-26")
        ]
    );
    assert_eq!(table.get(date("2012-11-05"), "Awesome Software"), 1);
    assert_eq!(table.get(date("2012-11-12"), "Awesome Software"), 0);
    assert_eq!(table.get(date("2012-11-19"), "Awesome Software"), 1);
    // Re-closed after a reopen: counted in the week of the latest closure.
    assert_eq!(table.get(date("2012-11-19"), "Other Software"), 0);
    assert_eq!(table.get(date("2012-11-26"), "Other Software"), 1);
}

#[test]
fn test_cumulative_throughput() {
    let aggregator = november_aggregator();
    let cumulative = aggregator
        .throughput(november(), &ThroughputOptions::cumulative())
        .unwrap();

    assert_eq!(cumulative.get(date("2012-11-12"), "Awesome Software"), 1);
    assert_eq!(cumulative.get(date("2012-11-26"), "Awesome Software"), 2);
    assert_eq!(cumulative.get(date("2012-11-26"), "Other Software"), 1);

    let incremental = aggregator
        .throughput(november(), &ThroughputOptions::incremental())
        .unwrap();
    assert_eq!(cumulative.de_cumulative(), incremental);
}

#[test]
fn test_throughput_by_type_grouping() {
    let options = ThroughputOptions::incremental().with_types(types(&["defects", "features"]));
    let table = november_aggregator().throughput(november(), &options).unwrap();

    let columns: Vec<_> = table.columns().collect();
    assert_eq!(
        columns,
        vec![
            "Awesome Software-defects",
            "Awesome Software-features",
            "Other Software-defects"
        ]
    );
    assert_eq!(table.column_total("Awesome Software-features"), 1);
}

#[test]
fn test_throughput_category_filter_and_window() {
    let aggregator = november_aggregator();

    let options = ThroughputOptions::incremental().with_category("Other Software");
    let table = aggregator.throughput(november(), &options).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.columns().collect::<Vec<_>>(), vec!["Other Software"]);

    let late = ReportWindow::new(date("2012-11-12"), date("2012-11-30")).unwrap();
    let table = aggregator
        .throughput(late, &ThroughputOptions::incremental())
        .unwrap();
    assert_eq!(table.weeks().next(), Some(date("2012-11-19")));
}

#[test]
fn test_throughput_rejects_unknown_grouping() {
    let options = ThroughputOptions::incremental().with_types(types(&["chores"]));
    let err = november_aggregator().throughput(november(), &options).unwrap_err();
    assert!(matches!(err, FlowError::UnknownTypeGrouping(ref g) if g == "chores"));
}

#[test]
fn test_demand_by_week_of_creation() {
    let table = november_aggregator().demand(november(), None).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(date("2012-11-05"), "Awesome Software"), 2);
    assert_eq!(table.get(date("2012-11-12"), "Awesome Software"), 1);
    assert_eq!(table.get(date("2012-11-19"), "Other Software"), 1);
}

#[test]
fn test_demand_fills_quiet_weeks_with_zero() {
    let raw = vec![
        ItemBuilder::new("A-1", "2012-11-05").build(),
        ItemBuilder::new("A-2", "2012-11-27").build(),
    ];
    let aggregator = MetricsAggregator::build(raw, settings(), Some(date("2012-11-30")));
    let table = aggregator.demand(november(), None).unwrap();

    assert_eq!(table.len(), 4);
    assert_eq!(table.get(date("2012-11-12"), "Awesome Software"), 0);
    assert_eq!(table.get(date("2012-11-19"), "Awesome Software"), 0);
    assert_eq!(
        table.rows()[1],
        vec!["2012-11-12".to_string(), "0".to_string()]
    );
}

#[test]
fn test_arrival_rate() {
    let table = november_aggregator().arrival_rate(november(), None).unwrap();

    assert_eq!(table.get(date("2012-11-05"), "In Progress"), 2);
    assert_eq!(table.get(date("2012-11-05"), "Closed"), 1);
    assert_eq!(table.get(date("2012-11-12"), "In Progress"), 1);
    assert_eq!(table.get(date("2012-11-19"), "Reopened"), 1);
    assert_eq!(table.get(date("2012-11-19"), "Customer Approval"), 1);
    assert_eq!(table.get(date("2012-11-26"), "Closed"), 1);
    assert_eq!(table.column_total("In Progress"), 4);
}

#[test]
fn test_arrivals_accumulate() {
    let raw = vec![ItemBuilder::new("QA-1", "2012-11-18")
        .transition("start", "QA Queue", "2012-11-18T09:54:29.284+00:00")
        .transition("QA Queue", "Customer Queue", "2012-11-18T09:54:29.284+00:00")
        .transition("Customer Queue", "Customer Review", "2012-11-22T09:54:29.284+00:00")
        .build()];
    let aggregator = MetricsAggregator::build(raw, FlowSettings::new(), None);

    let mut daily = BTreeMap::new();
    arrivals(aggregator.items(), &mut daily);
    assert_eq!(daily[&date("2012-11-18")]["QA Queue"], 1);
    assert_eq!(daily[&date("2012-11-18")]["Customer Queue"], 1);
    assert_eq!(daily[&date("2012-11-22")]["Customer Review"], 1);

    arrivals(aggregator.items(), &mut daily);
    assert_eq!(daily[&date("2012-11-18")]["QA Queue"], 2);
    assert_eq!(daily[&date("2012-11-22")]["Customer Review"], 2);
}

#[test]
fn test_cfd_orders_states_canonically() {
    let window = ReportWindow::new(date("2012-11-19"), date("2012-11-21")).unwrap();
    let cfd = november_aggregator().cfd(window, None).unwrap();

    assert_eq!(cfd.days().len(), 3);
    assert_eq!(
        cfd.day(date("2012-11-19")).unwrap(),
        &[
            None,
            Some("In Progress".to_string()),
            Some("In Progress".to_string()),
            Some("Closed".to_string()),
        ]
    );
    assert_eq!(
        cfd.day(date("2012-11-21")).unwrap(),
        &[
            Some("In Progress".to_string()),
            Some("In Progress".to_string()),
            Some("Customer Approval".to_string()),
            Some("Closed".to_string()),
        ]
    );

    let counts = cfd.counts();
    assert_eq!(
        counts[&date("2012-11-19")],
        vec![
            ("Open".to_string(), 0),
            ("In Progress".to_string(), 2),
            ("Reopened".to_string(), 0),
            ("Customer Approval".to_string(), 0),
            ("Closed".to_string(), 1),
        ]
    );
    assert_eq!(cfd.header()[0], "day");
}

#[test]
fn test_cfd_missing_state_is_named() {
    let settings = settings().with_state_order(["Open", "In Progress", "Customer Approval", "Closed"]);
    let aggregator =
        MetricsAggregator::build(common::november_items(), settings, Some(date("2012-11-30")));
    let window = ReportWindow::new(date("2012-11-23"), date("2012-11-23")).unwrap();

    let err = aggregator.cfd(window, None).unwrap_err();
    assert!(matches!(err, FlowError::MissingState { ref state } if state == "Reopened"));
    assert_eq!(err.to_string(), "Missing state: Reopened");
}

#[test]
fn test_cfd_restricted_to_type_grouping() {
    let window = ReportWindow::new(date("2012-11-21"), date("2012-11-21")).unwrap();
    let cfd = november_aggregator()
        .cfd(window, Some(types(&["features"]).as_slice()))
        .unwrap();
    assert_eq!(
        cfd.day(date("2012-11-21")).unwrap(),
        &[Some("Customer Approval".to_string())]
    );
}

#[test]
fn test_cycle_time_histogram_with_max_edge() {
    let edges = vec![BucketEdge::Value(0), BucketEdge::Value(5), BucketEdge::Max];
    let histogram = november_aggregator()
        .cycle_time_histogram("done", None, Some(edges.as_slice()))
        .unwrap();

    let series = histogram.series("done").unwrap();
    assert_eq!(
        series.buckets,
        vec![("0-4".to_string(), 1), ("5-8".to_string(), 1)]
    );
}

#[test]
fn test_cycle_time_histogram_by_type() {
    let histogram = november_aggregator()
        .cycle_time_histogram("done", Some(types(&["defects", "features"]).as_slice()), None)
        .unwrap();

    // The only feature never closed, so it contributes no series.
    assert_eq!(histogram.series.len(), 1);
    assert_eq!(histogram.series("defects-done").unwrap().total(), 2);
}

#[test]
fn test_cycle_statistics_skip_unfinished_items() {
    let aggregator = november_aggregator();
    let stats = aggregator.cycle_statistics();

    let develop = stats["develop"].as_ref().unwrap();
    assert_eq!(develop.count, 2);
    assert_eq!(develop.mean, 3.0);

    let done = stats["done"].as_ref().unwrap();
    assert_eq!(done.min, 3);
    assert_eq!(done.max, 8);
    assert_eq!(done.median, 5.5);

    let by_type = aggregator
        .cycle_statistics_by_type("done", &types(&["defects", "features"]))
        .unwrap();
    assert_eq!(by_type.keys().collect::<Vec<_>>(), vec!["defects-done"]);
}

#[test]
fn test_details_table() {
    let aggregator = november_aggregator();

    let details = aggregator.details(None);
    assert_eq!(
        details.fields(),
        &["id", "title", "state", "type", "date_created", "develop", "done"]
    );
    assert_eq!(details.len(), 4);
    assert_eq!(details.rows()[0][0], "OPS-1");
    assert_eq!(details.rows()[0][5], "3");
    assert_eq!(details.rows()[2][5], "");

    let fields = types(&["id", "done"]);
    let projected = aggregator.details(Some(fields.as_slice()));
    assert_eq!(projected.header(), fields);
    assert_eq!(projected.rows()[3], vec!["OPS-4".to_string(), "8".to_string()]);
}

#[test]
fn test_history_table() {
    let window = ReportWindow::new(date("2012-11-19"), date("2012-11-20")).unwrap();
    let history = november_aggregator().history(window, None).unwrap();

    assert_eq!(history.ids(), &["OPS-1", "OPS-2", "OPS-3", "OPS-4"]);
    assert_eq!(history.state(date("2012-11-19"), "OPS-4"), None);
    assert_eq!(history.state(date("2012-11-20"), "OPS-4"), Some("In Progress"));
    assert_eq!(
        history.rows()[0],
        vec!["2012-11-19", "Closed", "In Progress", "In Progress", ""]
    );
}

#[test]
fn test_items_created_after_until_are_skipped() {
    let mut raw = november_items();
    raw.push(
        ItemBuilder::new("OPS-5", "2012-12-03")
            .transition("Open", "In Progress", "2012-12-04T09:00:00+00:00")
            .build(),
    );
    let aggregator = MetricsAggregator::build(raw, settings(), Some(date("2012-11-30")));

    assert_eq!(aggregator.len(), 4);
    assert!(matches!(
        aggregator.work_item("OPS-5"),
        Err(FlowError::UnknownWorkItem(_))
    ));
}

#[test]
fn test_open_ended_batch_runs_through_today() {
    let aggregator = MetricsAggregator::build(november_items(), settings(), None);
    let today = chrono::Local::now().date_naive();

    let closed = aggregator.work_item("OPS-1").unwrap();
    assert_eq!(closed.history().end_date(), today);
    assert_eq!(closed.state_on(today), Some("Closed"));
}
