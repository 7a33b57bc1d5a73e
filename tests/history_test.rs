//! History reconstruction and cycle-time behaviour through the public API

mod common;

use common::{at, date, ItemBuilder};
use lean_flow_metrics::history::build_history;
use lean_flow_metrics::models::{
    CycleDefinition, CycleSet, EndBoundary, HistoryOptions, StartBoundary, StateTransition,
    WorkItem,
};
use lean_flow_metrics::FlowError;

fn cycles() -> CycleSet {
    let mut cycles = CycleSet::new();
    cycles.insert(
        "develop".into(),
        CycleDefinition::between("In Progress", "Customer Approval"),
    );
    cycles.insert(
        "develop-exit".into(),
        CycleDefinition::boundary(
            StartBoundary::Enter("In Progress".into()),
            EndBoundary::Exit("In Progress".into()),
        ),
    );
    cycles.insert(
        "to-pending".into(),
        CycleDefinition::between("In Progress", "pending"),
    );
    cycles.insert(
        "closed".into(),
        CycleDefinition::between("In Progress", "Closed").ignoring("Reopened"),
    );
    cycles.insert(
        "closed-any".into(),
        CycleDefinition::between("In Progress", "Closed"),
    );
    cycles
}

fn approved_item() -> WorkItem {
    let raw = ItemBuilder::new("OPSTOOLS-1", "2012-11-16")
        .transition("Open", "In Progress", "2012-11-18T09:54:29.284+00:00")
        .transition("In Progress", "pending", "2012-11-28T09:54:29.284+00:00")
        .transition("pending", "Customer Approval", "2012-11-30T09:54:29.284+00:00")
        .build();
    WorkItem::build(raw, &cycles(), &HistoryOptions::until(date("2012-12-02"))).unwrap()
}

#[test]
fn test_history_spans_created_to_until() {
    let item = approved_item();
    let history = item.history();

    assert_eq!(history.start_date(), date("2012-11-16"));
    assert_eq!(history.end_date(), date("2012-12-02"));
    assert_eq!(history.len(), 17);
    assert_eq!(history.state_on(date("2012-11-17")), Some("Open"));
    assert_eq!(history.state_on(date("2012-11-18")), Some("In Progress"));
    assert_eq!(history.state_on(date("2012-11-29")), Some("pending"));
    assert_eq!(history.final_state(), Some("Customer Approval"));
}

#[test]
fn test_boundary_cycle_time() {
    assert_eq!(approved_item().cycle("develop"), Some(13));
}

#[test]
fn test_exit_is_one_day_shorter_than_entering_next_state() {
    let item = approved_item();
    let exit = item.cycle("develop-exit").unwrap();
    let enter = item.cycle("to-pending").unwrap();
    assert_eq!(exit, 10);
    assert_eq!(enter - exit, 1);
}

#[test]
fn test_reopened_closure_does_not_count() {
    let raw = ItemBuilder::new("OPSTOOLS-2", "2012-11-01")
        .transition("Open", "In Progress", "2012-11-02T09:00:00+00:00")
        .transition("In Progress", "Closed", "2012-11-05T09:00:00+00:00")
        .transition("Closed", "Reopened", "2012-11-07T09:00:00+00:00")
        .transition("Reopened", "Closed", "2012-11-10T09:00:00+00:00")
        .build();
    let item = WorkItem::build(raw, &cycles(), &HistoryOptions::until(date("2012-11-15"))).unwrap();

    assert_eq!(item.cycle("closed"), Some(4));
    assert_eq!(item.cycle("closed-any"), Some(9));
}

#[test]
fn test_unfinished_item_has_no_cycle_time() {
    let raw = ItemBuilder::new("OPSTOOLS-3", "2012-11-01")
        .transition("Open", "In Progress", "2012-11-02T09:00:00+00:00")
        .build();
    let item = WorkItem::build(raw, &cycles(), &HistoryOptions::until(date("2012-11-15"))).unwrap();

    assert_eq!(item.cycle("develop"), None);
    assert_eq!(item.cycles().get("develop"), Some(&None));
    assert_eq!(item.cycle("no-such-cycle"), None);
}

#[test]
fn test_time_in_states() {
    let spans = approved_item().history().time_in_states();
    let summary: Vec<(&str, i64)> = spans.iter().map(|s| (s.state.as_str(), s.days)).collect();

    assert_eq!(
        summary,
        vec![
            ("Open", 2),
            ("In Progress", 10),
            ("pending", 2),
            ("Customer Approval", 3),
        ]
    );
    assert_eq!(spans[1].start, date("2012-11-18"));
}

#[test]
fn test_build_history_from_unordered_input_via_work_item() {
    let raw = ItemBuilder::new("OPSTOOLS-4", "2015-02-25")
        .transition("Active", "Closed", "2015-03-12T10:02:06+00:00")
        .transition("Open", "Active", "2015-02-26T10:02:06+00:00")
        .build();
    let item = WorkItem::build(raw, &CycleSet::new(), &HistoryOptions::default()).unwrap();

    assert_eq!(item.state_transitions[0].to_state, "Active");
    assert_eq!(item.history().len(), 16);
    assert_eq!(item.history().final_state(), Some("Closed"));
}

#[test]
fn test_until_before_creation_is_an_error() {
    let transitions = vec![StateTransition::new(
        Some("Open"),
        "In Progress",
        at("2012-11-18T09:00:00+00:00"),
    )];
    let err = build_history(
        date("2012-11-16"),
        &transitions,
        Some(date("2012-11-01")),
        "Open",
    )
    .unwrap_err();

    assert!(matches!(err, FlowError::InvalidDateRange(_)));
}
