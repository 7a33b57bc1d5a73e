//! Shared fixtures for flow metrics integration tests

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate};
use lean_flow_metrics::analytics::MetricsAggregator;
use lean_flow_metrics::config::FlowSettings;
use lean_flow_metrics::models::{parse_timestamp, CycleDefinition, RawWorkItem, StateTransition};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn at(raw: &str) -> DateTime<FixedOffset> {
    parse_timestamp(raw).unwrap()
}

/// Builder for raw work items with sensible defaults
pub struct ItemBuilder {
    raw: RawWorkItem,
}

impl ItemBuilder {
    pub fn new(id: &str, created: &str) -> Self {
        Self {
            raw: RawWorkItem {
                id: id.to_string(),
                title: Some(format!("Work item {}", id)),
                state: "Open".to_string(),
                item_type: "Defect".to_string(),
                category: "Awesome Software".to_string(),
                date_created: at(created),
                state_transitions: Vec::new(),
            },
        }
    }

    pub fn item_type(mut self, item_type: &str) -> Self {
        self.raw.item_type = item_type.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.raw.category = category.to_string();
        self
    }

    /// Appends a transition and makes its target the current state
    pub fn transition(mut self, from: &str, to: &str, timestamp: &str) -> Self {
        self.raw
            .state_transitions
            .push(StateTransition::new(Some(from), to, at(timestamp)));
        self.raw.state = to.to_string();
        self
    }

    pub fn build(self) -> RawWorkItem {
        self.raw
    }
}

pub fn settings() -> FlowSettings {
    FlowSettings::new()
        .with_cycle(
            "develop",
            CycleDefinition::between("In Progress", "Closed").ignoring("Reopened"),
        )
        .with_cycle("done", CycleDefinition::between("In Progress", "Closed"))
        .with_type_grouping("defects", ["Defect", "Bug"])
        .with_type_grouping("features", ["New Feature"])
        .with_counting_states(["Closed", "Customer Approval"])
        .with_state_order(["Open", "In Progress", "Reopened", "Customer Approval", "Closed"])
}

/// Four items across November 2012, weeks commencing 5th, 12th, 19th and 26th
pub fn november_items() -> Vec<RawWorkItem> {
    vec![
        ItemBuilder::new("OPS-1", "2012-11-05")
            .transition("Open", "In Progress", "2012-11-06T09:00:00+00:00")
            .transition("In Progress", "Closed", "2012-11-08T17:30:00+00:00")
            .build(),
        ItemBuilder::new("OPS-2", "2012-11-05")
            .item_type("New Feature")
            .transition("Open", "In Progress", "2012-11-07T09:00:00+00:00")
            .transition("In Progress", "Customer Approval", "2012-11-21T12:00:00+00:00")
            .build(),
        ItemBuilder::new("OPS-3", "2012-11-13")
            .transition("Open", "In Progress", "2012-11-14T10:00:00+00:00")
            .build(),
        ItemBuilder::new("OPS-4", "2012-11-20")
            .category("Other Software")
            .transition("Open", "In Progress", "2012-11-20T11:00:00+00:00")
            .transition("In Progress", "Closed", "2012-11-22T11:00:00+00:00")
            .transition("Closed", "Reopened", "2012-11-23T11:00:00+00:00")
            .transition("Reopened", "Closed", "2012-11-27T11:00:00+00:00")
            .build(),
    ]
}

pub fn november_aggregator() -> MetricsAggregator {
    MetricsAggregator::build(november_items(), settings(), Some(date("2012-11-30")))
}
