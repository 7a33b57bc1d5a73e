//! Per-item tables: daily state history and flattened details

use crate::analytics::tables::Tabular;
use crate::models::{WorkItem, WorkItemDetail, DETAIL_FIELDS};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Day × item id grid of daily states; `None` before an item existed or
/// after its history ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryTable {
    ids: Vec<String>,
    days: BTreeMap<NaiveDate, Vec<Option<String>>>,
}

impl HistoryTable {
    pub fn build(items: &[&WorkItem], from: NaiveDate, to: NaiveDate) -> Self {
        let ids = items.iter().map(|item| item.id.clone()).collect();
        let mut days = BTreeMap::new();

        let mut day = from;
        while day <= to {
            let states = items
                .iter()
                .map(|item| item.state_on(day).map(str::to_string))
                .collect();
            days.insert(day, states);
            day += Duration::days(1);
        }

        Self { ids, days }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<Option<String>>> {
        &self.days
    }

    pub fn state(&self, day: NaiveDate, id: &str) -> Option<&str> {
        let column = self.ids.iter().position(|i| i == id)?;
        self.days.get(&day)?.get(column)?.as_deref()
    }
}

impl Tabular for HistoryTable {
    fn header(&self) -> Vec<String> {
        std::iter::once("day".to_string())
            .chain(self.ids.iter().cloned())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.days
            .iter()
            .map(|(day, states)| {
                std::iter::once(day.to_string())
                    .chain(states.iter().map(|s| s.clone().unwrap_or_default()))
                    .collect()
            })
            .collect()
    }
}

/// Flattened item details with a fixed column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailsTable {
    fields: Vec<String>,
    rows: Vec<WorkItemDetail>,
}

impl DetailsTable {
    /// Project every item onto `fields`, or onto the fixed detail fields
    /// followed by each cycle name when `fields` is `None`.
    pub fn build(items: &[&WorkItem], fields: Option<&[String]>) -> Self {
        let fields = match fields {
            Some(fields) => fields.to_vec(),
            None => default_fields(items),
        };

        let rows = items
            .iter()
            .map(|item| {
                let detail = item.detail();
                fields
                    .iter()
                    .map(|field| {
                        let value = detail.get(field).cloned().unwrap_or(Value::Null);
                        (field.clone(), value)
                    })
                    .collect()
            })
            .collect();

        Self { fields, rows }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn records(&self) -> &[WorkItemDetail] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn default_fields(items: &[&WorkItem]) -> Vec<String> {
    let mut cycles: Vec<&String> = items
        .iter()
        .flat_map(|item| item.cycles().keys())
        .collect();
    cycles.sort();
    cycles.dedup();

    DETAIL_FIELDS
        .iter()
        .map(|f| f.to_string())
        .chain(cycles.into_iter().cloned())
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Tabular for DetailsTable {
    fn header(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.fields
                    .iter()
                    .map(|field| row.get(field).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}
