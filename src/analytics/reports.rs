//! Report plan: which tables to produce and how to name them

use crate::analytics::aggregation::{MetricsAggregator, ReportWindow};
use crate::analytics::buckets::BucketEdge;
use crate::analytics::cfd::CumulativeFlow;
use crate::analytics::details::{DetailsTable, HistoryTable};
use crate::analytics::histogram::CycleTimeHistogram;
use crate::analytics::tables::{Tabular, WeeklyTable};
use crate::analytics::throughput::ThroughputOptions;
use crate::config::FlowSettings;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of table a report produces
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReportMetric {
    Throughput,
    CumulativeThroughput,
    Cfd,
    Demand,
    Detail,
    CycleTime,
    ArrivalRate,
    History,
}

impl ReportMetric {
    /// Whether the metric can be split by type grouping
    pub fn accepts_types(&self) -> bool {
        !matches!(self, ReportMetric::Detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypesKeyword {
    /// One report per configured type grouping
    Foreach,
}

/// `types` in a report: an explicit list of groupings or `"foreach"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypesSelector {
    Keyword(TypesKeyword),
    List(Vec<String>),
}

/// One entry of the report plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSpec {
    pub metric: ReportMetric,

    /// Overrides the generated output name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub types: Option<TypesSelector>,

    /// Cycles to chart; every configured cycle when empty
    #[serde(default)]
    pub cycles: Vec<String>,

    /// Histogram edges; automatic binning when absent
    #[serde(default)]
    pub buckets: Option<Vec<BucketEdge>>,

    /// Detail columns; the full detail view when absent
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// Throughput category filter
    #[serde(default)]
    pub category: Option<String>,
}

impl ReportSpec {
    pub fn new(metric: ReportMetric) -> Self {
        Self {
            metric,
            name: None,
            types: None,
            cycles: Vec::new(),
            buckets: None,
            fields: None,
            category: None,
        }
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = Some(TypesSelector::List(types));
        self
    }

    pub fn for_each_type(mut self) -> Self {
        self.types = Some(TypesSelector::Keyword(TypesKeyword::Foreach));
        self
    }

    pub fn with_cycles(mut self, cycles: Vec<String>) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_buckets(mut self, buckets: Vec<BucketEdge>) -> Self {
        self.buckets = Some(buckets);
        self
    }

    /// Type selections this report runs with, one output per entry
    pub fn type_selections(&self, settings: &FlowSettings) -> Vec<Option<Vec<String>>> {
        match &self.types {
            None => vec![None],
            Some(TypesSelector::List(types)) => vec![Some(types.clone())],
            Some(TypesSelector::Keyword(TypesKeyword::Foreach)) => settings
                .groupings
                .names()
                .map(|name| Some(vec![name.to_string()]))
                .collect(),
        }
    }

    fn selected_cycles(&self, settings: &FlowSettings) -> Vec<String> {
        if self.cycles.is_empty() {
            settings.cycles.keys().cloned().collect()
        } else {
            self.cycles.clone()
        }
    }

    /// Check every grouping and cycle the report names against `settings`
    pub fn validate(&self, settings: &FlowSettings) -> Result<()> {
        if self.types.is_some() && !self.metric.accepts_types() {
            return Err(FlowError::Configuration(format!(
                "report '{}' does not accept types",
                self.metric
            )));
        }
        if let Some(TypesSelector::List(types)) = &self.types {
            settings.groupings.check(types)?;
        }
        match self
            .cycles
            .iter()
            .find(|cycle| !settings.cycles.contains_key(*cycle))
        {
            Some(unknown) => Err(FlowError::UnknownCycle(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Output name: type groupings, then cycle, then metric
    pub fn output_name(&self, types: Option<&[String]>, cycle: Option<&str>) -> String {
        if let Some(name) = &self.name {
            let suffix = types.map(|t| t.join("-")).filter(|_| self.is_foreach());
            return match suffix {
                Some(suffix) => format!("{}-{}", name, suffix),
                None => name.clone(),
            };
        }

        let mut parts: Vec<String> = types.map(|t| t.to_vec()).unwrap_or_default();
        parts.extend(cycle.map(str::to_string));
        parts.push(self.metric.to_string());
        parts.join("-")
    }

    fn is_foreach(&self) -> bool {
        matches!(self.types, Some(TypesSelector::Keyword(TypesKeyword::Foreach)))
    }
}

/// A computed report table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ReportTable {
    Weekly(WeeklyTable),
    Flow(CumulativeFlow),
    Histogram(CycleTimeHistogram),
    Details(DetailsTable),
    History(HistoryTable),
}

impl Tabular for ReportTable {
    fn header(&self) -> Vec<String> {
        match self {
            ReportTable::Weekly(table) => table.header(),
            ReportTable::Flow(table) => table.header(),
            ReportTable::Histogram(table) => table.header(),
            ReportTable::Details(table) => table.header(),
            ReportTable::History(table) => table.header(),
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        match self {
            ReportTable::Weekly(table) => table.rows(),
            ReportTable::Flow(table) => table.rows(),
            ReportTable::Histogram(table) => table.rows(),
            ReportTable::Details(table) => table.rows(),
            ReportTable::History(table) => table.rows(),
        }
    }
}

/// A named table ready for export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub name: String,
    pub metric: ReportMetric,
    pub window: ReportWindow,
    pub table: ReportTable,
}

/// Compute every output of one report
pub fn run_report(
    aggregator: &MetricsAggregator,
    spec: &ReportSpec,
    window: ReportWindow,
) -> Result<Vec<ReportOutput>> {
    spec.validate(aggregator.settings())?;

    let mut outputs = Vec::new();
    let output = |name: String, table: ReportTable| ReportOutput {
        name,
        metric: spec.metric,
        window,
        table,
    };

    for types in spec.type_selections(aggregator.settings()) {
        let types = types.as_deref();

        match spec.metric {
            ReportMetric::Throughput | ReportMetric::CumulativeThroughput => {
                let options = ThroughputOptions {
                    cumulative: spec.metric == ReportMetric::CumulativeThroughput,
                    category: spec.category.clone(),
                    types: types.map(<[String]>::to_vec),
                };
                let table = aggregator.throughput(window, &options)?;
                outputs.push(output(spec.output_name(types, None), ReportTable::Weekly(table)));
            }
            ReportMetric::Cfd => {
                let table = aggregator.cfd(window, types)?;
                outputs.push(output(spec.output_name(types, None), ReportTable::Flow(table)));
            }
            ReportMetric::Demand => {
                let table = aggregator.demand(window, types)?;
                outputs.push(output(spec.output_name(types, None), ReportTable::Weekly(table)));
            }
            ReportMetric::ArrivalRate => {
                let table = aggregator.arrival_rate(window, types)?;
                outputs.push(output(spec.output_name(types, None), ReportTable::Weekly(table)));
            }
            ReportMetric::Detail => {
                let table = aggregator.details(spec.fields.as_deref());
                outputs.push(output(spec.output_name(None, None), ReportTable::Details(table)));
            }
            ReportMetric::History => {
                let table = aggregator.history(window, types)?;
                outputs.push(output(spec.output_name(types, None), ReportTable::History(table)));
            }
            ReportMetric::CycleTime => {
                for cycle in spec.selected_cycles(aggregator.settings()) {
                    let table = aggregator.cycle_time_histogram(
                        &cycle,
                        types,
                        spec.buckets.as_deref(),
                    )?;
                    outputs.push(output(
                        spec.output_name(types, Some(&cycle)),
                        ReportTable::Histogram(table),
                    ));
                }
            }
        }
    }

    tracing::info!(
        metric = %spec.metric,
        outputs = outputs.len(),
        "Report complete"
    );
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CycleDefinition;
    use std::str::FromStr;

    fn settings() -> FlowSettings {
        FlowSettings::new()
            .with_cycle("develop", CycleDefinition::between("In Progress", "Closed"))
            .with_type_grouping("defects", ["Defect"])
            .with_type_grouping("features", ["New Feature"])
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(ReportMetric::CumulativeThroughput.to_string(), "cumulative-throughput");
        assert_eq!(ReportMetric::from_str("arrival-rate").unwrap(), ReportMetric::ArrivalRate);
    }

    #[test]
    fn test_deserialize_plan_entry() {
        let spec: ReportSpec = serde_json::from_str(
            r#"{"metric": "cycle-time", "types": "foreach", "cycles": ["develop"], "buckets": [0, 6, "max"]}"#,
        )
        .unwrap();
        assert_eq!(spec.metric, ReportMetric::CycleTime);
        assert!(spec.is_foreach());
        assert_eq!(spec.type_selections(&settings()).len(), 2);

        let spec: ReportSpec =
            serde_json::from_str(r#"{"metric": "throughput", "types": ["defects"]}"#).unwrap();
        assert_eq!(
            spec.type_selections(&settings()),
            vec![Some(vec!["defects".to_string()])]
        );
    }

    #[test]
    fn test_output_names() {
        let spec = ReportSpec::new(ReportMetric::CycleTime);
        let types = vec!["defects".to_string()];
        assert_eq!(
            spec.output_name(Some(types.as_slice()), Some("develop")),
            "defects-develop-cycle-time"
        );
        assert_eq!(ReportSpec::new(ReportMetric::Cfd).output_name(None, None), "cfd");
    }

    #[test]
    fn test_validate_rejects_unknown_names() {
        let spec = ReportSpec::new(ReportMetric::CycleTime).with_cycles(vec!["qa".into()]);
        assert!(matches!(
            spec.validate(&settings()),
            Err(FlowError::UnknownCycle(_))
        ));

        let spec = ReportSpec::new(ReportMetric::Demand).with_types(vec!["chores".into()]);
        assert!(matches!(
            spec.validate(&settings()),
            Err(FlowError::UnknownTypeGrouping(_))
        ));

        let spec = ReportSpec::new(ReportMetric::Detail).for_each_type();
        assert!(spec.validate(&settings()).is_err());
    }
}
