//! Cycle-time histograms

use crate::analytics::buckets::{auto_edges, bucket_counts, bucket_labels, resolve_edges, BucketEdge};
use crate::analytics::tables::Tabular;
use crate::error::Result;
use crate::models::{TypeGroupings, WorkItem};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket counts for one labelled series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramSeries {
    pub name: String,
    pub buckets: Vec<(String, u64)>,
}

impl HistogramSeries {
    pub fn count(&self, label: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|(_, count)| count).sum()
    }
}

/// One series per cycle, or per `{grouping}-{cycle}` when split by type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleTimeHistogram {
    pub series: Vec<HistogramSeries>,
}

impl CycleTimeHistogram {
    pub fn series(&self, name: &str) -> Option<&HistogramSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Bucket labels across all series in first-seen order
    fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for series in &self.series {
            for (label, _) in &series.buckets {
                if !labels.contains(label) {
                    labels.push(label.clone());
                }
            }
        }
        labels
    }
}

impl Tabular for CycleTimeHistogram {
    fn header(&self) -> Vec<String> {
        std::iter::once("bucket".to_string())
            .chain(self.series.iter().map(|s| s.name.clone()))
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.labels()
            .into_iter()
            .map(|label| {
                let cells = self.series.iter().map(|series| {
                    series
                        .count(&label)
                        .map(|c| c.to_string())
                        .unwrap_or_default()
                });
                std::iter::once(label.clone()).chain(cells).collect()
            })
            .collect()
    }
}

/// Collect non-null values of `cycle`, keyed by series name
pub fn collect_cycle_times(
    items: &[&WorkItem],
    cycle: &str,
    groupings: &TypeGroupings,
    types: Option<&[String]>,
) -> Result<BTreeMap<String, Vec<i64>>> {
    let mut data: BTreeMap<String, Vec<i64>> = BTreeMap::new();

    for item in items {
        let key = match types {
            None => cycle.to_string(),
            Some(types) => match groupings.first_match(types, &item.item_type)? {
                Some(grouping) => format!("{}-{}", grouping, cycle),
                None => continue,
            },
        };
        if let Some(days) = item.cycle(cycle) {
            data.entry(key).or_default().push(days);
        }
    }

    Ok(data)
}

/// Bin cycle times into `edges` (resolving `max` per series) or into automatic
/// even-width buckets.
pub fn cycle_time_histogram(
    items: &[&WorkItem],
    cycle: &str,
    groupings: &TypeGroupings,
    types: Option<&[String]>,
    edges: Option<&[BucketEdge]>,
) -> Result<CycleTimeHistogram> {
    let data = collect_cycle_times(items, cycle, groupings, types)?;
    let mut series = Vec::with_capacity(data.len());

    for (name, values) in data {
        let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
            continue;
        };
        let edges = match edges {
            Some(edges) => resolve_edges(edges, max)?,
            None => auto_edges(min, max),
        };
        let buckets = bucket_labels(&edges)
            .into_iter()
            .zip(bucket_counts(&values, &edges))
            .collect();
        series.push(HistogramSeries { name, buckets });
    }

    Ok(CycleTimeHistogram { series })
}
