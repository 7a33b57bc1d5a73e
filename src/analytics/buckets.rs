//! Histogram bucket edges and labels

use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// A configured bucket edge; `"max"` resolves to the largest observed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEdge", into = "RawEdge")]
pub enum BucketEdge {
    Value(i64),
    Max,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawEdge {
    Value(i64),
    Keyword(String),
}

impl TryFrom<RawEdge> for BucketEdge {
    type Error = String;

    fn try_from(raw: RawEdge) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawEdge::Value(v) => Ok(BucketEdge::Value(v)),
            RawEdge::Keyword(k) if k.eq_ignore_ascii_case("max") => Ok(BucketEdge::Max),
            RawEdge::Keyword(k) => Err(format!("bucket edge must be a number or 'max', got '{}'", k)),
        }
    }
}

impl From<BucketEdge> for RawEdge {
    fn from(edge: BucketEdge) -> Self {
        match edge {
            BucketEdge::Value(v) => RawEdge::Value(v),
            BucketEdge::Max => RawEdge::Keyword("max".to_string()),
        }
    }
}

/// Labels for consecutive edges: `"{lo}-{hi-1}"`, except the final bucket
/// which includes its upper edge.
pub fn bucket_labels(edges: &[i64]) -> Vec<String> {
    edges
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let upper = if i + 2 == edges.len() { pair[1] } else { pair[1] - 1 };
            format!("{}-{}", pair[0], upper)
        })
        .collect()
}

/// Resolve `max` sentinels and check the edges strictly increase.
///
/// A `max` that would fall at or below the previous edge takes that edge's
/// value plus one, so small samples still produce a usable final bucket.
pub fn resolve_edges(edges: &[BucketEdge], observed_max: i64) -> Result<Vec<i64>> {
    if edges.len() < 2 {
        return Err(FlowError::InvalidBuckets(
            "at least two bucket edges are required".to_string(),
        ));
    }

    let mut resolved: Vec<i64> = Vec::with_capacity(edges.len());
    for edge in edges {
        let value = match edge {
            BucketEdge::Value(v) => *v,
            BucketEdge::Max => match resolved.last() {
                Some(previous) if observed_max <= *previous => previous + 1,
                _ => observed_max,
            },
        };
        if let Some(previous) = resolved.last() {
            if value <= *previous {
                return Err(FlowError::InvalidBuckets(format!(
                    "edges must increase, got {} after {}",
                    value, previous
                )));
            }
        }
        resolved.push(value);
    }
    Ok(resolved)
}

/// Up to ten even integer-width buckets spanning `min..=max`
pub fn auto_edges(min: i64, max: i64) -> Vec<i64> {
    if max <= min {
        return vec![min, min + 1];
    }
    let span = max - min;
    let bins = span.min(10);
    let width = (span + bins - 1) / bins;
    let mut edges: Vec<i64> = (0..=bins).map(|k| (min + k * width).min(max)).collect();
    edges.dedup();
    edges
}

/// Count values per bucket. Buckets are half-open except the last, which is
/// closed; values outside the edges are not counted.
pub fn bucket_counts(values: &[i64], edges: &[i64]) -> Vec<u64> {
    let mut counts = vec![0u64; edges.len().saturating_sub(1)];
    let (Some(first), Some(last)) = (edges.first(), edges.last()) else {
        return counts;
    };

    for value in values {
        if value < first || value > last {
            continue;
        }
        // Index of the last edge <= value, capped to the final bucket.
        let index = edges.partition_point(|edge| edge <= value).saturating_sub(1);
        let index = index.min(counts.len().saturating_sub(1));
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_labels() {
        assert_eq!(bucket_labels(&[0, 6, 11, 20]), vec!["0-5", "6-10", "11-20"]);
        assert_eq!(bucket_labels(&[1, 3]), vec!["1-3"]);
        assert!(bucket_labels(&[5]).is_empty());
    }

    #[test]
    fn test_resolve_max_sentinel() {
        let edges = [BucketEdge::Value(0), BucketEdge::Value(6), BucketEdge::Max];
        assert_eq!(resolve_edges(&edges, 42).unwrap(), vec![0, 6, 42]);
        assert_eq!(resolve_edges(&edges, 3).unwrap(), vec![0, 6, 7]);
    }

    #[test]
    fn test_resolve_rejects_decreasing_edges() {
        let edges = [BucketEdge::Value(10), BucketEdge::Value(5)];
        assert!(matches!(resolve_edges(&edges, 1), Err(FlowError::InvalidBuckets(_))));
        assert!(resolve_edges(&[BucketEdge::Max], 1).is_err());
    }

    #[test]
    fn test_bucket_counts_last_bucket_closed() {
        let counts = bucket_counts(&[0, 5, 6, 10, 11, 20, 21, -1], &[0, 6, 11, 20]);
        assert_eq!(counts, vec![2, 2, 2]);
    }

    #[test]
    fn test_auto_edges() {
        assert_eq!(auto_edges(1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(auto_edges(0, 100), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert_eq!(auto_edges(3, 3), vec![3, 4]);

        let edges = auto_edges(2, 25);
        assert_eq!(edges.first(), Some(&2));
        assert_eq!(edges.last(), Some(&25));
        assert!(edges.len() <= 11);
    }

    #[test]
    fn test_edges_deserialize_with_max() {
        let edges: Vec<BucketEdge> = serde_json::from_str(r#"[0, 6, 11, "max"]"#).unwrap();
        assert_eq!(edges[3], BucketEdge::Max);
        assert!(serde_json::from_str::<Vec<BucketEdge>>(r#"["lots"]"#).is_err());
    }
}
