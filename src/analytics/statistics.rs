//! Summary statistics over cycle-time samples

use serde::Serialize;

/// Distribution of one cycle's completed values, in days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleTimeStatistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p85: f64,
    pub p95: f64,
    pub min: i64,
    pub max: i64,
}

impl CycleTimeStatistics {
    /// `None` for an empty sample
    pub fn from_values(values: &[i64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        let count = sorted.len();
        let mean = sorted.iter().sum::<i64>() as f64 / count as f64;

        Some(Self {
            count,
            mean,
            median: percentile(&sorted, 50.0),
            p85: percentile(&sorted, 85.0),
            p95: percentile(&sorted, 95.0),
            min,
            max,
        })
    }
}

/// Linear-interpolated percentile of an ascending sample
fn percentile(sorted: &[i64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower] as f64
    } else {
        let weight = index - lower as f64;
        sorted[lower] as f64 * (1.0 - weight) + sorted[upper] as f64 * weight
    }
}
