//! Grid statistics and range tables.
//!
//! A range table is a list of thresholds with, for each, the number of
//! valid cells whose value is at least that threshold. Slot 0 is reserved:
//! its value is a placeholder (the caller writes the record's nodata
//! sentinel there) and its count is the total number of valid cells.

use crate::legacy::RANGE_SLOTS;
use dss_common::{GridError, GridResult, UNDEFINED_FLOAT};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Number of thresholds in the default table when the data straddles zero.
const LINSPACE_STEPS: usize = 10;

/// How to build the range table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RangeSpec {
    /// Derive thresholds from the data's min and max.
    #[default]
    Default,
    /// Caller-supplied thresholds; values outside `[min, max]` are dropped.
    Thresholds(Vec<f64>),
    /// No range table.
    Skip,
}

impl From<bool> for RangeSpec {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Default
        } else {
            Self::Skip
        }
    }
}

impl From<Vec<f64>> for RangeSpec {
    fn from(thresholds: Vec<f64>) -> Self {
        Self::Thresholds(thresholds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of valid (non-nodata, non-NaN) cells.
    pub count: usize,
    pub range_vals: Vec<f64>,
    pub range_counts: Vec<i64>,
}

impl GridStats {
    /// Replace the slot-0 placeholder with the record's nodata sentinel.
    pub fn with_sentinel(mut self, nodata: f64) -> Self {
        if let Some(first) = self.range_vals.first_mut() {
            *first = nodata;
        }
        self
    }

    pub fn range_table(&self) -> RangeTable<'_> {
        RangeTable::new(&self.range_vals, &self.range_counts)
    }
}

/// Statistics over `cells`, treating `nodata` and NaN as missing.
pub fn compute_stats(cells: &[f32], nodata: Option<f32>, spec: &RangeSpec) -> GridResult<GridStats> {
    let valid: Vec<f32> = cells
        .iter()
        .copied()
        .filter(|v| !v.is_nan() && nodata.map_or(true, |nd| *v != nd))
        .collect();
    stats_from_valid(valid, spec)
}

/// Statistics over `cells` where `mask[i]` marks cell `i` as missing.
pub fn compute_stats_masked(cells: &[f32], mask: &[bool], spec: &RangeSpec) -> GridResult<GridStats> {
    if cells.len() != mask.len() {
        return Err(GridError::invalid_field(
            "mask",
            format!("mask has {} entries for {} cells", mask.len(), cells.len()),
        ));
    }
    let valid: Vec<f32> = cells
        .iter()
        .zip(mask)
        .filter(|(v, missing)| !**missing && !v.is_nan())
        .map(|(v, _)| *v)
        .collect();
    stats_from_valid(valid, spec)
}

fn stats_from_valid(mut valid: Vec<f32>, spec: &RangeSpec) -> GridResult<GridStats> {
    if valid.is_empty() {
        return Err(GridError::EmptyGrid);
    }
    valid.sort_by(|a, b| a.total_cmp(b));

    let count = valid.len();
    let min = valid[0] as f64;
    let max = valid[count - 1] as f64;
    let mean = valid.iter().map(|v| *v as f64).sum::<f64>() / count as f64;

    let thresholds = match spec {
        RangeSpec::Skip => None,
        RangeSpec::Default => Some(default_thresholds(min, max)),
        RangeSpec::Thresholds(list) => Some(explicit_thresholds(list, min, max)),
    };

    let (range_vals, range_counts) = match thresholds {
        None => (Vec::new(), Vec::new()),
        Some(thresholds) => {
            let mut vals = Vec::with_capacity(thresholds.len() + 1);
            let mut counts = Vec::with_capacity(thresholds.len() + 1);
            vals.push(UNDEFINED_FLOAT as f64);
            counts.push(count as i64);
            for t in thresholds {
                let below = valid.partition_point(|v| (*v as f64) < t);
                vals.push(t);
                counts.push((count - below) as i64);
            }
            (vals, counts)
        }
    };

    Ok(GridStats {
        min,
        max,
        mean,
        count,
        range_vals,
        range_counts,
    })
}

fn sort_ascending(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

/// Ten evenly spaced values when the data straddles zero, otherwise
/// `min` and the quarter points of `min + max`.
fn default_thresholds(min: f64, max: f64) -> Vec<f64> {
    let mut values = if min < 0.0 && max > 0.0 {
        let step = (max - min) / (LINSPACE_STEPS - 1) as f64;
        let mut v: Vec<f64> = (0..LINSPACE_STEPS).map(|i| min + step * i as f64).collect();
        v[LINSPACE_STEPS - 1] = max;
        v
    } else {
        let s = min + max;
        vec![min, 0.25 * s, 0.5 * s, 0.75 * s]
    };
    sort_ascending(&mut values);
    values
}

fn explicit_thresholds(list: &[f64], min: f64, max: f64) -> Vec<f64> {
    let mut values: Vec<f64> = list
        .iter()
        .copied()
        .filter(|v| *v >= min && *v <= max)
        .collect();
    sort_ascending(&mut values);
    values.truncate(RANGE_SLOTS - 1);
    values
}

// ============================================================================
// Report
// ============================================================================

/// Human-readable range table in the legacy layout.
///
/// Each row shows the threshold, the cumulative count of cells at or above
/// it, and the incremental count for the band up to the next threshold.
pub struct RangeTable<'a> {
    vals: &'a [f64],
    counts: &'a [i64],
}

impl<'a> RangeTable<'a> {
    pub fn new(vals: &'a [f64], counts: &'a [i64]) -> Self {
        let len = vals.len().min(counts.len());
        Self {
            vals: &vals[..len],
            counts: &counts[..len],
        }
    }

    /// `counts[i] - counts[i + 1]`, with the last band taking its own count.
    pub fn incremental_counts(&self) -> Vec<i64> {
        (0..self.counts.len())
            .map(|i| self.counts[i] - self.counts.get(i + 1).copied().unwrap_or(0))
            .collect()
    }
}

impl fmt::Display for RangeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4} {:>16} {:>12} {:>12}", "#", "range", "cumulative", "incremental")?;
        for (i, ((val, count), inc)) in self
            .vals
            .iter()
            .zip(self.counts)
            .zip(self.incremental_counts())
            .enumerate()
        {
            let label = if *val == UNDEFINED_FLOAT as f64 {
                "undefined".to_string()
            } else {
                format!("{:.3}", val)
            };
            writeln!(f, "{:>4} {:>16} {:>12} {:>12}", i, label, count, inc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_non_increasing(counts: &[i64]) {
        for pair in counts.windows(2) {
            assert!(pair[0] >= pair[1], "counts not non-increasing: {:?}", counts);
        }
    }

    #[test]
    fn test_basic_stats() {
        let cells = [1.0, 2.0, 3.0, 4.0];
        let stats = compute_stats(&cells, None, &RangeSpec::Default).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.range_counts[0], 4);
        assert_eq!(stats.range_vals.len(), stats.range_counts.len());
        assert_non_increasing(&stats.range_counts);
    }

    #[test]
    fn test_nodata_and_nan_excluded() {
        let cells = [-9999.0, 5.0, f32::NAN, 15.0];
        let stats = compute_stats(&cells, Some(-9999.0), &RangeSpec::Skip).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 10.0);
        assert!(stats.range_vals.is_empty());
        assert!(stats.range_counts.is_empty());
    }

    #[test]
    fn test_masked() {
        let cells = [100.0, 1.0, 2.0];
        let stats = compute_stats_masked(&cells, &[true, false, false], &RangeSpec::Skip).unwrap();
        assert_eq!(stats.max, 2.0);
        assert!(compute_stats_masked(&cells, &[true], &RangeSpec::Skip).is_err());
    }

    #[test]
    fn test_all_nodata_is_empty_grid() {
        let cells = [-1.0, -1.0];
        assert!(matches!(
            compute_stats(&cells, Some(-1.0), &RangeSpec::Default),
            Err(GridError::EmptyGrid)
        ));
        assert!(matches!(
            compute_stats(&[], None, &RangeSpec::Default),
            Err(GridError::EmptyGrid)
        ));
    }

    #[test]
    fn test_default_thresholds_straddling_zero() {
        let cells = [-9.0, 0.0, 9.0];
        let stats = compute_stats(&cells, None, &RangeSpec::Default).unwrap();
        assert_eq!(stats.range_vals.len(), 11);
        assert_eq!(stats.range_vals[1], -9.0);
        assert_eq!(stats.range_vals[10], 9.0);
        assert_eq!(stats.range_counts[1], 3);
        assert_eq!(stats.range_counts[10], 1);
        assert_non_increasing(&stats.range_counts);
    }

    #[test]
    fn test_default_thresholds_one_signed() {
        let cells = [0.0, 10.0, 20.0, 30.0, 40.0];
        let stats = compute_stats(&cells, None, &RangeSpec::Default).unwrap();
        assert_eq!(&stats.range_vals[1..], &[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(&stats.range_counts[..], &[5, 5, 4, 3, 2]);

        let negative = [-10.0, -2.0];
        let stats = compute_stats(&negative, None, &RangeSpec::Default).unwrap();
        assert_non_increasing(&stats.range_counts);
    }

    #[test]
    fn test_explicit_thresholds() {
        let cells = [1.0, 2.0, 3.0, 4.0, 5.0];
        let spec = RangeSpec::Thresholds(vec![4.0, -10.0, 2.0, 99.0]);
        let stats = compute_stats(&cells, None, &spec).unwrap();
        assert_eq!(&stats.range_vals[1..], &[2.0, 4.0]);
        assert_eq!(&stats.range_counts[..], &[5, 4, 2]);

        let many = RangeSpec::Thresholds((0..40).map(|i| 1.0 + i as f64 * 0.1).collect());
        let stats = compute_stats(&cells, None, &many).unwrap();
        assert_eq!(stats.range_vals.len(), RANGE_SLOTS);
    }

    #[test]
    fn test_with_sentinel() {
        let stats = compute_stats(&[1.0], None, &RangeSpec::Default)
            .unwrap()
            .with_sentinel(-9999.0);
        assert_eq!(stats.range_vals[0], -9999.0);
    }

    #[test]
    fn test_range_table_report() {
        let vals = [UNDEFINED_FLOAT as f64, 0.0, 10.0];
        let counts = [5, 5, 2];
        let table = RangeTable::new(&vals, &counts);
        assert_eq!(table.incremental_counts(), vec![0, 3, 2]);
        let text = table.to_string();
        assert!(text.contains("undefined"));
        assert!(text.contains("10.000"));
        assert_eq!(text.lines().count(), 4);
    }
}
