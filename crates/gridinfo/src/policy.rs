//! Consistency policies applied when data does not fit cleanly.
//!
//! Each policy returns its result together with an optional
//! [`ConsistencyWarning`], already logged.

use crate::legacy::{pack_str, unpack_str, RANGE_SLOTS};
use crate::warning::{ConsistencyWarning, TimePart};
use dss_common::DssTime;
use grid_geo::GeoTransform;

/// Pack text into exactly `N` words, truncating what does not fit.
pub fn truncate_to_words<const N: usize>(
    field: &str,
    value: &str,
) -> ([i32; N], Option<ConsistencyWarning>) {
    let packed = pack_str(value);
    let mut out = [0; N];
    let n = packed.len().min(N);
    out[..n].copy_from_slice(&packed[..n]);

    let warning = (packed.len() > N).then(|| {
        ConsistencyWarning::Truncated {
            field: field.to_string(),
            original: value.to_string(),
            kept: unpack_str(&out),
        }
        .emit()
    });
    (out, warning)
}

/// Compare a declared cell size with the transform's x cell size.
///
/// Returns a warning when they differ by more than `tolerance`; the caller
/// must then leave the dependent fields alone.
pub fn check_cell_size(
    declared: f64,
    transform: &GeoTransform,
    tolerance: f64,
) -> Option<ConsistencyWarning> {
    let actual = transform.cell_size_x().abs();
    ((declared - actual).abs() > tolerance).then(|| {
        ConsistencyWarning::CellSizeMismatch {
            declared,
            transform: actual,
        }
        .emit()
    })
}

/// Warn when a transform's cells are not square.
pub fn check_square_cells(transform: &GeoTransform) -> Option<ConsistencyWarning> {
    let (x, y) = (transform.cell_size_x().abs(), transform.cell_size_y().abs());
    (x != y).then(|| ConsistencyWarning::AsymmetricCellSize { x, y }.emit())
}

/// Warn when an Albers grid's cell zero is not at the SHG origin.
pub fn check_shg_origin(coords_cell0: (f64, f64)) -> Option<ConsistencyWarning> {
    let (x, y) = coords_cell0;
    (x != 0.0 || y != 0.0).then(|| ConsistencyWarning::NonZeroShgOrigin { x, y }.emit())
}

/// Minute value of a pathname date part.
///
/// An unparseable or out-of-range part yields 0 and a [`ConsistencyWarning::MissingTimestamp`].
pub fn path_timestamp(value: &str, part: TimePart) -> (i32, Option<ConsistencyWarning>) {
    match DssTime::parse(value).and_then(|time| time.minutes_value()) {
        Ok(minutes) => (minutes, None),
        Err(_) => (
            0,
            Some(
                ConsistencyWarning::MissingTimestamp {
                    part,
                    value: value.to_string(),
                }
                .emit(),
            ),
        ),
    }
}

/// Legacy range table: slots with trailing zero counts dropped, capped at
/// the shorter of the two lists and the slot count.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedRange {
    pub vals: Vec<f64>,
    pub counts: Vec<i64>,
}

impl TrimmedRange {
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }
}

pub fn trim_range_table(vals: &[f64], counts: &[i64]) -> (TrimmedRange, Option<ConsistencyWarning>) {
    let mut len = vals.len().min(counts.len());
    while len > 0 && counts[len - 1] == 0 {
        len -= 1;
    }
    let warning = (len > RANGE_SLOTS).then(|| {
        ConsistencyWarning::RangeTableTruncated {
            supplied: len,
            kept: RANGE_SLOTS,
        }
        .emit()
    });
    let len = len.min(RANGE_SLOTS);
    (
        TrimmedRange {
            vals: vals[..len].to_vec(),
            counts: counts[..len].to_vec(),
        },
        warning,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_words() {
        let (words, warning) = truncate_to_words::<3>("data_units", "MM");
        assert!(warning.is_none());
        assert_eq!(unpack_str(&words), "MM");

        let (words, warning) = truncate_to_words::<3>("data_units", "millimeters per hour");
        assert_eq!(unpack_str(&words), "millimeters ");
        match warning {
            Some(ConsistencyWarning::Truncated { field, kept, .. }) => {
                assert_eq!(field, "data_units");
                assert_eq!(kept.len(), 12);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncate_exact_fit() {
        let (words, warning) = truncate_to_words::<3>("proj_units", "abcdefghijkl");
        assert!(warning.is_none());
        assert_eq!(unpack_str(&words), "abcdefghijkl");
    }

    #[test]
    fn test_check_cell_size() {
        let t = GeoTransform::from_origin(0.0, 0.0, 2000.0, 2000.0);
        assert!(check_cell_size(2000.0, &t, 0.001).is_none());
        assert!(check_cell_size(2000.0005, &t, 0.001).is_none());
        assert!(matches!(
            check_cell_size(1000.0, &t, 0.001),
            Some(ConsistencyWarning::CellSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_square_and_origin_checks() {
        assert!(check_square_cells(&GeoTransform::from_origin(0.0, 0.0, 10.0, 10.0)).is_none());
        assert!(check_square_cells(&GeoTransform::from_origin(0.0, 0.0, 10.0, 5.0)).is_some());
        assert!(check_shg_origin((0.0, 0.0)).is_none());
        assert!(check_shg_origin((1.0, 0.0)).is_some());
    }

    #[test]
    fn test_path_timestamp() {
        let (value, warning) = path_timestamp("01JAN1900:0000", TimePart::Start);
        assert_eq!(value, 1440);
        assert!(warning.is_none());

        let (value, warning) = path_timestamp("", TimePart::End);
        assert_eq!(value, 0);
        assert!(warning.unwrap().is_time_issue());
    }

    #[test]
    fn test_trim_range_table() {
        let (trimmed, warning) = trim_range_table(&[0.0, 1.0, 2.0, 3.0], &[10, 5, 0, 0]);
        assert!(warning.is_none());
        assert_eq!(trimmed.vals, vec![0.0, 1.0]);
        assert_eq!(trimmed.counts, vec![10, 5]);

        let (trimmed, _) = trim_range_table(&[0.0, 1.0], &[3, 2, 1]);
        assert_eq!(trimmed.len(), 2);

        let vals: Vec<f64> = (0..25).map(f64::from).collect();
        let counts: Vec<i64> = (0..25).rev().map(|c| c + 1).collect();
        let (trimmed, warning) = trim_range_table(&vals, &counts);
        assert_eq!(trimmed.len(), 20);
        assert!(warning.is_some());
    }
}
