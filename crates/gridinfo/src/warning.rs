//! Non-fatal consistency findings.
//!
//! Policies that tolerate imperfect input (truncating text, skipping a
//! georeference update, missing timestamps) report what they did as a
//! [`ConsistencyWarning`]. Each warning is logged through `tracing` when it
//! is raised and also handed back to the caller.

use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Which pathname date part a timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePart {
    Start,
    End,
}

impl TimePart {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    /// Declared cell size disagrees with the transform; update skipped.
    CellSizeMismatch { declared: f64, transform: f64 },

    /// Transform has different x and y cell sizes.
    AsymmetricCellSize { x: f64, y: f64 },

    /// Albers grid with a cell-zero origin other than the SHG origin.
    NonZeroShgOrigin { x: f64, y: f64 },

    /// Text did not fit its fixed-width legacy slot.
    Truncated {
        field: String,
        original: String,
        kept: String,
    },

    /// Pathname date part could not be turned into a timestamp.
    MissingTimestamp { part: TimePart, value: String },

    /// Range table had more entries than the legacy header holds.
    RangeTableTruncated { supplied: usize, kept: usize },
}

impl ConsistencyWarning {
    /// Log the warning and hand it back.
    pub fn emit(self) -> Self {
        warn!(kind = self.kind(), "{}", self);
        self
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::CellSizeMismatch { .. } => "cell_size_mismatch",
            Self::AsymmetricCellSize { .. } => "asymmetric_cell_size",
            Self::NonZeroShgOrigin { .. } => "non_zero_shg_origin",
            Self::Truncated { .. } => "truncated",
            Self::MissingTimestamp { .. } => "missing_timestamp",
            Self::RangeTableTruncated { .. } => "range_table_truncated",
        }
    }

    pub fn is_time_issue(&self) -> bool {
        matches!(self, Self::MissingTimestamp { .. })
    }
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellSizeMismatch { declared, transform } => write!(
                f,
                "declared cell size {} does not match transform cell size {}; update skipped",
                declared, transform
            ),
            Self::AsymmetricCellSize { x, y } => {
                write!(f, "x cell size {} differs from y cell size {}", x, y)
            }
            Self::NonZeroShgOrigin { x, y } => write!(
                f,
                "coords_cell0 ({}, {}) is not the SHG origin (0, 0)",
                x, y
            ),
            Self::Truncated {
                field,
                original,
                kept,
            } => write!(f, "{} '{}' truncated to '{}'", field, original, kept),
            Self::MissingTimestamp { part, value } => write!(
                f,
                "{} time '{}' is not a DSS date/time; stored as 0",
                part.as_str(),
                value
            ),
            Self::RangeTableTruncated { supplied, kept } => {
                write!(f, "range table has {} entries; kept {}", supplied, kept)
            }
        }
    }
}
