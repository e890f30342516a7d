//! Compression method selection.
//!
//! The store does the compressing; the metadata only records which method
//! was used and, for the 2-byte precipitation scheme, the scaling that maps
//! values into a signed 16-bit range.

use crate::config::GridInfoConfig;
use chrono::Duration;
use dss_common::{CompressionMethod, DataType};
use serde::Serialize;

/// Largest scaled value the precipitation scheme can hold.
pub const PRECIP_MAX_SCALED: f64 = 32767.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressionChoice {
    pub method: CompressionMethod,
    pub base: f64,
    pub factor: f64,
}

impl CompressionChoice {
    pub fn plain(method: CompressionMethod) -> Self {
        Self {
            method,
            base: 0.0,
            factor: 0.0,
        }
    }

    pub fn precip(min: f64, max: f64, factor: f64) -> Self {
        let base = precip_base(min, max, factor);
        Self {
            method: CompressionMethod::Precip2Byte,
            base,
            factor,
        }
    }
}

/// Offset subtracted before scaling so that `(max - base) * factor` fits.
pub fn precip_base(min: f64, max: f64, factor: f64) -> f64 {
    let mut base = 0.0;
    if min < 0.0 {
        base = min.floor();
    }
    if (max - base) * factor > PRECIP_MAX_SCALED {
        base = (max - PRECIP_MAX_SCALED / factor).ceil();
    }
    base
}

/// Pick a method for a grid whose caller did not pin one.
///
/// Hourly cumulative grids on version-1 layouts use the 2-byte precipitation
/// scheme when the heuristic is enabled; everything else gets the configured
/// default.
pub fn select_compression(
    data_type: DataType,
    gridinfo_version: i32,
    span: Option<Duration>,
    min: f64,
    max: f64,
    config: &GridInfoConfig,
) -> CompressionChoice {
    let hourly = span == Some(Duration::minutes(60));
    if config.precip_heuristic && hourly && data_type == DataType::PerCum && gridinfo_version == 1 {
        return CompressionChoice::precip(min, max, config.precip_scale_factor);
    }
    CompressionChoice::plain(config.default_compression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour() -> Option<Duration> {
        Some(Duration::minutes(60))
    }

    #[test]
    fn test_precip_base_boundaries() {
        assert_eq!(precip_base(0.0, 10.0, 100.0), 0.0);
        assert_eq!(precip_base(-2.5, 10.0, 100.0), -3.0);
        assert_eq!(precip_base(-50.0, 400.0, 100.0), 73.0);
        assert_eq!(precip_base(0.0, 327.67, 100.0), 0.0);
    }

    #[test]
    fn test_hourly_cumulative_gets_precip() {
        let config = GridInfoConfig::default();
        let choice = select_compression(DataType::PerCum, 1, hour(), 0.0, 50.0, &config);
        assert_eq!(choice.method, CompressionMethod::Precip2Byte);
        assert_eq!(choice.factor, 100.0);
        assert_eq!(choice.base, 0.0);
    }

    #[test]
    fn test_other_grids_get_default() {
        let config = GridInfoConfig::default();
        let zlib = CompressionChoice::plain(CompressionMethod::Zlib);

        assert_eq!(select_compression(DataType::PerAver, 1, hour(), 0.0, 1.0, &config), zlib);
        assert_eq!(select_compression(DataType::PerCum, 2, hour(), 0.0, 1.0, &config), zlib);
        assert_eq!(
            select_compression(DataType::PerCum, 1, Some(Duration::minutes(360)), 0.0, 1.0, &config),
            zlib
        );
        assert_eq!(select_compression(DataType::PerCum, 1, None, 0.0, 1.0, &config), zlib);
    }

    #[test]
    fn test_heuristic_can_be_disabled() {
        let config = GridInfoConfig {
            precip_heuristic: false,
            ..GridInfoConfig::default()
        };
        let choice = select_compression(DataType::PerCum, 1, hour(), 0.0, 1.0, &config);
        assert_eq!(choice.method, CompressionMethod::Zlib);
    }
}
