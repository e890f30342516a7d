//! Configuration for grid metadata processing.

use dss_common::CompressionMethod;
use serde::{Deserialize, Serialize};

/// Tunables for the write pipeline and the consistency policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridInfoConfig {
    /// Largest allowed difference between a declared cell size and the
    /// transform's x cell size before georeferencing updates are skipped.
    pub cell_size_tolerance: f64,

    /// Method written when the caller pins none and no heuristic applies.
    pub default_compression: CompressionMethod,

    /// Pick the 2-byte precipitation scheme for hourly cumulative grids.
    pub precip_heuristic: bool,

    /// Scale factor used by the precipitation scheme.
    pub precip_scale_factor: f64,

    /// Build the default range table when the caller does not ask otherwise.
    pub compute_range_table: bool,
}

impl Default for GridInfoConfig {
    fn default() -> Self {
        Self {
            cell_size_tolerance: 0.001,
            default_compression: CompressionMethod::Zlib,
            precip_heuristic: true,
            precip_scale_factor: 100.0,
            compute_range_table: true,
        }
    }
}

impl GridInfoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRIDINFO_CELL_SIZE_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                config.cell_size_tolerance = tol;
            }
        }

        if let Ok(val) = std::env::var("GRIDINFO_DEFAULT_COMPRESSION") {
            if let Ok(method) = val.parse() {
                config.default_compression = method;
            }
        }

        if let Ok(val) = std::env::var("GRIDINFO_PRECIP_HEURISTIC") {
            config.precip_heuristic = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GRIDINFO_PRECIP_SCALE_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.precip_scale_factor = factor;
            }
        }

        if let Ok(val) = std::env::var("GRIDINFO_RANGE_TABLE") {
            config.compute_range_table = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size_tolerance <= 0.0 || self.cell_size_tolerance.is_nan() {
            return Err("cell_size_tolerance must be > 0".to_string());
        }

        if self.precip_scale_factor <= 0.0 || self.precip_scale_factor.is_nan() {
            return Err("precip_scale_factor must be > 0".to_string());
        }

        if self.default_compression == CompressionMethod::Precip2Byte {
            return Err("default_compression cannot be precip_2_byte; it needs per-grid scaling".to_string());
        }

        Ok(())
    }
}
