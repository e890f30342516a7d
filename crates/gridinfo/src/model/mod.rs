//! The modern (v7) grid metadata model.
//!
//! [`GridInfo`] is a closed union over the four grid families. Every
//! variant embeds a [`GridBase`] with the fields all families share.
//! Construction goes through [`GridInfo::build`] so the family invariants
//! hold from the start.

mod build;
mod fields;
mod georef;

pub use build::build_metadata;
pub(crate) use build::validate;
pub use fields::canonical_field_name;
pub use georef::UpdateOutcome;

use crate::compression::CompressionChoice;
use crate::stats::GridStats;
use dss_common::{
    CompressionMethod, DataType, Datum, GridError, GridFamily, GridResult, GridType,
    UNDEFINED_FLOAT,
};
use grid_geo::CellIndex;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fields shared by every grid family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridBase {
    pub grid_type: GridType,
    pub data_units: String,
    pub data_type: DataType,
    pub lower_left_cell: CellIndex,
    /// `(rows, cols)`.
    pub shape: (usize, usize),
    pub cell_size: f64,
    /// `None` (or `Undefined`) leaves the choice to the write pipeline.
    pub compression_method: Option<CompressionMethod>,
    pub compression_base: f64,
    pub compression_factor: f64,
    pub max_val: f64,
    pub min_val: f64,
    pub mean_val: f64,
    pub range_vals: Vec<f64>,
    pub range_counts: Vec<i64>,
    /// World coordinate of the grid's south-west corner, if known.
    pub min_xy: Option<(f64, f64)>,
    /// Caller-supplied fields the model does not recognise.
    pub extra: Map<String, Value>,
}

impl GridBase {
    pub fn new(grid_type: GridType, data_type: DataType, shape: (usize, usize), cell_size: f64) -> Self {
        Self {
            grid_type,
            data_units: String::new(),
            data_type,
            lower_left_cell: (0, 0),
            shape,
            cell_size,
            compression_method: None,
            compression_base: 0.0,
            compression_factor: 0.0,
            max_val: 0.0,
            min_val: 0.0,
            mean_val: 0.0,
            range_vals: Vec::new(),
            range_counts: Vec::new(),
            min_xy: None,
            extra: Map::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    pub fn cell_count(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    /// Whether the caller left the compression method open.
    pub fn compression_unpinned(&self) -> bool {
        matches!(
            self.compression_method,
            None | Some(CompressionMethod::Undefined)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UndefinedInfo {
    #[serde(flatten)]
    pub base: GridBase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HrapInfo {
    #[serde(flatten)]
    pub base: GridBase,
    pub data_source: String,
}

/// Albers equal-area (SHG) grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbersInfo {
    #[serde(flatten)]
    pub base: GridBase,
    pub proj_datum: Datum,
    pub proj_units: String,
    /// Latitude of origin.
    pub lat_0: f64,
    /// First standard parallel.
    pub lat_1: f64,
    /// Second standard parallel.
    pub lat_2: f64,
    /// Central meridian.
    pub lon_0: f64,
    /// False easting.
    pub x_0: f64,
    /// False northing.
    pub y_0: f64,
    pub coords_cell0: (f64, f64),
}

/// Grid in an arbitrary coordinate system described by `crs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecifiedInfo {
    #[serde(flatten)]
    pub base: GridBase,
    /// Coordinate system definition (WKT or similar).
    pub crs: String,
    pub crs_name: String,
    pub nodata: f64,
    pub tzid: String,
    /// Hours, within `[-24, 24]`.
    pub tzoffset: i32,
    pub coords_cell0: Option<(f64, f64)>,
    pub is_interval: bool,
    pub time_stamped: bool,
}

/// Grid metadata, discriminated by grid family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GridInfo {
    Undefined(UndefinedInfo),
    Hrap(HrapInfo),
    Albers(AlbersInfo),
    Specified(SpecifiedInfo),
}

impl GridInfo {
    pub fn base(&self) -> &GridBase {
        match self {
            Self::Undefined(i) => &i.base,
            Self::Hrap(i) => &i.base,
            Self::Albers(i) => &i.base,
            Self::Specified(i) => &i.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut GridBase {
        match self {
            Self::Undefined(i) => &mut i.base,
            Self::Hrap(i) => &mut i.base,
            Self::Albers(i) => &mut i.base,
            Self::Specified(i) => &mut i.base,
        }
    }

    pub fn grid_type(&self) -> GridType {
        self.base().grid_type
    }

    pub fn family(&self) -> GridFamily {
        match self {
            Self::Undefined(_) => GridFamily::Undefined,
            Self::Hrap(_) => GridFamily::Hrap,
            Self::Albers(_) => GridFamily::Albers,
            Self::Specified(_) => GridFamily::Specified,
        }
    }

    /// Whether the record is temporally indexed.
    pub fn has_time(&self) -> bool {
        self.grid_type().has_time()
    }

    /// Equivalent grid type in the legacy format, which only knows `x_time`.
    pub fn legacy_grid_type(&self) -> GridType {
        self.grid_type().legacy_equivalent()
    }

    /// Layout version: 2 for specified grids, 1 for the rest.
    pub fn version(&self) -> i32 {
        match self {
            Self::Specified(_) => 2,
            _ => 1,
        }
    }

    /// Value marking missing cells. Only specified grids carry their own.
    pub fn nodata(&self) -> f64 {
        match self {
            Self::Specified(s) => s.nodata,
            _ => UNDEFINED_FLOAT as f64,
        }
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.base().extra
    }

    // ===== Family access =====

    fn mismatch(&self, expected: GridFamily) -> GridError {
        GridError::type_mismatch(expected.as_str(), self.family().as_str())
    }

    pub fn as_hrap(&self) -> GridResult<&HrapInfo> {
        match self {
            Self::Hrap(i) => Ok(i),
            _ => Err(self.mismatch(GridFamily::Hrap)),
        }
    }

    pub fn as_albers(&self) -> GridResult<&AlbersInfo> {
        match self {
            Self::Albers(i) => Ok(i),
            _ => Err(self.mismatch(GridFamily::Albers)),
        }
    }

    pub fn as_albers_mut(&mut self) -> GridResult<&mut AlbersInfo> {
        match self {
            Self::Albers(i) => Ok(i),
            other => Err(other.mismatch(GridFamily::Albers)),
        }
    }

    pub fn as_specified(&self) -> GridResult<&SpecifiedInfo> {
        match self {
            Self::Specified(i) => Ok(i),
            _ => Err(self.mismatch(GridFamily::Specified)),
        }
    }

    pub fn as_specified_mut(&mut self) -> GridResult<&mut SpecifiedInfo> {
        match self {
            Self::Specified(i) => Ok(i),
            other => Err(other.mismatch(GridFamily::Specified)),
        }
    }

    // ===== Derived fields =====

    /// Copy statistics in, writing this record's nodata value into slot 0
    /// of the range table.
    pub fn apply_stats(&mut self, stats: &GridStats) {
        let nodata = self.nodata();
        let base = self.base_mut();
        base.max_val = stats.max;
        base.min_val = stats.min;
        base.mean_val = stats.mean;
        base.range_vals = stats.range_vals.clone();
        base.range_counts = stats.range_counts.clone();
        if let Some(first) = base.range_vals.first_mut() {
            *first = nodata;
        }
    }

    pub fn apply_compression(&mut self, choice: CompressionChoice) {
        let base = self.base_mut();
        base.compression_method = Some(choice.method);
        base.compression_base = choice.base;
        base.compression_factor = choice.factor;
    }

    /// JSON view, including `extra` as a nested object.
    pub fn to_json(&self) -> GridResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{compute_stats, RangeSpec};
    use serde_json::json;

    fn albers() -> GridInfo {
        let fields = json!({
            "data_type": "per_cum",
            "shape": [3, 4],
            "cell_size": 2000.0,
        });
        GridInfo::build(GridType::AlbersTime, fields.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_queries() {
        let info = albers();
        assert!(info.has_time());
        assert_eq!(info.family(), GridFamily::Albers);
        assert_eq!(info.legacy_grid_type(), GridType::AlbersTime);
        assert_eq!(info.version(), 1);
        assert_eq!(info.nodata(), UNDEFINED_FLOAT as f64);
        assert_eq!(info.base().cell_count(), 12);
        assert!(info.base().compression_unpinned());
    }

    #[test]
    fn test_family_access() {
        let mut info = albers();
        assert!(info.as_albers().is_ok());
        assert!(matches!(
            info.as_specified_mut(),
            Err(GridError::GridTypeMismatch { .. })
        ));
        assert!(info.as_hrap().is_err());
    }

    #[test]
    fn test_apply_stats_writes_sentinel() {
        let mut info = albers();
        let stats = compute_stats(&[1.0, 2.0, 3.0], None, &RangeSpec::Default).unwrap();
        info.apply_stats(&stats);
        let base = info.base();
        assert_eq!(base.max_val, 3.0);
        assert_eq!(base.range_vals[0], UNDEFINED_FLOAT as f64);
        assert_eq!(base.range_counts[0], 3);
    }

    #[test]
    fn test_serializes_flat() {
        let json = albers().to_json().unwrap();
        assert_eq!(json["grid_type"], "albers_time");
        assert_eq!(json["proj_datum"], "nad83");
        assert_eq!(json["shape"], json!([3, 4]));
    }
}
