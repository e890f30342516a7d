//! Common test fixtures for DSS grid tests.
//!
//! Pathnames and keyword-field maps for the grid families, in the shape the
//! metadata builders accept.

/// Record pathnames covering the interval lengths the write pipeline
/// distinguishes.
pub mod pathnames {
    /// One-hour interval.
    pub const ONE_HOUR: &str = "/SHG/TRINITY/PRECIP/01JAN2020:0000/01JAN2020:0100/NEXRAD/";

    /// Six-hour interval.
    pub const SIX_HOUR: &str = "/SHG/TRINITY/PRECIP/01JAN2020:0000/01JAN2020:0600/NEXRAD/";

    /// Instantaneous record, no end time.
    pub const INSTANT: &str = "/SHG/TRINITY/TEMPERATURE/15MAR2021:1200//MODEL/";

    /// End time written as 24:00 of the previous day.
    pub const MIDNIGHT_END: &str = "/SHG/TRINITY/PRECIP/31DEC2019:2300/31DEC2019:2400/NEXRAD/";

    /// Undated record.
    pub const UNDATED: &str = "/UTM/BASIN/ELEVATION///DEM/";

    /// Not a pathname at all.
    pub const MALFORMED: &str = "SHG/TRINITY/PRECIP";
}

/// Keyword-field maps, one builder per grid family.
pub mod fields {
    use serde_json::{json, Map, Value};

    fn into_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Standard Hydrologic Grid (Albers) precipitation grid with a 2 km cell,
    /// anchored at the SHG origin.
    pub fn albers_precip(rows: usize, cols: usize) -> Map<String, Value> {
        into_map(json!({
            "data_type": "per_cum",
            "data_units": "MM",
            "shape": [rows, cols],
            "cell_size": 2000.0,
            "min_xy": [0.0, 0.0],
        }))
    }

    /// Specified-CRS grid with an explicit nodata value and corner coordinate.
    pub fn specified_basic(rows: usize, cols: usize, nodata: f64) -> Map<String, Value> {
        into_map(json!({
            "data_type": "inst_val",
            "data_units": "DEG C",
            "shape": [rows, cols],
            "cell_size": 1000.0,
            "nodata": nodata,
            "crs_name": "UTM15N",
            "crs": "PROJCS[\"NAD_1983_UTM_Zone_15N\"]",
            "tzid": "UTC",
            "tzoffset": 0,
            "min_xy": [500000.0, 3000000.0],
        }))
    }

    /// HRAP grid with a data source tag.
    pub fn hrap_basic(rows: usize, cols: usize) -> Map<String, Value> {
        into_map(json!({
            "data_type": "per_cum",
            "data_units": "IN",
            "shape": [rows, cols],
            "cell_size": 4762.5,
            "lower_left_cell": [367, 263],
            "data_source": "MPE",
        }))
    }

    /// Grid with no projection information.
    pub fn undefined_basic(rows: usize, cols: usize) -> Map<String, Value> {
        into_map(json!({
            "data_type": "inst_val",
            "shape": [rows, cols],
            "cell_size": 1.0,
        }))
    }
}
