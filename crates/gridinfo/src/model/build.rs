//! Validated construction of [`GridInfo`] values from keyword fields.

use super::fields::FieldMap;
use super::{AlbersInfo, GridBase, GridInfo, HrapInfo, SpecifiedInfo, UndefinedInfo};
use crate::legacy::RANGE_SLOTS;
use crate::policy;
use dss_common::{Datum, GridError, GridFamily, GridResult, GridType};
use grid_geo::{lower_left_cell_from_min_xy, lower_left_cell_of_specified_grid};
use serde_json::{Map, Value};
use tracing::debug;

// SHG defaults
const ALBERS_PROJ_UNITS: &str = "meter";
const ALBERS_LAT_0: f64 = 23.0;
const ALBERS_LAT_1: f64 = 29.5;
const ALBERS_LAT_2: f64 = 49.5;
const ALBERS_LON_0: f64 = -96.0;

const MAX_TZ_OFFSET: i32 = 24;

impl GridInfo {
    /// Build and validate metadata of `grid_type` from keyword fields.
    ///
    /// Keys are matched case-insensitively against canonical names and
    /// their aliases. Unrecognised keys land in `extra`.
    pub fn build(grid_type: GridType, fields: &Map<String, Value>) -> GridResult<Self> {
        build_metadata(grid_type, fields)
    }

    /// Like [`GridInfo::build`], taking the grid type from the fields.
    pub fn from_fields(fields: &Map<String, Value>) -> GridResult<Self> {
        let mut lookup = FieldMap::new(fields)?;
        let grid_type = lookup
            .take_enum::<GridType>("grid_type")?
            .ok_or_else(|| GridError::missing_field("grid_type"))?;
        build_metadata(grid_type, fields)
    }
}

pub fn build_metadata(grid_type: GridType, input: &Map<String, Value>) -> GridResult<GridInfo> {
    let mut fields = FieldMap::new(input)?;

    if let Some(given) = fields.take_enum::<GridType>("grid_type")? {
        if given.family() != grid_type.family() {
            return Err(GridError::invalid_field(
                "grid_type",
                format!("fields say '{}' but building '{}'", given, grid_type),
            ));
        }
    }

    let llc_given = fields.contains("lower_left_cell");
    let base = build_base(grid_type, &mut fields)?;

    let mut info = match grid_type.family() {
        GridFamily::Undefined => GridInfo::Undefined(UndefinedInfo { base }),
        GridFamily::Hrap => GridInfo::Hrap(HrapInfo {
            data_source: fields.take_string("data_source")?.unwrap_or_default(),
            base,
        }),
        GridFamily::Albers => GridInfo::Albers(build_albers(base, &mut fields, llc_given)?),
        GridFamily::Specified => GridInfo::Specified(build_specified(base, &mut fields, llc_given)?),
    };

    info.base_mut().extra = fields.into_extra();
    validate(&info)?;
    debug!(grid_type = %info.grid_type(), shape = ?info.base().shape, "Built grid metadata");
    Ok(info)
}

fn required<T>(value: Option<T>, name: &str) -> GridResult<T> {
    value.ok_or_else(|| GridError::missing_field(name))
}

fn build_base(grid_type: GridType, fields: &mut FieldMap) -> GridResult<GridBase> {
    let data_type = required(fields.take_enum("data_type")?, "data_type")?;
    let (rows, cols) = required(fields.take_pair_i32("shape")?, "shape")?;
    let cell_size = required(fields.take_f64("cell_size")?, "cell_size")?;

    if rows < 1 || cols < 1 {
        return Err(GridError::invalid_field(
            "shape",
            format!("rows and cols must be >= 1, got ({}, {})", rows, cols),
        ));
    }

    let mut base = GridBase::new(grid_type, data_type, (rows as usize, cols as usize), cell_size);
    base.data_units = fields.take_string("data_units")?.unwrap_or_default();
    base.lower_left_cell = fields.take_pair_i32("lower_left_cell")?.unwrap_or((0, 0));
    base.compression_method = fields.take_enum("compression_method")?;
    base.compression_base = fields.take_f64("compression_base")?.unwrap_or(0.0);
    base.compression_factor = fields.take_f64("compression_factor")?.unwrap_or(0.0);
    base.max_val = fields.take_f64("max_val")?.unwrap_or(0.0);
    base.min_val = fields.take_f64("min_val")?.unwrap_or(0.0);
    base.mean_val = fields.take_f64("mean_val")?.unwrap_or(0.0);
    base.range_vals = fields.take_vec_f64("range_vals")?.unwrap_or_default();
    base.range_counts = fields.take_vec_i64("range_counts")?.unwrap_or_default();
    base.min_xy = fields.take_pair_f64("min_xy")?;
    Ok(base)
}

fn build_albers(base: GridBase, fields: &mut FieldMap, llc_given: bool) -> GridResult<AlbersInfo> {
    let mut info = AlbersInfo {
        proj_datum: fields.take_enum("proj_datum")?.unwrap_or(Datum::Nad83),
        proj_units: fields
            .take_string("proj_units")?
            .unwrap_or_else(|| ALBERS_PROJ_UNITS.to_string()),
        lat_0: fields.take_f64("lat_0")?.unwrap_or(ALBERS_LAT_0),
        lat_1: fields.take_f64("lat_1")?.unwrap_or(ALBERS_LAT_1),
        lat_2: fields.take_f64("lat_2")?.unwrap_or(ALBERS_LAT_2),
        lon_0: fields.take_f64("lon_0")?.unwrap_or(ALBERS_LON_0),
        x_0: fields.take_f64("x_0")?.unwrap_or(0.0),
        y_0: fields.take_f64("y_0")?.unwrap_or(0.0),
        coords_cell0: fields.take_pair_f64("coords_cell0")?.unwrap_or((0.0, 0.0)),
        base,
    };
    policy::check_shg_origin(info.coords_cell0);

    // Albers lower_left_cell is always derived; a supplied value is dropped.
    let derived = match info.base.min_xy {
        Some(min_xy) => {
            let (x0, y0) = info.coords_cell0;
            lower_left_cell_from_min_xy(min_xy, info.base.cell_size, x0, y0)
        }
        None => (0, 0),
    };
    if llc_given && derived != info.base.lower_left_cell {
        debug!(
            given = ?info.base.lower_left_cell,
            derived = ?derived,
            "Ignoring supplied lower_left_cell for albers grid"
        );
    }
    info.base.lower_left_cell = derived;
    Ok(info)
}

fn build_specified(base: GridBase, fields: &mut FieldMap, llc_given: bool) -> GridResult<SpecifiedInfo> {
    if llc_given && base.lower_left_cell != lower_left_cell_of_specified_grid() {
        return Err(GridError::invalid_field(
            "lower_left_cell",
            format!(
                "specified grids index from their own bottom-left cell; got {:?}",
                base.lower_left_cell
            ),
        ));
    }

    let tzoffset = fields.take_i64("tzoffset")?.unwrap_or(0);
    if tzoffset.abs() > MAX_TZ_OFFSET as i64 {
        return Err(GridError::invalid_field(
            "tzoffset",
            format!("{} is outside [-{}, {}]", tzoffset, MAX_TZ_OFFSET, MAX_TZ_OFFSET),
        ));
    }

    let coords_cell0 = fields.take_pair_f64("coords_cell0")?.or(base.min_xy);

    Ok(SpecifiedInfo {
        crs: fields.take_string("crs")?.unwrap_or_default(),
        crs_name: fields.take_string("crs_name")?.unwrap_or_default(),
        nodata: required(fields.take_f64("nodata")?, "nodata")?,
        tzid: fields.take_string("tzid")?.unwrap_or_default(),
        tzoffset: tzoffset as i32,
        coords_cell0,
        is_interval: fields.take_bool("is_interval")?.unwrap_or(true),
        time_stamped: fields.take_bool("time_stamped")?.unwrap_or(true),
        base,
    })
}

/// Check the invariants every [`GridInfo`] must satisfy.
pub(crate) fn validate(info: &GridInfo) -> GridResult<()> {
    let base = info.base();

    if base.shape.0 < 1 || base.shape.1 < 1 {
        return Err(GridError::invalid_field(
            "shape",
            format!("rows and cols must be >= 1, got {:?}", base.shape),
        ));
    }
    if !(base.cell_size.is_finite() && base.cell_size > 0.0) {
        return Err(GridError::invalid_field(
            "cell_size",
            format!("must be a positive number, got {}", base.cell_size),
        ));
    }
    if base.range_vals.len() != base.range_counts.len() {
        return Err(GridError::invalid_field(
            "range_vals",
            format!(
                "{} values but {} counts",
                base.range_vals.len(),
                base.range_counts.len()
            ),
        ));
    }
    if base.range_vals.len() > RANGE_SLOTS {
        return Err(GridError::invalid_field(
            "range_vals",
            format!("at most {} entries, got {}", RANGE_SLOTS, base.range_vals.len()),
        ));
    }
    if let GridInfo::Specified(s) = info {
        if base.lower_left_cell != lower_left_cell_of_specified_grid() {
            return Err(GridError::invalid_field(
                "lower_left_cell",
                "must be (0, 0) for specified grids",
            ));
        }
        if s.tzoffset.abs() > MAX_TZ_OFFSET {
            return Err(GridError::invalid_field(
                "tzoffset",
                format!("{} is outside [-24, 24]", s.tzoffset),
            ));
        }
    }
    Ok(())
}
