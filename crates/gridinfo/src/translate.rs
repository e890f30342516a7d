//! Translation between the modern model and the legacy header.
//!
//! Going to the legacy layout is lossy in known places: fixed three-word
//! text slots truncate, the range table is capped, and values narrow to
//! `f32`. Each loss is reported as a [`ConsistencyWarning`].

use crate::legacy::{
    pack_str, unpack_str, LegacyAlbers, LegacyExt, LegacyGridInfo, LegacyHrap, LegacySpecified,
    SPECIFIED_GRID_INFO_VERSION,
};
use crate::model::{AlbersInfo, GridBase, GridInfo, HrapInfo, SpecifiedInfo, UndefinedInfo};
use crate::policy;
use crate::warning::{ConsistencyWarning, TimePart};
use dss_common::{
    CompressionMethod, DataType, Datum, DssPathname, GridError, GridResult, GridType,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// Legacy-only slots carried through `extra` so a round trip keeps them.
const EXTRA_STIME: &str = "stime";
const EXTRA_ETIME: &str = "etime";
const EXTRA_COMPRESSION_SIZE: &str = "compression_size";
const EXTRA_CRS_TYPE: &str = "crs_type";

/// A legacy header plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyConversion {
    pub legacy: LegacyGridInfo,
    pub warnings: Vec<ConsistencyWarning>,
}

impl LegacyConversion {
    /// Whether a start or end time could not be derived from the pathname.
    pub fn has_time_issue(&self) -> bool {
        self.warnings.iter().any(ConsistencyWarning::is_time_issue)
    }
}

fn extra_i32(extra: &Map<String, Value>, key: &str) -> Option<i32> {
    extra
        .get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

fn dim(name: &str, value: usize) -> GridResult<i32> {
    i32::try_from(value)
        .map_err(|_| GridError::invalid_field(name, format!("{} does not fit a legacy header", value)))
}

/// Produce the legacy header for `info`, stored at `pathname`.
///
/// Start and end times come from the pathname's D and E parts; a part that
/// does not parse leaves its slot at 0 and is flagged.
pub fn to_legacy(info: &GridInfo, pathname: &str) -> GridResult<LegacyConversion> {
    let path = DssPathname::parse(pathname)?;
    let base = info.base();
    let mut warnings = Vec::new();
    let mut legacy = LegacyGridInfo::new(info.family());

    legacy.grid_type = info.legacy_grid_type().code();

    let (stime, w) = policy::path_timestamp(path.start_part(), TimePart::Start);
    legacy.stime = stime;
    warnings.extend(w);
    let (etime, w) = policy::path_timestamp(path.end_part(), TimePart::End);
    legacy.etime = etime;
    warnings.extend(w);

    let (units, w) = policy::truncate_to_words::<3>("data_units", &base.data_units);
    legacy.data_units = units;
    warnings.extend(w);

    legacy.data_type = base.data_type.code();
    legacy.lower_left_x = base.lower_left_cell.0;
    legacy.lower_left_y = base.lower_left_cell.1;
    legacy.rows = dim("rows", base.rows())?;
    legacy.cols = dim("cols", base.cols())?;
    legacy.cell_size = base.cell_size as f32;

    legacy.compression_method = base
        .compression_method
        .unwrap_or(CompressionMethod::Undefined)
        .code();
    legacy.compression_size = extra_i32(&base.extra, EXTRA_COMPRESSION_SIZE).unwrap_or(0);
    legacy.compression_factor = base.compression_factor as f32;
    legacy.compression_base = base.compression_base as f32;

    legacy.max_val = base.max_val as f32;
    legacy.min_val = base.min_val as f32;
    legacy.mean_val = base.mean_val as f32;

    let (range, w) = policy::trim_range_table(&base.range_vals, &base.range_counts);
    warnings.extend(w);
    legacy.range_length = range.len() as i32;
    for (i, (val, count)) in range.vals.iter().zip(&range.counts).enumerate() {
        legacy.range_vals[i] = *val as f32;
        legacy.range_counts[i] = (*count).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    }

    legacy.ext = match info {
        GridInfo::Undefined(_) => LegacyExt::Undefined,
        GridInfo::Hrap(h) => {
            let (data_source, w) = policy::truncate_to_words::<3>("data_source", &h.data_source);
            warnings.extend(w);
            LegacyExt::Hrap(LegacyHrap { data_source })
        }
        GridInfo::Albers(a) => {
            let (proj_units, w) = policy::truncate_to_words::<3>("proj_units", &a.proj_units);
            warnings.extend(w);
            LegacyExt::Albers(LegacyAlbers {
                proj_datum: a.proj_datum.code(),
                proj_units,
                first_parallel: a.lat_1 as f32,
                sec_parallel: a.lat_2 as f32,
                central_meridian: a.lon_0 as f32,
                lat_origin: a.lat_0 as f32,
                false_easting: a.x_0 as f32,
                false_northing: a.y_0 as f32,
                xcoord_cell0: a.coords_cell0.0 as f32,
                ycoord_cell0: a.coords_cell0.1 as f32,
            })
        }
        GridInfo::Specified(s) => {
            let (x0, y0) = s.coords_cell0.ok_or_else(|| {
                GridError::MissingGeoreference("coords_cell0".to_string())
            })?;
            LegacyExt::Specified(LegacySpecified {
                version: SPECIFIED_GRID_INFO_VERSION,
                crs_name: pack_str(&s.crs_name),
                crs_type: extra_i32(&base.extra, EXTRA_CRS_TYPE).unwrap_or(0),
                crs_def: pack_str(&s.crs),
                xcoord_cell0: x0 as f32,
                ycoord_cell0: y0 as f32,
                nodata: s.nodata as f32,
                tzid: pack_str(&s.tzid),
                tzoffset: s.tzoffset,
                is_interval: s.is_interval as i32,
                time_stamped: s.time_stamped as i32,
            })
        }
    };

    legacy.refresh_sizes();
    debug!(
        pathname = %path,
        grid_type = legacy.grid_type,
        words = legacy.word_count(),
        warnings = warnings.len(),
        "Converted grid metadata to legacy header"
    );
    Ok(LegacyConversion { legacy, warnings })
}

/// Rebuild modern metadata from a legacy header.
///
/// Header-only slots (`stime`, `etime`, `compression_size` and, for
/// specified grids, `crs_type`) are kept in `extra`.
pub fn to_modern(legacy: &LegacyGridInfo) -> GridResult<GridInfo> {
    let family = legacy.family();
    let grid_type = GridType::from_code(legacy.grid_type)
        .filter(|t| t.family() == family)
        .unwrap_or_else(|| GridType::new(family, true));

    let data_type = DataType::from_code(legacy.data_type).ok_or_else(|| {
        GridError::invalid_field("data_type", format!("unknown code {}", legacy.data_type))
    })?;
    let compression_method = CompressionMethod::from_code(legacy.compression_method).ok_or_else(|| {
        GridError::invalid_field(
            "compression_method",
            format!("unknown code {}", legacy.compression_method),
        )
    })?;
    if legacy.rows < 1 || legacy.cols < 1 {
        return Err(GridError::invalid_field(
            "shape",
            format!("legacy header has {} rows, {} cols", legacy.rows, legacy.cols),
        ));
    }

    let entries = legacy.range_entries();
    let mut base = GridBase::new(
        grid_type,
        data_type,
        (legacy.rows as usize, legacy.cols as usize),
        legacy.cell_size as f64,
    );
    base.data_units = unpack_str(&legacy.data_units);
    base.lower_left_cell = (legacy.lower_left_x, legacy.lower_left_y);
    base.compression_method = Some(compression_method);
    base.compression_base = legacy.compression_base as f64;
    base.compression_factor = legacy.compression_factor as f64;
    base.max_val = legacy.max_val as f64;
    base.min_val = legacy.min_val as f64;
    base.mean_val = legacy.mean_val as f64;
    base.range_vals = legacy.range_vals[..entries].iter().map(|v| *v as f64).collect();
    base.range_counts = legacy.range_counts[..entries].iter().map(|c| *c as i64).collect();
    base.extra.insert(EXTRA_STIME.to_string(), Value::from(legacy.stime));
    base.extra.insert(EXTRA_ETIME.to_string(), Value::from(legacy.etime));
    base.extra.insert(
        EXTRA_COMPRESSION_SIZE.to_string(),
        Value::from(legacy.compression_size),
    );

    let info = match &legacy.ext {
        LegacyExt::Undefined => GridInfo::Undefined(UndefinedInfo { base }),
        LegacyExt::Hrap(h) => GridInfo::Hrap(HrapInfo {
            base,
            data_source: unpack_str(&h.data_source),
        }),
        LegacyExt::Albers(a) => GridInfo::Albers(AlbersInfo {
            base,
            proj_datum: Datum::from_code(a.proj_datum).unwrap_or_else(|| {
                warn!(code = a.proj_datum, "Unknown projection datum code, reading as undefined");
                Datum::Undefined
            }),
            proj_units: unpack_str(&a.proj_units),
            lat_0: a.lat_origin as f64,
            lat_1: a.first_parallel as f64,
            lat_2: a.sec_parallel as f64,
            lon_0: a.central_meridian as f64,
            x_0: a.false_easting as f64,
            y_0: a.false_northing as f64,
            coords_cell0: (a.xcoord_cell0 as f64, a.ycoord_cell0 as f64),
        }),
        LegacyExt::Specified(s) => {
            base.extra.insert(EXTRA_CRS_TYPE.to_string(), Value::from(s.crs_type));
            GridInfo::Specified(SpecifiedInfo {
                base,
                crs: unpack_str(&s.crs_def),
                crs_name: unpack_str(&s.crs_name),
                nodata: s.nodata as f64,
                tzid: unpack_str(&s.tzid),
                tzoffset: s.tzoffset,
                coords_cell0: Some((s.xcoord_cell0 as f64, s.ycoord_cell0 as f64)),
                is_interval: s.is_interval != 0,
                time_stamped: s.time_stamped != 0,
            })
        }
    };

    crate::model::validate(&info)?;
    if let GridInfo::Albers(a) = &info {
        policy::check_shg_origin(a.coords_cell0);
    }
    Ok(info)
}
