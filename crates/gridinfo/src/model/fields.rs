//! Field-name aliases and typed readers for builder input.

use dss_common::{GridError, GridResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

/// Accepted spellings for each canonical field, lower case.
const ALIASES: &[(&str, &[&str])] = &[
    ("grid_type", &["type", "gtype", "gridtype", "grid"]),
    ("data_units", &["du", "data_unit", "units", "unit"]),
    ("data_type", &["dt", "datatype", "dtype"]),
    ("lower_left_cell", &["llc", "llci", "lower_left_cell_index", "ll_cell", "lower_cell"]),
    ("shape", &["dims", "dimensions"]),
    ("cell_size", &["cellsize", "cs", "dx", "spacing", "grid_size"]),
    ("compression_method", &["compression", "comp", "comp_method"]),
    ("compression_base", &["comp_base", "compbase", "base"]),
    ("compression_factor", &["comp_factor", "compfactor", "comp_scale", "scale"]),
    ("max_val", &["max", "maximum", "max_value"]),
    ("min_val", &["min", "minimum", "min_value"]),
    ("mean_val", &["mean", "mean_value", "average", "avg"]),
    ("range_vals", &["rv", "range_values", "rangevals"]),
    ("range_counts", &["rc", "rangecounts"]),
    ("min_xy", &["minxy", "xy_min", "xymin", "llxy"]),
    ("data_source", &["datasource", "data_sources", "dsource", "source"]),
    ("proj_datum", &["datum"]),
    ("proj_units", &["pu", "proj_unit", "projection_units", "projection_unit"]),
    ("lat_0", &["lat0", "lat_origin", "latitude_of_origin"]),
    ("lat_1", &["lat1", "first_parallel", "par1", "parallel1"]),
    ("lat_2", &["lat2", "sec_parallel", "second_parallel", "par2", "parallel2"]),
    ("lon_0", &["lon0", "central_meridian", "cm", "cmer"]),
    ("x_0", &["x0", "false_easting", "fe"]),
    ("y_0", &["y0", "false_northing", "fn"]),
    ("coords_cell0", &["coordscell0", "coords0", "xy_cell0", "cell0"]),
    ("crs", &["crs_def", "crs_definition", "srs", "srs_def", "wkt"]),
    ("crs_name", &["crsname", "srs_name", "srsname"]),
    ("nodata", &["no_data", "null", "nulldata", "null_value", "nullvalue"]),
    ("tzid", &["timezone_id", "time_zone_id", "timezoneid"]),
    ("tzoffset", &["tz_offset", "timezone_offset", "time_zone_offset", "timezoneoffset"]),
    ("is_interval", &["isinterval", "interval"]),
    ("time_stamped", &["timestamped", "is_time_stamped", "istimestamped"]),
];

/// Canonical name for `key`, matched case-insensitively against the
/// canonical names and their aliases.
pub fn canonical_field_name(key: &str) -> Option<&'static str> {
    let lower = key.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(canonical, aliases)| *canonical == lower || aliases.contains(&lower.as_str()))
        .map(|(canonical, _)| *canonical)
}

/// Builder input keyed by canonical name. Keys the model does not know are
/// kept aside, under their original spelling, for `extra`.
pub(crate) struct FieldMap {
    known: HashMap<&'static str, (String, Value)>,
    unknown: Map<String, Value>,
}

impl FieldMap {
    pub fn new(input: &Map<String, Value>) -> GridResult<Self> {
        let mut known: HashMap<&'static str, (String, Value)> = HashMap::new();
        let mut unknown = Map::new();

        for (key, value) in input {
            if key.eq_ignore_ascii_case("extra") {
                if let Value::Object(nested) = value {
                    for (k, v) in nested {
                        unknown.insert(k.clone(), v.clone());
                    }
                    continue;
                }
            }
            match canonical_field_name(key) {
                Some(canonical) => {
                    if let Some((first, _)) = known.get(canonical) {
                        return Err(GridError::invalid_field(
                            canonical,
                            format!("given twice, as '{}' and '{}'", first, key),
                        ));
                    }
                    known.insert(canonical, (key.clone(), value.clone()));
                }
                None => {
                    unknown.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(Self { known, unknown })
    }

    fn take_raw(&mut self, name: &str) -> Option<Value> {
        match self.known.remove(name) {
            Some((_, Value::Null)) | None => None,
            Some((_, value)) => Some(value),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        matches!(self.known.get(name), Some((_, v)) if !v.is_null())
    }

    pub fn take_f64(&mut self, name: &str) -> GridResult<Option<f64>> {
        self.take_raw(name).map(|v| as_f64(name, &v)).transpose()
    }

    pub fn take_i64(&mut self, name: &str) -> GridResult<Option<i64>> {
        self.take_raw(name).map(|v| as_i64(name, &v)).transpose()
    }

    pub fn take_bool(&mut self, name: &str) -> GridResult<Option<bool>> {
        self.take_raw(name)
            .map(|v| match &v {
                Value::Bool(b) => Ok(*b),
                Value::Number(_) => Ok(as_i64(name, &v)? != 0),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "1" => Ok(true),
                    "false" | "no" | "0" => Ok(false),
                    _ => Err(invalid(name, "a boolean", &v)),
                },
                _ => Err(invalid(name, "a boolean", &v)),
            })
            .transpose()
    }

    pub fn take_string(&mut self, name: &str) -> GridResult<Option<String>> {
        self.take_raw(name)
            .map(|v| match v {
                Value::String(s) => Ok(s),
                other => Err(invalid(name, "a string", &other)),
            })
            .transpose()
    }

    /// Enum value given by name or numeric code.
    pub fn take_enum<T>(&mut self, name: &str) -> GridResult<Option<T>>
    where
        T: FromStr<Err = GridError>,
    {
        self.take_raw(name)
            .map(|v| match &v {
                Value::String(s) => s.parse(),
                Value::Number(n) => n.to_string().parse(),
                _ => Err(invalid(name, "a name or code", &v)),
            })
            .transpose()
    }

    pub fn take_pair_f64(&mut self, name: &str) -> GridResult<Option<(f64, f64)>> {
        self.take_raw(name)
            .map(|v| {
                let items = pair(name, &v)?;
                Ok((as_f64(name, &items[0])?, as_f64(name, &items[1])?))
            })
            .transpose()
    }

    pub fn take_pair_i32(&mut self, name: &str) -> GridResult<Option<(i32, i32)>> {
        self.take_raw(name)
            .map(|v| {
                let items = pair(name, &v)?;
                Ok((as_i32(name, &items[0])?, as_i32(name, &items[1])?))
            })
            .transpose()
    }

    pub fn take_vec_f64(&mut self, name: &str) -> GridResult<Option<Vec<f64>>> {
        self.take_raw(name)
            .map(|v| {
                list(name, &v)?
                    .iter()
                    .map(|item| as_f64(name, item))
                    .collect()
            })
            .transpose()
    }

    pub fn take_vec_i64(&mut self, name: &str) -> GridResult<Option<Vec<i64>>> {
        self.take_raw(name)
            .map(|v| {
                list(name, &v)?
                    .iter()
                    .map(|item| as_i64(name, item))
                    .collect()
            })
            .transpose()
    }

    /// Everything not consumed: unknown keys plus canonical fields this
    /// family does not use.
    pub fn into_extra(self) -> Map<String, Value> {
        let mut extra = Map::new();
        for (canonical, (original, value)) in self.known {
            debug!(field = canonical, "Field not used by this grid family; kept in extra");
            extra.insert(original, value);
        }
        for (key, value) in self.unknown {
            extra.insert(key, value);
        }
        extra
    }
}

// ===== Value coercions =====

fn invalid(name: &str, expected: &str, value: &Value) -> GridError {
    GridError::invalid_field(name, format!("expected {}, got {}", expected, value))
}

fn as_f64(name: &str, value: &Value) -> GridResult<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(name, "a number", value)),
        // strings allow "nan", "inf" and friends
        Value::String(s) => s.trim().parse().map_err(|_| invalid(name, "a number", value)),
        _ => Err(invalid(name, "a number", value)),
    }
}

fn as_i64(name: &str, value: &Value) -> GridResult<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(invalid(name, "an integer", value)),
            }
        }
        Value::String(s) => s.trim().parse().map_err(|_| invalid(name, "an integer", value)),
        _ => Err(invalid(name, "an integer", value)),
    }
}

fn as_i32(name: &str, value: &Value) -> GridResult<i32> {
    let wide = as_i64(name, value)?;
    i32::try_from(wide).map_err(|_| invalid(name, "a 32-bit integer", value))
}

fn list<'a>(name: &str, value: &'a Value) -> GridResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| invalid(name, "a list", value))
}

fn pair<'a>(name: &str, value: &'a Value) -> GridResult<&'a [Value]> {
    let items = list(name, value)?;
    if items.len() != 2 {
        return Err(invalid(name, "a pair", value));
    }
    Ok(items.as_slice())
}
