//! Legacy (v6) grid header.
//!
//! The legacy header is a flat record of 32-bit words. [`LegacyGridInfo`]
//! holds it in typed form; [`layout`] describes the word order and
//! [`codec`] moves between the two.

pub mod codec;
pub mod layout;

pub use codec::{decode, encode, from_dict, pack_str, to_dict, unpack_str};
pub use layout::{FieldKind, FieldSpec, RANGE_SLOTS, TEXT_WORDS};

use dss_common::{GridError, GridFamily, GridResult};

/// `version` slot of a specified-grid header.
pub const SPECIFIED_GRID_INFO_VERSION: i32 = 2;

/// A single field value, keyed by its layout name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Float(f32),
    Words(Vec<i32>),
    Floats(Vec<f32>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyHrap {
    pub data_source: [i32; TEXT_WORDS],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAlbers {
    pub proj_datum: i32,
    pub proj_units: [i32; TEXT_WORDS],
    pub first_parallel: f32,
    pub sec_parallel: f32,
    pub central_meridian: f32,
    pub lat_origin: f32,
    pub false_easting: f32,
    pub false_northing: f32,
    pub xcoord_cell0: f32,
    pub ycoord_cell0: f32,
}

/// Specified-grid extension. Text slots are variable-length word lists;
/// their `*_length` fields are the list lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySpecified {
    pub version: i32,
    pub crs_name: Vec<i32>,
    pub crs_type: i32,
    pub crs_def: Vec<i32>,
    pub xcoord_cell0: f32,
    pub ycoord_cell0: f32,
    pub nodata: f32,
    pub tzid: Vec<i32>,
    pub tzoffset: i32,
    pub is_interval: i32,
    pub time_stamped: i32,
}

impl Default for LegacySpecified {
    fn default() -> Self {
        Self {
            version: SPECIFIED_GRID_INFO_VERSION,
            crs_name: vec![0],
            crs_type: 0,
            crs_def: vec![0],
            xcoord_cell0: 0.0,
            ycoord_cell0: 0.0,
            nodata: 0.0,
            tzid: vec![0],
            tzoffset: 0,
            is_interval: 0,
            time_stamped: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegacyExt {
    Undefined,
    Hrap(LegacyHrap),
    Albers(LegacyAlbers),
    Specified(LegacySpecified),
}

impl LegacyExt {
    pub fn family(&self) -> GridFamily {
        match self {
            Self::Undefined => GridFamily::Undefined,
            Self::Hrap(_) => GridFamily::Hrap,
            Self::Albers(_) => GridFamily::Albers,
            Self::Specified(_) => GridFamily::Specified,
        }
    }
}

/// Typed legacy grid header.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyGridInfo {
    pub info_fsize: i32,
    pub grid_type: i32,
    pub info_size: i32,
    pub info_gsize: i32,
    pub stime: i32,
    pub etime: i32,
    pub data_units: [i32; TEXT_WORDS],
    pub data_type: i32,
    pub lower_left_x: i32,
    pub lower_left_y: i32,
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f32,
    pub compression_method: i32,
    pub compression_size: i32,
    pub compression_factor: f32,
    pub compression_base: f32,
    pub max_val: f32,
    pub min_val: f32,
    pub mean_val: f32,
    pub range_length: i32,
    pub range_vals: [f32; RANGE_SLOTS],
    pub range_counts: [i32; RANGE_SLOTS],
    pub ext: LegacyExt,
}

impl LegacyGridInfo {
    /// Zeroed header for `family` with its size bookkeeping filled in.
    pub fn new(family: GridFamily) -> Self {
        let ext = match family {
            GridFamily::Undefined => LegacyExt::Undefined,
            GridFamily::Hrap => LegacyExt::Hrap(LegacyHrap::default()),
            GridFamily::Albers => LegacyExt::Albers(LegacyAlbers::default()),
            GridFamily::Specified => LegacyExt::Specified(LegacySpecified::default()),
        };
        let mut info = Self {
            info_fsize: 0,
            grid_type: family.legacy_code(),
            info_size: layout::info_size(family),
            info_gsize: layout::INFO_GSIZE,
            stime: 0,
            etime: 0,
            data_units: [0; TEXT_WORDS],
            data_type: 0,
            lower_left_x: 0,
            lower_left_y: 0,
            cols: 0,
            rows: 0,
            cell_size: 0.0,
            compression_method: 0,
            compression_size: 0,
            compression_factor: 0.0,
            compression_base: 0.0,
            max_val: 0.0,
            min_val: 0.0,
            mean_val: 0.0,
            range_length: 0,
            range_vals: [0.0; RANGE_SLOTS],
            range_counts: [0; RANGE_SLOTS],
            ext,
        };
        info.refresh_sizes();
        info
    }

    pub fn family(&self) -> GridFamily {
        self.ext.family()
    }

    /// Number of words the header encodes to.
    pub fn word_count(&self) -> usize {
        let variable = match &self.ext {
            LegacyExt::Specified(s) => s.crs_name.len() + s.crs_def.len() + s.tzid.len(),
            _ => 0,
        };
        layout::fixed_word_count(self.family()) + variable
    }

    /// Byte size of the flattened header.
    pub fn flat_size_bytes(&self) -> i32 {
        (self.word_count() * 4) as i32
    }

    /// Recompute `info_fsize`, `info_size` and `info_gsize`.
    pub fn refresh_sizes(&mut self) {
        let family = self.family();
        self.info_fsize = self.flat_size_bytes();
        self.info_size = layout::info_size(family);
        self.info_gsize = layout::INFO_GSIZE;
    }

    pub fn specified(&self) -> Option<&LegacySpecified> {
        match &self.ext {
            LegacyExt::Specified(s) => Some(s),
            _ => None,
        }
    }

    pub fn albers(&self) -> Option<&LegacyAlbers> {
        match &self.ext {
            LegacyExt::Albers(a) => Some(a),
            _ => None,
        }
    }

    pub fn hrap(&self) -> Option<&LegacyHrap> {
        match &self.ext {
            LegacyExt::Hrap(h) => Some(h),
            _ => None,
        }
    }

    /// Range table entries in use, clamped to the slot count.
    pub fn range_entries(&self) -> usize {
        self.range_length.clamp(0, RANGE_SLOTS as i32) as usize
    }

    // ===== Access by field name =====

    /// Value of a layout field, or `None` if this family has no such field.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        use FieldValue::*;
        let value = match name {
            "info_fsize" => Int(self.info_fsize),
            "grid_type" => Int(self.grid_type),
            "info_size" => Int(self.info_size),
            "info_gsize" => Int(self.info_gsize),
            "stime" => Int(self.stime),
            "etime" => Int(self.etime),
            "data_units" => Words(self.data_units.to_vec()),
            "data_type" => Int(self.data_type),
            "lower_left_x" => Int(self.lower_left_x),
            "lower_left_y" => Int(self.lower_left_y),
            "cols" => Int(self.cols),
            "rows" => Int(self.rows),
            "cell_size" => Float(self.cell_size),
            "compression_method" => Int(self.compression_method),
            "compression_size" => Int(self.compression_size),
            "compression_factor" => Float(self.compression_factor),
            "compression_base" => Float(self.compression_base),
            "max_val" => Float(self.max_val),
            "min_val" => Float(self.min_val),
            "mean_val" => Float(self.mean_val),
            "range_length" => Int(self.range_length),
            "range_vals" => Floats(self.range_vals.to_vec()),
            "range_counts" => Words(self.range_counts.to_vec()),
            _ => return self.get_ext(name),
        };
        Some(value)
    }

    fn get_ext(&self, name: &str) -> Option<FieldValue> {
        use FieldValue::*;
        let value = match (&self.ext, name) {
            (LegacyExt::Hrap(h), "data_source") => Words(h.data_source.to_vec()),
            (LegacyExt::Albers(a), _) => match name {
                "proj_datum" => Int(a.proj_datum),
                "proj_units" => Words(a.proj_units.to_vec()),
                "first_parallel" => Float(a.first_parallel),
                "sec_parallel" => Float(a.sec_parallel),
                "central_meridian" => Float(a.central_meridian),
                "lat_origin" => Float(a.lat_origin),
                "false_easting" => Float(a.false_easting),
                "false_northing" => Float(a.false_northing),
                "xcoord_cell0" => Float(a.xcoord_cell0),
                "ycoord_cell0" => Float(a.ycoord_cell0),
                _ => return None,
            },
            (LegacyExt::Specified(s), _) => match name {
                "version" => Int(s.version),
                "crs_name_length" => Int(s.crs_name.len() as i32),
                "crs_name" => Words(s.crs_name.clone()),
                "crs_type" => Int(s.crs_type),
                "crs_def_length" => Int(s.crs_def.len() as i32),
                "crs_def" => Words(s.crs_def.clone()),
                "xcoord_cell0" => Float(s.xcoord_cell0),
                "ycoord_cell0" => Float(s.ycoord_cell0),
                "nodata" => Float(s.nodata),
                "tzid_length" => Int(s.tzid.len() as i32),
                "tzid" => Words(s.tzid.clone()),
                "tzoffset" => Int(s.tzoffset),
                "is_interval" => Int(s.is_interval),
                "time_stamped" => Int(s.time_stamped),
                _ => return None,
            },
            _ => return None,
        };
        Some(value)
    }

    /// Set a layout field by name.
    ///
    /// `*_length` fields of variable text are derived from the text itself,
    /// so setting them is a no-op. Fixed arrays accept shorter input and are
    /// zero padded.
    pub fn set(&mut self, name: &str, value: FieldValue) -> GridResult<()> {
        match name {
            "info_fsize" => self.info_fsize = int(name, value)?,
            "grid_type" => self.grid_type = int(name, value)?,
            "info_size" => self.info_size = int(name, value)?,
            "info_gsize" => self.info_gsize = int(name, value)?,
            "stime" => self.stime = int(name, value)?,
            "etime" => self.etime = int(name, value)?,
            "data_units" => self.data_units = words_fixed(name, value)?,
            "data_type" => self.data_type = int(name, value)?,
            "lower_left_x" => self.lower_left_x = int(name, value)?,
            "lower_left_y" => self.lower_left_y = int(name, value)?,
            "cols" => self.cols = int(name, value)?,
            "rows" => self.rows = int(name, value)?,
            "cell_size" => self.cell_size = float(name, value)?,
            "compression_method" => self.compression_method = int(name, value)?,
            "compression_size" => self.compression_size = int(name, value)?,
            "compression_factor" => self.compression_factor = float(name, value)?,
            "compression_base" => self.compression_base = float(name, value)?,
            "max_val" => self.max_val = float(name, value)?,
            "min_val" => self.min_val = float(name, value)?,
            "mean_val" => self.mean_val = float(name, value)?,
            "range_length" => self.range_length = int(name, value)?,
            "range_vals" => self.range_vals = floats_fixed(name, value)?,
            "range_counts" => self.range_counts = words_fixed(name, value)?,
            _ => return self.set_ext(name, value),
        }
        Ok(())
    }

    fn set_ext(&mut self, name: &str, value: FieldValue) -> GridResult<()> {
        let family = self.family();
        let unknown = || {
            GridError::invalid_field(name, format!("no such field in a {} header", family))
        };
        match &mut self.ext {
            LegacyExt::Undefined => return Err(unknown()),
            LegacyExt::Hrap(h) => match name {
                "data_source" => h.data_source = words_fixed(name, value)?,
                _ => return Err(unknown()),
            },
            LegacyExt::Albers(a) => match name {
                "proj_datum" => a.proj_datum = int(name, value)?,
                "proj_units" => a.proj_units = words_fixed(name, value)?,
                "first_parallel" => a.first_parallel = float(name, value)?,
                "sec_parallel" => a.sec_parallel = float(name, value)?,
                "central_meridian" => a.central_meridian = float(name, value)?,
                "lat_origin" => a.lat_origin = float(name, value)?,
                "false_easting" => a.false_easting = float(name, value)?,
                "false_northing" => a.false_northing = float(name, value)?,
                "xcoord_cell0" => a.xcoord_cell0 = float(name, value)?,
                "ycoord_cell0" => a.ycoord_cell0 = float(name, value)?,
                _ => return Err(unknown()),
            },
            LegacyExt::Specified(s) => match name {
                "version" => s.version = int(name, value)?,
                "crs_name_length" | "crs_def_length" | "tzid_length" => {}
                "crs_name" => s.crs_name = words(name, value)?,
                "crs_type" => s.crs_type = int(name, value)?,
                "crs_def" => s.crs_def = words(name, value)?,
                "xcoord_cell0" => s.xcoord_cell0 = float(name, value)?,
                "ycoord_cell0" => s.ycoord_cell0 = float(name, value)?,
                "nodata" => s.nodata = float(name, value)?,
                "tzid" => s.tzid = words(name, value)?,
                "tzoffset" => s.tzoffset = int(name, value)?,
                "is_interval" => s.is_interval = int(name, value)?,
                "time_stamped" => s.time_stamped = int(name, value)?,
                _ => return Err(unknown()),
            },
        }
        Ok(())
    }
}

// ===== FieldValue coercions =====

fn wrong_kind(name: &str, expected: &str, value: &FieldValue) -> GridError {
    GridError::invalid_field(name, format!("expected {}, got {:?}", expected, value))
}

fn int(name: &str, value: FieldValue) -> GridResult<i32> {
    match value {
        FieldValue::Int(v) => Ok(v),
        other => Err(wrong_kind(name, "an integer", &other)),
    }
}

fn float(name: &str, value: FieldValue) -> GridResult<f32> {
    match value {
        FieldValue::Float(v) => Ok(v),
        FieldValue::Int(v) => Ok(v as f32),
        other => Err(wrong_kind(name, "a float", &other)),
    }
}

fn words(name: &str, value: FieldValue) -> GridResult<Vec<i32>> {
    match value {
        FieldValue::Words(v) => Ok(v),
        other => Err(wrong_kind(name, "a word list", &other)),
    }
}

fn words_fixed<const N: usize>(name: &str, value: FieldValue) -> GridResult<[i32; N]> {
    let list = words(name, value)?;
    if list.len() > N {
        return Err(GridError::invalid_field(
            name,
            format!("{} words do not fit {} slots", list.len(), N),
        ));
    }
    let mut out = [0; N];
    out[..list.len()].copy_from_slice(&list);
    Ok(out)
}

fn floats_fixed<const N: usize>(name: &str, value: FieldValue) -> GridResult<[f32; N]> {
    let list = match value {
        FieldValue::Floats(v) => v,
        other => return Err(wrong_kind(name, "a float list", &other)),
    };
    if list.len() > N {
        return Err(GridError::invalid_field(
            name,
            format!("{} values do not fit {} slots", list.len(), N),
        ));
    }
    let mut out = [0.0; N];
    out[..list.len()].copy_from_slice(&list);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_bookkeeping() {
        let hrap = LegacyGridInfo::new(GridFamily::Hrap);
        assert_eq!(hrap.grid_type, 410);
        assert_eq!(hrap.info_size, 128);
        assert_eq!(hrap.info_gsize, 124);
        assert_eq!(hrap.info_fsize, 66 * 4);

        let spec = LegacyGridInfo::new(GridFamily::Specified);
        assert_eq!(spec.specified().unwrap().version, 2);
        // three one-word empty strings
        assert_eq!(spec.word_count(), 77);
    }

    #[test]
    fn test_get_set_by_name() {
        let mut info = LegacyGridInfo::new(GridFamily::Albers);
        info.set("cell_size", FieldValue::Float(2000.0)).unwrap();
        info.set("lat_origin", FieldValue::Float(23.0)).unwrap();
        info.set("rows", FieldValue::Int(10)).unwrap();

        assert_eq!(info.get("cell_size"), Some(FieldValue::Float(2000.0)));
        assert_eq!(info.albers().unwrap().lat_origin, 23.0);
        assert_eq!(info.rows, 10);
        assert_eq!(info.get("tzid"), None);
    }

    #[test]
    fn test_set_rejects_wrong_family_or_kind() {
        let mut info = LegacyGridInfo::new(GridFamily::Hrap);
        assert!(info.set("nodata", FieldValue::Float(0.0)).is_err());
        assert!(info.set("rows", FieldValue::Float(1.0)).is_err());
        assert!(info
            .set("data_source", FieldValue::Words(vec![1, 2, 3, 4]))
            .is_err());
    }

    #[test]
    fn test_variable_lengths_follow_text() {
        let mut info = LegacyGridInfo::new(GridFamily::Specified);
        info.set("crs_def", FieldValue::Words(vec![1, 2, 3])).unwrap();
        assert_eq!(info.get("crs_def_length"), Some(FieldValue::Int(3)));
        info.set("crs_def_length", FieldValue::Int(99)).unwrap();
        assert_eq!(info.get("crs_def_length"), Some(FieldValue::Int(3)));
    }
}
