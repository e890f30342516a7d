//! Ordered field tables of the legacy header.
//!
//! Each family's header is the base table followed by its extension table.
//! A field's byte width decides how the codec walks it:
//!
//! - width <= 4: one word (an integer, or a float stored by bit pattern)
//! - width == 8: variable-length word list whose length is the value of the
//!   immediately preceding `*_length` field
//! - width > 8: fixed array of `width / 4` words

use dss_common::GridFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    /// Fixed number of words holding packed text.
    Text(usize),
    Ints(usize),
    Floats(usize),
    /// Packed text whose word count is carried by the previous field.
    VarText,
}

impl FieldKind {
    pub fn byte_width(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::VarText => 8,
            Self::Text(n) | Self::Ints(n) | Self::Floats(n) => n * 4,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Floats(_))
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Text(_) | Self::VarText)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_length(&self) -> bool {
        self.name.ends_with("_length")
    }
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Words of fixed-width text slots (units, data source, projection units).
pub const TEXT_WORDS: usize = 3;

/// Entries in the range table.
pub const RANGE_SLOTS: usize = 20;

pub const BASE_FIELDS: [FieldSpec; 23] = [
    field("info_fsize", FieldKind::Int),
    field("grid_type", FieldKind::Int),
    field("info_size", FieldKind::Int),
    field("info_gsize", FieldKind::Int),
    field("stime", FieldKind::Int),
    field("etime", FieldKind::Int),
    field("data_units", FieldKind::Text(TEXT_WORDS)),
    field("data_type", FieldKind::Int),
    field("lower_left_x", FieldKind::Int),
    field("lower_left_y", FieldKind::Int),
    field("cols", FieldKind::Int),
    field("rows", FieldKind::Int),
    field("cell_size", FieldKind::Float),
    field("compression_method", FieldKind::Int),
    field("compression_size", FieldKind::Int),
    field("compression_factor", FieldKind::Float),
    field("compression_base", FieldKind::Float),
    field("max_val", FieldKind::Float),
    field("min_val", FieldKind::Float),
    field("mean_val", FieldKind::Float),
    field("range_length", FieldKind::Int),
    field("range_vals", FieldKind::Floats(RANGE_SLOTS)),
    field("range_counts", FieldKind::Ints(RANGE_SLOTS)),
];

pub const HRAP_FIELDS: [FieldSpec; 1] = [field("data_source", FieldKind::Text(TEXT_WORDS))];

pub const ALBERS_FIELDS: [FieldSpec; 10] = [
    field("proj_datum", FieldKind::Int),
    field("proj_units", FieldKind::Text(TEXT_WORDS)),
    field("first_parallel", FieldKind::Float),
    field("sec_parallel", FieldKind::Float),
    field("central_meridian", FieldKind::Float),
    field("lat_origin", FieldKind::Float),
    field("false_easting", FieldKind::Float),
    field("false_northing", FieldKind::Float),
    field("xcoord_cell0", FieldKind::Float),
    field("ycoord_cell0", FieldKind::Float),
];

pub const SPECIFIED_FIELDS: [FieldSpec; 14] = [
    field("version", FieldKind::Int),
    field("crs_name_length", FieldKind::Int),
    field("crs_name", FieldKind::VarText),
    field("crs_type", FieldKind::Int),
    field("crs_def_length", FieldKind::Int),
    field("crs_def", FieldKind::VarText),
    field("xcoord_cell0", FieldKind::Float),
    field("ycoord_cell0", FieldKind::Float),
    field("nodata", FieldKind::Float),
    field("tzid_length", FieldKind::Int),
    field("tzid", FieldKind::VarText),
    field("tzoffset", FieldKind::Int),
    field("is_interval", FieldKind::Int),
    field("time_stamped", FieldKind::Int),
];

/// Extension table appended to the base table for `family`.
pub fn extension_fields(family: GridFamily) -> &'static [FieldSpec] {
    match family {
        GridFamily::Undefined => &[],
        GridFamily::Hrap => &HRAP_FIELDS,
        GridFamily::Albers => &ALBERS_FIELDS,
        GridFamily::Specified => &SPECIFIED_FIELDS,
    }
}

/// Full field order of a family's header.
pub fn fields_for(family: GridFamily) -> impl Iterator<Item = &'static FieldSpec> {
    BASE_FIELDS.iter().chain(extension_fields(family).iter())
}

/// Words taken by the fixed part of a family's header.
pub fn fixed_word_count(family: GridFamily) -> usize {
    fields_for(family)
        .map(|f| match f.kind {
            FieldKind::VarText => 0,
            kind => kind.byte_width() / 4,
        })
        .sum()
}

/// Value of the `info_size` header slot for a family.
pub fn info_size(family: GridFamily) -> i32 {
    match family {
        GridFamily::Undefined => 124,
        GridFamily::Hrap => 128,
        GridFamily::Albers => 164,
        GridFamily::Specified => 160,
    }
}

/// Value of the `info_gsize` header slot; the same for every family.
pub const INFO_GSIZE: i32 = 124;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_word_counts() {
        assert_eq!(fixed_word_count(GridFamily::Undefined), 63);
        assert_eq!(fixed_word_count(GridFamily::Hrap), 66);
        assert_eq!(fixed_word_count(GridFamily::Albers), 75);
        assert_eq!(fixed_word_count(GridFamily::Specified), 74);
    }

    #[test]
    fn test_variable_fields_follow_their_length() {
        let fields: Vec<_> = fields_for(GridFamily::Specified).collect();
        for (i, f) in fields.iter().enumerate() {
            if f.kind == FieldKind::VarText {
                assert!(fields[i - 1].is_length());
                assert_eq!(fields[i - 1].name, format!("{}_length", f.name));
            }
        }
    }

    #[test]
    fn test_byte_widths() {
        assert_eq!(FieldKind::Int.byte_width(), 4);
        assert_eq!(FieldKind::VarText.byte_width(), 8);
        assert_eq!(FieldKind::Text(3).byte_width(), 12);
        assert_eq!(FieldKind::Floats(20).byte_width(), 80);
    }
}
