//! Closed enumerations of the DSS grid record format.
//!
//! Every enum carries the integer code stored in legacy headers and parses
//! from either that code or a case-insensitive name. Names are matched after
//! dropping `-`, `_` and spaces, so `"per-cum"`, `"PER_CUM"` and `"percum"`
//! are the same value.

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ============================================================================
// Grid type
// ============================================================================

/// Grid family, ignoring whether the record is time-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridFamily {
    Undefined,
    Hrap,
    Albers,
    Specified,
}

impl GridFamily {
    /// Code written into legacy headers (always the time-indexed code).
    pub fn legacy_code(self) -> i32 {
        match self {
            Self::Undefined => 400,
            Self::Hrap => 410,
            Self::Albers => 420,
            Self::Specified => 430,
        }
    }

    /// Family of a grid type code; accepts both the plain and `_time` codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            400 | 401 => Some(Self::Undefined),
            410 | 411 => Some(Self::Hrap),
            420 | 421 => Some(Self::Albers),
            430 | 431 => Some(Self::Specified),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Hrap => "hrap",
            Self::Albers => "albers",
            Self::Specified => "specified",
        }
    }
}

impl fmt::Display for GridFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid type of a record: a family plus a time-indexed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridType {
    Undefined,
    UndefinedTime,
    Hrap,
    HrapTime,
    Albers,
    AlbersTime,
    Specified,
    SpecifiedTime,
}

impl GridType {
    pub fn new(family: GridFamily, has_time: bool) -> Self {
        match (family, has_time) {
            (GridFamily::Undefined, false) => Self::Undefined,
            (GridFamily::Undefined, true) => Self::UndefinedTime,
            (GridFamily::Hrap, false) => Self::Hrap,
            (GridFamily::Hrap, true) => Self::HrapTime,
            (GridFamily::Albers, false) => Self::Albers,
            (GridFamily::Albers, true) => Self::AlbersTime,
            (GridFamily::Specified, false) => Self::Specified,
            (GridFamily::Specified, true) => Self::SpecifiedTime,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::UndefinedTime => 400,
            Self::Undefined => 401,
            Self::HrapTime => 410,
            Self::Hrap => 411,
            Self::AlbersTime => 420,
            Self::Albers => 421,
            Self::SpecifiedTime => 430,
            Self::Specified => 431,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let family = GridFamily::from_code(code)?;
        Some(Self::new(family, code % 10 == 0))
    }

    pub fn family(self) -> GridFamily {
        match self {
            Self::Undefined | Self::UndefinedTime => GridFamily::Undefined,
            Self::Hrap | Self::HrapTime => GridFamily::Hrap,
            Self::Albers | Self::AlbersTime => GridFamily::Albers,
            Self::Specified | Self::SpecifiedTime => GridFamily::Specified,
        }
    }

    /// Whether the record is temporally indexed.
    pub fn has_time(self) -> bool {
        matches!(
            self,
            Self::UndefinedTime | Self::HrapTime | Self::AlbersTime | Self::SpecifiedTime
        )
    }

    /// The legacy format does not distinguish `x` from `x_time`; both map to `x_time`.
    pub fn legacy_equivalent(self) -> Self {
        Self::new(self.family(), true)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::UndefinedTime => "undefined_time",
            Self::Hrap => "hrap",
            Self::HrapTime => "hrap_time",
            Self::Albers => "albers",
            Self::AlbersTime => "albers_time",
            Self::Specified => "specified",
            Self::SpecifiedTime => "specified_time",
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridType {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.trim().parse::<i32>() {
            return Self::from_code(code).ok_or_else(|| GridError::UnknownGridType(s.to_string()));
        }
        let grid_type = match normalize(s).as_str() {
            "undefined" => Self::Undefined,
            "undefinedtime" => Self::UndefinedTime,
            "hrap" => Self::Hrap,
            "hraptime" => Self::HrapTime,
            "albers" | "alber" | "shg" => Self::Albers,
            "alberstime" | "albertime" | "shgtime" => Self::AlbersTime,
            "specified" | "spec" => Self::Specified,
            "specifiedtime" | "spectime" => Self::SpecifiedTime,
            _ => return Err(GridError::UnknownGridType(s.to_string())),
        };
        Ok(grid_type)
    }
}

// ============================================================================
// Data type
// ============================================================================

/// Kind of quantity stored in the grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    PerAver,
    PerCum,
    InstVal,
    InstCum,
    Freq,
    Invalid,
}

impl DataType {
    pub fn code(self) -> i32 {
        match self {
            Self::PerAver => 0,
            Self::PerCum => 1,
            Self::InstVal => 2,
            Self::InstCum => 3,
            Self::Freq => 4,
            Self::Invalid => -9999,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::PerAver),
            1 => Some(Self::PerCum),
            2 => Some(Self::InstVal),
            3 => Some(Self::InstCum),
            4 => Some(Self::Freq),
            -9999 => Some(Self::Invalid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerAver => "per_aver",
            Self::PerCum => "per_cum",
            Self::InstVal => "inst_val",
            Self::InstCum => "inst_cum",
            Self::Freq => "freq",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::invalid_field("data_type", format!("unknown data type '{}'", s));
        if let Ok(code) = s.trim().parse::<i32>() {
            return Self::from_code(code).ok_or_else(invalid);
        }
        match normalize(s).as_str() {
            "peraver" => Ok(Self::PerAver),
            "percum" => Ok(Self::PerCum),
            "instval" => Ok(Self::InstVal),
            "instcum" => Ok(Self::InstCum),
            "freq" => Ok(Self::Freq),
            "invalid" => Ok(Self::Invalid),
            _ => Err(invalid()),
        }
    }
}

// ============================================================================
// Compression method
// ============================================================================

/// Compression applied by the store to the cell buffer.
///
/// Only the method code and its parameters live in the metadata; the store
/// produces the compressed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionMethod {
    Undefined,
    Uncompressed,
    #[default]
    Zlib,
    /// Legacy 2-byte precipitation scheme.
    Precip2Byte,
}

impl CompressionMethod {
    pub fn code(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Uncompressed => 1,
            Self::Zlib => 26,
            Self::Precip2Byte => 101001,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Undefined),
            1 => Some(Self::Uncompressed),
            26 => Some(Self::Zlib),
            101001 => Some(Self::Precip2Byte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Uncompressed => "uncompressed",
            Self::Zlib => "zlib",
            Self::Precip2Byte => "precip_2_byte",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            GridError::invalid_field(
                "compression_method",
                format!("unknown compression method '{}'", s),
            )
        };
        if let Ok(code) = s.trim().parse::<i32>() {
            return Self::from_code(code).ok_or_else(invalid);
        }
        match normalize(s).as_str() {
            "undefined" => Ok(Self::Undefined),
            "uncompressed" | "none" | "nocomp" | "nocompression" => Ok(Self::Uncompressed),
            "zlib" | "deflate" | "zlibdeflate" => Ok(Self::Zlib),
            "precip2byte" | "hec" => Ok(Self::Precip2Byte),
            _ => Err(invalid()),
        }
    }
}

// ============================================================================
// Projection datum
// ============================================================================

/// Horizontal datum of an Albers/SHG projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    Undefined,
    Nad27,
    #[default]
    Nad83,
}

impl Datum {
    pub fn code(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Nad27 => 1,
            Self::Nad83 => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Undefined),
            1 => Some(Self::Nad27),
            2 => Some(Self::Nad83),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Nad27 => "nad27",
            Self::Nad83 => "nad83",
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datum {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.trim().parse::<i32>() {
            return Self::from_code(code)
                .ok_or_else(|| GridError::invalid_field("proj_datum", format!("unknown datum code {}", code)));
        }
        let name = normalize(s);
        if name == "undefined" {
            Ok(Self::Undefined)
        } else if name.contains("83") {
            Ok(Self::Nad83)
        } else if name.contains("27") {
            Ok(Self::Nad27)
        } else {
            Err(GridError::invalid_field(
                "proj_datum",
                format!("unknown datum '{}'", s),
            ))
        }
    }
}
