//! Common types shared by the DSS grid metadata crates.
//!
//! Holds the closed enumerations of the grid record format, the error
//! taxonomy used across the workspace, DSS pathname parsing, and the
//! minute-granularity DSS timestamp used by legacy headers.

pub mod enums;
pub mod error;
pub mod pathname;
pub mod time;

pub use enums::{CompressionMethod, DataType, Datum, GridFamily, GridType};
pub use error::{ErrorKind, GridError, GridResult};
pub use pathname::DssPathname;
pub use time::DssTime;

/// Value DSS uses for "no data" in float slots (`-FLT_MAX`).
pub const UNDEFINED_FLOAT: f32 = -3.402_823_5e38;
