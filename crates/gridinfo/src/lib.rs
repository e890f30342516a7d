//! Grid record metadata for DSS.
//!
//! A DSS grid record is a 2-D array of `f32` cells plus metadata describing
//! its grid family, units, statistics, compression and georeferencing. Two
//! metadata layouts exist: the legacy flat word header and the modern
//! structured model. This crate holds both and translates between them.
//!
//! # Architecture
//!
//! ```text
//! keyword fields ──► GridInfo::build ──► GridInfo (modern)
//!                                           │
//!            cells ──► stats ───────────────┤
//!        transform ──► georeference ────────┤
//!                      compression ─────────┤
//!                                           ▼
//!                                    translate::to_legacy
//!                                           │
//!                                           ▼
//!                               LegacyGridInfo ──► legacy::encode ──► words
//!                                                                      │
//!                                                                      ▼
//!                                                                  GridStore
//! ```
//!
//! Reading walks the same path backwards through `legacy::decode` and
//! `translate::to_modern`.
//!
//! # Example
//!
//! ```ignore
//! use gridinfo::{GridInfo, GridInfoConfig, MemoryGridStore, WriteRequest, write_grid};
//!
//! let info = GridInfo::build(GridType::AlbersTime, &fields)?;
//! let mut store = MemoryGridStore::new();
//! let request = WriteRequest::new("/a/b/precip/01JAN2020:0000/01JAN2020:0100/f/", info, &cells);
//! let prepared = write_grid(&mut store, request, &GridInfoConfig::from_env())?;
//! for warning in &prepared.warnings {
//!     eprintln!("{}", warning);
//! }
//! ```

pub mod compression;
pub mod config;
pub mod legacy;
pub mod model;
pub mod policy;
pub mod record;
pub mod stats;
pub mod store;
pub mod translate;
pub mod warning;

// Re-export commonly used types at crate root
pub use compression::{select_compression, CompressionChoice};
pub use config::GridInfoConfig;
pub use legacy::{decode, encode, LegacyGridInfo};
pub use model::{
    build_metadata, AlbersInfo, GridBase, GridInfo, HrapInfo, SpecifiedInfo, UndefinedInfo,
    UpdateOutcome,
};
pub use record::{prepare_write, read_grid, write_grid, GridRecord, PreparedRecord, WriteRequest};
pub use stats::{compute_stats, compute_stats_masked, GridStats, RangeSpec, RangeTable};
pub use store::{GridStore, MemoryGridStore};
pub use translate::{to_legacy, to_modern, LegacyConversion};
pub use warning::{ConsistencyWarning, TimePart};

pub use dss_common::{
    CompressionMethod, DataType, Datum, DssPathname, DssTime, GridError, GridFamily, GridResult,
    GridType, UNDEFINED_FLOAT,
};
pub use grid_geo::GeoTransform;
