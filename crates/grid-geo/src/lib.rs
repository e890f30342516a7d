//! Georeferencing math for DSS grid records.
//!
//! A grid record ties its array to the world through two values whose
//! convention depends on the grid family:
//!
//! | Family     | `lower_left_cell`                          | `coords_cell0`            |
//! |------------|--------------------------------------------|---------------------------|
//! | Albers/SHG | derived from min x/y or a transform        | fixed `(0, 0)`            |
//! | Specified  | fixed `(0, 0)`                             | south-west corner of grid |
//! | HRAP/other | `(0, 0)`                                   | `(0, 0)`                  |
//!
//! Everything here is a pure function of its inputs.

pub mod cell;
pub mod transform;

pub use cell::{
    coords_of_cell0_of_shg_grid, coords_of_cell0_of_specified_grid, lower_left_cell_from_min_xy,
    lower_left_cell_from_transform, lower_left_cell_of_specified_grid, CellIndex,
};
pub use transform::{GeoTransform, PixelOffset};
