//! Lower-left cell indices and cell-zero coordinates.

use crate::transform::GeoTransform;

/// Integer (x, y) index of a grid cell relative to the family's origin cell.
pub type CellIndex = (i32, i32);

/// Southern edge of a north-up grid: `ymax + rows * cell_size_y`.
fn grid_ymin(transform: &GeoTransform, rows: usize) -> f64 {
    transform.f + rows as f64 * transform.cell_size_y()
}

/// Lower-left cell index of a grid from its affine transform.
///
/// `(x_cell0, y_cell0)` is the world coordinate of the south-west corner of
/// cell (0, 0). With asymmetric cell sizes each axis keeps its own size;
/// reporting the mismatch is left to the caller.
pub fn lower_left_cell_from_transform(
    transform: &GeoTransform,
    shape: (usize, usize),
    x_cell0: f64,
    y_cell0: f64,
) -> CellIndex {
    let (rows, _cols) = shape;
    let xmin = transform.c;
    let ymin = grid_ymin(transform, rows);
    let x = ((xmin - x_cell0) / transform.cell_size_x().abs()).floor();
    let y = ((ymin - y_cell0) / transform.cell_size_y().abs()).floor();
    (x as i32, y as i32)
}

/// Lower-left cell index of a grid from its minimum (x, y) coordinate.
pub fn lower_left_cell_from_min_xy(
    min_xy: (f64, f64),
    cell_size: f64,
    x_cell0: f64,
    y_cell0: f64,
) -> CellIndex {
    let (xmin, ymin) = min_xy;
    let x = ((xmin - x_cell0) / cell_size).floor();
    let y = ((ymin - y_cell0) / cell_size).floor();
    (x as i32, y as i32)
}

/// Specified grids use their own bottom-left cell as cell (0, 0).
pub fn lower_left_cell_of_specified_grid() -> CellIndex {
    (0, 0)
}

/// Cell (0, 0) of a specified grid is its bottom-left cell, so its
/// coordinates are the grid's `(xmin, ymin)`.
pub fn coords_of_cell0_of_specified_grid(transform: &GeoTransform, shape: (usize, usize)) -> (f64, f64) {
    let (rows, _cols) = shape;
    (transform.c, grid_ymin(transform, rows))
}

/// Cell (0, 0) of an SHG/Albers grid sits at the projection origin.
pub fn coords_of_cell0_of_shg_grid() -> (f64, f64) {
    (0.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_left_from_min_xy() {
        assert_eq!(lower_left_cell_from_min_xy((5000.0, 3000.0), 2000.0, 0.0, 0.0), (2, 1));
    }

    #[test]
    fn test_lower_left_from_min_xy_negative_floors_down() {
        assert_eq!(lower_left_cell_from_min_xy((-5000.0, -1.0), 2000.0, 0.0, 0.0), (-3, -1));
    }

    #[test]
    fn test_lower_left_from_transform() {
        // xmin = 5000, ymax = 23000, 10 rows of 2000 -> ymin = 3000
        let t = GeoTransform::from_origin(5000.0, 23000.0, 2000.0, 2000.0);
        assert_eq!(lower_left_cell_from_transform(&t, (10, 10), 0.0, 0.0), (2, 1));
    }

    #[test]
    fn test_lower_left_relative_to_cell0() {
        let t = GeoTransform::from_origin(5000.0, 23000.0, 2000.0, 2000.0);
        assert_eq!(lower_left_cell_from_transform(&t, (10, 10), 1000.0, 1000.0), (2, 1));
        assert_eq!(lower_left_cell_from_transform(&t, (10, 10), 4000.0, 4000.0), (0, -1));
    }

    #[test]
    fn test_asymmetric_cells_use_each_axis() {
        let t = GeoTransform::new(100.0, 0.0, 1000.0, 0.0, -50.0, 5000.0);
        // ymin = 5000 - 10*50 = 4500
        assert_eq!(lower_left_cell_from_transform(&t, (10, 10), 0.0, 0.0), (10, 90));
    }

    #[test]
    fn test_specified_cell0() {
        let t = GeoTransform::new(100.0, 0.0, 1000.0, 0.0, -100.0, 5000.0);
        assert_eq!(coords_of_cell0_of_specified_grid(&t, (10, 10)), (1000.0, 4000.0));
        assert_eq!(lower_left_cell_of_specified_grid(), (0, 0));
    }

    #[test]
    fn test_shg_cell0() {
        assert_eq!(coords_of_cell0_of_shg_grid(), (0.0, 0.0));
    }
}
