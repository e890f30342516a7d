//! Affine pixel-to-world transforms.
//!
//! Coefficients follow the usual raster ordering `(a, b, c, d, e, f)`:
//!
//! ```text
//! x = a * col + b * row + c
//! y = d * col + e * row + f
//! ```
//!
//! For a north-up grid `a` is the cell width, `e` is the negated cell
//! height, and `(c, f)` is the north-west corner.

use serde::{Deserialize, Serialize};

/// Affine transform from (col, row) pixel space to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

/// Which point of a pixel [`GeoTransform::xy`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOffset {
    #[default]
    Center,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl PixelOffset {
    fn fractions(self) -> (f64, f64) {
        match self {
            Self::Center => (0.5, 0.5),
            Self::UpperLeft => (0.0, 0.0),
            Self::UpperRight => (1.0, 0.0),
            Self::LowerLeft => (0.0, 1.0),
            Self::LowerRight => (1.0, 1.0),
        }
    }
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform from the upper-left corner and pixel sizes.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self::new(xsize, 0.0, west, 0.0, -ysize, north)
    }

    /// North-up transform from bounds and array dimensions.
    pub fn from_bounds(
        west: f64,
        south: f64,
        east: f64,
        north: f64,
        width: usize,
        height: usize,
    ) -> Self {
        Self::new(
            (east - west) / width as f64,
            0.0,
            west,
            0.0,
            (south - north) / height as f64,
            north,
        )
    }

    /// Pixel width (positive for west-to-east grids).
    pub fn cell_size_x(&self) -> f64 {
        self.a
    }

    /// Pixel height (negative for north-up grids).
    pub fn cell_size_y(&self) -> f64 {
        self.e
    }

    /// Whether |cell_size_x| and |cell_size_y| agree within `tolerance`.
    pub fn is_square(&self, tolerance: f64) -> bool {
        (self.a.abs() - self.e.abs()).abs() <= tolerance
    }

    /// Map fractional pixel coordinates to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// World coordinates of a point of pixel (`row`, `col`).
    pub fn xy(&self, row: usize, col: usize, offset: PixelOffset) -> (f64, f64) {
        let (coff, roff) = offset.fractions();
        self.apply(col as f64 + coff, row as f64 + roff)
    }

    /// (row, col) of the pixel containing world point (`x`, `y`).
    ///
    /// Returns `None` for a degenerate (non-invertible) transform.
    pub fn rowcol(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 {
            return None;
        }
        let dx = x - self.c;
        let dy = y - self.f;
        let col = (self.e * dx - self.b * dy) / det;
        let row = (-self.d * dx + self.a * dy) / det;
        Some((row.floor() as i64, col.floor() as i64))
    }

    /// `(west, south, east, north)` of an array of `rows` x `cols` pixels.
    pub fn array_bounds(&self, rows: usize, cols: usize) -> (f64, f64, f64, f64) {
        let (west, north) = (self.c, self.f);
        let (east, south) = self.apply(cols as f64, rows as f64);
        (west, south, east, north)
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(c: [f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}

impl From<(f64, f64, f64, f64, f64, f64)> for GeoTransform {
    fn from(c: (f64, f64, f64, f64, f64, f64)) -> Self {
        Self::new(c.0, c.1, c.2, c.3, c.4, c.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_origin() {
        let t = GeoTransform::from_origin(1000.0, 5000.0, 100.0, 100.0);
        assert_eq!(t.to_array(), [100.0, 0.0, 1000.0, 0.0, -100.0, 5000.0]);
        assert!(t.is_square(1e-9));
    }

    #[test]
    fn test_from_bounds_matches_origin() {
        let t = GeoTransform::from_bounds(1000.0, 4000.0, 2000.0, 5000.0, 10, 10);
        assert_eq!(t, GeoTransform::from_origin(1000.0, 5000.0, 100.0, 100.0));
    }

    #[test]
    fn test_array_bounds() {
        let t = GeoTransform::from_origin(1000.0, 5000.0, 100.0, 100.0);
        assert_eq!(t.array_bounds(10, 20), (1000.0, 4000.0, 3000.0, 5000.0));
    }

    #[test]
    fn test_xy_offsets() {
        let t = GeoTransform::from_origin(0.0, 100.0, 10.0, 10.0);
        assert_eq!(t.xy(0, 0, PixelOffset::Center), (5.0, 95.0));
        assert_eq!(t.xy(0, 0, PixelOffset::UpperLeft), (0.0, 100.0));
        assert_eq!(t.xy(1, 2, PixelOffset::LowerRight), (30.0, 80.0));
    }

    #[test]
    fn test_rowcol() {
        let t = GeoTransform::from_origin(0.0, 100.0, 10.0, 10.0);
        assert_eq!(t.rowcol(5.0, 95.0), Some((0, 0)));
        assert_eq!(t.rowcol(25.0, 71.0), Some((2, 2)));
        assert_eq!(t.rowcol(-1.0, 101.0), Some((-1, -1)));

        let degenerate = GeoTransform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(degenerate.rowcol(1.0, 1.0), None);
    }

    #[test]
    fn test_tuple_conversion() {
        let t: GeoTransform = (100.0, 0.0, 1000.0, 0.0, -100.0, 5000.0).into();
        assert_eq!(t.cell_size_x(), 100.0);
        assert_eq!(t.cell_size_y(), -100.0);
    }
}
