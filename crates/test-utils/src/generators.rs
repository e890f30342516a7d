//! Test data generators for synthetic grid cells.
//!
//! All generators return row-major `Vec<f32>` buffers, row 0 first, the
//! layout DSS grid records use for their cell payload.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read/written correctly
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(cols: usize, rows: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid with sparse but deterministic precipitation depths in mm.
///
/// Roughly a quarter of the cells are wet, with depths from 0 to 50 mm.
pub fn create_precipitation_grid(cols: usize, rows: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let hash = simple_hash(col as u32, row as u32, seed);
            let precip = if hash % 4 == 0 {
                (hash % 5000) as f32 / 100.0
            } else {
                0.0
            };
            data.push(precip);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(cols: usize, rows: usize, value: f32) -> Vec<f32> {
    vec![value; cols * rows]
}

/// Creates a grid with `nodata` at the given `(col, row)` positions and
/// `col * 1000 + row` elsewhere. Out-of-range positions are ignored.
pub fn create_grid_with_nodata(
    cols: usize,
    rows: usize,
    nodata: f32,
    positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = create_test_grid(cols, rows);
    for &(col, row) in positions {
        if col < cols && row < rows {
            data[row * cols + col] = nodata;
        }
    }
    data
}

/// Creates a grid of uniform random values in `[low, high)` from a seeded RNG.
pub fn create_random_grid(cols: usize, rows: usize, low: f32, high: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..cols * rows).map(|_| rng.gen_range(low..high)).collect()
}

/// Random printable ASCII text of up to `max_len` characters.
///
/// Legacy headers store text as NUL-padded words, so NUL never appears.
pub fn random_text<R: Rng>(rng: &mut R, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen_range(b' '..=b'~') as char).collect()
}

/// Random finite `f32` in `(-magnitude, magnitude)`, with signed zeros and
/// the extreme finite values mixed in.
pub fn random_f32<R: Rng>(rng: &mut R, magnitude: f32) -> f32 {
    match rng.gen_range(0..10) {
        0 => -0.0,
        1 => f32::MAX,
        2 => f32::MIN,
        3 => f32::MIN_POSITIVE,
        _ => rng.gen_range(-magnitude..magnitude),
    }
}

/// Random range table of `len` entries: non-decreasing thresholds starting
/// at `floor`, paired with non-increasing counts bounded by `total`.
pub fn random_range_table<R: Rng>(
    rng: &mut R,
    len: usize,
    floor: f32,
    total: i32,
) -> (Vec<f32>, Vec<i32>) {
    let mut vals = Vec::with_capacity(len);
    let mut counts = Vec::with_capacity(len);
    let mut threshold = floor;
    let mut count = total;
    for _ in 0..len {
        vals.push(threshold);
        counts.push(count);
        threshold += rng.gen_range(0.0..25.0f32);
        count = rng.gen_range(0..=count.max(0));
    }
    (vals, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid[10], 1.0);
        assert_eq!(grid[11], 1001.0);
    }

    #[test]
    fn test_create_precipitation_grid_deterministic() {
        let a = create_precipitation_grid(20, 20, 42);
        let b = create_precipitation_grid(20, 20, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (0.0..50.0).contains(&v)));
        assert_ne!(a, create_precipitation_grid(20, 20, 43));
    }

    #[test]
    fn test_create_grid_with_nodata() {
        let grid = create_grid_with_nodata(10, 10, -9999.0, &[(5, 5), (0, 0), (20, 1)]);
        assert_eq!(grid[0], -9999.0);
        assert_eq!(grid[55], -9999.0); // row 5 * 10 + col 5
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid.iter().filter(|&&v| v == -9999.0).count(), 2);
    }

    #[test]
    fn test_create_random_grid() {
        let grid = create_random_grid(8, 4, -10.0, 10.0, 7);
        assert_eq!(grid.len(), 32);
        assert!(grid.iter().all(|&v| (-10.0..10.0).contains(&v)));
        assert_eq!(grid, create_random_grid(8, 4, -10.0, 10.0, 7));
    }

    #[test]
    fn test_create_constant_grid() {
        assert_eq!(create_constant_grid(3, 2, 1.5), vec![1.5; 6]);
    }

    #[test]
    fn test_random_text_is_printable() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let text = random_text(&mut rng, 12);
            assert!(text.len() <= 12);
            assert!(text.bytes().all(|b| (b' '..=b'~').contains(&b)));
        }
    }

    #[test]
    fn test_random_f32_is_finite() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!((0..200).map(|_| random_f32(&mut rng, 1.0e6)).all(f32::is_finite));
    }

    #[test]
    fn test_random_range_table_is_ordered() {
        let mut rng = StdRng::seed_from_u64(9);
        let (vals, counts) = random_range_table(&mut rng, 20, -5.0, 400);
        assert_eq!(vals.len(), 20);
        assert_eq!(counts[0], 400);
        assert!(vals.windows(2).all(|w| w[0] <= w[1]));
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }
}
