//! Record store abstraction.
//!
//! The store owns record layout on disk and the compression of cell
//! payloads. The metadata layer only needs three operations from it.

use bytes::Bytes;
use dss_common::{GridError, GridResult};
use std::collections::HashMap;
use tracing::debug;

/// Persistence for grid records: a legacy header plus a cell buffer.
pub trait GridStore {
    /// Header words of the record at `pathname`, with the family
    /// discriminant the store keeps alongside them.
    fn read_grid_words(&self, pathname: &str) -> GridResult<(i32, Vec<i32>)>;

    /// Decompressed row-major cells of the record at `pathname`.
    fn read_cell_buffer(&self, pathname: &str, shape: (usize, usize)) -> GridResult<Vec<f32>>;

    /// Store a record, replacing any record at the same pathname.
    fn write_grid_record(&mut self, pathname: &str, words: &[i32], cells: &[f32]) -> GridResult<()>;
}

#[derive(Debug, Clone)]
struct StoredRecord {
    words: Vec<i32>,
    /// Cells as native-endian `f32` bytes.
    cells: Bytes,
}

/// In-process store keyed by upper-cased pathname.
#[derive(Debug, Default)]
pub struct MemoryGridStore {
    records: HashMap<String, StoredRecord>,
}

fn key(pathname: &str) -> String {
    pathname.trim().to_uppercase()
}

impl MemoryGridStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, pathname: &str) -> bool {
        self.records.contains_key(&key(pathname))
    }

    /// Stored pathnames, sorted.
    pub fn pathnames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        names
    }

    fn record(&self, pathname: &str) -> GridResult<&StoredRecord> {
        self.records
            .get(&key(pathname))
            .ok_or_else(|| GridError::RecordNotFound(pathname.to_string()))
    }
}

impl GridStore for MemoryGridStore {
    fn read_grid_words(&self, pathname: &str) -> GridResult<(i32, Vec<i32>)> {
        let record = self.record(pathname)?;
        let grid_type = *record.words.get(1).ok_or_else(|| {
            GridError::Store(format!("record '{}' has a truncated header", pathname))
        })?;
        Ok((grid_type, record.words.clone()))
    }

    fn read_cell_buffer(&self, pathname: &str, shape: (usize, usize)) -> GridResult<Vec<f32>> {
        let record = self.record(pathname)?;
        let expected = shape.0 * shape.1 * std::mem::size_of::<f32>();
        if record.cells.len() != expected {
            return Err(GridError::Store(format!(
                "record '{}' holds {} cell bytes, shape {:?} needs {}",
                pathname,
                record.cells.len(),
                shape,
                expected
            )));
        }
        Ok(record
            .cells
            .chunks_exact(std::mem::size_of::<f32>())
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect())
    }

    fn write_grid_record(&mut self, pathname: &str, words: &[i32], cells: &[f32]) -> GridResult<()> {
        let payload = Bytes::copy_from_slice(bytemuck::cast_slice(cells));
        debug!(
            pathname = %pathname,
            words = words.len(),
            bytes = payload.len(),
            "Storing grid record"
        );
        self.records.insert(
            key(pathname),
            StoredRecord {
                words: words.to_vec(),
                cells: payload,
            },
        );
        Ok(())
    }
}
