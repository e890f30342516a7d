//! Grid record read/write pipeline.
//!
//! Writing runs: cell statistics, georeferencing, compression selection,
//! translation to the legacy header, and word encoding. Reading reverses
//! the last two steps and fetches the cells.

use crate::compression::{precip_base, select_compression, CompressionChoice};
use crate::config::GridInfoConfig;
use crate::legacy::{self, LegacyGridInfo};
use crate::model::GridInfo;
use crate::stats::{compute_stats, RangeSpec};
use crate::store::GridStore;
use crate::translate::{to_legacy, to_modern};
use crate::warning::ConsistencyWarning;
use chrono::Duration;
use dss_common::{CompressionMethod, DssPathname, DssTime, GridError, GridFamily, GridResult};
use grid_geo::GeoTransform;
use tracing::{debug, info, instrument};

/// Everything needed to write one grid record.
#[derive(Debug, Clone)]
pub struct WriteRequest<'a> {
    pub pathname: &'a str,
    pub info: GridInfo,
    /// Row-major cells, `rows * cols` long.
    pub cells: &'a [f32],
    pub transform: Option<GeoTransform>,
    pub range: RangeSpec,
}

impl<'a> WriteRequest<'a> {
    pub fn new(pathname: &'a str, info: GridInfo, cells: &'a [f32]) -> Self {
        Self {
            pathname,
            info,
            cells,
            transform: None,
            range: RangeSpec::Default,
        }
    }

    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.range = range;
        self
    }
}

/// A record ready for the store.
#[derive(Debug, Clone)]
pub struct PreparedRecord {
    pub pathname: String,
    /// Metadata after statistics, georeferencing and compression were filled in.
    pub info: GridInfo,
    pub legacy: LegacyGridInfo,
    pub words: Vec<i32>,
    pub warnings: Vec<ConsistencyWarning>,
}

/// A record as read back from the store.
#[derive(Debug, Clone)]
pub struct GridRecord {
    pub pathname: String,
    pub info: GridInfo,
    pub cells: Vec<f32>,
}

/// Span between the pathname's start and end times, when both parse.
fn record_span(path: &DssPathname) -> Option<Duration> {
    let start = DssTime::parse(path.start_part()).ok()?;
    let end = DssTime::parse(path.end_part()).ok()?;
    Some(start.span_to(&end))
}

/// Run the write pipeline without touching a store.
#[instrument(skip_all, fields(pathname = %request.pathname))]
pub fn prepare_write(request: WriteRequest<'_>, config: &GridInfoConfig) -> GridResult<PreparedRecord> {
    let WriteRequest {
        pathname,
        mut info,
        cells,
        transform,
        range,
    } = request;
    let path = DssPathname::parse(pathname)?;

    let expected = info.base().cell_count();
    if cells.len() != expected {
        return Err(GridError::invalid_field(
            "cells",
            format!(
                "{} cells for shape {:?} (expected {})",
                cells.len(),
                info.base().shape,
                expected
            ),
        ));
    }

    let mut warnings = Vec::new();

    // Statistics
    let range = match range {
        RangeSpec::Default if !config.compute_range_table => RangeSpec::Skip,
        other => other,
    };
    let nodata = info.nodata() as f32;
    let stats = compute_stats(cells, Some(nodata), &range)?;
    info.apply_stats(&stats);

    // Georeferencing; Albers grids always need a source for lower_left_cell
    if info.family() == GridFamily::Albers || transform.is_some() || info.base().min_xy.is_some() {
        warnings.extend(info.update_georeference(transform.as_ref(), config.cell_size_tolerance)?);
    }

    // Compression
    let base = info.base();
    let choice = if base.compression_unpinned() {
        Some(select_compression(
            base.data_type,
            info.version(),
            record_span(&path),
            base.min_val,
            base.max_val,
            config,
        ))
    } else if base.compression_method == Some(CompressionMethod::Precip2Byte)
        && base.compression_factor == 0.0
    {
        let factor = config.precip_scale_factor;
        Some(CompressionChoice {
            method: CompressionMethod::Precip2Byte,
            base: precip_base(base.min_val, base.max_val, factor),
            factor,
        })
    } else {
        None
    };
    if let Some(choice) = choice {
        debug!(method = %choice.method, base = choice.base, factor = choice.factor, "Selected compression");
        info.apply_compression(choice);
    }

    // Legacy header
    let conversion = to_legacy(&info, pathname)?;
    warnings.extend(conversion.warnings);
    let words = legacy::encode(&conversion.legacy)?;

    Ok(PreparedRecord {
        pathname: path.to_string(),
        info,
        legacy: conversion.legacy,
        words,
        warnings,
    })
}

/// Prepare a record and hand it to `store`.
pub fn write_grid<S: GridStore>(
    store: &mut S,
    request: WriteRequest<'_>,
    config: &GridInfoConfig,
) -> GridResult<PreparedRecord> {
    let cells = request.cells;
    let prepared = prepare_write(request, config)?;
    store.write_grid_record(&prepared.pathname, &prepared.words, cells)?;
    info!(
        pathname = %prepared.pathname,
        grid_type = %prepared.info.grid_type(),
        warnings = prepared.warnings.len(),
        "Wrote grid record"
    );
    Ok(prepared)
}

/// Read a record back as modern metadata plus its cells.
#[instrument(skip(store))]
pub fn read_grid<S: GridStore>(store: &S, pathname: &str) -> GridResult<GridRecord> {
    let (grid_type_code, words) = store.read_grid_words(pathname)?;
    let legacy = legacy::decode(&words, grid_type_code)?;
    let info = to_modern(&legacy)?;
    let cells = store.read_cell_buffer(pathname, info.base().shape)?;
    debug!(grid_type = %info.grid_type(), cells = cells.len(), "Read grid record");
    Ok(GridRecord {
        pathname: pathname.to_string(),
        info,
        cells,
    })
}
