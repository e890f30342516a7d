//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

use gridinfo::legacy::to_dict;
use gridinfo::{
    compute_stats, decode as decode_words, encode as encode_words, prepare_write, to_legacy,
    to_modern, GeoTransform, GridInfo, GridInfoConfig, RangeSpec, WriteRequest,
};

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_words(path: &Path) -> Result<Vec<i32>> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("{} is not an array of i32 words", path.display()))
}

fn read_cells(path: &Path) -> Result<Vec<f32>> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("{} is not an array of numbers", path.display()))
}

fn read_fields(path: &Path) -> Result<Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must hold a JSON object of metadata fields", path.display()),
    }
}

fn transform_from(coefficients: &[f64]) -> Result<GeoTransform> {
    match coefficients {
        [a, b, c, d, e, f] => Ok(GeoTransform::new(*a, *b, *c, *d, *e, *f)),
        other => bail!("transform needs 6 coefficients, got {}", other.len()),
    }
}

/// Legacy words to both metadata forms.
pub fn decode(words_path: &Path, grid_type: Option<i32>) -> Result<Value> {
    let words = read_words(words_path)?;
    let code = match grid_type.or_else(|| words.get(1).copied()) {
        Some(code) => code,
        None => bail!("no grid type given and the header is shorter than two words"),
    };
    let legacy = decode_words(&words, code)?;
    let modern = to_modern(&legacy)?;
    info!(words = words.len(), grid_type = %modern.grid_type(), "Decoded header");
    Ok(json!({
        "legacy": to_dict(&legacy),
        "modern": modern.to_json()?,
    }))
}

/// Keyword fields to legacy words.
pub fn encode(fields_path: &Path, pathname: &str) -> Result<Value> {
    let fields = read_fields(fields_path)?;
    let info = GridInfo::from_fields(&fields)?;
    let conversion = to_legacy(&info, pathname)?;
    let words = encode_words(&conversion.legacy)?;
    info!(words = words.len(), warnings = conversion.warnings.len(), "Encoded header");
    Ok(json!({
        "words": words,
        "warnings": conversion.warnings,
    }))
}

/// Statistics and range table of a cell buffer.
pub fn stats(cells_path: &Path, nodata: Option<f32>, thresholds: Option<Vec<f64>>) -> Result<Value> {
    let cells = read_cells(cells_path)?;
    let spec = thresholds.map(RangeSpec::from).unwrap_or_default();
    let stats = compute_stats(&cells, nodata, &spec)?;
    eprint!("{}", stats.range_table());
    Ok(serde_json::to_value(&stats)?)
}

/// Full write pipeline, without a store.
pub fn inspect(
    fields_path: &Path,
    cells_path: &Path,
    pathname: &str,
    transform: Option<Vec<f64>>,
    config: &GridInfoConfig,
) -> Result<Value> {
    let info = GridInfo::from_fields(&read_fields(fields_path)?)?;
    let cells = read_cells(cells_path)?;

    let mut request = WriteRequest::new(pathname, info, &cells);
    if let Some(coefficients) = transform {
        request = request.with_transform(transform_from(&coefficients)?);
    }
    let prepared = prepare_write(request, config)?;
    info!(
        pathname = %prepared.pathname,
        warnings = prepared.warnings.len(),
        "Prepared record"
    );
    Ok(json!({
        "pathname": prepared.pathname,
        "metadata": prepared.info.to_json()?,
        "legacy": to_dict(&prepared.legacy),
        "words": prepared.words,
        "warnings": prepared.warnings,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_needs_six_coefficients() {
        let t = transform_from(&[100.0, 0.0, 1000.0, 0.0, -100.0, 5000.0]).unwrap();
        assert_eq!(t, GeoTransform::new(100.0, 0.0, 1000.0, 0.0, -100.0, 5000.0));
        assert!(transform_from(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_missing_input_file() {
        let err = decode(Path::new("/nonexistent/words.json"), None).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
