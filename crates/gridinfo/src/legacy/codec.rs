//! Word codec for legacy headers.
//!
//! Text is packed four bytes per word in little-endian order and zero
//! padded; an empty string still takes one zero word. Floats travel as
//! their IEEE-754 bit pattern.

use super::layout::{self, FieldKind, FieldSpec};
use super::{FieldValue, LegacyGridInfo};
use dss_common::{GridError, GridFamily, GridResult};
use serde_json::{Map, Value};
use tracing::debug;

// ============================================================================
// Text packing
// ============================================================================

/// Pack `s` into words, four bytes per word. Always yields at least one word.
pub fn pack_str(s: &str) -> Vec<i32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return vec![0];
    }
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf[..chunk.len()].copy_from_slice(chunk);
            i32::from_le_bytes(buf)
        })
        .collect()
}

/// Unpack words produced by [`pack_str`], dropping trailing NUL bytes.
pub fn unpack_str(words: &[i32]) -> String {
    let mut bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

// ============================================================================
// Encode / decode
// ============================================================================

fn field_value(info: &LegacyGridInfo, spec: &FieldSpec) -> GridResult<FieldValue> {
    info.get(spec.name).ok_or_else(|| {
        GridError::malformed(format!(
            "{} header has no '{}' field",
            info.family(),
            spec.name
        ))
    })
}

/// Flatten a header into its word sequence.
pub fn encode(info: &LegacyGridInfo) -> GridResult<Vec<i32>> {
    let mut out = Vec::with_capacity(info.word_count());
    let mut pending_len: Option<usize> = None;

    for spec in layout::fields_for(info.family()) {
        let value = field_value(info, spec)?;
        match spec.kind.byte_width() {
            w if w <= 4 => {
                let word = match value {
                    FieldValue::Int(v) => v,
                    FieldValue::Float(v) => v.to_bits() as i32,
                    other => {
                        return Err(GridError::malformed(format!(
                            "'{}' holds {:?}, expected a scalar",
                            spec.name, other
                        )))
                    }
                };
                if spec.is_length() {
                    pending_len = Some(word.max(0) as usize);
                }
                out.push(word);
            }
            8 => {
                let len = pending_len.take().ok_or_else(|| {
                    GridError::malformed(format!("'{}' has no preceding length field", spec.name))
                })?;
                let words = match value {
                    FieldValue::Words(w) => w,
                    other => {
                        return Err(GridError::malformed(format!(
                            "'{}' holds {:?}, expected words",
                            spec.name, other
                        )))
                    }
                };
                if words.len() != len {
                    return Err(GridError::malformed(format!(
                        "'{}' has {} words but its length field says {}",
                        spec.name,
                        words.len(),
                        len
                    )));
                }
                out.extend(words);
            }
            w => {
                let count = w / 4;
                let words: Vec<i32> = match value {
                    FieldValue::Words(w) => w,
                    FieldValue::Floats(f) => f.into_iter().map(|v| v.to_bits() as i32).collect(),
                    other => {
                        return Err(GridError::malformed(format!(
                            "'{}' holds {:?}, expected an array",
                            spec.name, other
                        )))
                    }
                };
                if words.len() != count {
                    return Err(GridError::malformed(format!(
                        "'{}' has {} words, layout needs {}",
                        spec.name,
                        words.len(),
                        count
                    )));
                }
                out.extend(words);
            }
        }
    }

    Ok(out)
}

struct Cursor<'a> {
    words: &'a [i32],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize, field: &str) -> GridResult<&'a [i32]> {
        let end = self.pos + n;
        if end > self.words.len() {
            return Err(GridError::malformed(format!(
                "ran out of words reading '{}': need {} at offset {}, have {}",
                field,
                n,
                self.pos,
                self.words.len()
            )));
        }
        let slice = &self.words[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Rebuild a header from its word sequence.
///
/// `grid_type_code` is the family discriminant reported by the store; the
/// header's own `grid_type` word must belong to the same family. Trailing
/// words past the layout are ignored.
pub fn decode(words: &[i32], grid_type_code: i32) -> GridResult<LegacyGridInfo> {
    let family = GridFamily::from_code(grid_type_code)
        .ok_or_else(|| GridError::UnknownGridType(grid_type_code.to_string()))?;
    let stored = *words
        .get(1)
        .ok_or_else(|| GridError::malformed(format!("{} words is too short for a header", words.len())))?;
    match GridFamily::from_code(stored) {
        Some(f) if f == family => {}
        Some(f) => return Err(GridError::type_mismatch(family.as_str(), f.as_str())),
        None => return Err(GridError::UnknownGridType(stored.to_string())),
    }

    let mut info = LegacyGridInfo::new(family);
    let mut cursor = Cursor { words, pos: 0 };
    let mut pending_len: Option<usize> = None;

    for spec in layout::fields_for(family) {
        let value = match spec.kind.byte_width() {
            w if w <= 4 => {
                let word = cursor.take(1, spec.name)?[0];
                if spec.is_length() {
                    if word < 0 {
                        return Err(GridError::malformed(format!(
                            "'{}' is negative ({})",
                            spec.name, word
                        )));
                    }
                    pending_len = Some(word as usize);
                }
                match spec.kind {
                    FieldKind::Float => FieldValue::Float(f32::from_bits(word as u32)),
                    _ => FieldValue::Int(word),
                }
            }
            8 => {
                let len = pending_len.take().ok_or_else(|| {
                    GridError::malformed(format!("'{}' has no preceding length field", spec.name))
                })?;
                FieldValue::Words(cursor.take(len, spec.name)?.to_vec())
            }
            w => {
                let slice = cursor.take(w / 4, spec.name)?;
                if spec.kind.is_float() {
                    FieldValue::Floats(slice.iter().map(|v| f32::from_bits(*v as u32)).collect())
                } else {
                    FieldValue::Words(slice.to_vec())
                }
            }
        };
        info.set(spec.name, value)?;
    }

    if cursor.pos < words.len() {
        debug!(
            trailing = words.len() - cursor.pos,
            family = %family,
            "Ignoring words past the end of the header"
        );
    }

    Ok(info)
}

// ============================================================================
// Dictionary view
// ============================================================================

fn float_value(v: f32) -> Value {
    Value::from(v as f64)
}

/// Dictionary view of a header: text slots become strings, arrays become
/// number lists and `*_length` fields are reported as stored.
pub fn to_dict(info: &LegacyGridInfo) -> Map<String, Value> {
    let mut map = Map::new();
    for spec in layout::fields_for(info.family()) {
        let Some(value) = info.get(spec.name) else {
            continue;
        };
        let json = match (spec.kind, value) {
            (kind, FieldValue::Words(w)) if kind.is_text() => Value::String(unpack_str(&w)),
            (_, FieldValue::Int(v)) => Value::from(v),
            (_, FieldValue::Float(v)) => float_value(v),
            (_, FieldValue::Words(w)) => Value::from(w),
            (_, FieldValue::Floats(f)) => Value::Array(f.into_iter().map(float_value).collect()),
        };
        map.insert(spec.name.to_string(), json);
    }
    map
}

fn dict_value(spec: &FieldSpec, value: &Value) -> GridResult<FieldValue> {
    let invalid = |expected: &str| {
        GridError::invalid_field(spec.name, format!("expected {}, got {}", expected, value))
    };
    let as_f32 = |v: &Value| -> GridResult<f32> {
        match v {
            Value::Null => Ok(f32::NAN),
            other => other.as_f64().map(|f| f as f32).ok_or_else(|| invalid("a number")),
        }
    };
    let as_i32 = |v: &Value| -> GridResult<i32> {
        v.as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| invalid("a 32-bit integer"))
    };

    match spec.kind {
        FieldKind::Int => Ok(FieldValue::Int(as_i32(value)?)),
        FieldKind::Float => Ok(FieldValue::Float(as_f32(value)?)),
        FieldKind::Text(n) => {
            let text = value.as_str().ok_or_else(|| invalid("a string"))?;
            let mut words = pack_str(text);
            if words.len() > n {
                return Err(GridError::invalid_field(
                    spec.name,
                    format!("'{}' does not fit {} words", text, n),
                ));
            }
            words.resize(n, 0);
            Ok(FieldValue::Words(words))
        }
        FieldKind::VarText => {
            let text = value.as_str().ok_or_else(|| invalid("a string"))?;
            Ok(FieldValue::Words(pack_str(text)))
        }
        FieldKind::Ints(_) => {
            let list = value.as_array().ok_or_else(|| invalid("a list"))?;
            Ok(FieldValue::Words(list.iter().map(as_i32).collect::<GridResult<_>>()?))
        }
        FieldKind::Floats(_) => {
            let list = value.as_array().ok_or_else(|| invalid("a list"))?;
            Ok(FieldValue::Floats(list.iter().map(as_f32).collect::<GridResult<_>>()?))
        }
    }
}

/// Build a header from its dictionary view.
///
/// The family comes from the `grid_type` entry. Missing fields keep their
/// zeroed defaults; size bookkeeping is recomputed.
pub fn from_dict(map: &Map<String, Value>) -> GridResult<LegacyGridInfo> {
    let code = map
        .get("grid_type")
        .and_then(Value::as_i64)
        .ok_or_else(|| GridError::missing_field("grid_type"))?;
    let family = i32::try_from(code)
        .ok()
        .and_then(GridFamily::from_code)
        .ok_or_else(|| GridError::UnknownGridType(code.to_string()))?;

    let mut info = LegacyGridInfo::new(family);
    for spec in layout::fields_for(family) {
        if let Some(value) = map.get(spec.name) {
            info.set(spec.name, dict_value(spec, value)?)?;
        }
    }
    for key in map.keys() {
        if !layout::fields_for(family).any(|f| f.name == key) {
            debug!(field = %key, family = %family, "Ignoring unknown legacy field");
        }
    }
    info.refresh_sizes();
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::LegacyExt;

    #[test]
    fn test_pack_str() {
        assert_eq!(pack_str(""), vec![0]);
        assert_eq!(pack_str("mm"), vec![i32::from_le_bytes([b'm', b'm', 0, 0])]);
        assert_eq!(pack_str("abcd").len(), 1);
        assert_eq!(pack_str("abcde").len(), 2);
    }

    #[test]
    fn test_unpack_str_strips_trailing_nul() {
        assert_eq!(unpack_str(&pack_str("MM")), "MM");
        assert_eq!(unpack_str(&[0, 0, 0]), "");
        assert_eq!(unpack_str(&pack_str("PROJCS[\"x\"]")), "PROJCS[\"x\"]");
    }

    #[test]
    fn test_encode_undefined_header_size() {
        let info = LegacyGridInfo::new(GridFamily::Undefined);
        let words = encode(&info).unwrap();
        assert_eq!(words.len(), 63);
        assert_eq!(words[0], 63 * 4);
        assert_eq!(words[1], 400);
        assert_eq!(words[2], 124);
        assert_eq!(words[3], 124);
    }

    #[test]
    fn test_floats_travel_as_bits() {
        let mut info = LegacyGridInfo::new(GridFamily::Undefined);
        info.cell_size = 2000.0;
        let words = encode(&info).unwrap();
        assert_eq!(words[14], 2000.0f32.to_bits() as i32);
    }

    #[test]
    fn test_specified_roundtrip_with_variable_text() {
        let mut info = LegacyGridInfo::new(GridFamily::Specified);
        if let LegacyExt::Specified(s) = &mut info.ext {
            s.crs_name = pack_str("");
            s.crs_def = pack_str("EPSG");
            s.tzid = pack_str("America/Chicago");
            s.nodata = -9999.0;
            s.is_interval = 1;
        }
        info.refresh_sizes();

        let words = encode(&info).unwrap();
        assert_eq!(words.len(), 74 + 1 + 1 + 4);
        assert_eq!(words[0] as usize, words.len() * 4);

        let back = decode(&words, 430).unwrap();
        assert_eq!(back, info);
        let spec = back.specified().unwrap();
        assert_eq!(unpack_str(&spec.tzid), "America/Chicago");
        assert_eq!(unpack_str(&spec.crs_name), "");
    }

    #[test]
    fn test_decode_accepts_trailing_words() {
        let info = LegacyGridInfo::new(GridFamily::Hrap);
        let mut words = encode(&info).unwrap();
        words.extend([7, 7, 7]);
        assert_eq!(decode(&words, 411).unwrap(), info);
    }

    #[test]
    fn test_decode_errors() {
        let info = LegacyGridInfo::new(GridFamily::Albers);
        let words = encode(&info).unwrap();

        assert!(matches!(
            decode(&words[..40], 420),
            Err(GridError::MalformedWords(_))
        ));
        assert!(matches!(
            decode(&words, 430),
            Err(GridError::GridTypeMismatch { .. })
        ));
        assert!(matches!(decode(&words, 999), Err(GridError::UnknownGridType(_))));
        assert!(decode(&[], 420).is_err());
    }

    #[test]
    fn test_decode_rejects_negative_length() {
        let info = LegacyGridInfo::new(GridFamily::Specified);
        let mut words = encode(&info).unwrap();
        // crs_name_length sits right after the version word
        words[64] = -1;
        assert!(matches!(decode(&words, 430), Err(GridError::MalformedWords(_))));
    }

    #[test]
    fn test_dict_view() {
        let mut info = LegacyGridInfo::new(GridFamily::Hrap);
        info.data_units = [pack_str("MM")[0], 0, 0];
        info.data_type = 1;
        let dict = to_dict(&info);
        assert_eq!(dict["data_units"], "MM");
        assert_eq!(dict["data_source"], "");
        assert_eq!(dict["range_counts"].as_array().unwrap().len(), 20);

        let back = from_dict(&dict).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_from_dict_requires_grid_type() {
        let map = Map::new();
        assert!(matches!(from_dict(&map), Err(GridError::MissingField(_))));
    }
}
