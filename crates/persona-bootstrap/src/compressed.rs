//! Compressed memory blob: gzip around a JSON object

use flate2::read::GzDecoder;
use persona_core::{BootError, Result};
use serde_json::{Map, Value};
use std::io::Read;

/// Decompress and parse the blob. Anything other than a gzip stream holding
/// a UTF-8 JSON object is `MalformedData` against `file`.
pub fn decode_compressed(file: &str, bytes: &[u8]) -> Result<Map<String, Value>> {
    let mut json = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut json)
        .map_err(|e| BootError::malformed(file, format!("decompression failed: {}", e)))?;

    let value: Value = serde_json::from_str(&json)
        .map_err(|e| BootError::malformed(file, format!("invalid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(BootError::malformed(
            file,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
