//! Usage report parser.
//!
//! Extracts the latest reading of each kind from a poll response. The
//! payload looks like this (only the fields read here are shown):
//!
//! ```json
//! {
//!   "status": "COMPLETE",
//!   "data": {
//!     "ELECTRIC": [
//!       { "type": "USAGE", "series": [ { "data": [ { "x": 1, "y": 10.0 }, { "x": 2, "y": 20.0 } ] } ] },
//!       { "type": "COST",  "series": [ { "data": [ { "x": 2, "y": 3.1 } ] } ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Data points are chronological, so the last point of a series is the latest
//! reading. When several series of the same type carry data, the one
//! iterated last wins.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::models::{ReadingKind, ReadingSet};

/// Industry tag whose entries are consumed.
pub const ELECTRIC: &str = "ELECTRIC";

/// Extracts the latest readings from a raw poll response.
///
/// Returns `Ok(None)` when the document is well formed but holds no data
/// point for any reading kind yet.
///
/// # Errors
///
/// Returns [`ParseError`] if a value along the walked path has the wrong
/// type, or if the last data point of a series has no `y` field.
pub fn extract_readings(document: &Value) -> Result<Option<ReadingSet>, ParseError> {
    let root = expect_object(document, "$")?;

    let Some(data) = present(root, "data") else {
        return Ok(None);
    };
    let data = expect_object(data, "data")?;

    let Some(entries) = present(data, ELECTRIC) else {
        return Ok(None);
    };
    let path = format!("data.{ELECTRIC}");
    let entries = expect_array(entries, &path)?;

    let mut readings = ReadingSet::new();
    for (i, entry) in entries.iter().enumerate() {
        let entry_path = format!("{path}[{i}]");
        let entry = expect_object(entry, &entry_path)?;

        let Some(kind) = entry
            .get("type")
            .and_then(Value::as_str)
            .and_then(ReadingKind::from_entry_type)
        else {
            continue;
        };

        if let Some(value) = last_series_value(entry, &entry_path)? {
            readings.replace(kind, value);
        }
    }

    Ok(if readings.is_empty() { None } else { Some(readings) })
}

/// Returns the `y` of the last point of the last non-empty series in `entry`.
///
/// The outer `None` means no series had any points. `Some(None)` means the
/// latest point carried a `null` reading, which overrides earlier series.
fn last_series_value(
    entry: &Map<String, Value>,
    path: &str,
) -> Result<Option<Option<f64>>, ParseError> {
    let Some(series) = present(entry, "series") else {
        return Ok(None);
    };
    let series_path = format!("{path}.series");
    let series = expect_array(series, &series_path)?;

    let mut latest = None;
    for (i, serie) in series.iter().enumerate() {
        let serie_path = format!("{series_path}[{i}]");
        let serie = expect_object(serie, &serie_path)?;

        let Some(points) = present(serie, "data") else {
            continue;
        };
        let points_path = format!("{serie_path}.data");
        let points = expect_array(points, &points_path)?;

        let Some(last) = points.last() else {
            continue;
        };
        let point_path = format!("{points_path}[{}]", points.len() - 1);
        latest = Some(point_value(last, &point_path)?);
    }

    Ok(latest)
}

/// Reads `y` from a data point. `null` means no value.
fn point_value(point: &Value, path: &str) -> Result<Option<f64>, ParseError> {
    let point = expect_object(point, path)?;
    match point.get("y") {
        None => Err(ParseError::new(path, "data point has no 'y' field")),
        Some(Value::Null) => Ok(None),
        Some(y) => y
            .as_f64()
            .map(Some)
            .ok_or_else(|| ParseError::new(format!("{path}.y"), type_mismatch("a number", y))),
    }
}

/// Returns the field if it exists and is not `null`.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ParseError> {
    value
        .as_object()
        .ok_or_else(|| ParseError::new(path, type_mismatch("an object", value)))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ParseError> {
    value
        .as_array()
        .ok_or_else(|| ParseError::new(path, type_mismatch("an array", value)))
}

fn type_mismatch(expected: &str, found: &Value) -> String {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("expected {expected}, found {found}")
}

// ============================================================================
// Tests
// ============================================================================
