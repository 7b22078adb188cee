//! Argument extraction shared by plugin implementations

use agri_core::{AgriError, Value};
use std::collections::HashMap;

/// Fail with ARG_COUNT unless at least `expected` arguments were passed
pub fn require_args(args: &[Value], func: &str, expected: usize) -> Result<(), AgriError> {
    if args.len() < expected {
        return Err(AgriError::arg_count(func, expected, args.len()));
    }
    Ok(())
}

/// Extract a number from a Value, returning error context
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<f64, AgriError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Null => Err(AgriError::arg_type(func, arg, "Number", "Null")),
        Value::Error(e) => Err(e.clone()),
        other => Err(AgriError::arg_type(func, arg, "Number", other.type_name())),
    }
}

/// Extract a Text string from a Value
pub fn extract_text(value: &Value, func: &str, arg: &str) -> Result<String, AgriError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        Value::Null => Err(AgriError::arg_type(func, arg, "Text", "Null")),
        Value::Error(e) => Err(e.clone()),
        other => Err(AgriError::arg_type(func, arg, "Text", other.type_name())),
    }
}

/// Extract an Object (record) from a Value
pub fn extract_object<'a>(value: &'a Value, func: &str, arg: &str) -> Result<&'a HashMap<String, Value>, AgriError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Error(e) => Err(e.clone()),
        other => Err(AgriError::arg_type(func, arg, "Object", other.type_name())),
    }
}

/// Extract optional Text string
pub fn extract_optional_text(args: &[Value], index: usize) -> Option<String> {
    args.get(index).and_then(|v| v.as_text().map(str::to_string))
}
