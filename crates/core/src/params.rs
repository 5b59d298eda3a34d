//! Lenient accessors for JSON parameter objects.
//!
//! Every helper looks up `params[name]` and falls back to the given default
//! when the key is absent or holds the wrong JSON type. Range checks are the
//! caller's job; see [`crate::config::SimConfig::from_json`].

use glam::DVec2;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Any JSON number as `f64`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// A non-negative JSON integer as `usize`. Floats and negatives fall back.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map_or_else(|| default.to_owned(), String::from)
}

/// A two-element numeric array `[x, y]` as a vector.
///
/// Arrays of any other length, or with non-numeric elements, fall back.
pub fn param_vec2(params: &Value, name: &str, default: DVec2) -> DVec2 {
    match params.get(name).and_then(Value::as_array).map(Vec::as_slice) {
        Some([x, y]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => DVec2::new(x, y),
            _ => default,
        },
        _ => default,
    }
}

/// Any serde-deserializable value, such as a snake_case enum tag.
pub fn param_parsed<T: DeserializeOwned>(params: &Value, name: &str, default: T) -> T {
    params
        .get(name)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or(default)
}
