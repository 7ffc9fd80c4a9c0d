//! Runtime Value Representation
//!
//! The VM has exactly one value type: a signed 64-bit integer.
//! Zero is false, anything else is true.

/// Runtime value
pub type Value = i64;

/// Truthiness used by the conditional jumps
pub fn is_truthy(value: Value) -> bool {
    value != 0
}

/// Encode a comparison result
pub fn from_bool(b: bool) -> Value {
    Value::from(b)
}
