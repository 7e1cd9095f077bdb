//! Scalar conversion between wire and local values
//!
//! The REST API is loosely typed: integers may come back as `2.0` or `"2"`.
//! [`FieldCodec`] turns those into typed local values and checks local values
//! on the way back.

use crate::error::{MapError, Result};
use crate::schema::ScalarKind;
use crate::types::Value;

/// How leniently int fields are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Integers and integer-valued floats only
    #[default]
    IntegralOnly,
    /// Also accept decimal integer strings such as `"443"`
    ParseStrings,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldCodec {
    pub numeric: NumericPolicy,
}

impl FieldCodec {
    pub fn new(numeric: NumericPolicy) -> Self {
        Self { numeric }
    }

    /// Wire scalar to local typed value
    pub fn decode(&self, wire: &Value, kind: ScalarKind, path: &str) -> Result<Value> {
        let mismatch = || MapError::type_mismatch(path, kind.name(), wire.type_name());

        match (kind, wire) {
            (ScalarKind::Int, Value::Int(i)) => Ok(Value::Int(*i)),
            (ScalarKind::Int, Value::Float(f)) => {
                float_to_int(*f).map(Value::Int).ok_or_else(mismatch)
            }
            (ScalarKind::Int, Value::String(s)) if self.numeric == NumericPolicy::ParseStrings => {
                s.trim().parse::<i64>().map(Value::Int).map_err(|_| mismatch())
            }
            (ScalarKind::String, Value::String(s)) => Ok(Value::String(s.clone())),
            (ScalarKind::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
            _ => Err(mismatch()),
        }
    }

    /// Local typed value to wire scalar; `Null` passes through as a clear
    pub fn encode(&self, local: &Value, kind: ScalarKind, path: &str) -> Result<Value> {
        match (kind, local) {
            (_, Value::Null) => Ok(Value::Null),
            (ScalarKind::Int, Value::Int(i)) => Ok(Value::Int(*i)),
            (ScalarKind::String, Value::String(s)) => Ok(Value::String(s.clone())),
            (ScalarKind::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
            _ => Err(MapError::type_mismatch(path, kind.name(), local.type_name())),
        }
    }
}

/// Exact conversion of an integer-valued float
fn float_to_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn decode_truncates_integral_floats() {
        let codec = FieldCodec::default();
        assert_eq!(
            codec.decode(&Value::Float(2.0), ScalarKind::Int, "x").unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            codec.decode(&Value::Int(-7), ScalarKind::Int, "x").unwrap(),
            Value::Int(-7)
        );
    }

    #[test]
    fn decode_rejects_fractional_floats() {
        let codec = FieldCodec::default();
        let err = codec
            .decode(&Value::Float(2.5), ScalarKind::Int, "keypair_count")
            .unwrap_err();
        assert_eq!(
            err,
            MapError::TypeMismatch {
                path: "keypair_count".to_string(),
                expected: "int".to_string(),
                actual: "float".to_string(),
            }
        );
        assert!(codec
            .decode(&Value::Float(f64::NAN), ScalarKind::Int, "x")
            .is_err());
        assert!(codec.decode(&Value::Float(1e20), ScalarKind::Int, "x").is_err());
    }

    #[test]
    fn numeric_strings_need_parse_strings_policy() {
        let strict = FieldCodec::default();
        let lenient = FieldCodec::new(NumericPolicy::ParseStrings);
        let wire = Value::from("443");

        assert!(strict.decode(&wire, ScalarKind::Int, "port").is_err());
        assert_eq!(
            lenient.decode(&wire, ScalarKind::Int, "port").unwrap(),
            Value::Int(443)
        );
        assert!(lenient
            .decode(&Value::from("4.5"), ScalarKind::Int, "port")
            .is_err());
    }

    #[test]
    fn decode_passes_strings_and_bools_through() {
        let codec = FieldCodec::default();
        assert_eq!(
            codec
                .decode(&Value::from("enable"), ScalarKind::String, "status")
                .unwrap(),
            Value::from("enable")
        );
        assert_eq!(
            codec.decode(&Value::Bool(true), ScalarKind::Bool, "b").unwrap(),
            Value::Bool(true)
        );
        assert!(codec.decode(&Value::Int(1), ScalarKind::String, "s").is_err());
        assert!(codec.decode(&Value::from("true"), ScalarKind::Bool, "b").is_err());
    }

    #[test]
    fn encode_checks_declared_kind() {
        let codec = FieldCodec::default();
        assert_eq!(
            codec.encode(&Value::Int(500), ScalarKind::Int, "x").unwrap(),
            Value::Int(500)
        );
        assert_eq!(
            codec.encode(&Value::Null, ScalarKind::Int, "x").unwrap(),
            Value::Null
        );
        let err = codec
            .encode(&Value::from("500"), ScalarKind::Int, "embryonic_limit")
            .unwrap_err();
        assert!(matches!(err, MapError::TypeMismatch { .. }));
    }
}
