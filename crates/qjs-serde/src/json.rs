//! Conversions between [`Value`] and [`serde_json::Value`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number};

use crate::error::Error;
use crate::typed_array::TypedArray;
use crate::value::Value;

/// Largest integer magnitude an `f64` holds exactly.
const MAX_SAFE_INTEGER: u64 = 1 << 53;

const DATA_URI_PREFIX: &str = "data:application/octet-stream;base64,";

fn float(f: f64) -> serde_json::Value {
    Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn numbers<T: Copy, F: Fn(T) -> serde_json::Value>(items: &[T], f: F) -> serde_json::Value {
    serde_json::Value::Array(items.iter().map(|&x| f(x)).collect())
}

impl From<TypedArray> for serde_json::Value {
    fn from(arr: TypedArray) -> Self {
        match arr {
            TypedArray::Uint8Clamped(v) | TypedArray::Uint8(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Int8(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Int16(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Uint16(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Int32(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Uint32(v) => numbers(&v, serde_json::Value::from),
            TypedArray::BigInt64(v) => numbers(&v, serde_json::Value::from),
            TypedArray::BigUint64(v) => numbers(&v, serde_json::Value::from),
            TypedArray::Float32(v) => numbers(&v, |f| float(f as f64)),
            TypedArray::Float64(v) => numbers(&v, float),
        }
    }
}

impl From<Value> for serde_json::Value {
    /// Lossy where JSON has no counterpart: `Undefined` and non-finite
    /// floats become `null`, array buffers become a base64 data URI and typed
    /// arrays become plain number arrays.
    fn from(v: Value) -> Self {
        match v {
            Value::Null | Value::Undefined => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int32(i) => serde_json::Value::from(i),
            Value::Float64(f) => float(f),
            Value::String(s) => serde_json::Value::String(s),
            Value::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect::<Map<_, _>>(),
            ),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::ArrayBuffer(bytes) => {
                serde_json::Value::String(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(bytes)))
            }
            Value::TypedArray(arr) => serde_json::Value::from(arr),
        }
    }
}

fn number(n: &Number) -> Result<Value, Error> {
    if let Some(i) = n.as_i64() {
        if let Ok(i) = i32::try_from(i) {
            return Ok(Value::Int32(i));
        }
        if i.unsigned_abs() <= MAX_SAFE_INTEGER {
            return Ok(Value::Float64(i as f64));
        }
        return Err(Error::UnsupportedValue(format!("integer {i} exceeds 2^53")));
    }
    if let Some(u) = n.as_u64() {
        if u <= MAX_SAFE_INTEGER {
            return Ok(Value::Float64(u as f64));
        }
        return Err(Error::UnsupportedValue(format!("integer {u} exceeds 2^53")));
    }
    n.as_f64()
        .map(Value::Float64)
        .ok_or_else(|| Error::UnsupportedValue(format!("number {n}")))
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number(&n)?,
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(
                arr.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}
