//! Object field binder: assigns a decoded object's properties onto a
//! caller-owned record by field name.
//!
//! A [`Binder`] is built once per record type from typed setter closures,
//! then reused for every bind.
//!
//! ```
//! use qjs_serde::{Binder, Value};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     label: String,
//! }
//!
//! let binder = Binder::new()
//!     .field("x", |p: &mut Point, v: i32| p.x = v)
//!     .field("label", |p: &mut Point, v: String| p.label = v);
//!
//! let value: Value = [("x", Value::from(3)), ("label", Value::from("a"))]
//!     .into_iter()
//!     .collect();
//! let mut point = Point::default();
//! binder.bind(value, &mut point).unwrap();
//! assert_eq!(point.x, 3);
//! assert_eq!(point.label, "a");
//! ```

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::typed_array::TypedArray;
use crate::value::Value;

/// Field name reported when the bound value itself is not an object.
const RECORD: &str = "<record>";

/// Conversion out of a decoded [`Value`].
///
/// Returns the value back on a type mismatch so the caller can report what
/// was found.
pub trait FromValue: Sized {
    /// Type name used in [`Error::TypeMismatch`].
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "int32";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int32(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int32";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int32(i) => Ok(i as i64),
            other => Err(other),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float64(f) => Ok(f),
            Value::Int32(i) => Ok(i as f64),
            other => Err(other),
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<u8> {
    const EXPECTED: &'static str = "array buffer";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::ArrayBuffer(bytes) => Ok(bytes),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "array";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Array(arr) => Ok(arr),
            other => Err(other),
        }
    }
}

impl FromValue for TypedArray {
    const EXPECTED: &'static str = "typed array";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::TypedArray(arr) => Ok(arr),
            other => Err(other),
        }
    }
}

impl FromValue for IndexMap<String, Value> {
    const EXPECTED: &'static str = "object";

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(obj) => Ok(obj),
            other => Err(other),
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Result<Self, Value> {
        if value.is_nullish() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

type Setter<R> = Box<dyn Fn(&mut R, Value) -> Result<()> + Send + Sync>;

/// Name-to-setter table for records of type `R`.
pub struct Binder<R> {
    fields: HashMap<String, Setter<R>>,
}

impl<R> Default for Binder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Binder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Binder").field("fields", &names).finish()
    }
}

impl<R> Binder<R> {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Registers `setter` for the property `name`. A later registration for
    /// the same name replaces the earlier one.
    pub fn field<T, F>(mut self, name: &str, setter: F) -> Self
    where
        T: FromValue + Default + 'static,
        F: Fn(&mut R, T) + Send + Sync + 'static,
    {
        let field = name.to_owned();
        let set: Setter<R> = Box::new(move |record, value| {
            if value.is_nullish() {
                setter(record, T::default());
                return Ok(());
            }
            match T::from_value(value) {
                Ok(v) => {
                    setter(record, v);
                    Ok(())
                }
                Err(found) => Err(Error::TypeMismatch {
                    field: field.clone(),
                    expected: T::EXPECTED,
                    found: found.type_name(),
                }),
            }
        });
        self.fields.insert(name.to_owned(), set);
        self
    }

    /// Names of the registered fields, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Assigns every property of `value` that names a registered field.
    /// Unknown properties are skipped. Fields assigned before an error keep
    /// their new values.
    pub fn bind<'r>(&self, value: Value, record: &'r mut R) -> Result<&'r mut R> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => {
                return Err(Error::TypeMismatch {
                    field: RECORD.to_owned(),
                    expected: "object",
                    found: other.type_name(),
                })
            }
        };
        for (key, val) in obj {
            if let Some(set) = self.fields.get(&key) {
                set(record, val)?;
            }
        }
        Ok(record)
    }
}
