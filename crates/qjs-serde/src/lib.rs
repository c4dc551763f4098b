//! Decoder and encoder for the QuickJS value serialization format
//! (version 12).
//!
//! A stream is a version byte, an atom table of interned strings, then one
//! tag-prefixed value. Supported values are the JSON-like subset plus
//! `undefined`, array buffers and typed arrays; see [`Value`].
//!
//! ```
//! use qjs_serde::{decode, encode, Value};
//!
//! let value: Value = [("k", Value::Null), ("n", Value::Int32(42))]
//!     .into_iter()
//!     .collect();
//! let bytes = encode(&value).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```

mod atoms;
mod binder;
mod constants;
mod decoder;
mod encoder;
mod error;
mod json;
mod options;
mod primitive;
mod typed_array;
mod value;

pub mod cli;

use std::io::{Read, Write};

pub use atoms::AtomTable;
pub use binder::{Binder, FromValue};
pub use constants::{Tag, DEFAULT_MAX_DEPTH, VERSION};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use options::Options;
pub use typed_array::{TypedArray, TypedArrayKind};
pub use value::{Object, Value};

/// Decodes one value with default [`Options`].
pub fn decode(input: &[u8]) -> Result<Value> {
    decode_with(input, &Options::default())
}

pub fn decode_with(input: &[u8], options: &Options) -> Result<Value> {
    Decoder::with_options(*options).decode(input)
}

/// Reads `reader` to its end, then decodes one value from the bytes.
pub fn read_value<R: Read>(reader: R) -> Result<Value> {
    read_value_with(reader, &Options::default())
}

pub fn read_value_with<R: Read>(mut reader: R, options: &Options) -> Result<Value> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode_with(&buf, options)
}

/// Decodes one object straight into `record` through `binder`.
pub fn decode_into<'r, R>(input: &[u8], binder: &Binder<R>, record: &'r mut R) -> Result<&'r mut R> {
    decode_into_with(input, &Options::default(), binder, record)
}

pub fn decode_into_with<'r, R>(
    input: &[u8],
    options: &Options,
    binder: &Binder<R>,
    record: &'r mut R,
) -> Result<&'r mut R> {
    let value = decode_with(input, options)?;
    binder.bind(value, record)
}

/// Encodes one value with default [`Options`].
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    encode_with(value, &Options::default())
}

pub fn encode_with(value: &Value, options: &Options) -> Result<Vec<u8>> {
    Encoder::with_options(*options).encode(value)
}

/// Encodes `value` and writes the whole stream to `writer`.
pub fn write_value<W: Write>(mut writer: W, value: &Value) -> Result<()> {
    let bytes = encode(value)?;
    writer.write_all(&bytes)?;
    Ok(())
}
