//! Typed arrays and the array buffers they are serialized over.
//!
//! A typed array record is laid out as:
//!
//! ```text
//! kind:u8  count:varint  offset:varint  ArrayBuffer-tag  count:varint  elements
//! ```
//!
//! The nested buffer repeats the element count, not a byte length; it is
//! followed by `count × width` little-endian bytes. `offset` is the view's
//! offset at serialization time. It never points into the buffer that
//! follows, so it is read and dropped.

use qjs_serde_buffers::{Reader, Writer};

use crate::constants::Tag;
use crate::error::{Error, Result};
use crate::primitive::{read_uvarint, write_len, write_uvarint};

/// Element kind of a typed array, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypedArrayKind {
    Uint8Clamped = 0,
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    BigInt64 = 7,
    BigUint64 = 8,
    Float32 = 9,
    Float64 = 10,
}

impl TypedArrayKind {
    /// Bytes per element.
    pub fn width(self) -> usize {
        match self {
            TypedArrayKind::Uint8Clamped | TypedArrayKind::Int8 | TypedArrayKind::Uint8 => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 | TypedArrayKind::Float64 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::BigInt64 => "BigInt64Array",
            TypedArrayKind::BigUint64 => "BigUint64Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }
}

impl TryFrom<u8> for TypedArrayKind {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Ok(match byte {
            0 => TypedArrayKind::Uint8Clamped,
            1 => TypedArrayKind::Int8,
            2 => TypedArrayKind::Uint8,
            3 => TypedArrayKind::Int16,
            4 => TypedArrayKind::Uint16,
            5 => TypedArrayKind::Int32,
            6 => TypedArrayKind::Uint32,
            7 => TypedArrayKind::BigInt64,
            8 => TypedArrayKind::BigUint64,
            9 => TypedArrayKind::Float32,
            10 => TypedArrayKind::Float64,
            other => return Err(Error::BadTypedArrayTag(other)),
        })
    }
}

/// A decoded typed array: its kind and its elements.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    Uint8Clamped(Vec<u8>),
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    BigInt64(Vec<i64>),
    BigUint64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Default for TypedArray {
    fn default() -> Self {
        TypedArray::Uint8(Vec::new())
    }
}

impl TypedArray {
    pub fn kind(&self) -> TypedArrayKind {
        match self {
            TypedArray::Uint8Clamped(_) => TypedArrayKind::Uint8Clamped,
            TypedArray::Int8(_) => TypedArrayKind::Int8,
            TypedArray::Uint8(_) => TypedArrayKind::Uint8,
            TypedArray::Int16(_) => TypedArrayKind::Int16,
            TypedArray::Uint16(_) => TypedArrayKind::Uint16,
            TypedArray::Int32(_) => TypedArrayKind::Int32,
            TypedArray::Uint32(_) => TypedArrayKind::Uint32,
            TypedArray::BigInt64(_) => TypedArrayKind::BigInt64,
            TypedArray::BigUint64(_) => TypedArrayKind::BigUint64,
            TypedArray::Float32(_) => TypedArrayKind::Float32,
            TypedArray::Float64(_) => TypedArrayKind::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            TypedArray::Uint8Clamped(v) | TypedArray::Uint8(v) => v.len(),
            TypedArray::Int8(v) => v.len(),
            TypedArray::Int16(v) => v.len(),
            TypedArray::Uint16(v) => v.len(),
            TypedArray::Int32(v) => v.len(),
            TypedArray::Uint32(v) => v.len(),
            TypedArray::BigInt64(v) => v.len(),
            TypedArray::BigUint64(v) => v.len(),
            TypedArray::Float32(v) => v.len(),
            TypedArray::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads an array buffer payload (the tag is already consumed).
pub fn read_array_buffer(reader: &mut Reader<'_>) -> Result<Vec<u8>> {
    let n = read_uvarint(reader)? as usize;
    Ok(reader.buf(n)?.to_vec())
}

/// Writes an array buffer payload (the caller writes the tag).
pub fn write_array_buffer(writer: &mut Writer, bytes: &[u8]) -> Result<()> {
    write_len(writer, bytes.len(), "array buffer")?;
    writer.buf(bytes);
    Ok(())
}

macro_rules! read_elements {
    ($bytes:expr, $n:expr, $read:ident) => {{
        let mut elements = Reader::new($bytes);
        let mut out = Vec::with_capacity($n);
        for _ in 0..$n {
            out.push(elements.$read()?);
        }
        out
    }};
}

/// Reads a typed array payload (the tag is already consumed).
pub fn read_typed_array(reader: &mut Reader<'_>) -> Result<TypedArray> {
    let kind = TypedArrayKind::try_from(reader.u8()?)?;
    let n = read_uvarint(reader)? as usize;
    let _offset = read_uvarint(reader)?;

    let tag = reader.u8()?;
    if tag != Tag::ArrayBuffer as u8 {
        return Err(Error::StructuralError(format!(
            "{} not followed by an array buffer (found tag {tag})",
            kind.name()
        )));
    }
    let found = read_uvarint(reader)? as usize;
    if found != n {
        return Err(Error::SizeMismatch { expected: n, found });
    }
    let byte_len = n
        .checked_mul(kind.width())
        .ok_or_else(|| Error::Overflow(format!("{} length {n}", kind.name())))?;
    let bytes = reader.buf(byte_len)?;

    Ok(match kind {
        TypedArrayKind::Uint8Clamped => TypedArray::Uint8Clamped(bytes.to_vec()),
        TypedArrayKind::Uint8 => TypedArray::Uint8(bytes.to_vec()),
        TypedArrayKind::Int8 => TypedArray::Int8(read_elements!(bytes, n, i8)),
        TypedArrayKind::Int16 => TypedArray::Int16(read_elements!(bytes, n, i16)),
        TypedArrayKind::Uint16 => TypedArray::Uint16(read_elements!(bytes, n, u16)),
        TypedArrayKind::Int32 => TypedArray::Int32(read_elements!(bytes, n, i32)),
        TypedArrayKind::Uint32 => TypedArray::Uint32(read_elements!(bytes, n, u32)),
        TypedArrayKind::BigInt64 => TypedArray::BigInt64(read_elements!(bytes, n, i64)),
        TypedArrayKind::BigUint64 => TypedArray::BigUint64(read_elements!(bytes, n, u64)),
        TypedArrayKind::Float32 => TypedArray::Float32(read_elements!(bytes, n, f32)),
        TypedArrayKind::Float64 => TypedArray::Float64(read_elements!(bytes, n, f64)),
    })
}

macro_rules! write_elements {
    ($writer:expr, $items:expr, $write:ident) => {{
        for item in $items.iter() {
            $writer.$write(*item);
        }
    }};
}

/// Writes a typed array payload (the caller writes the tag).
pub fn write_typed_array(writer: &mut Writer, array: &TypedArray) -> Result<()> {
    let kind = array.kind();
    let n = array.len();

    writer.u8(kind as u8);
    write_len(writer, n, kind.name())?;
    write_uvarint(writer, 0);
    writer.u8(Tag::ArrayBuffer as u8);
    write_len(writer, n, kind.name())?;

    match array {
        TypedArray::Uint8Clamped(v) | TypedArray::Uint8(v) => writer.buf(v),
        TypedArray::Int8(v) => write_elements!(writer, v, i8),
        TypedArray::Int16(v) => write_elements!(writer, v, i16),
        TypedArray::Uint16(v) => write_elements!(writer, v, u16),
        TypedArray::Int32(v) => write_elements!(writer, v, i32),
        TypedArray::Uint32(v) => write_elements!(writer, v, u32),
        TypedArray::BigInt64(v) => write_elements!(writer, v, i64),
        TypedArray::BigUint64(v) => write_elements!(writer, v, u64),
        TypedArray::Float32(v) => write_elements!(writer, v, f32),
        TypedArray::Float64(v) => write_elements!(writer, v, f64),
    }
    Ok(())
}
