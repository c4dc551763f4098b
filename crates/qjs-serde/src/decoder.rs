//! Tag-dispatch decoder.

use indexmap::IndexMap;
use qjs_serde_buffers::Reader;
use tracing::{debug, trace};

use crate::atoms::{read_atom_key, read_header, AtomTable};
use crate::constants::Tag;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::primitive::{read_f64, read_string, read_svarint, read_uvarint};
use crate::typed_array::{read_array_buffer, read_typed_array};
use crate::value::{Object, Value};

/// Decodes a header plus one value from a byte slice.
///
/// Holds only its options between calls; each [`decode`](Decoder::decode)
/// builds its own atom table and depth counter.
#[derive(Debug, Default)]
pub struct Decoder {
    options: Options,
    consumed: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            consumed: 0,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decodes one value. Bytes after the value are left unread; see
    /// [`consumed`](Decoder::consumed).
    pub fn decode(&mut self, input: &[u8]) -> Result<Value> {
        let mut reader = Reader::new(input);
        let result = read_header(&mut reader).and_then(|atoms| {
            let mut session = Session {
                reader: &mut reader,
                atoms,
                max_depth: self.options.max_depth,
            };
            session.read_value()
        });
        self.consumed = reader.x;
        if let Err(e) = &result {
            debug!(error = %e, offset = reader.x, "decode failed");
        }
        result
    }

    /// Bytes consumed by the last [`decode`](Decoder::decode) call.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

struct Session<'a, 'r> {
    reader: &'r mut Reader<'a>,
    atoms: AtomTable,
    max_depth: usize,
}

/// A container whose children are still being read.
enum Frame {
    Array {
        items: Vec<Value>,
        remaining: usize,
    },
    Object {
        entries: Object,
        remaining: usize,
        key: String,
    },
}

impl Frame {
    fn is_full(&self) -> bool {
        match self {
            Frame::Array { remaining, .. } | Frame::Object { remaining, .. } => *remaining == 0,
        }
    }

    fn push(&mut self, value: Value) {
        match self {
            Frame::Array { items, remaining } => {
                items.push(value);
                *remaining -= 1;
            }
            Frame::Object {
                entries,
                remaining,
                key,
            } => {
                entries.insert(std::mem::take(key), value);
                *remaining -= 1;
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::Array { items, .. } => Value::Array(items),
            Frame::Object { entries, .. } => Value::Object(entries),
        }
    }
}

/// What a single tag read produced.
enum Item {
    Leaf(Value),
    Open(Frame),
}

impl Session<'_, '_> {
    fn enter(&self, depth: usize) -> Result<()> {
        if depth + 1 > self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    /// Rejects counts that cannot fit in the remaining input before
    /// allocating for them. Every element takes at least one byte.
    fn check_count(&self, count: usize) -> Result<()> {
        if count > self.reader.size() {
            return Err(Error::StreamTruncated);
        }
        Ok(())
    }

    /// Reads one value. Open containers live on an explicit stack, so input
    /// nesting never grows the call stack.
    fn read_value(&mut self) -> Result<Value> {
        let mut stack: Vec<Frame> = Vec::new();
        'next: loop {
            if let Some(Frame::Object { key, .. }) = stack.last_mut() {
                *key = read_atom_key(self.reader, &self.atoms)?;
            }
            let mut value = match self.read_item(stack.len())? {
                Item::Leaf(value) => value,
                Item::Open(frame) if frame.is_full() => frame.finish(),
                Item::Open(frame) => {
                    stack.push(frame);
                    continue;
                }
            };
            while let Some(mut parent) = stack.pop() {
                parent.push(value);
                if !parent.is_full() {
                    stack.push(parent);
                    continue 'next;
                }
                value = parent.finish();
            }
            return Ok(value);
        }
    }

    fn read_item(&mut self, depth: usize) -> Result<Item> {
        let byte = self.reader.u8()?;
        let tag =
            Tag::try_from(byte).map_err(|b| Error::UnsupportedTag(format!("unknown tag {b}")))?;
        trace!(tag = tag.name(), depth, "read value");
        let value = match tag {
            Tag::Null => Value::Null,
            Tag::Undefined => Value::Undefined,
            Tag::False => Value::Bool(false),
            Tag::True => Value::Bool(true),
            Tag::Int32 => Value::Int32(read_svarint(self.reader)?),
            Tag::Float64 => Value::Float64(read_f64(self.reader)?),
            Tag::String => Value::String(read_string(self.reader)?),
            Tag::Object => {
                self.enter(depth)?;
                let size = self.read_count()?;
                return Ok(Item::Open(Frame::Object {
                    entries: IndexMap::with_capacity(size),
                    remaining: size,
                    key: String::new(),
                }));
            }
            Tag::Array => {
                self.enter(depth)?;
                let size = self.read_count()?;
                return Ok(Item::Open(Frame::Array {
                    items: Vec::with_capacity(size),
                    remaining: size,
                }));
            }
            Tag::ArrayBuffer => Value::ArrayBuffer(read_array_buffer(self.reader)?),
            Tag::TypedArray => {
                self.enter(depth)?;
                Value::TypedArray(read_typed_array(self.reader)?)
            }
            Tag::BigInt
            | Tag::TemplateObject
            | Tag::FunctionBytecode
            | Tag::Module
            | Tag::SharedArrayBuffer
            | Tag::RegExp
            | Tag::Date
            | Tag::ObjectValue
            | Tag::ObjectReference => return Err(Error::UnsupportedTag(tag.name().to_owned())),
        };
        Ok(Item::Leaf(value))
    }

    fn read_count(&mut self) -> Result<usize> {
        let size = read_uvarint(self.reader)? as usize;
        self.check_count(size)?;
        Ok(size)
    }
}
