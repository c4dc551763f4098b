//! Encoder producing a version-12 stream from a [`Value`].
//!
//! Encoding is two passes over the tree: the first collects every object key
//! that needs an atom (in first-seen order), the second writes the header and
//! the payload.

use indexmap::IndexSet;
use qjs_serde_buffers::Writer;
use tracing::{debug, trace};

use crate::atoms::{tagged_int_key, write_atom_key, write_header, AtomTable};
use crate::constants::Tag;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::primitive::{write_f64, write_len, write_string, write_svarint};
use crate::typed_array::{write_array_buffer, write_typed_array};
use crate::value::Value;

pub struct Encoder {
    options: Options,
    pub writer: Writer,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            writer: Writer::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Encodes `value` into a fresh byte vector. On error nothing is left
    /// behind in the writer.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>> {
        self.writer.reset();
        match self.write_stream(value) {
            Ok(()) => Ok(self.writer.flush()),
            Err(e) => {
                debug!(error = %e, "encode failed");
                self.writer.reset();
                Err(e)
            }
        }
    }

    fn write_stream(&mut self, value: &Value) -> Result<()> {
        let mut atoms = IndexSet::new();
        collect_atoms(value, &mut atoms, self.options.max_depth)?;
        let table: AtomTable = atoms.iter().cloned().collect();
        write_header(&mut self.writer, &table)?;

        let mut steps = vec![Step::Value(value, 0)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Key(key) => write_atom_key(&mut self.writer, key, &atoms)?,
                Step::Value(value, depth) => {
                    self.write_head(value)?;
                    push_children(&mut steps, value, depth + 1);
                }
            }
        }
        Ok(())
    }

    /// Writes a scalar whole, or a container's tag and length.
    fn write_head(&mut self, value: &Value) -> Result<()> {
        let writer = &mut self.writer;
        match value {
            Value::Null => writer.u8(Tag::Null as u8),
            Value::Undefined => writer.u8(Tag::Undefined as u8),
            Value::Bool(false) => writer.u8(Tag::False as u8),
            Value::Bool(true) => writer.u8(Tag::True as u8),
            Value::Int32(i) => {
                writer.u8(Tag::Int32 as u8);
                write_svarint(writer, *i);
            }
            Value::Float64(f) => {
                writer.u8(Tag::Float64 as u8);
                write_f64(writer, *f);
            }
            Value::String(s) => {
                writer.u8(Tag::String as u8);
                write_string(writer, s)?;
            }
            Value::Object(obj) => {
                trace!(len = obj.len(), "write object");
                writer.u8(Tag::Object as u8);
                write_len(writer, obj.len(), "object")?;
            }
            Value::Array(arr) => {
                trace!(len = arr.len(), "write array");
                writer.u8(Tag::Array as u8);
                write_len(writer, arr.len(), "array")?;
            }
            Value::ArrayBuffer(bytes) => {
                writer.u8(Tag::ArrayBuffer as u8);
                write_array_buffer(writer, bytes)?;
            }
            Value::TypedArray(arr) => {
                writer.u8(Tag::TypedArray as u8);
                write_typed_array(writer, arr)?;
            }
        }
        Ok(())
    }
}

/// Pending work for both passes. Both walk the tree with an explicit stack,
/// so value nesting never grows the call stack.
enum Step<'v> {
    Key(&'v str),
    /// A value and the number of containers enclosing it.
    Value(&'v Value, usize),
}

/// Schedules the children of a container so they pop in document order,
/// each object key just before its value.
fn push_children<'v>(steps: &mut Vec<Step<'v>>, value: &'v Value, depth: usize) {
    match value {
        Value::Object(obj) => {
            for (key, val) in obj.iter().rev() {
                steps.push(Step::Value(val, depth));
                steps.push(Step::Key(key));
            }
        }
        Value::Array(arr) => steps.extend(arr.iter().rev().map(|val| Step::Value(val, depth))),
        _ => {}
    }
}

/// First pass: gathers non-integer object keys and enforces the depth limit
/// before anything is written.
fn collect_atoms(value: &Value, atoms: &mut IndexSet<String>, max_depth: usize) -> Result<()> {
    let mut steps = vec![Step::Value(value, 0)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Key(key) => {
                if tagged_int_key(key).is_none() && !atoms.contains(key) {
                    atoms.insert(key.to_owned());
                }
            }
            Step::Value(value, depth) => {
                if !matches!(
                    value,
                    Value::Object(_) | Value::Array(_) | Value::TypedArray(_)
                ) {
                    continue;
                }
                let nested = depth + 1;
                if nested > max_depth {
                    return Err(Error::DepthExceeded(max_depth));
                }
                push_children(&mut steps, value, nested);
            }
        }
    }
    Ok(())
}
