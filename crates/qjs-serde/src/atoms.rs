//! Stream header and the atom table of interned strings.
//!
//! Object keys are written as a varint: low bit set means the remaining bits
//! are a small non-negative integer key, low bit clear means the remaining
//! bits are a 1-based index into the atom table that follows the version
//! byte.

use indexmap::IndexSet;
use qjs_serde_buffers::{Reader, Writer};
use tracing::debug;

use crate::constants::VERSION;
use crate::error::{Error, Result};
use crate::primitive::{read_string, read_uvarint, write_len, write_string, write_uvarint};

/// Largest integer key that fits the tagged-integer layout.
const MAX_TAGGED_INT: u32 = u32::MAX >> 1;

/// Interned strings referenced by 1-based index from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomTable {
    atoms: Vec<String>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Resolves a 1-based wire index. Index 0 is reserved.
    pub fn get(&self, index: u32) -> Result<&str> {
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.atoms.get(i))
            .map(String::as_str)
            .ok_or(Error::AtomOutOfRange(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.atoms.iter().map(String::as_str)
    }
}

impl FromIterator<String> for AtomTable {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}

/// Reads the version byte and the atom table.
pub fn read_header(reader: &mut Reader<'_>) -> Result<AtomTable> {
    let version = reader.u8()?;
    if version != VERSION {
        return Err(Error::VersionMismatch {
            found: version,
            expected: VERSION,
        });
    }
    let count = read_uvarint(reader)? as usize;
    // every atom takes at least its length byte
    if count > reader.size() {
        return Err(Error::StreamTruncated);
    }
    let mut atoms = Vec::with_capacity(count);
    for _ in 0..count {
        atoms.push(read_string(reader)?);
    }
    debug!(version, atoms = atoms.len(), "read header");
    Ok(AtomTable { atoms })
}

/// Writes the version byte and the atom table.
pub fn write_header(writer: &mut Writer, atoms: &AtomTable) -> Result<()> {
    writer.u8(VERSION);
    write_len(writer, atoms.len(), "atom table")?;
    for atom in atoms.iter() {
        write_string(writer, atom)?;
    }
    debug!(version = VERSION, atoms = atoms.len(), "wrote header");
    Ok(())
}

/// Reads one object key.
pub fn read_atom_key(reader: &mut Reader<'_>, atoms: &AtomTable) -> Result<String> {
    let k = read_uvarint(reader)?;
    if k & 1 == 1 {
        Ok((k >> 1).to_string())
    } else {
        atoms.get(k >> 1).map(str::to_owned)
    }
}

/// Returns the integer a key stands for when it can use the tagged layout:
/// canonical decimal text (no sign, no leading zeros) up to `2^31 - 1`.
pub fn tagged_int_key(key: &str) -> Option<u32> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    key.parse::<u32>().ok().filter(|&n| n <= MAX_TAGGED_INT)
}

/// Writes one object key, using an index into `atoms` unless the key is a
/// tagged integer. `atoms` must hold every non-integer key of the payload.
pub fn write_atom_key(writer: &mut Writer, key: &str, atoms: &IndexSet<String>) -> Result<()> {
    if let Some(n) = tagged_int_key(key) {
        write_uvarint(writer, n << 1 | 1);
        return Ok(());
    }
    let index = atoms
        .get_index_of(key)
        .ok_or_else(|| Error::StructuralError(format!("key {key:?} missing from atom table")))?
        + 1;
    if index > MAX_TAGGED_INT as usize {
        return Err(Error::Overflow(format!("atom index {index}")));
    }
    write_uvarint(writer, (index as u32) << 1);
    Ok(())
}
