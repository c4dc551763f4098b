//! Varints, floats and strings.
//!
//! Encoding rules:
//! - unsigned varint: LEB128, least significant 7-bit group first
//! - signed varint: zigzag, then unsigned varint
//! - float64: 8 bytes IEEE 754 little-endian
//! - string: varint(count << 1 | wide) + count bytes (narrow, UTF-8) or
//!   count UTF-16LE code units (wide)

use qjs_serde_buffers::{Reader, Writer};

use crate::error::{Error, Result};

/// Longest LEB128 sequence accepted for a 64-bit accumulator.
const MAX_VARINT_LEN: usize = 10;

/// Largest character count a string header can carry.
const MAX_STRING_LEN: usize = (u32::MAX >> 1) as usize;

fn read_uvarint64(reader: &mut Reader<'_>) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let b = reader.u8()?;
        if b < 0x80 {
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                break;
            }
            return Ok(result | (b as u64) << shift);
        }
        result |= ((b & 0x7f) as u64) << shift;
        shift += 7;
    }
    Err(Error::Overflow("varint".into()))
}

/// Reads an unsigned varint that must fit in 32 bits.
pub fn read_uvarint(reader: &mut Reader<'_>) -> Result<u32> {
    let v = read_uvarint64(reader)?;
    u32::try_from(v).map_err(|_| Error::Overflow(format!("uint32 {v}")))
}

/// Reads a zigzag varint that must fit in 32 bits signed.
pub fn read_svarint(reader: &mut Reader<'_>) -> Result<i32> {
    let encoded = read_uvarint64(reader)?;
    let v = ((encoded >> 1) as i64) ^ -((encoded & 1) as i64);
    i32::try_from(v).map_err(|_| Error::Overflow(format!("int32 {v}")))
}

/// Reads a little-endian float64, sign of zero included.
pub fn read_f64(reader: &mut Reader<'_>) -> Result<f64> {
    Ok(reader.f64()?)
}

/// Reads a length-prefixed narrow (UTF-8) or wide (UTF-16LE) string.
pub fn read_string(reader: &mut Reader<'_>) -> Result<String> {
    let header = read_uvarint(reader)?;
    let wide = header & 1 == 1;
    let count = (header >> 1) as usize;
    if wide {
        let bytes = reader.buf(count * 2)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    } else {
        Ok(reader.utf8(count)?.to_owned())
    }
}

/// Writes an unsigned varint.
pub fn write_uvarint(writer: &mut Writer, mut n: u32) {
    loop {
        let low7 = (n & 0x7f) as u8;
        n >>= 7;
        if n == 0 {
            writer.u8(low7);
            return;
        }
        writer.u8(low7 | 0x80);
    }
}

/// Writes a zigzag-encoded signed varint.
pub fn write_svarint(writer: &mut Writer, n: i32) {
    write_uvarint(writer, ((n << 1) ^ (n >> 31)) as u32);
}

/// Writes a collection length, which the format caps at 32 bits.
pub fn write_len(writer: &mut Writer, len: usize, what: &str) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| Error::Overflow(format!("{what} length {len}")))?;
    write_uvarint(writer, len);
    Ok(())
}

/// Writes a little-endian float64.
pub fn write_f64(writer: &mut Writer, f: f64) {
    writer.f64(f);
}

/// Writes a string: ASCII text narrow, anything else as UTF-16LE.
pub fn write_string(writer: &mut Writer, s: &str) -> Result<()> {
    if s.is_ascii() {
        let header = string_header(s.len(), false)?;
        write_uvarint(writer, header);
        writer.utf8(s);
    } else {
        let units: Vec<u16> = s.encode_utf16().collect();
        let header = string_header(units.len(), true)?;
        write_uvarint(writer, header);
        for unit in units {
            writer.u16(unit);
        }
    }
    Ok(())
}

fn string_header(count: usize, wide: bool) -> Result<u32> {
    if count > MAX_STRING_LEN {
        return Err(Error::Overflow(format!("string length {count}")));
    }
    Ok((count as u32) << 1 | wide as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<F: FnOnce(&mut Writer)>(f: F) -> Vec<u8> {
        let mut writer = Writer::new();
        f(&mut writer);
        writer.flush()
    }

    #[test]
    fn uvarint_wire_matrix() {
        assert_eq!(encode(|w| write_uvarint(w, 0)), [0]);
        assert_eq!(encode(|w| write_uvarint(w, 127)), [0x7f]);
        assert_eq!(encode(|w| write_uvarint(w, 128)), [0x80, 0x01]);
        assert_eq!(encode(|w| write_uvarint(w, 300)), [0xac, 0x02]);
        assert_eq!(
            encode(|w| write_uvarint(w, u32::MAX)),
            [0xff, 0xff, 0xff, 0xff, 0x0f]
        );
    }

    #[test]
    fn uvarint_rejects_values_above_u32() {
        let data = [0x80, 0x80, 0x80, 0x80, 0x10];
        let mut reader = Reader::new(&data);
        assert!(matches!(read_uvarint(&mut reader), Err(Error::Overflow(_))));
    }

    #[test]
    fn uvarint_rejects_overlong_sequences() {
        let data = [0xff; 11];
        let mut reader = Reader::new(&data);
        assert!(matches!(read_uvarint(&mut reader), Err(Error::Overflow(_))));

        let mut data = vec![0xff; 9];
        data.push(0x02);
        let mut reader = Reader::new(&data);
        assert!(matches!(read_uvarint(&mut reader), Err(Error::Overflow(_))));
    }

    #[test]
    fn uvarint_truncated() {
        let data = [0x80, 0x80];
        let mut reader = Reader::new(&data);
        assert!(matches!(read_uvarint(&mut reader), Err(Error::StreamTruncated)));
    }

    #[test]
    fn svarint_zigzag() {
        assert_eq!(encode(|w| write_svarint(w, 42)), [84]);
        assert_eq!(encode(|w| write_svarint(w, -1)), [1]);
        assert_eq!(encode(|w| write_svarint(w, 0)), [0]);

        let mut reader = Reader::new(&[84]);
        assert_eq!(read_svarint(&mut reader).unwrap(), 42);
        let mut reader = Reader::new(&[3]);
        assert_eq!(read_svarint(&mut reader).unwrap(), -2);
    }

    #[test]
    fn svarint_range_checked() {
        let bytes = encode(|w| write_uvarint(w, u32::MAX));
        let mut reader = Reader::new(&bytes);
        assert_eq!(read_svarint(&mut reader).unwrap(), i32::MIN);

        // zigzag(2^31) = 2^32 does not fit in an i32
        let data = [0x80, 0x80, 0x80, 0x80, 0x10];
        let mut reader = Reader::new(&data);
        assert!(matches!(read_svarint(&mut reader), Err(Error::Overflow(_))));
    }

    #[test]
    fn f64_sign_of_zero() {
        let mut reader = Reader::new(&[0, 0, 0, 0, 0, 0, 0, 0]);
        let pos = read_f64(&mut reader).unwrap();
        let mut reader = Reader::new(&[0, 0, 0, 0, 0, 0, 0, 128]);
        let neg = read_f64(&mut reader).unwrap();
        assert_eq!(pos.to_bits(), 0);
        assert_eq!(neg.to_bits(), 1 << 63);
        assert_ne!(pos.to_bits(), neg.to_bits());
    }

    #[test]
    fn narrow_and_wide_strings() {
        let mut reader = Reader::new(&[4, 111, 107]);
        assert_eq!(read_string(&mut reader).unwrap(), "ok");

        let mut reader = Reader::new(&[5, 61, 216, 45, 222]);
        assert_eq!(read_string(&mut reader).unwrap(), "😭");
    }

    #[test]
    fn string_writer_picks_layout() {
        assert_eq!(encode(|w| write_string(w, "ok").unwrap()), [4, 111, 107]);
        assert_eq!(
            encode(|w| write_string(w, "😭").unwrap()),
            [5, 61, 216, 45, 222]
        );
        assert_eq!(encode(|w| write_string(w, "é").unwrap()), [3, 0xe9, 0]);
    }

    #[test]
    fn lone_surrogate_becomes_replacement() {
        let mut reader = Reader::new(&[3, 0x3d, 0xd8]);
        assert_eq!(read_string(&mut reader).unwrap(), "\u{fffd}");
    }

    #[test]
    fn narrow_invalid_utf8() {
        let mut reader = Reader::new(&[2, 0xff]);
        assert!(matches!(read_string(&mut reader), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn string_truncated() {
        let mut reader = Reader::new(&[10, b'a', b'b']);
        assert!(matches!(read_string(&mut reader), Err(Error::StreamTruncated)));
    }
}
