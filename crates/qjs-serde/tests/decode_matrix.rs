use qjs_serde::{decode, read_value, read_value_with, Error, Options, TypedArray, Value, VERSION};

fn object(pairs: &[(&str, Value)]) -> Value {
    pairs.iter().cloned().collect()
}

#[test]
fn decode_value_matrix() {
    let cases: Vec<(Vec<u8>, Value)> = vec![
        (vec![VERSION, 0, 1], Value::Null),
        (vec![VERSION, 0, 2], Value::Undefined),
        (vec![VERSION, 0, 3], Value::Bool(false)),
        (vec![VERSION, 0, 4], Value::Bool(true)),
        (vec![VERSION, 0, 5, 84], Value::Int32(42)),
        (
            vec![VERSION, 0, 6, 61, 10, 215, 163, 112, 189, 42, 64],
            Value::Float64(13.37),
        ),
        (vec![VERSION, 0, 7, 4, 111, 107], Value::from("ok")),
        (vec![VERSION, 0, 7, 5, 61, 216, 45, 222], Value::from("😭")),
        (vec![VERSION, 0, 9, 0], Value::Array(vec![])),
        (vec![VERSION, 0, 9, 1, 1], Value::Array(vec![Value::Null])),
        (vec![VERSION, 0, 15, 0], Value::ArrayBuffer(vec![])),
        (vec![VERSION, 0, 15, 1, 42], Value::ArrayBuffer(vec![42])),
        (
            vec![VERSION, 0, 14, 2, 1, 0, 15, 1, 42],
            Value::TypedArray(TypedArray::Uint8(vec![42])),
        ),
        (
            vec![VERSION, 1, 2, 107, 8, 1, 2, 1],
            object(&[("k", Value::Null)]),
        ),
        (vec![VERSION, 0, 8, 1, 85, 1], object(&[("42", Value::Null)])),
        (
            vec![VERSION, 1, 6, 45, 52, 50, 8, 1, 2, 1],
            object(&[("-42", Value::Null)]),
        ),
    ];
    for (bytes, expected) in cases {
        assert_eq!(decode(&bytes).unwrap(), expected, "bytes {bytes:?}");
    }
}

#[test]
fn float_sign_of_zero_matrix() {
    let pos = decode(&[VERSION, 0, 6, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
    let neg = decode(&[VERSION, 0, 6, 0, 0, 0, 0, 0, 0, 0, 128]).unwrap();
    match (pos, neg) {
        (Value::Float64(p), Value::Float64(n)) => {
            assert!(p.is_sign_positive());
            assert!(n.is_sign_negative());
            assert_ne!(p.to_bits(), n.to_bits());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn version_mismatch_matrix() {
    let payloads: [&[u8]; 4] = [&[0, 1], &[0, 5, 84], &[1, 2, 107, 8, 1, 2, 1], &[]];
    for version in [0u8, 1, 11, 13, 0xff] {
        for payload in payloads {
            let mut bytes = vec![version];
            bytes.extend_from_slice(payload);
            assert!(
                matches!(
                    decode(&bytes),
                    Err(Error::VersionMismatch { found, expected: VERSION }) if found == version
                ),
                "bytes {bytes:?}"
            );
        }
    }
}

#[test]
fn typed_array_kind_matrix() {
    let cases: Vec<(Vec<u8>, TypedArray)> = vec![
        (vec![0, 2, 0, 15, 2, 0, 255], TypedArray::Uint8Clamped(vec![0, 255])),
        (vec![1, 1, 0, 15, 1, 0xff], TypedArray::Int8(vec![-1])),
        (vec![3, 1, 0, 15, 1, 0xfe, 0xff], TypedArray::Int16(vec![-2])),
        (vec![4, 1, 0, 15, 1, 0x34, 0x12], TypedArray::Uint16(vec![0x1234])),
        (vec![5, 1, 0, 15, 1, 0xff, 0xff, 0xff, 0xff], TypedArray::Int32(vec![-1])),
        (vec![6, 1, 0, 15, 1, 1, 0, 0, 0], TypedArray::Uint32(vec![1])),
        (
            vec![7, 1, 0, 15, 1, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            TypedArray::BigInt64(vec![-1]),
        ),
        (
            vec![8, 1, 0, 15, 1, 2, 0, 0, 0, 0, 0, 0, 0],
            TypedArray::BigUint64(vec![2]),
        ),
        (vec![9, 1, 0, 15, 1, 0, 0, 0xc0, 0x3f], TypedArray::Float32(vec![1.5])),
        (
            vec![10, 1, 0, 15, 1, 0, 0, 0, 0, 0, 0, 0xf8, 0x3f],
            TypedArray::Float64(vec![1.5]),
        ),
    ];
    for (payload, expected) in cases {
        let mut bytes = vec![VERSION, 0, 14];
        bytes.extend_from_slice(&payload);
        assert_eq!(
            decode(&bytes).unwrap(),
            Value::TypedArray(expected),
            "payload {payload:?}"
        );
    }
}

#[test]
fn nested_count_is_element_count() {
    // Int16Array [1, -1]: two elements, nested count 2, four element bytes
    assert_eq!(
        decode(&[VERSION, 0, 14, 3, 2, 0, 15, 2, 0x01, 0x00, 0xff, 0xff]).unwrap(),
        Value::TypedArray(TypedArray::Int16(vec![1, -1]))
    );
}

#[test]
fn typed_array_error_matrix() {
    // nested buffer declares 2 bytes for a single Uint8 element
    assert!(matches!(
        decode(&[VERSION, 0, 14, 2, 1, 0, 15, 2, 42, 43]),
        Err(Error::SizeMismatch { expected: 1, found: 2 })
    ));
    // the nested count is in elements, not bytes
    assert!(matches!(
        decode(&[VERSION, 0, 14, 4, 1, 0, 15, 2, 42, 43]),
        Err(Error::SizeMismatch { expected: 1, found: 2 })
    ));
    assert!(matches!(
        decode(&[VERSION, 0, 14, 11, 0, 0, 15, 0]),
        Err(Error::BadTypedArrayTag(11))
    ));
    assert!(matches!(
        decode(&[VERSION, 0, 14, 2, 1, 0, 9, 1, 42]),
        Err(Error::StructuralError(_))
    ));
}

#[test]
fn object_key_error_matrix() {
    // atom index 0 is reserved
    assert!(matches!(
        decode(&[VERSION, 1, 2, 107, 8, 1, 0, 1]),
        Err(Error::AtomOutOfRange(0))
    ));
    // atom 2 of a one-entry table
    assert!(matches!(
        decode(&[VERSION, 1, 2, 107, 8, 1, 4, 1]),
        Err(Error::AtomOutOfRange(2))
    ));
}

#[test]
fn truncation_matrix() {
    let full: [&[u8]; 5] = [
        &[VERSION, 0, 5, 84],
        &[VERSION, 0, 6, 61, 10, 215, 163, 112, 189, 42, 64],
        &[VERSION, 0, 7, 4, 111, 107],
        &[VERSION, 0, 15, 1, 42],
        &[VERSION, 1, 2, 107, 8, 1, 2, 1],
    ];
    for bytes in full {
        for end in 1..bytes.len() {
            assert!(
                matches!(decode(&bytes[..end]), Err(Error::StreamTruncated)),
                "prefix {:?}",
                &bytes[..end]
            );
        }
    }
}

#[test]
fn int32_overflow() {
    // zigzag 2^32 is outside the int32 range
    assert!(matches!(
        decode(&[VERSION, 0, 5, 0x80, 0x80, 0x80, 0x80, 0x10]),
        Err(Error::Overflow(_))
    ));
}

#[test]
fn deep_nesting_fails_cleanly() {
    let mut bytes = vec![VERSION, 0];
    for _ in 0..100_000 {
        bytes.extend_from_slice(&[9, 1]);
    }
    bytes.push(1);
    assert!(matches!(decode(&bytes), Err(Error::DepthExceeded(1000))));
}

#[test]
fn read_value_from_reader() {
    let bytes: &[u8] = &[VERSION, 0, 5, 84];
    assert_eq!(read_value(bytes).unwrap(), Value::Int32(42));
    let truncated: &[u8] = &[VERSION, 0, 5];
    assert!(matches!(read_value(truncated), Err(Error::StreamTruncated)));
}

#[test]
fn read_value_honors_max_depth() {
    let bytes: &[u8] = &[VERSION, 0, 9, 1, 9, 0];
    let options = Options::default().with_max_depth(1);
    assert!(matches!(
        read_value_with(bytes, &options),
        Err(Error::DepthExceeded(1))
    ));
    let options = Options::default().with_max_depth(2);
    assert_eq!(
        read_value_with(bytes, &options).unwrap(),
        Value::Array(vec![Value::Array(vec![])])
    );
}

#[test]
fn error_messages() {
    let err = decode(&[VERSION, 0, 18]).unwrap_err();
    assert_eq!(err.to_string(), "unsupported tag: date");
    let err = decode(&[VERSION, 0, 42]).unwrap_err();
    assert_eq!(err.to_string(), "unsupported tag: unknown tag 42");
}
