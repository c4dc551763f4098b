use proptest::prelude::*;
use qjs_serde::{decode, encode, Object, TypedArray, Value};

fn arb_typed_array() -> impl Strategy<Value = TypedArray> {
    let ints = prop_oneof![
        prop::collection::vec(any::<u8>(), 0..8).prop_map(TypedArray::Uint8Clamped),
        prop::collection::vec(any::<i8>(), 0..8).prop_map(TypedArray::Int8),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(TypedArray::Uint8),
        prop::collection::vec(any::<i16>(), 0..8).prop_map(TypedArray::Int16),
        prop::collection::vec(any::<u16>(), 0..8).prop_map(TypedArray::Uint16),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(TypedArray::Int32),
        prop::collection::vec(any::<u32>(), 0..8).prop_map(TypedArray::Uint32),
    ];
    let wide = prop_oneof![
        prop::collection::vec(any::<i64>(), 0..8).prop_map(TypedArray::BigInt64),
        prop::collection::vec(any::<u64>(), 0..8).prop_map(TypedArray::BigUint64),
        prop::collection::vec(-1.0e6f32..1.0e6, 0..8).prop_map(TypedArray::Float32),
        prop::collection::vec(-1.0e12f64..1.0e12, 0..8).prop_map(TypedArray::Float64),
    ];
    prop_oneof![ints, wide]
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,6}",
        (0u32..100_000).prop_map(|n| n.to_string()),
        (-100i32..0).prop_map(|n| n.to_string()),
        "\\PC{1,4}",
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        Just(Value::Undefined),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int32),
        any::<f64>()
            .prop_filter("NaN is not equal to itself", |f| !f.is_nan())
            .prop_map(Value::Float64),
        "\\PC{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::ArrayBuffer),
        arb_typed_array().prop_map(Value::TypedArray),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Object>())),
        ]
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(value in arb_value()) {
        let bytes = encode(&value).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn encoding_is_deterministic(value in arb_value()) {
        prop_assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
    }

    #[test]
    fn arbitrary_bytes_never_panic(tail in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut bytes = vec![qjs_serde::VERSION];
        bytes.extend(tail);
        let _ = decode(&bytes);
    }
}
