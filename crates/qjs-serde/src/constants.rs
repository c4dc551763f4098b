//! Wire format constants.

/// The only serialization format version this crate reads and writes.
pub const VERSION: u8 = 12;

/// Default bound on Object/Array/TypedArray nesting.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// One-byte value tags, numbered as the engine numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Null = 1,
    Undefined = 2,
    False = 3,
    True = 4,
    Int32 = 5,
    Float64 = 6,
    String = 7,
    Object = 8,
    Array = 9,
    BigInt = 10,
    TemplateObject = 11,
    FunctionBytecode = 12,
    Module = 13,
    TypedArray = 14,
    ArrayBuffer = 15,
    SharedArrayBuffer = 16,
    RegExp = 17,
    Date = 18,
    ObjectValue = 19,
    ObjectReference = 20,
}

impl Tag {
    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Undefined => "undefined",
            Tag::False => "false",
            Tag::True => "true",
            Tag::Int32 => "int32",
            Tag::Float64 => "float64",
            Tag::String => "string",
            Tag::Object => "object",
            Tag::Array => "array",
            Tag::BigInt => "big integer",
            Tag::TemplateObject => "template object",
            Tag::FunctionBytecode => "function bytecode",
            Tag::Module => "module",
            Tag::TypedArray => "typed array",
            Tag::ArrayBuffer => "array buffer",
            Tag::SharedArrayBuffer => "shared array buffer",
            Tag::RegExp => "regexp",
            Tag::Date => "date",
            Tag::ObjectValue => "object value",
            Tag::ObjectReference => "object reference",
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Ok(match byte {
            1 => Tag::Null,
            2 => Tag::Undefined,
            3 => Tag::False,
            4 => Tag::True,
            5 => Tag::Int32,
            6 => Tag::Float64,
            7 => Tag::String,
            8 => Tag::Object,
            9 => Tag::Array,
            10 => Tag::BigInt,
            11 => Tag::TemplateObject,
            12 => Tag::FunctionBytecode,
            13 => Tag::Module,
            14 => Tag::TypedArray,
            15 => Tag::ArrayBuffer,
            16 => Tag::SharedArrayBuffer,
            17 => Tag::RegExp,
            18 => Tag::Date,
            19 => Tag::ObjectValue,
            20 => Tag::ObjectReference,
            other => return Err(other),
        })
    }
}
