use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::CodecError, reader::ByteReader, wire::Wire, writer::ByteWriter};

const TAG_INT: u8 = 0;
const TAG_FLOAT64: u8 = 1;
const TAG_STRING: u8 = 2;
const TAG_ID: u8 = 3;
const TAG_OBJECT: u8 = 4;

/// A self-describing argument value.
///
/// Every argument on the wire is tagged with its type, so one instruction
/// format serves heterogeneous remote method signatures. Object references
/// carry the referenced object's global id; resolution from logical proxy
/// handles to ids happens before a Variant is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Int(i64),
    Float64(f64),
    Str(String),
    /// An id-typed integer (array sizes, element counts)
    Id(u64),
    /// A reference to another remote object, by global id
    Object(u64),
}

impl Variant {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Variant::Int(_) => "Int",
            Variant::Float64(_) => "Float64",
            Variant::Str(_) => "Str",
            Variant::Id(_) => "Id",
            Variant::Object(_) => "Object",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Float64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            Variant::Id(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<u64> {
        match self {
            Variant::Object(value) => Some(*value),
            _ => None,
        }
    }
}

impl Wire for Variant {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            Variant::Int(value) => {
                writer.write_u8(TAG_INT);
                writer.write_i64(*value);
            }
            Variant::Float64(value) => {
                writer.write_u8(TAG_FLOAT64);
                writer.write_f64(*value);
            }
            Variant::Str(value) => {
                writer.write_u8(TAG_STRING);
                value.ser(writer);
            }
            Variant::Id(value) => {
                writer.write_u8(TAG_ID);
                writer.write_u64(*value);
            }
            Variant::Object(value) => {
                writer.write_u8(TAG_OBJECT);
                writer.write_u64(*value);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            TAG_INT => Ok(Variant::Int(reader.read_i64()?)),
            TAG_FLOAT64 => Ok(Variant::Float64(reader.read_f64()?)),
            TAG_STRING => Ok(Variant::Str(String::de(reader)?)),
            TAG_ID => Ok(Variant::Id(reader.read_u64()?)),
            TAG_OBJECT => Ok(Variant::Object(reader.read_u64()?)),
            tag => Err(CodecError::InvalidTag {
                context: "variant",
                tag,
            }),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variant::Int(value) => write!(f, "{}", value),
            Variant::Float64(value) => write!(f, "{}", value),
            Variant::Str(value) => write!(f, "{:?}", value),
            Variant::Id(value) => write!(f, "#{}", value),
            Variant::Object(value) => write!(f, "@{}", value),
        }
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float64(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}
