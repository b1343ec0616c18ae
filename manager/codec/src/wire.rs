use crate::{error::CodecError, reader::ByteReader, writer::ByteWriter};

/// Serialization contract for everything that crosses the process boundary.
///
/// Implementations must be symmetric: `de` applied to the bytes produced by
/// `ser` yields an equal value. The format is only guaranteed stable within
/// one protocol version.
pub trait Wire: Sized {
    fn ser(&self, writer: &mut ByteWriter);
    fn de(reader: &mut ByteReader) -> Result<Self, CodecError>;
}

impl Wire for bool {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(*self as u8);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(CodecError::InvalidTag {
                context: "bool",
                tag,
            }),
        }
    }
}

impl Wire for u8 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_u8()
    }
}

impl Wire for u16 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u16(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_u16()
    }
}

impl Wire for u32 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_u32()
    }
}

impl Wire for u64 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u64(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_u64()
    }
}

impl Wire for i64 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i64(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_i64()
    }
}

impl Wire for f64 {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_f64(*self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        reader.read_f64()
    }
}

impl Wire for String {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.len() as u32);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        let length = reader.read_u32()? as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<T: Wire> Wire for Vec<T> {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.len() as u32);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        let length = reader.read_u32()? as usize;
        let mut output = Vec::with_capacity(length.min(4096));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

impl<T: Wire> Wire for Option<T> {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            None => writer.write_u8(0),
            Some(value) => {
                writer.write_u8(1);
                value.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::de(reader)?)),
            tag => Err(CodecError::InvalidTag {
                context: "option",
                tag,
            }),
        }
    }
}

impl<T: Wire, U: Wire> Wire for (T, U) {
    fn ser(&self, writer: &mut ByteWriter) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok((T::de(reader)?, U::de(reader)?))
    }
}
