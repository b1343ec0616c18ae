use crate::error::CodecError;

/// A bounds-checked cursor over an incoming wire payload.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let [byte] = *self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], CodecError> {
        if length > self.remaining() {
            return Err(CodecError::LengthOverrun {
                length,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + length];
        self.cursor += length;
        Ok(slice)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(*self.read_array::<2>()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(*self.read_array::<4>()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(*self.read_array::<8>()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_le_bytes(*self.read_array::<8>()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(f64::from_le_bytes(*self.read_array::<8>()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<&'a [u8; N], CodecError> {
        if N > self.remaining() {
            return Err(CodecError::BufferExhausted {
                needed: N - self.remaining(),
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + N];
        self.cursor += N;
        // length is checked above, the conversion cannot fail
        Ok(slice.try_into().unwrap())
    }
}
