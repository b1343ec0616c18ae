/// A growable writer for outgoing wire payloads.
///
/// Instruction streams have no fixed upper size (a single push may carry an
/// arbitrary number of invocations), so the buffer grows as needed rather
/// than being capped at a packet size.
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn bytes_written(&self) -> usize {
        self.buffer.len()
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_appended_in_order() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0xAB);
        writer.write_u16(0x0102);
        writer.write_u32(0x03040506);

        let bytes = writer.to_bytes();
        assert_eq!(bytes, vec![0xAB, 0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn writer_grows_past_initial_capacity() {
        let mut writer = ByteWriter::new();
        for _ in 0..10_000 {
            writer.write_u8(0xFF);
        }
        let bytes = writer.to_bytes();
        assert_eq!(bytes.len(), 10_000);
        assert!(bytes.iter().all(|&b| b == 0xFF));
    }
}
