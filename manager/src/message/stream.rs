use vizsync_codec::{ByteReader, ByteWriter, CodecError, Variant, Wire};

use crate::ident::GlobalId;

use super::instruction::Instruction;

/// An ordered sequence of instructions.
///
/// Instructions within one stream execute in append order on the receiving
/// process; ordering across independent streams is only guaranteed when both
/// are sent through the same session in sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    instructions: Vec<Instruction>,
}

impl Stream {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    pub fn append(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn invoke(&mut self, id: GlobalId, method: &str, args: Vec<Variant>) {
        self.instructions.push(Instruction::Invoke {
            id,
            method: method.to_string(),
            args,
        });
    }

    pub fn extend(&mut self, other: Stream) {
        self.instructions.extend(other.instructions);
    }

    pub fn iter(&self) -> std::slice::Iter<Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn reset(&mut self) {
        self.instructions.clear();
    }
}

impl Wire for Stream {
    fn ser(&self, writer: &mut ByteWriter) {
        self.instructions.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Stream {
            instructions: Vec::de(reader)?,
        })
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_order_survives_the_wire() {
        let mut stream = Stream::new();
        stream.append(Instruction::New {
            id: GlobalId::from_value(300),
            class: "SphereSource".to_string(),
        });
        stream.invoke(
            GlobalId::from_value(300),
            "SetRadius",
            vec![Variant::Float64(1.0)],
        );
        stream.append(Instruction::Delete {
            id: GlobalId::from_value(300),
        });

        let mut writer = ByteWriter::new();
        stream.ser(&mut writer);
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        let decoded = Stream::de(&mut reader).unwrap();
        assert_eq!(decoded, stream);
        assert_eq!(decoded.len(), 3);
    }
}
