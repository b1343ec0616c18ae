use vizsync_codec::{ByteReader, ByteWriter, CodecError, Variant, Wire};

use crate::ident::GlobalId;

const TAG_NEW: u8 = 0;
const TAG_INVOKE: u8 = 1;
const TAG_DELETE: u8 = 2;

/// One step of an instruction stream.
///
/// Arguments are self-describing [`Variant`]s, so the same wire format serves
/// heterogeneous remote method signatures.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Instantiate native class `class` on the receiving process, registering
    /// it under `id`.
    New { id: GlobalId, class: String },
    /// Invoke `method` on the object registered under `id`.
    Invoke {
        id: GlobalId,
        method: String,
        args: Vec<Variant>,
    },
    /// Remove the object registered under `id`. Deleting an already-absent id
    /// is a no-op on the receiving side, not an error.
    Delete { id: GlobalId },
}

impl Instruction {
    pub fn target(&self) -> GlobalId {
        match self {
            Instruction::New { id, .. } => *id,
            Instruction::Invoke { id, .. } => *id,
            Instruction::Delete { id } => *id,
        }
    }
}

impl Wire for Instruction {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            Instruction::New { id, class } => {
                writer.write_u8(TAG_NEW);
                id.ser(writer);
                class.ser(writer);
            }
            Instruction::Invoke { id, method, args } => {
                writer.write_u8(TAG_INVOKE);
                id.ser(writer);
                method.ser(writer);
                args.ser(writer);
            }
            Instruction::Delete { id } => {
                writer.write_u8(TAG_DELETE);
                id.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            TAG_NEW => Ok(Instruction::New {
                id: GlobalId::de(reader)?,
                class: String::de(reader)?,
            }),
            TAG_INVOKE => Ok(Instruction::Invoke {
                id: GlobalId::de(reader)?,
                method: String::de(reader)?,
                args: Vec::de(reader)?,
            }),
            TAG_DELETE => Ok(Instruction::Delete {
                id: GlobalId::de(reader)?,
            }),
            tag => Err(CodecError::InvalidTag {
                context: "instruction",
                tag,
            }),
        }
    }
}
