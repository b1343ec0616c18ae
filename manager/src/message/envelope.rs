use vizsync_codec::{ByteReader, ByteWriter, CodecError, Wire};

use crate::ident::{GlobalId, Location};

use super::{proxy_state::ProxyState, stream::Stream};

const TAG_INSTRUCTIONS: u8 = 0;
const TAG_STATE: u8 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An ordered instruction stream, executed against already-known objects.
    Instructions(Stream),
    /// A full-state snapshot, applied as a whole. This is the form undo/redo
    /// snapshots travel in.
    State(ProxyState),
}

/// The message envelope: a global id naming the addressed object, a location
/// mask naming the process roles that must execute it, and the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub global_id: GlobalId,
    pub location: Location,
    pub payload: Payload,
}

impl Message {
    pub fn instructions(global_id: GlobalId, location: Location, stream: Stream) -> Self {
        Self {
            global_id,
            location,
            payload: Payload::Instructions(stream),
        }
    }

    pub fn state(location: Location, state: ProxyState) -> Self {
        Self {
            global_id: state.global_id,
            location,
            payload: Payload::State(state),
        }
    }

    /// The same message re-addressed to a different effective location.
    pub fn retargeted(&self, location: Location) -> Self {
        Self {
            global_id: self.global_id,
            location,
            payload: self.payload.clone(),
        }
    }
}

impl Wire for Message {
    fn ser(&self, writer: &mut ByteWriter) {
        self.global_id.ser(writer);
        self.location.ser(writer);
        match &self.payload {
            Payload::Instructions(stream) => {
                writer.write_u8(TAG_INSTRUCTIONS);
                stream.ser(writer);
            }
            Payload::State(state) => {
                writer.write_u8(TAG_STATE);
                state.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        let global_id = GlobalId::de(reader)?;
        let location = Location::de(reader)?;
        let payload = match reader.read_u8()? {
            TAG_INSTRUCTIONS => Payload::Instructions(Stream::de(reader)?),
            TAG_STATE => Payload::State(ProxyState::de(reader)?),
            tag => {
                return Err(CodecError::InvalidTag {
                    context: "message payload",
                    tag,
                })
            }
        };
        Ok(Message {
            global_id,
            location,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::instruction::Instruction;

    #[test]
    fn envelope_round_trip() {
        let mut stream = Stream::new();
        stream.append(Instruction::New {
            id: GlobalId::from_value(400),
            class: "ConeSource".to_string(),
        });
        let message = Message::instructions(
            GlobalId::from_value(400),
            Location::DATA_SERVER | Location::RENDER_SERVER,
            stream,
        );

        let mut writer = ByteWriter::new();
        message.ser(&mut writer);
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(Message::de(&mut reader).unwrap(), message);
    }

    #[test]
    fn retarget_preserves_payload_and_id() {
        let message = Message::instructions(
            GlobalId::from_value(7),
            Location::RENDER_SERVER,
            Stream::new(),
        );
        let demoted = message.retargeted(Location::DATA_SERVER);
        assert_eq!(demoted.global_id, message.global_id);
        assert_eq!(demoted.payload, message.payload);
        assert_eq!(demoted.location, Location::DATA_SERVER);
    }
}
