use serde::{Deserialize, Serialize};
use vizsync_codec::{ByteReader, ByteWriter, CodecError, Variant, Wire};

use crate::ident::{GlobalId, Location};

const TAG_ELEMENTS: u8 = 0;
const TAG_REFERENCES: u8 = 1;

/// The value side of a property snapshot.
///
/// Scalar-valued properties snapshot their element list; reference-valued
/// properties snapshot the referenced global ids, which the loader re-resolves
/// against live objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotValues {
    Elements(Vec<Variant>),
    References(Vec<GlobalId>),
}

impl Wire for SnapshotValues {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            SnapshotValues::Elements(elements) => {
                writer.write_u8(TAG_ELEMENTS);
                elements.ser(writer);
            }
            SnapshotValues::References(references) => {
                writer.write_u8(TAG_REFERENCES);
                references.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            TAG_ELEMENTS => Ok(SnapshotValues::Elements(Vec::de(reader)?)),
            TAG_REFERENCES => Ok(SnapshotValues::References(Vec::de(reader)?)),
            tag => Err(CodecError::InvalidTag {
                context: "snapshot values",
                tag,
            }),
        }
    }
}

/// One property's slice of a full-state message.
///
/// Snapshots are self-applying: they carry the remote command name alongside
/// the values, so a receiver (or an undo element) can re-apply them without
/// consulting the proxy definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub information_only: bool,
    pub values: SnapshotValues,
}

impl Wire for PropertySnapshot {
    fn ser(&self, writer: &mut ByteWriter) {
        self.name.ser(writer);
        self.command.ser(writer);
        self.information_only.ser(writer);
        self.values.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(PropertySnapshot {
            name: String::de(reader)?,
            command: String::de(reader)?,
            information_only: bool::de(reader)?,
            values: SnapshotValues::de(reader)?,
        })
    }
}

/// Complete snapshot of a proxy: every property's current value plus identity
/// and location.
///
/// This is the primitive undo/redo and session save/load are built on;
/// loading one must be able to re-create the proxy's entire configuration
/// with no other side channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyState {
    pub global_id: GlobalId,
    pub location: Location,
    /// Wire id of the wrapped native object, when the snapshot was taken
    /// from an instantiated proxy. Receivers apply property commands there.
    #[serde(default)]
    pub native_id: Option<GlobalId>,
    pub class_name: String,
    pub group: String,
    pub proxy_type: String,
    pub properties: Vec<PropertySnapshot>,
    #[serde(default)]
    pub sub_proxies: Vec<(String, ProxyState)>,
}

impl Wire for ProxyState {
    fn ser(&self, writer: &mut ByteWriter) {
        self.global_id.ser(writer);
        self.location.ser(writer);
        self.native_id.ser(writer);
        self.class_name.ser(writer);
        self.group.ser(writer);
        self.proxy_type.ser(writer);
        self.properties.ser(writer);
        self.sub_proxies.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(ProxyState {
            global_id: GlobalId::de(reader)?,
            location: Location::de(reader)?,
            native_id: Option::de(reader)?,
            class_name: String::de(reader)?,
            group: String::de(reader)?,
            proxy_type: String::de(reader)?,
            properties: Vec::de(reader)?,
            sub_proxies: Vec::de(reader)?,
        })
    }
}

impl ProxyState {
    pub fn property(&self, name: &str) -> Option<&PropertySnapshot> {
        self.properties.iter().find(|snapshot| snapshot.name == name)
    }
}
