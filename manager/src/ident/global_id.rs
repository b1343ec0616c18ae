use serde::{Deserialize, Serialize};
use vizsync_codec::{ByteReader, ByteWriter, CodecError, Wire};

/// Process-wide unique identifier for a remote-capable object.
///
/// Allocated by the owning [`Session`](crate::Session), never reused while
/// the session lives, and used as the join key between client state and
/// server state.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(u64);

/// Ids at or below this value are reserved for session-scoped singletons.
pub const RESERVED_ID_MAX: u64 = 255;

impl GlobalId {
    /// The null reference, pushed by `null_on_empty` properties to explicitly
    /// clear a remote object's current input.
    pub const NULL: GlobalId = GlobalId(0);

    pub fn from_value(value: u64) -> Self {
        GlobalId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn is_reserved(&self) -> bool {
        self.0 <= RESERVED_ID_MAX
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "gid:{}", self.0)
    }
}

impl Wire for GlobalId {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(GlobalId(reader.read_u64()?))
    }
}
