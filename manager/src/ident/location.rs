use serde::{Deserialize, Serialize};
use vizsync_codec::{ByteReader, ByteWriter, CodecError, Wire};

/// Bitmask selecting which process role(s) a message or object targets.
///
/// Every message and every remote object carries one. A message's effective
/// location is the intersection of its explicit location and the capability
/// of the active session; a session with no render server re-routes
/// render-server traffic to the data server before that intersection.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(u8);

impl Location {
    pub const NONE: Location = Location(0);
    pub const CLIENT: Location = Location(0x01);
    pub const DATA_SERVER: Location = Location(0x02);
    pub const DATA_SERVER_ROOT: Location = Location(0x04);
    pub const RENDER_SERVER: Location = Location(0x08);
    pub const RENDER_SERVER_ROOT: Location = Location(0x10);

    pub const SERVERS: Location = Location(0x02 | 0x08);
    pub const CLIENT_AND_SERVERS: Location = Location(0x01 | 0x02 | 0x08);

    pub fn from_bits(bits: u8) -> Self {
        Location(bits & 0x1F)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Location) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(&self, other: Location) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: Location) -> Location {
        Location(self.0 | other.0)
    }

    pub fn intersection(&self, other: Location) -> Location {
        Location(self.0 & other.0)
    }

    /// Re-target render-server bits onto the corresponding data-server bits.
    ///
    /// Applied by sessions without a render-server connection so render-only
    /// traffic degrades gracefully to a combined data+render process.
    pub fn demote_render_to_data(&self) -> Location {
        let mut bits = self.0 & !(Self::RENDER_SERVER.0 | Self::RENDER_SERVER_ROOT.0);
        if self.contains(Self::RENDER_SERVER) {
            bits |= Self::DATA_SERVER.0;
        }
        if self.contains(Self::RENDER_SERVER_ROOT) {
            bits |= Self::DATA_SERVER_ROOT.0;
        }
        Location(bits)
    }
}

impl std::ops::BitOr for Location {
    type Output = Location;

    fn bitor(self, rhs: Location) -> Location {
        self.union(rhs)
    }
}

impl std::ops::BitAnd for Location {
    type Output = Location;

    fn bitand(self, rhs: Location) -> Location {
        self.intersection(rhs)
    }
}

impl std::fmt::Debug for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const NAMES: [(u8, &str); 5] = [
            (0x01, "CLIENT"),
            (0x02, "DATA_SERVER"),
            (0x04, "DATA_SERVER_ROOT"),
            (0x08, "RENDER_SERVER"),
            (0x10, "RENDER_SERVER_ROOT"),
        ];
        if self.0 == 0 {
            return write!(f, "NONE");
        }
        let mut first = true;
        for (bit, name) in NAMES {
            if self.0 & bit != 0 {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Wire for Location {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        Ok(Location::from_bits(reader.read_u8()?))
    }
}
