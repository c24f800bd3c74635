//! Radio packet layout.
//!
//! Every frame on the air starts with a four byte header:
//!
//! | byte | meaning |
//! |------|---------|
//! | 0    | destination (reserved for the mail layer) |
//! | 1    | sender address |
//! | 2    | message identifier |
//! | 3    | flags (reserved for the mail layer) |
//!
//! Payload bytes follow the header.

use crate::address::NodeAddress;

pub const HEADER_LEN: usize = 4;

/// Set on acknowledgement frames.
pub const FLAG_ACK: u8 = 0x80;
/// Set on retransmissions so receivers can drop duplicates.
pub const FLAG_RETRY: u8 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub destination: NodeAddress,
    pub sender: NodeAddress,
    pub id: u8,
    pub flags: u8,
}

impl PacketHeader {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [destination, sender, id, flags, ..] => Some(Self {
                destination: *destination,
                sender: *sender,
                id: *id,
                flags: *flags,
            }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        [self.destination, self.sender, self.id, self.flags]
    }

    pub fn is_ack(&self) -> bool {
        self.flags & FLAG_ACK != 0
    }

    pub fn is_retry(&self) -> bool {
        self.flags & FLAG_RETRY != 0
    }
}

/// A received frame, header included, as handed up by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet(Vec<u8>);

impl Packet {
    pub fn new(header: &PacketHeader, payload: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(payload);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` when the frame is shorter than a header.
    pub fn header(&self) -> Option<PacketHeader> {
        PacketHeader::parse(&self.0)
    }

    pub fn payload(&self) -> &[u8] {
        self.0.get(HEADER_LEN..).unwrap_or_default()
    }
}

impl From<Vec<u8>> for Packet {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Packet {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
