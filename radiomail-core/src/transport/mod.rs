//! Radio transport contract.
//!
//! The mail layer only ever talks to the radio through [`Transport`], so the
//! simulated air in [`air`] and the scripted doubles used in tests are
//! interchangeable.

pub mod air;

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::address::NodeAddress;
use crate::packet::Packet;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("radio I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("base port {base} leaves no room for 256 node addresses")]
    PortRange { base: u16 },
}

/// Half-duplex packet radio.
///
/// `receive` waits at most the configured receive timeout; `send` frames the
/// payload to the current destination and, with `with_ack`, reports whether
/// an acknowledgement came back within the ack window.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn receive(&mut self) -> Result<Option<Packet>, TransportError>;

    async fn send(&mut self, payload: &[u8], with_ack: bool) -> Result<bool, TransportError>;

    fn node_address(&self) -> NodeAddress;

    fn set_node_address(&mut self, address: NodeAddress) -> Result<(), TransportError>;

    fn destination(&self) -> NodeAddress;

    fn set_destination(&mut self, address: NodeAddress);
}

/// Radio parameters shared by every transport implementation.
#[derive(Debug, Clone, Serialize)]
pub struct RadioConfig {
    pub node_address: NodeAddress,
    pub destination: NodeAddress,
    /// How long one attempt waits for an ACK.
    pub ack_wait: Duration,
    /// Retransmissions after the first attempt.
    pub ack_retries: u32,
    /// Pause before answering a frame with an ACK.
    pub ack_delay: Duration,
    /// Upper bound on a single receive poll.
    pub receive_timeout: Duration,
    pub enable_crc: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            node_address: 2,
            destination: 1,
            ack_wait: Duration::from_millis(500),
            ack_retries: 2,
            ack_delay: Duration::from_millis(100),
            receive_timeout: Duration::from_millis(50),
            enable_crc: true,
        }
    }
}
