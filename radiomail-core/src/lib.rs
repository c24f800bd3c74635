//! Core library for radiomail
//!
//! This crate holds the store-and-forward logic of a packet radio mail node:
//! turning inbound packets into inbox messages, acknowledged sends with a
//! retry queue for undelivered mail, and the two-state command machine that
//! sits between the operator's text commands and the radio transport.

pub mod address;
pub mod command;
pub mod delivery;
pub mod driver;
pub mod error;
pub mod mailbox;
pub mod packet;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use anyhow::Result;
pub use address::{BROADCAST_ADDRESS, NodeAddress};
pub use driver::{Driver, Event, LinePoll, LineSource};
pub use error::CommandError;
pub use session::{Reply, Session, State};
pub use transport::air::UdpAir;
pub use transport::{RadioConfig, Transport, TransportError};
