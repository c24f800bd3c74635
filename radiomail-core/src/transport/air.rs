//! Simulated air over loopback UDP.
//!
//! Node `n` listens on `base_port + n`. A frame on the wire is the packet
//! header, the payload, and a big-endian CRC-16/CCITT-FALSE over both.
//! Broadcast frames are fanned out to every other node port.

use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, trace, warn};

use super::{RadioConfig, Transport, TransportError};
use crate::address::{BROADCAST_ADDRESS, NodeAddress};
use crate::packet::{FLAG_ACK, FLAG_RETRY, HEADER_LEN, Packet, PacketHeader};

pub const DEFAULT_AIR_PORT: u16 = 47000;

/// Largest payload one frame can carry.
pub const MAX_PAYLOAD: usize = 251;

const CRC_LEN: usize = 2;
const MAX_FRAME: usize = HEADER_LEN + MAX_PAYLOAD + CRC_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame of {len} bytes is shorter than header and CRC")]
    TooShort { len: usize },

    #[error("CRC mismatch: frame carries {carried:#06x}, computed {computed:#06x}")]
    BadCrc { carried: u16, computed: u16 },
}

/// CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF).
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

pub fn encode_frame(header: &PacketHeader, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);
    let crc = crc16_ccitt(&frame);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame
}

pub fn decode_frame(frame: &[u8], check_crc: bool) -> Result<(PacketHeader, &[u8]), FrameError> {
    if frame.len() < HEADER_LEN + CRC_LEN {
        return Err(FrameError::TooShort { len: frame.len() });
    }

    let (body, crc) = frame.split_at(frame.len() - CRC_LEN);
    if check_crc {
        let carried = u16::from_be_bytes([crc[0], crc[1]]);
        let computed = crc16_ccitt(body);
        if carried != computed {
            return Err(FrameError::BadCrc { carried, computed });
        }
    }

    let Some(header) = PacketHeader::parse(body) else {
        return Err(FrameError::TooShort { len: frame.len() });
    };
    Ok((header, &body[HEADER_LEN..]))
}

/// One node on the simulated air.
pub struct UdpAir {
    socket: UdpSocket,
    host: Ipv4Addr,
    base_port: u16,
    config: RadioConfig,
    sequence: u8,
    /// Last accepted message id per sender, for retry deduplication.
    seen: HashMap<NodeAddress, u8>,
    /// Data frames that arrived while a send was waiting for its ACK.
    backlog: VecDeque<Packet>,
}

impl UdpAir {
    pub async fn bind(config: RadioConfig, base_port: u16) -> Result<Self, TransportError> {
        if base_port > u16::MAX - u16::from(BROADCAST_ADDRESS) {
            return Err(TransportError::PortRange { base: base_port });
        }

        let host = Ipv4Addr::LOCALHOST;
        let socket = UdpSocket::bind(endpoint(host, base_port, config.node_address)).await?;
        info!(
            "Node {address} on the air at {local}",
            address = config.node_address,
            local = socket.local_addr()?
        );

        Ok(Self {
            socket,
            host,
            base_port,
            config,
            sequence: rand::random(),
            seen: HashMap::new(),
            backlog: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    async fn transmit(&self, destination: NodeAddress, frame: &[u8]) -> Result<(), TransportError> {
        if destination == BROADCAST_ADDRESS {
            for address in 0..BROADCAST_ADDRESS {
                if address != self.config.node_address {
                    self.socket
                        .send_to(frame, endpoint(self.host, self.base_port, address))
                        .await?;
                }
            }
        } else {
            self.socket
                .send_to(frame, endpoint(self.host, self.base_port, destination))
                .await?;
        }
        Ok(())
    }

    /// Next well-formed frame before `deadline`, or `None` once it passes.
    async fn recv_frame(
        &mut self,
        deadline: Instant,
    ) -> Result<Option<(PacketHeader, Vec<u8>)>, TransportError> {
        let mut buf = [0u8; MAX_FRAME];
        loop {
            let len = match timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Err(_) => return Ok(None),
                Ok(Ok((len, _))) => len,
                // ICMP port-unreachable from an earlier send surfaces here on some platforms
                Ok(Err(e)) if is_transient(&e) => {
                    debug!("Ignoring transient socket error: {e}");
                    continue;
                }
                Ok(Err(e)) => return Err(e.into()),
            };

            match decode_frame(&buf[..len], self.config.enable_crc) {
                Ok((header, payload)) => return Ok(Some((header, payload.to_vec()))),
                Err(e) => warn!("Dropping frame: {e}"),
            }
        }
    }

    /// Filter, acknowledge, and deduplicate a data frame.
    async fn accept(
        &mut self,
        header: PacketHeader,
        payload: Vec<u8>,
    ) -> Result<Option<Packet>, TransportError> {
        let me = self.config.node_address;
        if header.destination != me && header.destination != BROADCAST_ADDRESS {
            trace!(
                "Frame for {destination} is not for us",
                destination = header.destination
            );
            return Ok(None);
        }

        if header.destination != BROADCAST_ADDRESS {
            if !self.config.ack_delay.is_zero() {
                sleep(self.config.ack_delay).await;
            }
            let ack = PacketHeader {
                destination: header.sender,
                sender: me,
                id: header.id,
                flags: FLAG_ACK,
            };
            self.transmit(header.sender, &encode_frame(&ack, &[])).await?;
            trace!("ACK {id} sent to {sender}", id = header.id, sender = header.sender);
        }

        if header.is_retry() && self.seen.get(&header.sender) == Some(&header.id) {
            debug!(
                "Duplicate {id} from {sender} dropped",
                id = header.id,
                sender = header.sender
            );
            return Ok(None);
        }
        self.seen.insert(header.sender, header.id);

        Ok(Some(Packet::new(&header, &payload)))
    }
}

/// Queue a data frame heard while a send waits for its ACK. Failing to
/// acknowledge that frame must not abort the send in progress.
pub(crate) fn stash_inbound(
    backlog: &mut VecDeque<Packet>,
    sender: NodeAddress,
    outcome: Result<Option<Packet>, TransportError>,
) {
    match outcome {
        Ok(Some(packet)) => backlog.push_back(packet),
        Ok(None) => {}
        Err(e) => warn!("Failed to acknowledge frame from {sender} while awaiting ACK: {e}"),
    }
}

impl Transport for UdpAir {
    async fn receive(&mut self) -> Result<Option<Packet>, TransportError> {
        if let Some(packet) = self.backlog.pop_front() {
            return Ok(Some(packet));
        }

        let deadline = Instant::now() + self.config.receive_timeout;
        while let Some((header, payload)) = self.recv_frame(deadline).await? {
            if header.is_ack() {
                trace!("Ignoring stray ACK {id}", id = header.id);
                continue;
            }
            if let Some(packet) = self.accept(header, payload).await? {
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }

    async fn send(&mut self, payload: &[u8], with_ack: bool) -> Result<bool, TransportError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(TransportError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        self.sequence = self.sequence.wrapping_add(1);
        let destination = self.config.destination;
        let mut header = PacketHeader {
            destination,
            sender: self.config.node_address,
            id: self.sequence,
            flags: 0,
        };

        if !with_ack {
            self.transmit(destination, &encode_frame(&header, payload))
                .await?;
            return Ok(true);
        }

        for attempt in 0..=self.config.ack_retries {
            if attempt > 0 {
                header.flags |= FLAG_RETRY;
                debug!("Retransmitting {id} to {destination} (attempt {attempt})", id = header.id);
            }
            self.transmit(destination, &encode_frame(&header, payload))
                .await?;

            let deadline = Instant::now() + self.config.ack_wait;
            while let Some((reply, body)) = self.recv_frame(deadline).await? {
                if reply.is_ack() {
                    if reply.sender == destination
                        && reply.id == header.id
                        && reply.destination == header.sender
                    {
                        return Ok(true);
                    }
                    trace!("Ignoring unrelated ACK {id}", id = reply.id);
                } else {
                    let sender = reply.sender;
                    let outcome = self.accept(reply, body).await;
                    stash_inbound(&mut self.backlog, sender, outcome);
                }
            }
        }

        Ok(false)
    }

    fn node_address(&self) -> NodeAddress {
        self.config.node_address
    }

    fn set_node_address(&mut self, address: NodeAddress) -> Result<(), TransportError> {
        if address == self.config.node_address {
            return Ok(());
        }

        let socket = std::net::UdpSocket::bind(endpoint(self.host, self.base_port, address))?;
        socket.set_nonblocking(true)?;
        self.socket = UdpSocket::from_std(socket)?;
        self.config.node_address = address;
        info!("Node now listening as {address} at {local}", local = self.socket.local_addr()?);
        Ok(())
    }

    fn destination(&self) -> NodeAddress {
        self.config.destination
    }

    fn set_destination(&mut self, address: NodeAddress) {
        self.config.destination = address;
    }
}

fn endpoint(host: Ipv4Addr, base_port: u16, address: NodeAddress) -> SocketAddr {
    SocketAddr::from((host, base_port + u16::from(address)))
}

fn is_transient(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionRefused
    )
}
