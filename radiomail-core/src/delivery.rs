use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::address::NodeAddress;
use crate::error::CommandError;
use crate::mailbox::{InboundMessage, Outbox, UndeliveredMessage};
use crate::packet::Packet;
use crate::transport::Transport;

/// Verdict of one acknowledged send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Acked,
    Unacked,
}

/// Send `content` to `destination` and wait for its ACK.
///
/// A transport fault is reported the same way as a missing ACK. Queueing
/// the message for a retry is left to the caller.
pub async fn send_with_ack<T: Transport>(
    transport: &mut T,
    destination: NodeAddress,
    content: &[u8],
) -> Delivery {
    transport.set_destination(destination);

    match transport.send(content, true).await {
        Ok(true) => {
            info!("ACK received from {destination:#x}");
            Delivery::Acked
        }
        Ok(false) => {
            warn!("No ACK from {destination:#x}");
            Delivery::Unacked
        }
        Err(e) => {
            warn!("Send to {destination:#x} failed: {e}");
            Delivery::Unacked
        }
    }
}

/// Poll the transport once and turn whatever arrived into an inbox message.
pub async fn classify_inbound<T: Transport>(transport: &mut T) -> Option<InboundMessage> {
    match transport.receive().await {
        Ok(Some(packet)) => classify_packet(&packet),
        Ok(None) => None,
        Err(e) => {
            warn!("Receive failed: {e}");
            None
        }
    }
}

pub fn classify_packet(packet: &Packet) -> Option<InboundMessage> {
    let Some(header) = packet.header() else {
        warn!(
            "Dropping {len} byte packet without a full header",
            len = packet.len()
        );
        return None;
    };

    debug!(
        "Packet {id:#x} from {sender:#x}, {len} payload bytes",
        id = header.id,
        sender = header.sender,
        len = packet.payload().len()
    );

    Some(InboundMessage {
        from: header.sender,
        message_id: header.id,
        content: packet.payload().to_vec(),
        received_at: Utc::now(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendReport {
    pub message: UndeliveredMessage,
    pub delivery: Delivery,
}

/// Take the entry at `index` out of the outbox and try it again.
///
/// The entry is gone from the queue while the attempt is in flight. On a
/// failed attempt a fresh copy goes to the tail, so repeated failures keep
/// cycling the message to the back without any cap.
pub async fn resend<T: Transport>(
    transport: &mut T,
    outbox: &mut Outbox,
    index: usize,
) -> Result<ResendReport, CommandError> {
    let message = outbox.remove(index)?;
    let delivery = send_with_ack(transport, message.to, message.content.as_bytes()).await;

    if delivery == Delivery::Unacked {
        outbox.push(message.clone());
    }

    Ok(ResendReport { message, delivery })
}
