//! The command state machine.
//!
//! A [`Session`] owns the transport, both mailboxes, and the current
//! [`State`]. In `Idle` every line is a command; after `send <addr>` the
//! session waits for exactly one more line, which becomes the message body.

use serde::Serialize;
use tracing::{debug, info};

use crate::address::NodeAddress;
use crate::command::{Command, HelpEntry, help_entries};
use crate::delivery::{self, Delivery};
use crate::error::CommandError;
use crate::mailbox::{Inbox, InboxSummary, Outbox, OutboxEntry, UndeliveredMessage};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum State {
    Idle,
    AwaitingBody { to: NodeAddress },
}

/// Successful outcome of one operator line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    /// `send` accepted; the next line is the body.
    Compose { to: NodeAddress },
    Inbox { entries: Vec<InboxSummary> },
    Message {
        index: usize,
        from: String,
        message_id: String,
        text: String,
        content_hex: String,
    },
    Deleted { index: usize },
    Undelivered { entries: Vec<OutboxEntry> },
    Sent {
        to: NodeAddress,
        content: String,
        delivery: Delivery,
    },
    Resent {
        index: usize,
        to: NodeAddress,
        content: String,
        delivery: Delivery,
    },
    NodeAddress { address: NodeAddress },
    NodeAddressSet { address: NodeAddress },
    Help { entries: Vec<HelpEntry> },
}

pub struct Session<T> {
    transport: T,
    inbox: Inbox,
    outbox: Outbox,
    state: State,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            inbox: Inbox::inbox(),
            outbox: Outbox::outbox(),
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Poll the radio once; a new message is appended to the inbox.
    pub async fn poll_inbound(&mut self) -> Option<InboxSummary> {
        let message = delivery::classify_inbound(&mut self.transport).await?;
        let index = self.inbox.push(message);
        self.inbox
            .get(index)
            .ok()
            .map(|message| InboxSummary::new(index, message))
    }

    /// Dispatch one operator line according to the current state.
    ///
    /// Returns `None` for a blank line in `Idle`. Errors leave the state
    /// unchanged.
    pub async fn handle_line(&mut self, line: &str) -> Option<Result<Reply, CommandError>> {
        match self.state {
            State::AwaitingBody { to } => {
                self.state = State::Idle;
                Some(Ok(self.deliver(to, line).await))
            }
            State::Idle => match Command::parse(line) {
                // A blank line is not a command and gets no reply.
                Ok(None) => None,
                Ok(Some(command)) => Some(self.execute(command).await),
                Err(e) => Some(Err(e)),
            },
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Reply, CommandError> {
        debug!("Executing {command:?}");

        match command {
            Command::Send { to } => {
                self.transport.set_destination(to);
                self.state = State::AwaitingBody { to };
                Ok(Reply::Compose { to })
            }

            Command::List => Ok(Reply::Inbox {
                entries: self.inbox.summaries(),
            }),

            Command::Read { index } => {
                let message = self.inbox.get(index)?;
                Ok(Reply::Message {
                    index,
                    from: message.from_hex(),
                    message_id: message.message_id_hex(),
                    text: message.text().into_owned(),
                    content_hex: hex::encode(&message.content),
                })
            }

            Command::Delete { index } => {
                self.inbox.remove(index)?;
                Ok(Reply::Deleted { index })
            }

            Command::Undelivered => Ok(Reply::Undelivered {
                entries: self.outbox.entries(),
            }),

            Command::Resend { index } => {
                let report = delivery::resend(&mut self.transport, &mut self.outbox, index).await?;
                Ok(Reply::Resent {
                    index,
                    to: report.message.to,
                    content: report.message.content,
                    delivery: report.delivery,
                })
            }

            Command::Address { new_address: None } => Ok(Reply::NodeAddress {
                address: self.transport.node_address(),
            }),

            Command::Address {
                new_address: Some(address),
            } => {
                self.transport.set_node_address(address)?;
                info!("Node address set to {address}");
                Ok(Reply::NodeAddressSet { address })
            }

            Command::Help => Ok(Reply::Help {
                entries: help_entries(),
            }),
        }
    }

    async fn deliver(&mut self, to: NodeAddress, body: &str) -> Reply {
        debug!("Sending {len} bytes to {to:#x}", len = body.len());
        let delivery = delivery::send_with_ack(&mut self.transport, to, body.as_bytes()).await;

        if delivery == Delivery::Unacked {
            self.outbox.push(UndeliveredMessage {
                to,
                content: body.to_string(),
            });
        }

        Reply::Sent {
            to,
            content: body.to_string(),
            delivery,
        }
    }
}
