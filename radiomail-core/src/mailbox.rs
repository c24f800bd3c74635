use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use strum::Display;

use crate::address::{NodeAddress, format_hex};
use crate::error::CommandError;

/// A message received over the air. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundMessage {
    pub from: NodeAddress,
    pub message_id: u8,
    pub content: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn from_hex(&self) -> String {
        format_hex(self.from)
    }

    pub fn message_id_hex(&self) -> String {
        format_hex(self.message_id)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// A message whose last send attempt was not acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndeliveredMessage {
    pub to: NodeAddress,
    pub content: String,
}

/// Inbox row as shown by `list` and arrival notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxSummary {
    pub index: usize,
    pub from: String,
    pub message_id: String,
    pub received_at: DateTime<Utc>,
}

impl InboxSummary {
    pub fn new(index: usize, message: &InboundMessage) -> Self {
        Self {
            index,
            from: message.from_hex(),
            message_id: message.message_id_hex(),
            received_at: message.received_at,
        }
    }
}

/// Outbox row as shown by `undelivered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboxEntry {
    pub index: usize,
    pub to: NodeAddress,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum MailboxKind {
    #[strum(serialize = "inbox")]
    Inbox,
    #[strum(serialize = "undelivered queue")]
    Outbox,
}

/// Insertion-ordered message list addressed by position.
///
/// Indices are only meaningful until the next push or remove; removing an
/// entry shifts everything after it down by one.
#[derive(Debug, Clone)]
pub struct Mailbox<T> {
    kind: MailboxKind,
    entries: Vec<T>,
}

pub type Inbox = Mailbox<InboundMessage>;
pub type Outbox = Mailbox<UndeliveredMessage>;

impl Inbox {
    pub fn inbox() -> Self {
        Mailbox::new(MailboxKind::Inbox)
    }

    pub fn summaries(&self) -> Vec<InboxSummary> {
        self.iter()
            .enumerate()
            .map(|(index, message)| InboxSummary::new(index, message))
            .collect()
    }
}

impl Outbox {
    pub fn outbox() -> Self {
        Mailbox::new(MailboxKind::Outbox)
    }

    pub fn entries(&self) -> Vec<OutboxEntry> {
        self.iter()
            .enumerate()
            .map(|(index, message)| OutboxEntry {
                index,
                to: message.to,
                content: message.content.clone(),
            })
            .collect()
    }
}

impl<T> Mailbox<T> {
    pub fn new(kind: MailboxKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> MailboxKind {
        self.kind
    }

    /// Append to the tail, returning the new entry's index.
    pub fn push(&mut self, entry: T) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Result<&T, CommandError> {
        self.entries
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))
    }

    pub fn remove(&mut self, index: usize) -> Result<T, CommandError> {
        if index >= self.entries.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    fn out_of_bounds(&self, index: usize) -> CommandError {
        CommandError::OutOfBounds {
            mailbox: self.kind,
            index,
            len: self.entries.len(),
        }
    }
}
