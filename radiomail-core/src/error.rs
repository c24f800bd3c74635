use thiserror::Error;

use crate::command::Verb;
use crate::mailbox::MailboxKind;
use crate::transport::TransportError;

/// Everything an operator command can fail with. None of these stop the
/// driver loop; they are rendered and the session stays in its state.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("'{verb}' needs an argument: {usage} (e.g. '{example}')", usage = .verb.usage(), example = .verb.example())]
    Usage { verb: Verb },

    #[error("index {index} out of bounds for {mailbox} ({len} entries)")]
    OutOfBounds {
        mailbox: MailboxKind,
        index: usize,
        len: usize,
    },

    #[error("invalid argument '{value}' for '{verb}'")]
    InvalidArgument { verb: Verb, value: String },

    #[error("command not found: '{verb}'")]
    NotFound { verb: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CommandError {
    /// Stable identifier for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Usage { .. } => "usage",
            CommandError::OutOfBounds { .. } => "out_of_bounds",
            CommandError::InvalidArgument { .. } => "invalid_argument",
            CommandError::NotFound { .. } => "not_found",
            CommandError::Transport(_) => "transport",
        }
    }

    /// What the operator should run next.
    pub fn hint(&self) -> &'static str {
        match self {
            CommandError::Usage {
                verb: Verb::Read | Verb::Delete,
            }
            | CommandError::OutOfBounds {
                mailbox: MailboxKind::Inbox,
                ..
            } => "run 'list' to see indexes",
            CommandError::Usage { verb: Verb::Resend }
            | CommandError::OutOfBounds {
                mailbox: MailboxKind::Outbox,
                ..
            } => "run 'undelivered' to see indexes",
            _ => "run 'help' for more",
        }
    }
}
