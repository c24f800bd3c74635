//! Operator command parsing.
//!
//! One command per line, whitespace separated. The first token is the verb,
//! the second its argument; anything after that is ignored.

use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::address::{NodeAddress, parse_address};
use crate::error::CommandError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Send,
    List,
    Read,
    Delete,
    Undelivered,
    Resend,
    Address,
    Help,
}

impl Verb {
    pub fn usage(self) -> &'static str {
        match self {
            Verb::Send => "send <address>",
            Verb::List => "list",
            Verb::Read => "read <index>",
            Verb::Delete => "delete <index>",
            Verb::Undelivered => "undelivered",
            Verb::Resend => "resend <undelivered_index>",
            Verb::Address => "address [new_address]",
            Verb::Help => "help",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            Verb::Send => "send 8",
            Verb::Read => "read 0",
            Verb::Delete => "delete 0",
            Verb::Resend => "resend 0",
            Verb::Address => "address 3",
            Verb::List => "list",
            Verb::Undelivered => "undelivered",
            Verb::Help => "help",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Verb::Send => {
                "Start a new message to the address. The next line you enter is sent as its content."
            }
            Verb::List => "Print all messages in the inbox.",
            Verb::Read => "Print the sender and contents of the inbox message with the index.",
            Verb::Delete => "Delete the inbox message with the index.",
            Verb::Undelivered => {
                "Print all messages that were not acknowledged. Shows the indexes used by resend."
            }
            Verb::Resend => "Try again to deliver the undelivered message with the index.",
            Verb::Address => "Print this node's address, or change it to the one given.",
            Verb::Help => "Print this help message.",
        }
    }
}

/// One line of the help reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub usage: &'static str,
    pub example: &'static str,
    pub summary: &'static str,
}

impl From<Verb> for HelpEntry {
    fn from(verb: Verb) -> Self {
        Self {
            usage: verb.usage(),
            example: verb.example(),
            summary: verb.summary(),
        }
    }
}

pub fn help_entries() -> Vec<HelpEntry> {
    Verb::iter().map(HelpEntry::from).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send { to: NodeAddress },
    List,
    Read { index: usize },
    Delete { index: usize },
    Undelivered,
    Resend { index: usize },
    Address { new_address: Option<NodeAddress> },
    Help,
}

impl Command {
    /// Parse one operator line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut tokens = line.split_whitespace();
        let Some(word) = tokens.next() else {
            return Ok(None);
        };
        let verb = Verb::from_str(word).map_err(|_| CommandError::NotFound {
            verb: word.to_string(),
        })?;
        let arg = tokens.next();

        let command = match verb {
            Verb::Send => Command::Send {
                to: address(verb, required(verb, arg)?)?,
            },
            Verb::List => Command::List,
            Verb::Read => Command::Read {
                index: index(verb, required(verb, arg)?)?,
            },
            Verb::Delete => Command::Delete {
                index: index(verb, required(verb, arg)?)?,
            },
            Verb::Undelivered => Command::Undelivered,
            Verb::Resend => Command::Resend {
                index: index(verb, required(verb, arg)?)?,
            },
            Verb::Address => Command::Address {
                new_address: arg.map(|value| address(verb, value)).transpose()?,
            },
            Verb::Help => Command::Help,
        };

        Ok(Some(command))
    }

    pub fn verb(&self) -> Verb {
        match self {
            Command::Send { .. } => Verb::Send,
            Command::List => Verb::List,
            Command::Read { .. } => Verb::Read,
            Command::Delete { .. } => Verb::Delete,
            Command::Undelivered => Verb::Undelivered,
            Command::Resend { .. } => Verb::Resend,
            Command::Address { .. } => Verb::Address,
            Command::Help => Verb::Help,
        }
    }
}

fn required(verb: Verb, arg: Option<&str>) -> Result<&str, CommandError> {
    arg.ok_or(CommandError::Usage { verb })
}

fn index(verb: Verb, value: &str) -> Result<usize, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidArgument {
        verb,
        value: value.to_string(),
    })
}

fn address(verb: Verb, value: &str) -> Result<NodeAddress, CommandError> {
    parse_address(value).ok_or_else(|| CommandError::InvalidArgument {
        verb,
        value: value.to_string(),
    })
}
