//! The polling loop.
//!
//! Each cycle polls the radio once, then services at most one line of
//! operator input if one is already waiting. Input never blocks the loop, so
//! a silent operator cannot starve inbound traffic.

use anyhow::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::info;

use crate::error::CommandError;
use crate::mailbox::InboxSummary;
use crate::session::{Reply, Session};
use crate::transport::Transport;

pub enum LinePoll {
    Line(String),
    /// Nothing typed yet.
    Pending,
    /// The input side is gone for good.
    Closed,
}

/// Non-blocking source of operator lines.
pub trait LineSource {
    fn try_next_line(&mut self) -> LinePoll;
}

impl LineSource for mpsc::Receiver<String> {
    fn try_next_line(&mut self) -> LinePoll {
        match self.try_recv() {
            Ok(line) => LinePoll::Line(line),
            Err(TryRecvError::Empty) => LinePoll::Pending,
            Err(TryRecvError::Disconnected) => LinePoll::Closed,
        }
    }
}

/// Scripted input: every queued line, then closed.
impl LineSource for VecDeque<String> {
    fn try_next_line(&mut self) -> LinePoll {
        match self.pop_front() {
            Some(line) => LinePoll::Line(line),
            None => LinePoll::Closed,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    MessageArrived(InboxSummary),
    Reply {
        line: String,
        result: Result<Reply, CommandError>,
    },
}

pub struct Driver<T, L> {
    session: Session<T>,
    input: L,
    exit_on_eof: bool,
}

impl<T: Transport, L: LineSource> Driver<T, L> {
    pub fn new(session: Session<T>, input: L) -> Self {
        Self {
            session,
            input,
            exit_on_eof: false,
        }
    }

    /// Stop `run` once the line source closes instead of polling forever.
    pub fn exit_on_eof(mut self, exit: bool) -> Self {
        self.exit_on_eof = exit;
        self
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Run one poll cycle. Returns `false` once the line source is closed.
    pub async fn cycle<F>(&mut self, on_event: &mut F) -> Result<bool>
    where
        F: FnMut(Event) -> Result<()>,
    {
        if let Some(summary) = self.session.poll_inbound().await {
            on_event(Event::MessageArrived(summary))?;
        }

        let open = match self.input.try_next_line() {
            LinePoll::Line(line) => {
                if let Some(result) = self.session.handle_line(&line).await {
                    on_event(Event::Reply { line, result })?;
                }
                true
            }
            LinePoll::Pending => true,
            LinePoll::Closed => false,
        };

        // Let the input reader make progress on a single-threaded runtime
        tokio::task::yield_now().await;

        Ok(open)
    }

    /// Poll until the callback fails or, with `exit_on_eof`, input closes.
    pub async fn run<F>(&mut self, mut on_event: F) -> Result<()>
    where
        F: FnMut(Event) -> Result<()>,
    {
        loop {
            let open = self.cycle(&mut on_event).await?;
            if !open && self.exit_on_eof {
                info!("Operator input closed, stopping");
                return Ok(());
            }
        }
    }
}
