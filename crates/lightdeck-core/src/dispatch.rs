//! Global rate limiting for outbound commands.
//!
//! The service tolerates roughly one command every half second. Commands
//! submitted faster than that are not dropped; they wait in a FIFO queue
//! and leave one per elapsed interval. A newer command for the same light
//! and the same setting replaces the queued one in place, so a burst of
//! slider releases only ever sends the final brightness.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

use lightdeck_types::{CommandKind, LightCommand};

/// A command waiting for its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    /// Light index in the store.
    pub index: usize,
    /// What to send.
    pub command: LightCommand,
}

/// Minimum-interval gate in front of the command client.
#[derive(Debug, Clone)]
pub struct DispatchGate {
    interval: Duration,
    last_dispatch: Option<Instant>,
    queue: VecDeque<PendingCommand>,
}

impl DispatchGate {
    /// Create a gate that lets one command through per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_dispatch: None,
            queue: VecDeque::new(),
        }
    }

    /// Queue a command.
    pub fn submit(&mut self, index: usize, command: LightCommand) {
        let pending = PendingCommand { index, command };
        match self
            .queue
            .iter_mut()
            .find(|p| p.index == index && p.command.kind() == command.kind())
        {
            Some(slot) => {
                debug!(index, old = %slot.command, new = %command, "Replacing queued command");
                *slot = pending;
            }
            None => self.queue.push_back(pending),
        }
    }

    /// Drop a queued command for light `index` that changes `kind`.
    ///
    /// Returns the removed command, if any.
    pub fn cancel(&mut self, index: usize, kind: CommandKind) -> Option<LightCommand> {
        let position = self
            .queue
            .iter()
            .position(|p| p.index == index && p.command.kind() == kind)?;
        let removed = self.queue.remove(position).map(|p| p.command);
        if let Some(command) = removed {
            debug!(index, %command, "Cancelled queued command");
        }
        removed
    }

    /// Whether the interval since the last dispatch has elapsed.
    pub fn is_ready(&self, now: Instant) -> bool {
        self.last_dispatch
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Take the next command if one is queued and the gate is open.
    pub fn poll(&mut self, now: Instant) -> Option<PendingCommand> {
        if self.is_ready(now) {
            self.queue.pop_front()
        } else {
            None
        }
    }

    /// Record that a command went out at `now`, successful or not.
    pub fn mark_sent(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
    }

    /// Time of the last dispatch.
    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Queued commands, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &PendingCommand> {
        self.queue.iter()
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
