//! Channel carrying deferred work back to the engine.
//!
//! Async rule settlements and debounce timers complete on spawned tasks.
//! They never touch engine state themselves: they send a [`Command`] and the
//! engine applies it the next time it polls its receiver.

use tokio::sync::mpsc;

use crate::validation::ValidationResult;

/// Identifies one in-flight async check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CheckId(pub(crate) u64);

/// Identifies one scheduled debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TimerId(pub(crate) u64);

/// Outcome of one async rule.
#[derive(Debug, Clone)]
pub(crate) enum Settled {
    Fulfilled(ValidationResult),
    Rejected(String),
}

#[derive(Debug)]
pub(crate) enum Command {
    /// Every async rule of a check has settled, in declaration order.
    Settled { check: CheckId, outcomes: Vec<Settled> },
    /// A debounce timer elapsed.
    TimerFired(TimerId),
}

/// Sender half of the command channel.
#[derive(Clone, Debug)]
pub(crate) struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    /// Send a command.
    ///
    /// Errors are ignored (receiver dropped = engine gone).
    pub(crate) fn send(&self, command: Command) {
        let _ = self.tx.send(command);
    }
}

/// Receiver half of the command channel.
pub(crate) struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<Command>,
}

impl CommandReceiver {
    /// Wait for the next command.
    pub(crate) async fn recv(&mut self) -> Option<Command> {
        self.rx.recv().await
    }

    /// Take a command if one is already queued.
    pub(crate) fn try_recv(&mut self) -> Option<Command> {
        self.rx.try_recv().ok()
    }
}

/// Create a new command channel pair.
pub(crate) fn channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, CommandReceiver { rx })
}
