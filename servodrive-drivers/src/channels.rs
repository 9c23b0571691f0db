//! Controller inbox and outbox
//!
//! One [`ServoChannels`] per controller. Other tasks send commands into it
//! and wait on the status and rejection signals; the controller is the only
//! receiver.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use servodrive_core::state::{RejectReason, ServoCommand, ServoStatus};

/// Command queue and status signals for one controller
pub struct ServoChannels<M: RawMutex, const N: usize> {
    commands: Channel<M, ServoCommand, N>,
    status: Signal<M, ServoStatus>,
    rejected: Signal<M, RejectReason>,
}

impl<M: RawMutex, const N: usize> ServoChannels<M, N> {
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            status: Signal::new(),
            rejected: Signal::new(),
        }
    }

    /// Queue a command, waiting for space
    pub async fn send(&self, command: ServoCommand) {
        self.commands.send(command).await;
    }

    /// Queue a command without waiting
    ///
    /// Returns the command back if the inbox is full.
    pub fn try_send(&self, command: ServoCommand) -> Result<(), ServoCommand> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(command) => command,
        })
    }

    /// Wait for the next status snapshot
    pub async fn wait_status(&self) -> ServoStatus {
        self.status.wait().await
    }

    /// Take the latest status snapshot, if one was published since the last take
    pub fn try_status(&self) -> Option<ServoStatus> {
        self.status.try_take()
    }

    /// Wait for the next rejected command
    pub async fn wait_rejected(&self) -> RejectReason {
        self.rejected.wait().await
    }

    pub fn try_rejected(&self) -> Option<RejectReason> {
        self.rejected.try_take()
    }

    pub(crate) async fn receive(&self) -> ServoCommand {
        self.commands.receive().await
    }

    pub(crate) fn publish(&self, status: ServoStatus) {
        self.status.signal(status);
    }

    pub(crate) fn reject(&self, reason: RejectReason) {
        self.rejected.signal(reason);
    }
}

impl<M: RawMutex, const N: usize> Default for ServoChannels<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
