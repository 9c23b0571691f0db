//! Recording relay and store doubles for controller tests

use core::cell::RefCell;

use heapless::Vec;
use servodrive_hal::{PositionStore, Relay, RelayError, RelayOutput, StoreError};

/// Relay output that records every switch
#[derive(Debug, Default)]
pub struct RecordingRelays {
    /// Current output levels, indexed by [`Relay::index`]
    pub on: [bool; 2],
    /// Every successful switch, in order
    pub log: Vec<(Relay, bool), 64>,
    /// Number of successful activations
    pub activations: usize,
    /// Set if both relays were ever on together
    pub overlapped: bool,
    /// Fail activation of this relay
    pub fail_activate: Option<Relay>,
    /// Fail deactivation of this relay
    pub fail_deactivate: Option<Relay>,
    /// Fail the next activation of either relay, then recover
    pub fail_next_activation: bool,
}

impl RecordingRelays {
    pub fn all_off(&self) -> bool {
        !self.on[0] && !self.on[1]
    }

    fn try_activate(&mut self, relay: Relay) -> Result<(), RelayError> {
        if self.fail_activate == Some(relay) || self.fail_next_activation {
            self.fail_next_activation = false;
            return Err(RelayError::Dispatch);
        }
        self.activations += 1;
        self.switch(relay, true);
        Ok(())
    }

    fn try_deactivate(&mut self, relay: Relay) -> Result<(), RelayError> {
        if self.fail_deactivate == Some(relay) {
            return Err(RelayError::Dispatch);
        }
        self.switch(relay, false);
        Ok(())
    }

    fn switch(&mut self, relay: Relay, on: bool) {
        self.on[relay.index()] = on;
        if self.on[0] && self.on[1] {
            self.overlapped = true;
        }
        let _ = self.log.push((relay, on));
    }
}

impl RelayOutput for RecordingRelays {
    async fn activate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.try_activate(relay)
    }

    async fn deactivate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.try_deactivate(relay)
    }
}

/// Recording relays readable from another future while a move is running
pub struct SharedRelays<'a>(pub &'a RefCell<RecordingRelays>);

impl RelayOutput for SharedRelays<'_> {
    async fn activate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.0.borrow_mut().try_activate(relay)
    }

    async fn deactivate(&mut self, relay: Relay) -> Result<(), RelayError> {
        self.0.borrow_mut().try_deactivate(relay)
    }
}

/// In-memory position store
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub value: Option<u8>,
    pub writes: Vec<u8, 16>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn holding(value: u8) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn last_write(&self) -> Option<u8> {
        self.writes.last().copied()
    }
}

impl PositionStore for MemoryStore {
    async fn read_position(&mut self) -> Result<Option<u8>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Backend);
        }
        Ok(self.value)
    }

    async fn write_position(&mut self, position: u8) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend);
        }
        self.value = Some(position);
        let _ = self.writes.push(position);
        Ok(())
    }
}
