//! Relay interlock
//!
//! [`RelayPair`] is the only code that talks to a [`RelayOutput`]. It keeps
//! track of which relay it last energised, so the controller never has to
//! query the outputs, and it never activates one relay without first
//! switching off the other.

use servodrive_core::motion::Direction;
use servodrive_hal::{Relay, RelayError, RelayOutput};

/// Relay driving the actuator in `direction`
pub const fn relay_for(direction: Direction) -> Relay {
    match direction {
        Direction::Extend => Relay::Plus,
        Direction::Retract => Relay::Minus,
    }
}

/// Mutually exclusive plus/minus relays
pub struct RelayPair<R: RelayOutput> {
    output: R,
    /// Relay believed to be on
    active: Option<Relay>,
}

impl<R: RelayOutput> RelayPair<R> {
    /// Wrap a relay output; both relays are assumed off
    pub fn new(output: R) -> Self {
        Self {
            output,
            active: None,
        }
    }

    /// Relay currently energised, if any
    pub fn active(&self) -> Option<Relay> {
        self.active
    }

    /// Underlying output
    pub fn output(&self) -> &R {
        &self.output
    }

    /// Energise the relay for `direction`
    pub async fn drive(&mut self, direction: Direction) -> Result<(), RelayError> {
        self.engage(relay_for(direction)).await
    }

    /// Energise `relay`, switching the opposite one off first
    pub async fn engage(&mut self, relay: Relay) -> Result<(), RelayError> {
        let other = relay.opposite();
        self.output.deactivate(other).await?;
        if self.active == Some(other) {
            self.active = None;
        }

        self.output.activate(relay).await?;
        self.active = Some(relay);
        trace!("relay {} on", relay);
        Ok(())
    }

    /// Switch off the active relay, if any
    pub async fn release(&mut self) -> Result<(), RelayError> {
        if let Some(relay) = self.active {
            self.output.deactivate(relay).await?;
            self.active = None;
            trace!("relay {} off", relay);
        }
        Ok(())
    }

    /// Force both relays off regardless of tracked state
    ///
    /// Attempts both relays even if the first fails and returns the last
    /// error seen.
    pub async fn release_all(&mut self) -> Result<(), RelayError> {
        let mut result = Ok(());
        for relay in Relay::ALL {
            match self.output.deactivate(relay).await {
                Ok(()) => {
                    if self.active == Some(relay) {
                        self.active = None;
                    }
                }
                Err(e) => {
                    warn!("failed to release relay {}: {}", relay, e);
                    result = Err(e);
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingRelays;
    use embassy_futures::block_on;

    #[test]
    fn test_engage_switches_opposite_off_first() {
        let mut pair = RelayPair::new(RecordingRelays::default());
        block_on(async {
            pair.engage(Relay::Plus).await.unwrap();
            pair.engage(Relay::Minus).await.unwrap();
        });

        let log = &pair.output().log;
        assert_eq!(
            log.as_slice(),
            &[
                (Relay::Minus, false),
                (Relay::Plus, true),
                (Relay::Plus, false),
                (Relay::Minus, true),
            ]
        );
        assert!(!pair.output().overlapped);
        assert_eq!(pair.active(), Some(Relay::Minus));
    }

    #[test]
    fn test_drive_maps_direction() {
        assert_eq!(relay_for(Direction::Extend), Relay::Plus);
        assert_eq!(relay_for(Direction::Retract), Relay::Minus);

        let mut pair = RelayPair::new(RecordingRelays::default());
        block_on(pair.drive(Direction::Retract)).unwrap();
        assert_eq!(pair.active(), Some(Relay::Minus));
        assert!(pair.output().on[Relay::Minus.index()]);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pair = RelayPair::new(RecordingRelays::default());
        block_on(async {
            pair.engage(Relay::Plus).await.unwrap();
            pair.release().await.unwrap();
            pair.release().await.unwrap();
        });
        assert_eq!(pair.active(), None);
        assert!(pair.output().all_off());
        // Second release sends nothing
        assert_eq!(pair.output().log.last(), Some(&(Relay::Plus, false)));
        assert_eq!(pair.output().log.len(), 3);
    }

    #[test]
    fn test_failed_activation_leaves_nothing_active() {
        let relays = RecordingRelays {
            fail_activate: Some(Relay::Plus),
            ..Default::default()
        };
        let mut pair = RelayPair::new(relays);
        let result = block_on(pair.engage(Relay::Plus));
        assert_eq!(result, Err(RelayError::Dispatch));
        assert_eq!(pair.active(), None);
        assert!(pair.output().all_off());
    }

    #[test]
    fn test_release_all_tries_both() {
        let relays = RecordingRelays {
            fail_deactivate: Some(Relay::Plus),
            ..Default::default()
        };
        let mut pair = RelayPair::new(relays);
        let result = block_on(pair.release_all());
        assert_eq!(result, Err(RelayError::Dispatch));
        assert_eq!(pair.output().log.as_slice(), &[(Relay::Minus, false)]);
    }
}
