//! Relay output abstractions
//!
//! A servo drive is wired to two momentary relays. Energising "plus" drives
//! the actuator towards its extended (open) end stop, energising "minus"
//! drives it towards the retracted (closed) end stop.

/// Relay role on the servo drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Relay {
    /// Extend / open relay
    Plus,
    /// Retract / close relay
    Minus,
}

impl Relay {
    /// Both relays, plus first
    pub const ALL: [Relay; 2] = [Relay::Plus, Relay::Minus];

    /// The relay that must be off while this one is on
    pub const fn opposite(self) -> Self {
        match self {
            Relay::Plus => Relay::Minus,
            Relay::Minus => Relay::Plus,
        }
    }

    /// Index into a two-element array (plus = 0, minus = 1)
    pub const fn index(self) -> usize {
        match self {
            Relay::Plus => 0,
            Relay::Minus => 1,
        }
    }
}

/// Errors from relay command dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError {
    /// The command could not be delivered to the output
    Dispatch,
    /// The output reported a fault while switching
    Fault,
}

/// Relay output trait
///
/// Implementations map [`Relay`] roles onto their own identifiers (GPIO
/// numbers, host entity ids, ...). Both operations must be idempotent:
/// activating an active relay or deactivating an inactive one succeeds
/// without side effects.
pub trait RelayOutput {
    /// Energise a relay
    fn activate(&mut self, relay: Relay) -> impl core::future::Future<Output = Result<(), RelayError>>;

    /// De-energise a relay
    fn deactivate(&mut self, relay: Relay) -> impl core::future::Future<Output = Result<(), RelayError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite() {
        assert_eq!(Relay::Plus.opposite(), Relay::Minus);
        assert_eq!(Relay::Minus.opposite(), Relay::Plus);
        assert_eq!(Relay::Plus.opposite().opposite(), Relay::Plus);
    }

    #[test]
    fn test_index_is_unique() {
        assert_eq!(Relay::Plus.index(), 0);
        assert_eq!(Relay::Minus.index(), 1);
        assert_eq!(Relay::ALL.len(), 2);
    }
}
