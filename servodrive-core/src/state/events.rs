//! Events that trigger motion state transitions

use crate::motion::Direction;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Motion events
    /// A timed move was started in the given direction
    MoveStarted(Direction),
    /// The planned travel time elapsed
    TravelElapsed,
    /// A stop request interrupted the move
    Interrupted,

    // Calibration events
    /// Baseline run started (forced full extend)
    BaselineStarted,
    /// Baseline run reached the end stop
    BaselineComplete,

    // Administrative and fault events
    /// Position overridden by an operator
    PositionForced,
    /// A relay command could not be dispatched
    DispatchFailed,
}
