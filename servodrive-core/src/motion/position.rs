//! Actuator position types
//!
//! Positions are percentages of full stroke: 0 is fully retracted (closed),
//! 100 is fully extended (open).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest valid position (fully retracted)
pub const POSITION_MIN: u8 = 0;

/// Highest valid position (fully extended)
pub const POSITION_MAX: u8 = 100;

/// Actuator position in percent of full stroke
///
/// Every constructor clamps, so a `Position` is always within
/// [`POSITION_MIN`]..=[`POSITION_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position(u8);

impl Position {
    /// Fully retracted
    pub const CLOSED: Self = Self(POSITION_MIN);
    /// Fully extended
    pub const OPEN: Self = Self(POSITION_MAX);
    /// Mid stroke
    pub const CENTER: Self = Self(50);

    /// Create a position from a raw percentage, clamping above 100
    pub const fn new(percent: u8) -> Self {
        if percent > POSITION_MAX {
            Self(POSITION_MAX)
        } else {
            Self(percent)
        }
    }

    /// Create a position from an arbitrary (possibly negative) request
    pub fn clamped(raw: i32) -> Self {
        Self(raw.clamp(POSITION_MIN as i32, POSITION_MAX as i32) as u8)
    }

    /// Position as a percentage
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Open means "not fully closed"
    pub const fn is_open(self) -> bool {
        self.0 > POSITION_MIN
    }

    /// Check if the actuator is fully retracted
    pub const fn is_closed(self) -> bool {
        self.0 == POSITION_MIN
    }

    /// Absolute distance to another position, in percent
    pub const fn distance(self, other: Position) -> u8 {
        self.0.abs_diff(other.0)
    }

    /// Direction needed to travel from here to `target`
    ///
    /// Returns `None` when already there.
    pub fn direction_to(self, target: Position) -> Option<Direction> {
        match target.0.cmp(&self.0) {
            core::cmp::Ordering::Greater => Some(Direction::Extend),
            core::cmp::Ordering::Less => Some(Direction::Retract),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Step `amount` percent in `direction`, saturating at the end stops
    pub fn step(self, direction: Direction, amount: u8) -> Self {
        match direction {
            Direction::Extend => Self::new(self.0.saturating_add(amount)),
            Direction::Retract => Self(self.0.saturating_sub(amount)),
        }
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

/// Travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Towards 100 (open)
    Extend,
    /// Towards 0 (closed)
    Retract,
}

impl Direction {
    /// End stop reached by travelling in this direction
    pub const fn end_stop(self) -> Position {
        match self {
            Direction::Extend => Position::OPEN,
            Direction::Retract => Position::CLOSED,
        }
    }
}

/// Controller's belief about where the actuator is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PositionEstimate {
    /// Estimate derived from commanded travel time
    Known(Position),
    /// A relay command failed mid-move; position cannot be trusted
    Unknown,
}

impl PositionEstimate {
    /// The estimated position, if trustworthy
    pub const fn known(self) -> Option<Position> {
        match self {
            PositionEstimate::Known(position) => Some(position),
            PositionEstimate::Unknown => None,
        }
    }

    /// Check if the estimate can be used to plan a move
    pub const fn is_known(self) -> bool {
        matches!(self, PositionEstimate::Known(_))
    }
}

impl From<Position> for PositionEstimate {
    fn from(position: Position) -> Self {
        PositionEstimate::Known(position)
    }
}
