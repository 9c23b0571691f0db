//! Controller commands and status snapshots

use super::machine::MotionState;
use crate::motion::{Direction, Position, PositionEstimate};

/// Command accepted by the motion controller's inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoCommand {
    /// Drive to 100
    Open,
    /// Drive to 0
    Close,
    /// Drive to a position; out-of-range requests are clamped
    SetPosition(i32),
    /// Interrupt the move in flight
    Stop,
    /// Run the desync recovery procedure
    ResetPosition,
    /// Overwrite the estimate without moving (clamped)
    ForcePosition(i32),
}

/// Why a command was not carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RejectReason {
    /// A move is already in flight
    Busy = 1,
    /// Calibration baseline run in progress
    Calibrating = 2,
    /// Position estimate was lost after a relay failure
    PositionUnknown = 3,
    /// Relay dispatch failed
    RelayFault = 4,
    /// Command frame could not be decoded
    Malformed = 5,
}

impl RejectReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Busy),
            2 => Some(Self::Calibrating),
            3 => Some(Self::PositionUnknown),
            4 => Some(Self::RelayFault),
            5 => Some(Self::Malformed),
            _ => None,
        }
    }
}

/// Snapshot of the controller, published after every state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoStatus {
    /// Estimated position
    pub estimate: PositionEstimate,
    /// Target of the latest accepted command
    pub target: Position,
    /// Current motion state
    pub state: MotionState,
    /// Last write to the position store failed
    pub store_stale: bool,
}

impl ServoStatus {
    /// Idle status at a known position
    pub const fn idle(position: Position) -> Self {
        Self {
            estimate: PositionEstimate::Known(position),
            target: position,
            state: MotionState::Idle,
            store_stale: false,
        }
    }

    /// Status with no trustworthy position, before any controller reported
    pub const fn unknown() -> Self {
        Self {
            estimate: PositionEstimate::Unknown,
            target: Position::CLOSED,
            state: MotionState::Idle,
            store_stale: false,
        }
    }

    /// Open means any position above 0
    pub fn is_open(&self) -> bool {
        self.estimate.known().is_some_and(Position::is_open)
    }

    pub fn is_closed(&self) -> bool {
        self.estimate.known().is_some_and(Position::is_closed)
    }

    pub fn is_moving(&self) -> bool {
        self.state.is_moving()
    }

    pub fn is_opening(&self) -> bool {
        self.state.direction() == Some(Direction::Extend)
    }

    pub fn is_closing(&self) -> bool {
        self.state.direction() == Some(Direction::Retract)
    }
}

impl Default for ServoStatus {
    fn default() -> Self {
        Self::idle(Position::CLOSED)
    }
}
