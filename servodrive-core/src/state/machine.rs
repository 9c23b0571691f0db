//! State machine definition
//!
//! Relay outputs, the "moving" flags reported to the host and the command
//! guards are all functions of the current state.

use super::events::Event;
use crate::motion::Direction;

/// Motion states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// Both relays off
    #[default]
    Idle,
    /// Plus relay on, travelling towards 100
    MovingExtend,
    /// Minus relay on, travelling towards 0
    MovingRetract,
}

impl MotionState {
    /// Moving state for a direction
    pub const fn moving(direction: Direction) -> Self {
        match direction {
            Direction::Extend => MotionState::MovingExtend,
            Direction::Retract => MotionState::MovingRetract,
        }
    }

    /// Check if a relay should be energised
    pub fn is_moving(&self) -> bool {
        !matches!(self, MotionState::Idle)
    }

    /// Direction of travel, if moving
    pub fn direction(&self) -> Option<Direction> {
        match self {
            MotionState::Idle => None,
            MotionState::MovingExtend => Some(Direction::Extend),
            MotionState::MovingRetract => Some(Direction::Retract),
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use MotionState::*;

        match (self, event) {
            (Idle, MoveStarted(direction)) => MotionState::moving(direction),

            // Calibration bypasses the idle guard
            (_, BaselineStarted) => MovingExtend,

            (MovingExtend | MovingRetract, TravelElapsed) => Idle,
            (MovingExtend | MovingRetract, Interrupted) => Idle,
            (MovingExtend, BaselineComplete) => Idle,

            // Always safe to fall back to idle
            (_, PositionForced) => Idle,
            (_, DispatchFailed) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(MotionState::default(), MotionState::Idle);
        assert!(!MotionState::Idle.is_moving());
        assert_eq!(MotionState::Idle.direction(), None);
    }

    #[test]
    fn test_move_flow() {
        let state = MotionState::Idle.transition(Event::MoveStarted(Direction::Extend));
        assert_eq!(state, MotionState::MovingExtend);
        assert!(state.is_moving());
        assert_eq!(state.direction(), Some(Direction::Extend));

        let done = state.transition(Event::TravelElapsed);
        assert_eq!(done, MotionState::Idle);
    }

    #[test]
    fn test_interrupt_returns_to_idle() {
        for state in [MotionState::MovingExtend, MotionState::MovingRetract] {
            assert_eq!(state.transition(Event::Interrupted), MotionState::Idle);
        }
    }

    #[test]
    fn test_move_ignored_while_moving() {
        let state = MotionState::MovingRetract;
        assert_eq!(
            state.transition(Event::MoveStarted(Direction::Extend)),
            MotionState::MovingRetract
        );
    }

    #[test]
    fn test_interrupt_on_idle_is_noop() {
        assert_eq!(
            MotionState::Idle.transition(Event::Interrupted),
            MotionState::Idle
        );
    }

    #[test]
    fn test_baseline_bypasses_guard() {
        let states = [
            MotionState::Idle,
            MotionState::MovingExtend,
            MotionState::MovingRetract,
        ];

        for state in states {
            let next = state.transition(Event::BaselineStarted);
            assert_eq!(next, MotionState::MovingExtend);
            assert_eq!(next.transition(Event::BaselineComplete), MotionState::Idle);
        }
    }

    #[test]
    fn test_fault_and_force_from_any_state() {
        let states = [
            MotionState::Idle,
            MotionState::MovingExtend,
            MotionState::MovingRetract,
        ];

        for state in states {
            assert_eq!(state.transition(Event::DispatchFailed), MotionState::Idle);
            assert_eq!(state.transition(Event::PositionForced), MotionState::Idle);
        }
    }
}
