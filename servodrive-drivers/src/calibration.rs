//! Desync recovery
//!
//! Without a position sensor the estimate drifts over time. Recovery runs
//! the actuator into its extend end stop for a full stroke, takes 100 as
//! the new baseline and then re-centers with a normal move.
//!
//! The baseline run cannot be interrupted; commands arriving during it are
//! rejected. The re-center move is an ordinary move and honours `Stop`.

use embassy_sync::blocking_mutex::raw::RawMutex;
use servodrive_core::motion::{Direction, Position};
use servodrive_hal::{PositionStore, RelayOutput};

use crate::controller::{MotionController, MoveOutcome, ServoError};

/// Baseline-and-recenter procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRoutine {
    center: Position,
}

impl CalibrationRoutine {
    pub const fn new(center: Position) -> Self {
        Self { center }
    }

    /// Position the actuator ends at
    pub const fn center(&self) -> Position {
        self.center
    }

    /// Run the procedure on `controller`
    ///
    /// Works from any state, including an unknown estimate.
    pub async fn run<M, R, S, const N: usize>(
        &self,
        controller: &mut MotionController<'_, M, R, S, N>,
    ) -> Result<MoveOutcome, ServoError>
    where
        M: RawMutex,
        R: RelayOutput,
        S: PositionStore,
    {
        info!("calibration started");
        controller.run_baseline().await?;

        info!("calibration: re-centering to {}", self.center);
        let outcome = controller.move_to(self.center).await?;

        info!(
            "calibration complete at {}",
            outcome.position(Direction::Extend.end_stop())
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ServoChannels;
    use crate::controller::MotionSettings;
    use crate::mock::{MemoryStore, RecordingRelays};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::{Instant, Timer};
    use servodrive_core::motion::{PositionEstimate, TravelRate};
    use servodrive_core::state::{MotionState, RejectReason, ServoCommand};
    use servodrive_hal::{Relay, RelayError};

    type Channels = ServoChannels<NoopRawMutex, 4>;

    fn settings() -> MotionSettings {
        MotionSettings::new(TravelRate::from_millis(400).unwrap())
    }

    fn controller(
        channels: &Channels,
        relays: RecordingRelays,
        initial: u8,
    ) -> MotionController<'_, NoopRawMutex, RecordingRelays, MemoryStore, 4> {
        MotionController::new(
            relays,
            MemoryStore::default(),
            settings(),
            channels,
            Position::new(initial),
        )
    }

    #[test]
    fn test_reset_ends_centered_from_any_position() {
        for initial in [0, 50, 100] {
            let channels = Channels::new();
            let mut ctl = controller(&channels, RecordingRelays::default(), initial);

            let outcome = block_on(ctl.reset_position()).unwrap();

            assert_eq!(outcome, MoveOutcome::Arrived(Position::CENTER));
            assert_eq!(ctl.estimate(), PositionEstimate::Known(Position::CENTER));
            assert_eq!(ctl.state(), MotionState::Idle);
            assert!(ctl.relays().output().all_off());
            assert!(!ctl.relays().output().overlapped);
            // Baseline persisted before the re-center result
            assert_eq!(ctl.store().writes.as_slice(), &[100, 50]);
        }
    }

    #[test]
    fn test_baseline_runs_full_stroke() {
        let channels = Channels::new();
        let mut ctl = controller(&channels, RecordingRelays::default(), 100);

        let started = Instant::now();
        block_on(ctl.run_baseline()).unwrap();

        // Extends for the whole stroke even though the estimate said 100
        assert!(started.elapsed().as_millis() >= 400);
        assert_eq!(ctl.relays().output().activations, 1);
        assert_eq!(
            ctl.relays().output().log.last(),
            Some(&(Relay::Plus, false))
        );
    }

    #[test]
    fn test_baseline_ignores_stop() {
        let channels = Channels::new();
        let mut ctl = controller(&channels, RecordingRelays::default(), 20);

        let (outcome, _) = block_on(join(ctl.reset_position(), async {
            Timer::after_millis(100).await;
            channels.send(ServoCommand::Stop).await;
        }));

        assert_eq!(outcome, Ok(MoveOutcome::Arrived(Position::CENTER)));
        assert_eq!(channels.try_rejected(), Some(RejectReason::Calibrating));
        assert_eq!(ctl.store().writes.as_slice(), &[100, 50]);
    }

    #[test]
    fn test_recenter_is_stoppable() {
        let channels = Channels::new();
        let mut ctl = controller(&channels, RecordingRelays::default(), 0);

        // Baseline takes 400 ms, re-center another 200 ms
        let (outcome, _) = block_on(join(ctl.reset_position(), async {
            Timer::after_millis(500).await;
            channels.send(ServoCommand::Stop).await;
        }));

        let Ok(MoveOutcome::Stopped(position)) = outcome else {
            panic!("re-center was not interrupted: {:?}", outcome);
        };
        assert!(position > Position::CENTER && position < Position::OPEN);
        assert_eq!(ctl.estimate().known(), Some(position));
        assert!(ctl.relays().output().all_off());
    }

    #[test]
    fn test_calibration_clears_unknown_estimate() {
        let channels = Channels::new();
        let relays = RecordingRelays {
            fail_next_activation: true,
            ..Default::default()
        };
        let mut ctl = controller(&channels, relays, 60);

        assert_eq!(
            block_on(ctl.close()),
            Err(ServoError::Relay(RelayError::Dispatch))
        );
        assert_eq!(ctl.estimate(), PositionEstimate::Unknown);

        let outcome = block_on(ctl.reset_position()).unwrap();
        assert_eq!(outcome, MoveOutcome::Arrived(Position::CENTER));
        assert_eq!(ctl.estimate(), PositionEstimate::Known(Position::CENTER));
    }

    #[test]
    fn test_custom_center() {
        let routine = CalibrationRoutine::new(Position::new(30));
        assert_eq!(routine.center(), Position::new(30));

        let channels = Channels::new();
        let mut ctl = controller(&channels, RecordingRelays::default(), 0);
        let outcome = block_on(routine.run(&mut ctl)).unwrap();
        assert_eq!(outcome, MoveOutcome::Arrived(Position::new(30)));
    }
}
