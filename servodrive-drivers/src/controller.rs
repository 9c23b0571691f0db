//! Open-loop motion controller
//!
//! Turns commands into timed relay pulses and keeps a position estimate.
//!
//! # Moves
//!
//! A move from `p` to `t` energises one relay for
//! `|t - p| * full_travel / 100` and then switches it off. While waiting the
//! controller keeps reading its inbox:
//!
//! - `Stop` ends the wait early; the position reached is interpolated from
//!   the elapsed time
//! - every other command is rejected and the move runs on to its deadline
//!
//! Every completed or interrupted move is written to the position store.
//! A failed write is logged and reported through `store_stale`, the move
//! itself still counts.
//!
//! # Faults
//!
//! If a relay command cannot be dispatched both relays are forced off and
//! the estimate becomes [`PositionEstimate::Unknown`]. Moves are refused
//! until calibration or a forced position gives a new baseline.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Timer};

use servodrive_core::config::{ConfigError, ServoConfig};
use servodrive_core::motion::{interpolate, Direction, Position, PositionEstimate, TravelRate};
use servodrive_core::state::{Event, MotionState, RejectReason, ServoCommand, ServoStatus};
use servodrive_hal::{PositionStore, RelayError, RelayOutput};

use crate::calibration::CalibrationRoutine;
use crate::channels::ServoChannels;
use crate::relay::RelayPair;

/// Errors returned by controller operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// A relay command failed; the estimate is now unknown
    Relay(RelayError),
    /// No trustworthy position to plan a move from
    PositionUnknown,
}

impl From<RelayError> for ServoError {
    fn from(e: RelayError) -> Self {
        ServoError::Relay(e)
    }
}

impl ServoError {
    /// Reason reported to the host
    pub fn reason(self) -> RejectReason {
        match self {
            ServoError::Relay(_) => RejectReason::RelayFault,
            ServoError::PositionUnknown => RejectReason::PositionUnknown,
        }
    }
}

/// How a move ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveOutcome {
    /// Already at the target; no relay was touched
    AlreadyThere,
    /// Travel time elapsed
    Arrived(Position),
    /// Interrupted by a stop request
    Stopped(Position),
}

impl MoveOutcome {
    /// Position after the move
    pub fn position(self, from: Position) -> Position {
        match self {
            MoveOutcome::AlreadyThere => from,
            MoveOutcome::Arrived(p) | MoveOutcome::Stopped(p) => p,
        }
    }
}

/// Timing parameters for a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSettings {
    /// Full-stroke travel time
    pub rate: TravelRate,
    /// Re-center target after calibration
    pub center: Position,
    /// Late wake-up allowed before an overshoot is logged
    pub overshoot_tolerance: Duration,
}

impl MotionSettings {
    /// Settings with default center and tolerance
    pub fn new(rate: TravelRate) -> Self {
        Self {
            rate,
            center: Position::new(servodrive_core::config::DEFAULT_CALIBRATION_CENTER),
            overshoot_tolerance: Duration::from_millis(
                servodrive_core::config::DEFAULT_OVERSHOOT_TOLERANCE_MS as u64,
            ),
        }
    }

    /// Settings from a validated configuration
    pub fn from_config(config: &ServoConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rate: config.travel_rate()?,
            center: config.center(),
            overshoot_tolerance: Duration::from_millis(config.overshoot_tolerance_ms as u64),
        })
    }
}

/// Which commands may cut a wait short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitMode {
    /// Normal move; `Stop` interrupts
    Stoppable,
    /// Calibration baseline; everything is rejected
    Baseline,
}

/// Open-loop controller for one servo drive
pub struct MotionController<'a, M: RawMutex, R: RelayOutput, S: PositionStore, const N: usize> {
    relays: RelayPair<R>,
    store: S,
    settings: MotionSettings,
    channels: &'a ServoChannels<M, N>,
    estimate: PositionEstimate,
    target: Position,
    state: MotionState,
    store_stale: bool,
}

impl<'a, M, R, S, const N: usize> MotionController<'a, M, R, S, N>
where
    M: RawMutex,
    R: RelayOutput,
    S: PositionStore,
{
    /// Create an idle controller at `initial`
    ///
    /// Both relays are assumed off. Call [`seed`](Self::seed) to pick up a
    /// stored position instead.
    pub fn new(
        relays: R,
        store: S,
        settings: MotionSettings,
        channels: &'a ServoChannels<M, N>,
        initial: Position,
    ) -> Self {
        Self {
            relays: RelayPair::new(relays),
            store,
            settings,
            channels,
            estimate: PositionEstimate::Known(initial),
            target: initial,
            state: MotionState::Idle,
            store_stale: false,
        }
    }

    /// Load the persisted position, falling back to `fallback`
    ///
    /// A read failure is logged and treated like an empty store.
    pub async fn seed(&mut self, fallback: Position) -> Position {
        let position = match self.store.read_position().await {
            Ok(Some(raw)) => {
                info!("restored position {}", raw);
                Position::new(raw)
            }
            Ok(None) => {
                info!("no stored position, starting at {}", fallback);
                fallback
            }
            Err(e) => {
                warn!("position store read failed: {}", e);
                fallback
            }
        };

        self.estimate = PositionEstimate::Known(position);
        self.target = position;
        self.publish();
        position
    }

    /// Current status snapshot
    pub fn status(&self) -> ServoStatus {
        ServoStatus {
            estimate: self.estimate,
            target: self.target,
            state: self.state,
            store_stale: self.store_stale,
        }
    }

    pub fn estimate(&self) -> PositionEstimate {
        self.estimate
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn settings(&self) -> &MotionSettings {
        &self.settings
    }

    pub fn relays(&self) -> &RelayPair<R> {
        &self.relays
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drive fully open
    pub async fn open(&mut self) -> Result<MoveOutcome, ServoError> {
        self.move_to(Position::OPEN).await
    }

    /// Drive fully closed
    pub async fn close(&mut self) -> Result<MoveOutcome, ServoError> {
        self.move_to(Position::CLOSED).await
    }

    /// Drive to `position`, clamped to 0..=100
    pub async fn set_position(&mut self, position: i32) -> Result<MoveOutcome, ServoError> {
        self.move_to(Position::clamped(position)).await
    }

    /// Stop request outside a move
    ///
    /// Moves in flight are interrupted by sending [`ServoCommand::Stop`]
    /// through the controller's channels. Called directly, the controller
    /// is already idle and this does nothing.
    pub fn stop(&mut self) {
        debug!("stop while idle ignored");
    }

    /// Overwrite the estimate without moving
    ///
    /// Both relays are switched off and the forced value is persisted.
    pub async fn force_position(&mut self, position: Position) -> Result<(), ServoError> {
        if let Err(e) = self.relays.release_all().await {
            return Err(self.fault(e).await);
        }

        info!("position forced to {}", position);
        self.state = self.state.transition(Event::PositionForced);
        self.estimate = PositionEstimate::Known(position);
        self.target = position;
        self.persist(position).await;
        self.publish();
        Ok(())
    }

    /// Run the desync recovery procedure
    pub async fn reset_position(&mut self) -> Result<MoveOutcome, ServoError> {
        let routine = CalibrationRoutine::new(self.settings.center);
        routine.run(self).await
    }

    /// Carry out one command
    pub async fn handle(&mut self, command: ServoCommand) -> Result<(), ServoError> {
        debug!("command {}", command);
        match command {
            ServoCommand::Open => self.open().await.map(|_| ()),
            ServoCommand::Close => self.close().await.map(|_| ()),
            ServoCommand::SetPosition(p) => self.set_position(p).await.map(|_| ()),
            ServoCommand::Stop => {
                self.stop();
                Ok(())
            }
            ServoCommand::ResetPosition => self.reset_position().await.map(|_| ()),
            ServoCommand::ForcePosition(p) => self.force_position(Position::clamped(p)).await,
        }
    }

    /// Serve the inbox forever
    pub async fn run(&mut self) -> ! {
        info!("servo controller running");
        self.publish();

        loop {
            let command = self.channels.receive().await;
            if let Err(e) = self.handle(command).await {
                error!("command {} failed: {}", command, e);
                self.channels.reject(e.reason());
            }
        }
    }

    /// Timed move to `target`
    pub(crate) async fn move_to(&mut self, target: Position) -> Result<MoveOutcome, ServoError> {
        let Some(from) = self.estimate.known() else {
            warn!("move to {} refused, position unknown", target);
            return Err(ServoError::PositionUnknown);
        };

        self.target = target;

        let Some(direction) = from.direction_to(target) else {
            debug!("already at {}", target);
            self.publish();
            return Ok(MoveOutcome::AlreadyThere);
        };

        let duration_ms = self.settings.rate.travel_time_ms(from, target);
        info!("moving {} -> {} ({} ms)", from, target, duration_ms);

        self.state = self.state.transition(Event::MoveStarted(direction));
        if let Err(e) = self.relays.drive(direction).await {
            return Err(self.fault(e).await);
        }
        self.publish();

        let started = Instant::now();
        let deadline = started + Duration::from_millis(duration_ms);
        let interrupted = self.wait_until(deadline, WaitMode::Stoppable).await;
        let elapsed_ms = started.elapsed().as_millis();

        if let Err(e) = self.relays.release().await {
            return Err(self.fault(e).await);
        }

        let (position, outcome) = if interrupted {
            let position = interpolate(from, target, elapsed_ms, duration_ms);
            info!("stopped at {} after {} ms", position, elapsed_ms);
            self.state = self.state.transition(Event::Interrupted);
            (position, MoveOutcome::Stopped(position))
        } else {
            self.check_overshoot(deadline);
            self.state = self.state.transition(Event::TravelElapsed);
            (target, MoveOutcome::Arrived(target))
        };

        self.estimate = PositionEstimate::Known(position);
        self.persist(position).await;
        self.publish();
        Ok(outcome)
    }

    /// Full-stroke extend, ignoring the current estimate
    ///
    /// Not cancellable. Leaves the controller idle at 100.
    pub(crate) async fn run_baseline(&mut self) -> Result<(), ServoError> {
        let duration_ms = self.settings.rate.full_travel_ms() as u64;
        info!("baseline run ({} ms)", duration_ms);

        let end_stop = Direction::Extend.end_stop();
        self.state = self.state.transition(Event::BaselineStarted);
        self.target = end_stop;
        if let Err(e) = self.relays.drive(Direction::Extend).await {
            return Err(self.fault(e).await);
        }
        self.publish();

        let deadline = Instant::now() + Duration::from_millis(duration_ms);
        self.wait_until(deadline, WaitMode::Baseline).await;

        if let Err(e) = self.relays.release().await {
            return Err(self.fault(e).await);
        }

        self.state = self.state.transition(Event::BaselineComplete);
        self.estimate = PositionEstimate::Known(end_stop);
        self.persist(end_stop).await;
        self.publish();
        Ok(())
    }

    /// Wait for `deadline`, serving the inbox meanwhile
    ///
    /// Returns `true` if a stop request ended the wait early.
    async fn wait_until(&self, deadline: Instant, mode: WaitMode) -> bool {
        let channels = self.channels;
        loop {
            match select(Timer::at(deadline), channels.receive()).await {
                Either::First(()) => return false,
                Either::Second(ServoCommand::Stop) if mode == WaitMode::Stoppable => {
                    return true;
                }
                Either::Second(command) => {
                    let reason = match mode {
                        WaitMode::Stoppable => RejectReason::Busy,
                        WaitMode::Baseline => RejectReason::Calibrating,
                    };
                    warn!("{} rejected while moving: {}", command, reason);
                    channels.reject(reason);
                }
            }
        }
    }

    fn check_overshoot(&self, deadline: Instant) {
        let now = Instant::now();
        if now > deadline + self.settings.overshoot_tolerance {
            warn!("woke {} ms past deadline", (now - deadline).as_millis());
        }
    }

    async fn persist(&mut self, position: Position) {
        match self.store.write_position(position.percent()).await {
            Ok(()) => self.store_stale = false,
            Err(e) => {
                warn!("failed to persist position {}: {}", position, e);
                self.store_stale = true;
            }
        }
    }

    /// Relay dispatch failed: force everything off and forget the position
    async fn fault(&mut self, error: RelayError) -> ServoError {
        error!("relay dispatch failed: {}", error);
        // Best effort; failures are logged by the pair
        let _ = self.relays.release_all().await;
        self.state = self.state.transition(Event::DispatchFailed);
        self.estimate = PositionEstimate::Unknown;
        self.publish();
        ServoError::Relay(error)
    }

    fn publish(&self) {
        self.channels.publish(self.status());
    }
}
