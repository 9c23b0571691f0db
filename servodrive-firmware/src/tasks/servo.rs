//! Motion controller task

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use servodrive_core::motion::Position;
use servodrive_drivers::MotionController;
use servodrive_hal_rp2040::{FlashPositionStore, GpioRelays};

use crate::channels::SERVO_INBOX_SIZE;

/// The controller as wired on this board
pub type Servo = MotionController<
    'static,
    CriticalSectionRawMutex,
    GpioRelays<'static>,
    FlashPositionStore<'static>,
    SERVO_INBOX_SIZE,
>;

/// Restore the stored position, then serve commands forever
#[embassy_executor::task]
pub async fn servo_task(mut servo: Servo) {
    // No stored value means a fresh board; the actuator ships retracted
    let position = servo.seed(Position::CLOSED).await;
    info!(
        "Servo task started at {}% ({} ms full stroke)",
        position.percent(),
        servo.settings().rate.full_travel_ms()
    );

    servo.run().await
}
