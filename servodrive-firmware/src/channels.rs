//! Inter-task communication channels
//!
//! The controller's inbox and status signals live in [`SERVO`]. The link
//! tasks share [`LINK_OUT`] for replies that do not come from the controller.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use servodrive_drivers::ServoChannels;
use servodrive_protocol::DeviceMessage;

/// Commands queued for the controller
pub const SERVO_INBOX_SIZE: usize = 4;

/// Replies queued for the host link
const LINK_OUT_SIZE: usize = 4;

/// Controller inbox, status and rejections
pub static SERVO: ServoChannels<CriticalSectionRawMutex, SERVO_INBOX_SIZE> = ServoChannels::new();

/// Replies produced by the receive task (pong, link-level NAKs)
pub static LINK_OUT: Channel<CriticalSectionRawMutex, DeviceMessage, LINK_OUT_SIZE> =
    Channel::new();

/// Host asked for the current status
pub static STATUS_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();
