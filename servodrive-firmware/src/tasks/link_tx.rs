//! Host link transmit task
//!
//! Forwards every status snapshot and rejection from the controller, plus
//! the replies queued by the receive task.

use defmt::*;
use embassy_futures::select::{select4, Either4};
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use servodrive_core::state::ServoStatus;
use servodrive_protocol::{DeviceMessage, MAX_FRAME_SIZE};

use crate::channels::{LINK_OUT, SERVO, STATUS_REQUEST};

/// Link TX task - sends frames to the host
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    // Answered to GET_STATUS; stays unknown until the controller has seeded
    let mut last_status = ServoStatus::unknown();

    loop {
        let msg = match select4(
            SERVO.wait_status(),
            SERVO.wait_rejected(),
            LINK_OUT.receive(),
            STATUS_REQUEST.wait(),
        )
        .await
        {
            Either4::First(status) => {
                last_status = status;
                DeviceMessage::Status(status)
            }
            Either4::Second(reason) => DeviceMessage::Nak(reason),
            Either4::Third(msg) => msg,
            Either4::Fourth(()) => DeviceMessage::Status(last_status),
        };

        send(&mut tx, &msg).await;
    }
}

async fn send(tx: &mut BufferedUartTx, msg: &DeviceMessage) {
    let frame = match msg.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Failed to encode {}: {}", msg, e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    if let Ok(len) = frame.encode(&mut buf) {
        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Failed to send frame: {:?}", e);
        } else {
            trace!("TX: {}", msg);
        }
    }
}
