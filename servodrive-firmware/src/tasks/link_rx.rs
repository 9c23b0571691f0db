//! Host link receive task
//!
//! Parses frames from the host and routes them: commands go to the
//! controller inbox, everything else is answered through [`LINK_OUT`].

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use servodrive_core::state::RejectReason;
use servodrive_protocol::{DeviceMessage, FrameParser, HostMessage};

use crate::channels::{LINK_OUT, SERVO, STATUS_REQUEST};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives and parses frames from the host
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match HostMessage::from_frame(&frame) {
                            Ok(msg) => handle_host_message(msg).await,
                            Err(e) => {
                                warn!("Unknown message {:#x}: {}", frame.msg_type, e);
                                reply(DeviceMessage::Nak(RejectReason::Malformed)).await;
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Frame parse error: {}", e);
                            reply(DeviceMessage::Nak(RejectReason::Malformed)).await;
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {}", e);
            }
        }
    }
}

async fn handle_host_message(msg: HostMessage) {
    match msg {
        HostMessage::Command(command) => {
            debug!("Command: {}", command);
            // The controller rejects commands it cannot take; a full inbox is
            // the only case it never sees
            if let Err(command) = SERVO.try_send(command) {
                warn!("Servo inbox full, dropping {}", command);
                reply(DeviceMessage::Nak(RejectReason::Busy)).await;
            }
        }
        HostMessage::Ping => {
            trace!("PING received");
            reply(DeviceMessage::Pong).await;
        }
        HostMessage::GetStatus => {
            STATUS_REQUEST.signal(());
        }
    }
}

async fn reply(msg: DeviceMessage) {
    LINK_OUT.send(msg).await;
}
