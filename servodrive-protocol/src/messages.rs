//! Message types for the host link
//!
//! - Host → device: controller commands, ping, status request
//! - Device → host: status snapshots, pong, rejections

use servodrive_core::motion::{Position, PositionEstimate};
use servodrive_core::state::{MotionState, RejectReason, ServoCommand, ServoStatus};

use crate::frame::{Frame, FrameError};

// Message type IDs: host → device
pub const MSG_OPEN: u8 = 0x01;
pub const MSG_CLOSE: u8 = 0x02;
pub const MSG_SET_POSITION: u8 = 0x03;
pub const MSG_STOP: u8 = 0x04;
pub const MSG_RESET_POSITION: u8 = 0x05;
pub const MSG_FORCE_POSITION: u8 = 0x06;
pub const MSG_PING: u8 = 0x07;
pub const MSG_GET_STATUS: u8 = 0x08;

// Message type IDs: device → host
pub const MSG_STATUS: u8 = 0x20;
pub const MSG_PONG: u8 = 0x21;
pub const MSG_NAK: u8 = 0x22;

/// Position byte sent when the estimate is unknown
pub const POSITION_UNKNOWN: u8 = 0xFF;

/// Status flag: last position write failed
pub const FLAG_STORE_STALE: u8 = 0x01;

/// Messages sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage {
    /// Forward a command to the controller
    Command(ServoCommand),
    /// Heartbeat request
    Ping,
    /// Ask for the current status
    GetStatus,
}

impl HostMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let payload = frame.payload.as_slice();
        let command = match frame.msg_type {
            MSG_OPEN => ServoCommand::Open,
            MSG_CLOSE => ServoCommand::Close,
            MSG_SET_POSITION => match payload {
                [lo, hi] => ServoCommand::SetPosition(i16::from_le_bytes([*lo, *hi]) as i32),
                _ => return Err(FrameError::InvalidFrame),
            },
            MSG_STOP => ServoCommand::Stop,
            MSG_RESET_POSITION => ServoCommand::ResetPosition,
            MSG_FORCE_POSITION => match payload {
                [position] => ServoCommand::ForcePosition(*position as i32),
                _ => return Err(FrameError::InvalidFrame),
            },
            MSG_PING => return Ok(HostMessage::Ping),
            MSG_GET_STATUS => return Ok(HostMessage::GetStatus),
            _ => return Err(FrameError::InvalidFrame),
        };
        Ok(HostMessage::Command(command))
    }

    /// Encode this message into a frame (used by host-side tooling and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            HostMessage::Command(command) => match *command {
                ServoCommand::Open => Ok(Frame::empty(MSG_OPEN)),
                ServoCommand::Close => Ok(Frame::empty(MSG_CLOSE)),
                ServoCommand::SetPosition(p) => {
                    let p = p.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
                    Frame::new(MSG_SET_POSITION, &p.to_le_bytes())
                }
                ServoCommand::Stop => Ok(Frame::empty(MSG_STOP)),
                ServoCommand::ResetPosition => Ok(Frame::empty(MSG_RESET_POSITION)),
                ServoCommand::ForcePosition(p) => {
                    Frame::new(MSG_FORCE_POSITION, &[Position::clamped(p).percent()])
                }
            },
            HostMessage::Ping => Ok(Frame::empty(MSG_PING)),
            HostMessage::GetStatus => Ok(Frame::empty(MSG_GET_STATUS)),
        }
    }
}

/// Messages sent by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage {
    /// Status snapshot
    Status(ServoStatus),
    /// Heartbeat response
    Pong,
    /// A command was not carried out
    Nak(RejectReason),
}

impl DeviceMessage {
    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            DeviceMessage::Status(status) => Frame::new(MSG_STATUS, &encode_status(status)),
            DeviceMessage::Pong => Ok(Frame::empty(MSG_PONG)),
            DeviceMessage::Nak(reason) => Frame::new(MSG_NAK, &[reason.as_u8()]),
        }
    }

    /// Parse a message from a frame (used by host-side tooling and tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match (frame.msg_type, frame.payload.as_slice()) {
            (MSG_STATUS, payload) => decode_status(payload).map(DeviceMessage::Status),
            (MSG_PONG, []) => Ok(DeviceMessage::Pong),
            (MSG_NAK, [reason]) => RejectReason::from_u8(*reason)
                .map(DeviceMessage::Nak)
                .ok_or(FrameError::InvalidFrame),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Payload: `[position | 0xFF, target, state, flags]`
fn encode_status(status: &ServoStatus) -> [u8; 4] {
    let position = match status.estimate {
        PositionEstimate::Known(p) => p.percent(),
        PositionEstimate::Unknown => POSITION_UNKNOWN,
    };
    let state = match status.state {
        MotionState::Idle => 0,
        MotionState::MovingExtend => 1,
        MotionState::MovingRetract => 2,
    };
    let flags = if status.store_stale { FLAG_STORE_STALE } else { 0 };

    [position, status.target.percent(), state, flags]
}

fn decode_status(payload: &[u8]) -> Result<ServoStatus, FrameError> {
    let [position, target, state, flags] = payload else {
        return Err(FrameError::InvalidFrame);
    };

    let estimate = match *position {
        POSITION_UNKNOWN => PositionEstimate::Unknown,
        p if p <= 100 => PositionEstimate::Known(Position::new(p)),
        _ => return Err(FrameError::InvalidFrame),
    };
    if *target > 100 {
        return Err(FrameError::InvalidFrame);
    }
    let state = match *state {
        0 => MotionState::Idle,
        1 => MotionState::MovingExtend,
        2 => MotionState::MovingRetract,
        _ => return Err(FrameError::InvalidFrame),
    };

    Ok(ServoStatus {
        estimate,
        target: Position::new(*target),
        state,
        store_stale: flags & FLAG_STORE_STALE != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        let cases = [
            (MSG_OPEN, ServoCommand::Open),
            (MSG_CLOSE, ServoCommand::Close),
            (MSG_STOP, ServoCommand::Stop),
            (MSG_RESET_POSITION, ServoCommand::ResetPosition),
        ];
        for (msg_type, command) in cases {
            let msg = HostMessage::from_frame(&Frame::empty(msg_type)).unwrap();
            assert_eq!(msg, HostMessage::Command(command));
        }
        assert_eq!(
            HostMessage::from_frame(&Frame::empty(MSG_PING)),
            Ok(HostMessage::Ping)
        );
        assert_eq!(
            HostMessage::from_frame(&Frame::empty(MSG_GET_STATUS)),
            Ok(HostMessage::GetStatus)
        );
    }

    #[test]
    fn test_set_position_payload() {
        let frame = Frame::new(MSG_SET_POSITION, &(-5i16).to_le_bytes()).unwrap();
        assert_eq!(
            HostMessage::from_frame(&frame),
            Ok(HostMessage::Command(ServoCommand::SetPosition(-5)))
        );

        let frame = HostMessage::Command(ServoCommand::SetPosition(150))
            .to_frame()
            .unwrap();
        assert_eq!(frame.payload.as_slice(), &[150, 0]);
    }

    #[test]
    fn test_bad_payloads_rejected() {
        let short = Frame::new(MSG_SET_POSITION, &[1]).unwrap();
        assert_eq!(HostMessage::from_frame(&short), Err(FrameError::InvalidFrame));

        let empty_force = Frame::empty(MSG_FORCE_POSITION);
        assert_eq!(
            HostMessage::from_frame(&empty_force),
            Err(FrameError::InvalidFrame)
        );

        let unknown = Frame::empty(0x7F);
        assert_eq!(HostMessage::from_frame(&unknown), Err(FrameError::InvalidFrame));
    }

    #[test]
    fn test_force_position_clamped_on_encode() {
        let frame = HostMessage::Command(ServoCommand::ForcePosition(300))
            .to_frame()
            .unwrap();
        assert_eq!(frame.msg_type, MSG_FORCE_POSITION);
        assert_eq!(frame.payload.as_slice(), &[100]);
    }

    #[test]
    fn test_status_payload() {
        let status = ServoStatus {
            estimate: PositionEstimate::Known(Position::new(42)),
            target: Position::OPEN,
            state: MotionState::MovingExtend,
            store_stale: true,
        };
        let frame = DeviceMessage::Status(status).to_frame().unwrap();

        assert_eq!(frame.msg_type, MSG_STATUS);
        assert_eq!(frame.payload.as_slice(), &[42, 100, 1, FLAG_STORE_STALE]);
        assert_eq!(
            DeviceMessage::from_frame(&frame),
            Ok(DeviceMessage::Status(status))
        );
    }

    #[test]
    fn test_unknown_position_marker() {
        let status = ServoStatus {
            estimate: PositionEstimate::Unknown,
            target: Position::CENTER,
            state: MotionState::Idle,
            store_stale: false,
        };
        let frame = DeviceMessage::Status(status).to_frame().unwrap();
        assert_eq!(frame.payload[0], POSITION_UNKNOWN);
        assert_eq!(
            DeviceMessage::from_frame(&frame),
            Ok(DeviceMessage::Status(status))
        );
    }

    #[test]
    fn test_unreported_status_marks_position_unknown() {
        let frame = DeviceMessage::Status(ServoStatus::unknown()).to_frame().unwrap();
        assert_eq!(frame.payload.as_slice(), &[POSITION_UNKNOWN, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_status_rejected() {
        let bad_state = Frame::new(MSG_STATUS, &[10, 10, 9, 0]).unwrap();
        assert_eq!(DeviceMessage::from_frame(&bad_state), Err(FrameError::InvalidFrame));

        let bad_position = Frame::new(MSG_STATUS, &[101, 10, 0, 0]).unwrap();
        assert_eq!(
            DeviceMessage::from_frame(&bad_position),
            Err(FrameError::InvalidFrame)
        );

        let bad_target = Frame::new(MSG_STATUS, &[10, 101, 0, 0]).unwrap();
        assert_eq!(
            DeviceMessage::from_frame(&bad_target),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_nak_and_pong() {
        let frame = DeviceMessage::Nak(RejectReason::Busy).to_frame().unwrap();
        assert_eq!(frame.payload.as_slice(), &[1]);
        assert_eq!(
            DeviceMessage::from_frame(&frame),
            Ok(DeviceMessage::Nak(RejectReason::Busy))
        );

        let frame = DeviceMessage::Pong.to_frame().unwrap();
        assert_eq!(DeviceMessage::from_frame(&frame), Ok(DeviceMessage::Pong));
    }
}
