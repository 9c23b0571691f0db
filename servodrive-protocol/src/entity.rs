//! Cover-entity view for the home-automation host
//!
//! The host exposes the drive as a cover with open/close/set-position/stop
//! verbs plus a few integration-specific services. [`ServiceCall`] maps
//! those service names onto controller commands and [`CoverState`] is the
//! entity state derived from a status snapshot.

use servodrive_core::state::{ServoCommand, ServoStatus};

/// Service domain of the integration-specific services
pub const DOMAIN: &str = "meibes_servo";

/// Service domain of the generic cover verbs
pub const COVER_DOMAIN: &str = "cover";

/// Supported-feature bits, using the host platform's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoverFeatures(u32);

impl CoverFeatures {
    pub const OPEN: Self = Self(1);
    pub const CLOSE: Self = Self(2);
    pub const SET_POSITION: Self = Self(4);
    pub const STOP: Self = Self(8);

    /// Everything the servo drive supports
    pub const SERVO: Self =
        Self(Self::OPEN.0 | Self::CLOSE.0 | Self::SET_POSITION.0 | Self::STOP.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Errors mapping a service call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError {
    /// Service name not handled by this entity
    UnknownService,
    /// Position service called without a `position` field
    MissingPosition,
}

/// Host service calls understood by the drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceCall {
    OpenServoDrive,
    CloseServoDrive,
    SetServoDrivePosition { position: i32 },
    ResetServoDrivePosition,
    OpenCover,
    CloseCover,
    SetCoverPosition { position: i32 },
    StopCover,
}

impl ServiceCall {
    /// Map a service name and its optional `position` field
    ///
    /// Accepts bare names (`open_servo_drive`) and domain-qualified ones
    /// (`meibes_servo.open_servo_drive`, `cover.stop_cover`).
    pub fn parse(service: &str, position: Option<i32>) -> Result<Self, ServiceError> {
        let (domain, name) = match service.split_once('.') {
            Some((domain, name)) => (Some(domain), name),
            None => (None, service),
        };

        let call = match name {
            "open_servo_drive" => ServiceCall::OpenServoDrive,
            "close_servo_drive" => ServiceCall::CloseServoDrive,
            "set_servo_drive_position" => ServiceCall::SetServoDrivePosition {
                position: position.ok_or(ServiceError::MissingPosition)?,
            },
            "reset_servo_drive_position" => ServiceCall::ResetServoDrivePosition,
            "open_cover" => ServiceCall::OpenCover,
            "close_cover" => ServiceCall::CloseCover,
            "set_cover_position" => ServiceCall::SetCoverPosition {
                position: position.ok_or(ServiceError::MissingPosition)?,
            },
            "stop_cover" => ServiceCall::StopCover,
            _ => return Err(ServiceError::UnknownService),
        };

        match domain {
            Some(domain) if domain != call.domain() => Err(ServiceError::UnknownService),
            _ => Ok(call),
        }
    }

    /// Domain the service is registered under
    pub fn domain(&self) -> &'static str {
        match self {
            ServiceCall::OpenCover
            | ServiceCall::CloseCover
            | ServiceCall::SetCoverPosition { .. }
            | ServiceCall::StopCover => COVER_DOMAIN,
            _ => DOMAIN,
        }
    }

    /// Service name without domain
    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::OpenServoDrive => "open_servo_drive",
            ServiceCall::CloseServoDrive => "close_servo_drive",
            ServiceCall::SetServoDrivePosition { .. } => "set_servo_drive_position",
            ServiceCall::ResetServoDrivePosition => "reset_servo_drive_position",
            ServiceCall::OpenCover => "open_cover",
            ServiceCall::CloseCover => "close_cover",
            ServiceCall::SetCoverPosition { .. } => "set_cover_position",
            ServiceCall::StopCover => "stop_cover",
        }
    }

    /// Controller command for this call
    pub fn command(&self) -> ServoCommand {
        match *self {
            ServiceCall::OpenServoDrive | ServiceCall::OpenCover => ServoCommand::Open,
            ServiceCall::CloseServoDrive | ServiceCall::CloseCover => ServoCommand::Close,
            ServiceCall::SetServoDrivePosition { position }
            | ServiceCall::SetCoverPosition { position } => ServoCommand::SetPosition(position),
            ServiceCall::ResetServoDrivePosition => ServoCommand::ResetPosition,
            ServiceCall::StopCover => ServoCommand::Stop,
        }
    }
}

/// Cover entity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoverState {
    /// 0-100, or `None` while the position is unknown
    pub current_position: Option<u8>,
    pub is_open: bool,
    pub is_closed: bool,
    pub is_opening: bool,
    pub is_closing: bool,
    pub supported_features: CoverFeatures,
}

impl From<&ServoStatus> for CoverState {
    fn from(status: &ServoStatus) -> Self {
        Self {
            current_position: status.estimate.known().map(|p| p.percent()),
            is_open: status.is_open(),
            is_closed: status.is_closed(),
            is_opening: status.is_opening(),
            is_closing: status.is_closing(),
            supported_features: CoverFeatures::SERVO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servodrive_core::motion::{Position, PositionEstimate};
    use servodrive_core::state::MotionState;

    #[test]
    fn test_service_names() {
        let cases = [
            ("open_servo_drive", ServoCommand::Open),
            ("close_servo_drive", ServoCommand::Close),
            ("reset_servo_drive_position", ServoCommand::ResetPosition),
            ("open_cover", ServoCommand::Open),
            ("close_cover", ServoCommand::Close),
            ("stop_cover", ServoCommand::Stop),
        ];
        for (name, command) in cases {
            let call = ServiceCall::parse(name, None).unwrap();
            assert_eq!(call.command(), command);
            assert_eq!(call.name(), name);
        }
    }

    #[test]
    fn test_position_services() {
        let call = ServiceCall::parse("set_servo_drive_position", Some(150)).unwrap();
        assert_eq!(call, ServiceCall::SetServoDrivePosition { position: 150 });
        assert_eq!(call.command(), ServoCommand::SetPosition(150));

        let call = ServiceCall::parse("set_cover_position", Some(-5)).unwrap();
        assert_eq!(call.command(), ServoCommand::SetPosition(-5));

        assert_eq!(
            ServiceCall::parse("set_cover_position", None),
            Err(ServiceError::MissingPosition)
        );
    }

    #[test]
    fn test_qualified_names() {
        let call = ServiceCall::parse("meibes_servo.open_servo_drive", None).unwrap();
        assert_eq!(call, ServiceCall::OpenServoDrive);
        assert_eq!(call.domain(), DOMAIN);

        let call = ServiceCall::parse("cover.stop_cover", None).unwrap();
        assert_eq!(call.domain(), COVER_DOMAIN);

        assert_eq!(
            ServiceCall::parse("cover.open_servo_drive", None),
            Err(ServiceError::UnknownService)
        );
        assert_eq!(
            ServiceCall::parse("toggle", None),
            Err(ServiceError::UnknownService)
        );
    }

    #[test]
    fn test_feature_bits() {
        assert_eq!(CoverFeatures::SERVO.bits(), 15);
        assert!(CoverFeatures::SERVO.contains(CoverFeatures::STOP));
        assert!(!CoverFeatures::OPEN.contains(CoverFeatures::CLOSE));
    }

    #[test]
    fn test_cover_state() {
        let status = ServoStatus {
            estimate: PositionEstimate::Known(Position::new(30)),
            target: Position::CLOSED,
            state: MotionState::MovingRetract,
            store_stale: false,
        };
        let state = CoverState::from(&status);
        assert_eq!(state.current_position, Some(30));
        assert!(state.is_open);
        assert!(!state.is_closed);
        assert!(state.is_closing);
        assert!(!state.is_opening);
        assert_eq!(state.supported_features, CoverFeatures::SERVO);

        let unknown = ServoStatus {
            estimate: PositionEstimate::Unknown,
            ..status
        };
        assert_eq!(CoverState::from(&unknown).current_position, None);
    }
}
