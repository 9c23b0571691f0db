//! Motion state machine
//!
//! The relays are a direct function of [`MotionState`]: one relay on per
//! moving state, both off when idle.

pub mod command;
pub mod events;
pub mod machine;

pub use command::{RejectReason, ServoCommand, ServoStatus};
pub use events::Event;
pub use machine::MotionState;
