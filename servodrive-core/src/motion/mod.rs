//! Position estimation
//!
//! Without a position sensor the only source of truth is time: how long a
//! relay was energised, relative to how long a full stroke takes.

pub mod estimator;
pub mod position;

pub use estimator::{interpolate, TravelRate};
pub use position::{Direction, Position, PositionEstimate};
