//! Travel-time estimation
//!
//! The actuator is assumed to move at constant speed, so travel time is
//! linear in distance:
//!
//! ```text
//! duration = |target - position| * full_travel / 100
//! ```
//!
//! The inverse, [`interpolate`], turns an interrupted move's elapsed time
//! back into a position.

use super::position::Position;

/// Full-stroke travel time
///
/// Never zero; construct through [`TravelRate::from_secs`] or
/// [`TravelRate::from_millis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TravelRate {
    full_travel_ms: u32,
}

impl TravelRate {
    /// Create from a full-stroke time in milliseconds
    pub const fn from_millis(full_travel_ms: u32) -> Option<Self> {
        if full_travel_ms == 0 {
            None
        } else {
            Some(Self { full_travel_ms })
        }
    }

    /// Create from a full-stroke time in seconds
    pub const fn from_secs(full_travel_s: u16) -> Option<Self> {
        Self::from_millis(full_travel_s as u32 * 1000)
    }

    /// Time for a full 0 -> 100 stroke
    pub const fn full_travel_ms(self) -> u32 {
        self.full_travel_ms
    }

    /// Time needed to travel from `from` to `to`
    ///
    /// Zero when the positions are equal.
    pub fn travel_time_ms(self, from: Position, to: Position) -> u64 {
        from.distance(to) as u64 * self.full_travel_ms as u64 / 100
    }
}

/// Estimate the position reached after `elapsed_ms` of a move
///
/// `total_ms` is the move's planned duration. Elapsed time beyond the plan
/// is treated as a completed move; the covered distance is rounded to the
/// nearest percent.
pub fn interpolate(from: Position, to: Position, elapsed_ms: u64, total_ms: u64) -> Position {
    let Some(direction) = from.direction_to(to) else {
        return to;
    };
    if total_ms == 0 || elapsed_ms >= total_ms {
        return to;
    }

    let distance = from.distance(to) as u64;
    let covered = (distance * elapsed_ms + total_ms / 2) / total_ms;

    from.step(direction, covered as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rate_30s() -> TravelRate {
        TravelRate::from_secs(30).unwrap()
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(TravelRate::from_millis(0).is_none());
        assert!(TravelRate::from_secs(0).is_none());
        assert_eq!(TravelRate::from_secs(30).unwrap().full_travel_ms(), 30_000);
    }

    #[test]
    fn test_travel_times() {
        let rate = rate_30s();
        assert_eq!(rate.travel_time_ms(Position::CLOSED, Position::OPEN), 30_000);
        assert_eq!(rate.travel_time_ms(Position::CLOSED, Position::CENTER), 15_000);
        assert_eq!(rate.travel_time_ms(Position::OPEN, Position::CLOSED), 30_000);
        assert_eq!(rate.travel_time_ms(Position::CENTER, Position::CENTER), 0);
    }

    #[test]
    fn test_interpolate_halfway() {
        let p = interpolate(Position::CLOSED, Position::OPEN, 15_000, 30_000);
        assert_eq!(p, Position::CENTER);

        let p = interpolate(Position::OPEN, Position::CLOSED, 15_000, 30_000);
        assert_eq!(p, Position::CENTER);
    }

    #[test]
    fn test_interpolate_partial_range() {
        // 20 -> 60 is a 40% move; a quarter of the way is 10% further
        let p = interpolate(Position::new(20), Position::new(60), 3_000, 12_000);
        assert_eq!(p, Position::new(30));
    }

    #[test]
    fn test_interpolate_bounds() {
        assert_eq!(
            interpolate(Position::CLOSED, Position::OPEN, 0, 30_000),
            Position::CLOSED
        );
        assert_eq!(
            interpolate(Position::CLOSED, Position::OPEN, 45_000, 30_000),
            Position::OPEN
        );
        assert_eq!(
            interpolate(Position::CENTER, Position::CENTER, 10, 0),
            Position::CENTER
        );
    }

    #[test]
    fn test_interpolate_rounds_to_nearest() {
        // 100 * 1006 / 30000 = 3.35 -> 3
        assert_eq!(
            interpolate(Position::CLOSED, Position::OPEN, 1_006, 30_000),
            Position::new(3)
        );
        // 100 * 1050 / 30000 = 3.5 -> 4
        assert_eq!(
            interpolate(Position::CLOSED, Position::OPEN, 1_050, 30_000),
            Position::new(4)
        );
    }

    proptest! {
        #[test]
        fn prop_travel_time_linear(a in 0u8..=100, b in 0u8..=100, secs in 1u16..=600) {
            let rate = TravelRate::from_secs(secs).unwrap();
            let (a, b) = (Position::new(a), Position::new(b));
            let expected = a.distance(b) as u64 * secs as u64 * 1000 / 100;
            prop_assert_eq!(rate.travel_time_ms(a, b), expected);
            prop_assert_eq!(rate.travel_time_ms(a, b), rate.travel_time_ms(b, a));
        }

        #[test]
        fn prop_interpolate_stays_between_endpoints(
            a in 0u8..=100,
            b in 0u8..=100,
            elapsed in 0u64..=40_000,
        ) {
            let (a, b) = (Position::new(a), Position::new(b));
            let total = rate_30s().travel_time_ms(a, b);
            let p = interpolate(a, b, elapsed, total);
            prop_assert!(p >= a.min(b) && p <= a.max(b));
        }
    }
}
