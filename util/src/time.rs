//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration.num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a std duration between two instants into seconds, allowing for a
/// negative difference if `later` is actually before `earlier`.
pub fn signed_seconds_between(
    earlier: std::time::Instant, 
    later: std::time::Instant
) -> f64 {
    if later >= earlier {
        (later - earlier).as_secs_f64()
    }
    else {
        -(earlier - later).as_secs_f64()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)), 
            Some(1.5)
        );
    }

    #[test]
    fn test_signed_seconds_between() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(20);

        assert!((signed_seconds_between(t0, t1) - 0.02).abs() < 1e-9);
        assert!((signed_seconds_between(t1, t0) + 0.02).abs() < 1e-9);
    }
}
