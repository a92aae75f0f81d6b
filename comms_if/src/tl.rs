//! # Traffic Light Types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A traffic light as reported by the traffic light source.
///
/// The source always sends the complete list of lights, and the position of a
/// light in that list matches the position of its stop line in the stop line
/// configuration.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    /// Position of the light itself in the map frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// The colour of the light. In simulation this is the true colour, on the
    /// physical vehicle it is `Unknown`.
    pub state: LightState,
}

/// The waypoint the vehicle must stop at for a red light, published by the
/// traffic light detector once per perception cycle.
///
/// Serialised as the plain waypoint index, or `-1` if no stop is required.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct StopWaypoint(pub Option<usize>);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The colour of a traffic light.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightState {
    Red,
    Yellow,
    Green,
    Unknown,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for LightState {
    fn default() -> Self {
        LightState::Unknown
    }
}

impl TrafficLight {
    pub fn new(x_m: f64, y_m: f64, z_m: f64, state: LightState) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, z_m),
            state,
        }
    }
}

impl StopWaypoint {
    /// No stop is required.
    pub const NONE: StopWaypoint = StopWaypoint(None);

    /// Get the message value for this stop, `-1` if no stop is required.
    pub fn as_msg(&self) -> i32 {
        match self.0 {
            Some(i) => i32::try_from(i).unwrap_or(i32::MAX),
            None => -1,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.0.is_some()
    }
}

impl From<i32> for StopWaypoint {
    fn from(msg: i32) -> Self {
        StopWaypoint(usize::try_from(msg).ok())
    }
}

impl From<StopWaypoint> for i32 {
    fn from(wp: StopWaypoint) -> Self {
        wp.as_msg()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop_waypoint_msg() {
        assert_eq!(StopWaypoint::NONE.as_msg(), -1);
        assert_eq!(StopWaypoint(Some(0)).as_msg(), 0);
        assert_eq!(StopWaypoint::from(-1), StopWaypoint::NONE);
        assert_eq!(StopWaypoint::from(15), StopWaypoint(Some(15)));

        assert_eq!(serde_json::to_string(&StopWaypoint(Some(15))).unwrap(), "15");
        assert_eq!(serde_json::to_string(&StopWaypoint::NONE).unwrap(), "-1");
    }
}
