//! # Drive-by-wire Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands sent to the drive-by-wire system once per control cycle.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DbwDems {
    /// Throttle pedal demand between 0 and 1.
    pub throttle: f64,

    /// Brake torque demand.
    ///
    /// Units: Newton meters
    pub brake_nm: f64,

    /// Steering wheel angle demand, positive to the left.
    ///
    /// Units: radians
    pub steer_rad: f64,
}

/// Sensor data reported by the drive-by-wire system.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DbwSensData {
    /// Current forward velocity of the vehicle.
    ///
    /// Units: meters/second
    pub current_vel_ms: f64,

    /// True if the safety driver has handed control to drive-by-wire.
    pub dbw_enabled: bool,
}

/// The velocity the vehicle should currently be travelling at, as produced by
/// the waypoint follower.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TwistCmd {
    /// Desired forward velocity.
    ///
    /// Units: meters/second
    pub linear_ms: f64,

    /// Desired yaw rate, positive to the left.
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DbwDems {
    /// Demands with everything at zero.
    pub fn zero() -> Self {
        Self::default()
    }
}
