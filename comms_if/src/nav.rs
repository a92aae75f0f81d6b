//! # Navigation Types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The current pose of the vehicle in the map frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the vehicle in the map frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Heading of the vehicle, the angle to the positive map X axis.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// A single point on the vehicle's base path.
///
/// Waypoints are always handled as an ordered list, the order of which is the
/// nominal driving direction.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position of the waypoint in the map frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }
}

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
        }
    }
}
