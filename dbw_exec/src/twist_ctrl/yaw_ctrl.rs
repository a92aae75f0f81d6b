//! Feed-forward steering controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Computes the steering wheel angle which gives a target yaw rate, using a
/// bicycle model of the vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct YawController {
    /// Units: meters
    wheel_base_m: f64,

    steer_ratio: f64,

    /// Below this speed curvature is undefined and no steering is demanded.
    ///
    /// Units: meters/second
    min_speed_ms: f64,

    /// Units: meters/second^2
    max_lat_accel_mss: f64,

    /// Units: radians
    max_steer_angle_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl YawController {
    pub fn new(
        wheel_base_m: f64,
        steer_ratio: f64,
        min_speed_ms: f64,
        max_lat_accel_mss: f64,
        max_steer_angle_rad: f64
    ) -> Self {
        Self {
            wheel_base_m,
            steer_ratio,
            min_speed_ms,
            max_lat_accel_mss,
            max_steer_angle_rad,
        }
    }

    /// Build the controller from the twist controller parameters.
    pub fn from_params(params: &Params) -> Self {
        Self::new(
            params.vehicle.wheel_base_m,
            params.vehicle.steer_ratio,
            params.min_vel_ms,
            params.vehicle.max_lat_accel_mss,
            params.vehicle.max_steer_angle_rad,
        )
    }

    /// Steering wheel angle for a turn of the given radius.
    ///
    /// Units: radians
    fn get_angle(&self, radius_m: f64) -> f64 {
        let angle = (self.wheel_base_m / radius_m).atan() * self.steer_ratio;
        angle.max(-self.max_steer_angle_rad).min(self.max_steer_angle_rad)
    }

    /// Get the steering wheel angle demand.
    ///
    /// The target yaw rate is first rescaled from the target speed to the
    /// current speed, so that the path curvature is kept, then limited so
    /// the lateral acceleration at the current speed stays within the
    /// maximum.
    ///
    /// # Inputs
    /// - `linear_vel_ms`: Target forward velocity
    /// - `angular_vel_rads`: Target yaw rate
    /// - `current_vel_ms`: Current forward velocity
    pub fn get_steering(
        &self, 
        linear_vel_ms: f64, 
        angular_vel_rads: f64, 
        current_vel_ms: f64
    ) -> f64 {
        if linear_vel_ms.abs() < self.min_speed_ms || linear_vel_ms == 0.0 {
            return 0.0
        }

        let mut angular_vel_rads = current_vel_ms * angular_vel_rads / linear_vel_ms;

        if current_vel_ms.abs() > self.min_speed_ms {
            let max_yaw_rate_rads = (self.max_lat_accel_mss / current_vel_ms).abs();
            angular_vel_rads = angular_vel_rads
                .max(-max_yaw_rate_rads)
                .min(max_yaw_rate_rads);
        }

        if angular_vel_rads == 0.0 {
            return 0.0
        }

        self.get_angle(current_vel_ms.max(self.min_speed_ms) / angular_vel_rads)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn controller() -> YawController {
        YawController::new(2.8498, 14.8, 0.1, 3.0, 8.0)
    }

    #[test]
    fn test_straight_and_stopped() {
        let yc = controller();

        assert_eq!(yc.get_steering(10.0, 0.0, 10.0), 0.0);
        assert_eq!(yc.get_steering(0.0, 0.5, 10.0), 0.0);
        assert_eq!(yc.get_steering(0.05, 0.5, 0.05), 0.0);
        assert_eq!(yc.get_steering(5.0, 0.5, 0.0), 0.0);
    }

    #[test]
    fn test_turn() {
        let yc = controller();

        // At the target speed, a 50 m radius turn
        let steer = yc.get_steering(10.0, 0.2, 10.0);
        let expected = (2.8498f64 / 50.0).atan() * 14.8;
        assert!((steer - expected).abs() < 1e-9);

        // Turning right is symmetric
        assert!((yc.get_steering(10.0, -0.2, 10.0) + expected).abs() < 1e-9);

        // The curvature is kept when the current speed differs from the target
        assert!((yc.get_steering(10.0, 0.2, 5.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_limits() {
        let yc = controller();

        // 1 rad/s at 20 m/s is 20 m/s^2 laterally, limited to 3 m/s^2 which
        // is a radius of 400 / 3 m
        let steer = yc.get_steering(20.0, 1.0, 20.0);
        let expected = (2.8498f64 / (400.0 / 3.0)).atan() * 14.8;
        assert!((steer - expected).abs() < 1e-9);

        // A very tight turn is clamped to the maximum angle
        let steer = yc.get_steering(1.0, 5.0, 1.0);
        assert_eq!(steer, 8.0);
        assert_eq!(yc.get_steering(1.0, -5.0, 1.0), -8.0);
    }
}
