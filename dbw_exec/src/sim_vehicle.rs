//! # Simulated vehicle
//!
//! A kinematic bicycle model of the vehicle, used to close the loop when the
//! executable is driven from a script rather than a real vehicle or an
//! external simulator. Throttle and brake are converted into a longitudinal
//! acceleration, the steering wheel angle into a road wheel angle, and the
//! pose is integrated with a simple Euler step.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::dbw::{DbwDems, DbwSensData},
    nav::Pose,
};
use util::maths::{lin_map, wrap_pi};

use crate::twist_ctrl::VehicleParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated vehicle not covered by the vehicle geometry.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Acceleration produced by a full throttle demand.
    ///
    /// Units: meters/second^2
    pub full_throttle_accel_mss: f64,

    /// Deceleration from rolling resistance and drag, applied whenever the
    /// vehicle is moving.
    ///
    /// Units: meters/second^2
    pub coast_decel_mss: f64,
}

/// Simulated vehicle state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimVehicle {
    #[serde(skip)]
    vehicle: VehicleParams,

    params: SimParams,

    /// Current pose in the map frame
    pub pose: Pose,

    /// Current forward velocity, never negative.
    ///
    /// Units: meters/second
    pub vel_ms: f64,

    /// Distance travelled since the start.
    ///
    /// Units: meters
    pub odometer_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            full_throttle_accel_mss: 4.0,
            coast_decel_mss: 0.1,
        }
    }
}

impl SimVehicle {

    pub fn new(vehicle: VehicleParams, params: SimParams) -> Self {
        Self {
            vehicle,
            params,
            ..Self::default()
        }
    }

    /// Move the vehicle to the given pose and bring it to rest.
    pub fn set_pose(&mut self, pose: Pose) {
        debug!(
            "SimVehicle moved to ({:.2}, {:.2}) heading {:.3} rad", 
            pose.position_m[0], pose.position_m[1], pose.heading_rad
        );
        self.pose = pose;
        self.vel_ms = 0.0;
    }

    /// Sensor data as the drive-by-wire system would report it.
    pub fn sens_data(&self, dbw_enabled: bool) -> DbwSensData {
        DbwSensData {
            current_vel_ms: self.vel_ms,
            dbw_enabled,
        }
    }

    /// Advance the simulation by `dt_s` seconds under the given demands.
    pub fn step(&mut self, dems: &DbwDems, dt_s: f64) {
        if dt_s <= 0.0 {
            return;
        }

        // Longitudinal
        let throttle_accel_mss = lin_map(
            (0.0, 1.0), 
            (0.0, self.params.full_throttle_accel_mss), 
            dems.throttle.max(0.0).min(1.0)
        );
        let brake_decel_mss = dems.brake_nm.max(0.0) 
            / (self.vehicle.vehicle_mass_kg * self.vehicle.wheel_radius_m);
        let coast_decel_mss = if self.vel_ms > 0.0 {
            self.params.coast_decel_mss
        }
        else {
            0.0
        };

        let accel_mss = throttle_accel_mss - brake_decel_mss - coast_decel_mss;

        // Brakes and drag can stop the vehicle but not reverse it
        let new_vel_ms = (self.vel_ms + accel_mss * dt_s).max(0.0);
        let mean_vel_ms = 0.5 * (self.vel_ms + new_vel_ms);
        self.vel_ms = new_vel_ms;

        // Lateral
        let wheel_angle_rad = dems.steer_rad
            .max(-self.vehicle.max_steer_angle_rad)
            .min(self.vehicle.max_steer_angle_rad)
            / self.vehicle.steer_ratio;
        let yaw_rate_rads = mean_vel_ms * wheel_angle_rad.tan() / self.vehicle.wheel_base_m;

        let dist_m = mean_vel_ms * dt_s;
        let mid_heading_rad = self.pose.heading_rad + 0.5 * yaw_rate_rads * dt_s;

        self.pose.position_m += Vector2::new(mid_heading_rad.cos(), mid_heading_rad.sin()) * dist_m;
        self.pose.heading_rad = wrap_pi(self.pose.heading_rad + yaw_rate_rads * dt_s);
        self.odometer_m += dist_m;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vehicle() -> SimVehicle {
        SimVehicle::new(
            VehicleParams::default(), 
            SimParams {
                full_throttle_accel_mss: 4.0,
                coast_decel_mss: 0.0,
            }
        )
    }

    #[test]
    fn test_straight_line() {
        let mut v = vehicle();
        let dems = DbwDems { throttle: 0.5, brake_nm: 0.0, steer_rad: 0.0 };

        for _ in 0..50 {
            v.step(&dems, 0.02);
        }

        // 2 m/s^2 for 1 s
        assert!((v.vel_ms - 2.0).abs() < 1e-9);
        assert!((v.pose.position_m[0] - 1.0).abs() < 1e-9);
        assert!(v.pose.position_m[1].abs() < 1e-12);
        assert!((v.odometer_m - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_brake_does_not_reverse() {
        let mut v = vehicle();
        v.vel_ms = 1.0;

        let dems = DbwDems { throttle: 0.0, brake_nm: 700.0, steer_rad: 0.0 };
        for _ in 0..100 {
            v.step(&dems, 0.02);
        }

        assert_eq!(v.vel_ms, 0.0);
        assert!(v.pose.position_m[0] > 0.0);
        assert!(v.pose.position_m[0] < 1.0);
    }

    #[test]
    fn test_turn() {
        let mut v = vehicle();
        v.set_pose(Pose::new(10.0, 5.0, 0.0));
        v.vel_ms = 5.0;

        let dems = DbwDems { throttle: 0.0, brake_nm: 0.0, steer_rad: 1.0 };
        v.step(&dems, 0.1);

        assert!(v.pose.heading_rad > 0.0);
        assert!(v.pose.position_m[1] > 5.0);

        // Right turn mirrors it
        let mut w = vehicle();
        w.set_pose(Pose::new(10.0, 5.0, 0.0));
        w.vel_ms = 5.0;
        w.step(&DbwDems { steer_rad: -1.0, ..dems }, 0.1);
        assert!((w.pose.heading_rad + v.pose.heading_rad).abs() < 1e-12);
    }

    #[test]
    fn test_sens_data() {
        let mut v = vehicle();
        v.vel_ms = 3.5;

        assert_eq!(
            v.sens_data(true), 
            DbwSensData { current_vel_ms: 3.5, dbw_enabled: true }
        );

        v.set_pose(Pose::default());
        assert_eq!(v.vel_ms, 0.0);
    }
}
