//! Parameters structure for TwistCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::TwistCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the twist controller.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- THROTTLE PID ----

    /// Throttle controller proportional gain
    pub k_p: f64,

    /// Throttle controller integral gain
    pub k_i: f64,

    /// Throttle controller derivative gain
    pub k_d: f64,

    /// Minimum throttle demand
    pub min_throttle: f64,

    /// Maximum throttle demand
    pub max_throttle: f64,

    /// Sample times longer than this are treated as a clock jump and the
    /// integral and derivative terms are skipped for that cycle.
    ///
    /// Units: seconds
    pub max_sample_time_s: f64,

    // ---- VELOCITY FILTER ----

    /// Time constant of the velocity low pass filter
    ///
    /// Units: seconds
    pub tau_s: f64,

    /// Nominal sample period of the velocity low pass filter
    ///
    /// Units: seconds
    pub ts_s: f64,

    /// Target velocities above this bypass the velocity filter. Below it
    /// throttle is also scaled by `low_speed_throttle_scale`.
    ///
    /// Units: meters/second
    pub filter_activation_vel_ms: f64,

    // ---- BRAKING ----

    /// Below this velocity the vehicle is considered stopped.
    ///
    /// Units: meters/second
    pub min_vel_ms: f64,

    /// Scale applied to throttle when the target velocity is low
    pub low_speed_throttle_scale: f64,

    /// Throttle demands below this allow the brake to be applied when the
    /// vehicle is faster than the target.
    pub brake_throttle_threshold: f64,

    /// Brake torque used to hold the vehicle stationary, also the minimum
    /// torque applied whenever braking.
    ///
    /// Units: Newton meters
    pub hold_brake_nm: f64,

    // ---- VEHICLE ----

    pub vehicle: VehicleParams,
}

/// Geometry and capabilities of the vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleParams {
    /// Units: kilograms
    pub vehicle_mass_kg: f64,

    /// Units: litres
    pub fuel_capacity_l: f64,

    /// Brake deadband reported by the vehicle.
    pub brake_deadband: f64,

    /// Maximum deceleration the controller will brake for, negative.
    ///
    /// Units: meters/second^2
    pub decel_limit_mss: f64,

    /// Maximum acceleration of the vehicle.
    ///
    /// Units: meters/second^2
    pub accel_limit_mss: f64,

    /// Units: meters
    pub wheel_radius_m: f64,

    /// Distance between the front and rear axles.
    ///
    /// Units: meters
    pub wheel_base_m: f64,

    /// Ratio between steering wheel angle and road wheel angle.
    pub steer_ratio: f64,

    /// Maximum lateral acceleration allowed when turning.
    ///
    /// Units: meters/second^2
    pub max_lat_accel_mss: f64,

    /// Maximum steering wheel angle.
    ///
    /// Units: radians
    pub max_steer_angle_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.3,
            k_i: 0.0001,
            k_d: 0.0,
            min_throttle: 0.0,
            max_throttle: 0.4,
            max_sample_time_s: 1.0,
            tau_s: 0.5,
            ts_s: 0.02,
            filter_activation_vel_ms: 5.0,
            min_vel_ms: 0.1,
            low_speed_throttle_scale: 0.25,
            brake_throttle_threshold: 0.1,
            hold_brake_nm: 700.0,
            vehicle: VehicleParams::default(),
        }
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            vehicle_mass_kg: 1736.35,
            fuel_capacity_l: 13.5,
            brake_deadband: 0.1,
            decel_limit_mss: -5.0,
            accel_limit_mss: 1.0,
            wheel_radius_m: 0.2413,
            wheel_base_m: 2.8498,
            steer_ratio: 14.8,
            max_lat_accel_mss: 3.0,
            max_steer_angle_rad: 8.0,
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), TwistCtrlError> {
        let checks = [
            (self.min_throttle <= self.max_throttle, "min_throttle must not exceed max_throttle"),
            (self.max_throttle <= 1.0 && self.min_throttle >= 0.0, "throttle limits must be within [0, 1]"),
            (self.max_sample_time_s > 0.0, "max_sample_time_s must be positive"),
            (self.k_i >= 0.0, "k_i must not be negative"),
            (self.tau_s >= 0.0, "tau_s must not be negative"),
            (self.filter_activation_vel_ms >= 0.0, "filter_activation_vel_ms must not be negative"),
            (self.ts_s > 0.0, "ts_s must be positive"),
            (self.min_vel_ms >= 0.0, "min_vel_ms must not be negative"),
            (self.hold_brake_nm >= 0.0, "hold_brake_nm must not be negative"),
            (self.vehicle.decel_limit_mss <= 0.0, "decel_limit_mss must not be positive"),
            (self.vehicle.vehicle_mass_kg > 0.0, "vehicle_mass_kg must be positive"),
            (self.vehicle.wheel_radius_m > 0.0, "wheel_radius_m must be positive"),
            (self.vehicle.wheel_base_m > 0.0, "wheel_base_m must be positive"),
            (self.vehicle.steer_ratio > 0.0, "steer_ratio must be positive"),
            (self.vehicle.max_steer_angle_rad >= 0.0, "max_steer_angle_rad must not be negative"),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(TwistCtrlError::InvalidParams(msg.to_string())),
            None => Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        let toml_str = include_str!("../../../params/twist_ctrl.toml");
        let params: Params = util::params::from_str(toml_str).unwrap();

        assert!(params.validate().is_ok());
        assert_eq!(params.hold_brake_nm, 700.0);
        assert_eq!(params.vehicle.decel_limit_mss, -5.0);
    }

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let bad = Params {
            min_throttle: 0.5,
            max_throttle: 0.4,
            ..Params::default()
        };
        assert!(bad.validate().is_err());

        let mut bad = Params::default();
        bad.vehicle.decel_limit_mss = 1.0;
        assert!(bad.validate().is_err());

        let bad = Params {
            k_i: -0.1,
            ..Params::default()
        };
        assert!(bad.validate().is_err());

        let bad = Params {
            filter_activation_vel_ms: -1.0,
            ..Params::default()
        };
        assert!(bad.validate().is_err());
    }
}
