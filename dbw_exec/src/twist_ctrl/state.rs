//! Implementations for the TwistCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::time::Instant;
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{LowPassFilter, Params, PidController, TwistCtrlError, VehicleParams, YawController};
use comms_if::eqpt::dbw::{DbwDems, TwistCmd};
use util::{
    params, 
    module::State,
    session::Session,
    time::signed_seconds_between};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Twist controller module state
#[derive(Debug)]
pub struct TwistCtrl {
    pub(crate) params: Params,

    /// Throttle controller
    throttle_ctrl: PidController,

    /// Steering controller
    yaw_ctrl: YawController,

    /// Measured velocity filter
    vel_lpf: LowPassFilter,

    /// Time of the previous enabled cycle
    prev_time: Option<Instant>,

    /// Whether drive-by-wire was enabled on the previous cycle
    was_enabled: bool,
}

/// Input data to the twist controller.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Measured forward velocity of the vehicle.
    ///
    /// Units: meters/second
    pub current_vel_ms: f64,

    /// True if drive-by-wire is in control of the vehicle
    pub dbw_enabled: bool,

    /// Target velocities
    pub twist: TwistCmd,

    /// Time at which the inputs were sampled
    pub time: Instant,
}

/// Status report for TwistCtrl processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// The velocity used by the controllers
    pub filtered_vel_ms: f64,

    /// True if the velocity filter was bypassed
    pub filter_bypassed: bool,

    /// Target minus filtered velocity
    pub vel_error_ms: f64,

    /// Time since the previous enabled cycle
    pub sample_time_s: Option<f64>,

    /// Throttle from the PID before braking was considered
    pub pid_throttle: f64,

    /// The braking decision made this cycle
    pub brake_mode: BrakeMode,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The outcome of the braking policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BrakeMode {
    /// Drive-by-wire disabled, no demands
    Disabled,

    /// Not braking
    Released,

    /// Stationary with a stop target, holding the vehicle
    Hold,

    /// Faster than the target, braking proportionally to the error
    Decel,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BrakeMode {
    fn default() -> Self {
        BrakeMode::Disabled
    }
}

impl Default for TwistCtrl {
    fn default() -> Self {
        Self::build(Params::default())
    }
}

impl State for TwistCtrl {
    type InitData = &'static str;
    type InitError = TwistCtrlError;
    
    type InputData = InputData;
    type OutputData = DbwDems;
    type StatusReport = StatusReport;
    type ProcError = TwistCtrlError;

    /// Initialise the TwistCtrl module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) 
        -> Result<(), Self::InitError> 
    {
        let params: Params = params::load(init_data)
            .map_err(TwistCtrlError::ParamLoadError)?;

        info!(
            "TwistCtrl gains: k_p = {}, k_i = {}, k_d = {}, throttle limits [{}, {}]",
            params.k_p, params.k_i, params.k_d, params.min_throttle, params.max_throttle
        );

        *self = Self::new(params)?;

        Ok(())
    }

    /// Perform one control cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> 
    {
        let (dems, report) = self.control(input_data);
        
        trace!(
            "TwistCtrl output: throttle {:.3}, brake {:.1} Nm, steer {:.4} rad ({:?})",
            dems.throttle, dems.brake_nm, dems.steer_rad, report.brake_mode
        );

        Ok((dems, report))
    }
}

impl TwistCtrl {

    /// Create a new controller from the given parameters.
    pub fn new(params: Params) -> Result<Self, TwistCtrlError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: Params) -> Self {
        Self {
            throttle_ctrl: PidController::new(
                params.k_p, 
                params.k_i, 
                params.k_d, 
                params.min_throttle, 
                params.max_throttle,
                params.max_sample_time_s
            ),
            yaw_ctrl: YawController::from_params(&params),
            vel_lpf: LowPassFilter::new(params.tau_s, params.ts_s),
            prev_time: None,
            was_enabled: false,
            params,
        }
    }

    /// Compute the demands for one cycle.
    pub fn control(&mut self, input: &InputData) -> (DbwDems, StatusReport) {

        // Disabling clears all controller memory, so nothing stale is applied
        // when control is handed back.
        if !input.dbw_enabled {
            if self.was_enabled {
                info!("Drive-by-wire disabled, resetting TwistCtrl");
            }
            self.reset();
            return (DbwDems::zero(), StatusReport::default())
        }

        if !self.was_enabled {
            info!("Drive-by-wire enabled");
            self.was_enabled = true;
        }

        let target = input.twist;
        let p = &self.params;

        // Filtering only matters when creeping, where the measurement noise
        // dominates. Above that the raw velocity is used and the filter
        // follows it.
        let filter_bypassed = target.linear_ms > p.filter_activation_vel_ms;
        let vel_ms = if filter_bypassed {
            self.vel_lpf.seed(input.current_vel_ms);
            input.current_vel_ms
        }
        else {
            self.vel_lpf.filt(input.current_vel_ms)
        };

        let mut steer_rad = self.yaw_ctrl.get_steering(
            target.linear_ms, 
            target.angular_rads, 
            vel_ms
        );

        let vel_error_ms = target.linear_ms - vel_ms;

        let sample_time_s = self.prev_time
            .map(|t0| signed_seconds_between(t0, input.time));
        self.prev_time = Some(input.time);

        let pid_throttle = self.throttle_ctrl.step(vel_error_ms, sample_time_s);
        let mut throttle = pid_throttle;
        if target.linear_ms < p.filter_activation_vel_ms {
            throttle *= p.low_speed_throttle_scale;
        }

        let mut brake_nm = 0.0;
        let brake_mode;

        if target.linear_ms == 0.0 && vel_ms < p.min_vel_ms {
            // Stopped, hold the vehicle and don't turn the wheel at standstill
            throttle = 0.0;
            brake_nm = p.hold_brake_nm;
            steer_rad = 0.0;
            brake_mode = BrakeMode::Hold;
        }
        else if throttle < p.brake_throttle_threshold && vel_error_ms < 0.0 {
            throttle = 0.0;
            brake_nm = decel_brake_torque(p, vel_error_ms);
            brake_mode = BrakeMode::Decel;
        }
        else {
            brake_mode = BrakeMode::Released;
        }

        let dems = DbwDems {
            throttle: throttle.max(0.0).min(1.0),
            brake_nm,
            steer_rad
        };

        let report = StatusReport {
            filtered_vel_ms: vel_ms,
            filter_bypassed,
            vel_error_ms,
            sample_time_s,
            pid_throttle,
            brake_mode
        };

        (dems, report)
    }

    /// Clear the throttle controller, velocity filter and timing memory.
    pub fn reset(&mut self) {
        self.throttle_ctrl.reset();
        self.vel_lpf.reset();
        self.prev_time = None;
        self.was_enabled = false;
    }

    /// Geometry of the vehicle being controlled.
    pub fn vehicle_params(&self) -> &VehicleParams {
        &self.params.vehicle
    }

    /// The throttle controller's integral accumulation.
    pub fn throttle_integral(&self) -> f64 {
        self.throttle_ctrl.integral()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Brake torque for a (negative) velocity error.
///
/// The requested deceleration is limited to the vehicle's deceleration limit,
/// and the torque is never less than the hold torque.
pub fn decel_brake_torque(params: &Params, vel_error_ms: f64) -> f64 {
    let decel_mss = vel_error_ms.max(params.vehicle.decel_limit_mss);

    let torque_nm = 
        decel_mss.abs() 
        * params.vehicle.vehicle_mass_kg 
        * params.vehicle.wheel_radius_m;

    torque_nm.max(params.hold_brake_nm)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn input(current_vel_ms: f64, linear_ms: f64, time: Instant) -> InputData {
        InputData {
            current_vel_ms,
            dbw_enabled: true,
            twist: TwistCmd {
                linear_ms,
                angular_rads: 0.0
            },
            time
        }
    }

    #[test]
    fn test_disabled() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        let mut i = input(10.0, 11.0, t0);
        i.twist.angular_rads = 0.3;
        tc.control(&i);

        i.dbw_enabled = false;
        i.time = t0 + Duration::from_millis(20);
        let (dems, report) = tc.control(&i);

        assert_eq!(dems, DbwDems::zero());
        assert_eq!(report.brake_mode, BrakeMode::Disabled);
        assert_eq!(tc.throttle_integral(), 0.0);
    }

    #[test]
    fn test_hold_at_standstill() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        let mut i = input(0.05, 0.0, t0);
        i.twist.angular_rads = 0.4;
        let (dems, report) = tc.control(&i);

        assert_eq!(dems, DbwDems { throttle: 0.0, brake_nm: 700.0, steer_rad: 0.0 });
        assert_eq!(report.brake_mode, BrakeMode::Hold);

        // Integral built up while creeping doesn't stop the hold
        let mut tc = TwistCtrl::default();
        for k in 0..50 {
            tc.control(&input(0.05, 1.0, t0 + Duration::from_millis(20 * k)));
        }
        assert!(tc.throttle_integral() > 0.0);

        let (dems, _) = tc.control(&input(0.05, 0.0, t0 + Duration::from_millis(1000)));
        assert_eq!(dems, DbwDems { throttle: 0.0, brake_nm: 700.0, steer_rad: 0.0 });
    }

    #[test]
    fn test_decel_braking() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        // 2 m/s too fast at low speed, which is a small deceleration so the
        // hold torque floor applies
        let (dems, report) = tc.control(&input(3.0, 1.0, t0));
        assert_eq!(report.brake_mode, BrakeMode::Decel);
        assert_eq!(dems.throttle, 0.0);
        let expected = (2.0 * 1736.35 * 0.2413f64).max(700.0);
        assert!((dems.brake_nm - expected).abs() < 1e-9);

        // Very large error is limited by the deceleration limit
        let mut tc = TwistCtrl::default();
        let (dems, _) = tc.control(&input(20.0, 6.0, t0));
        assert!((dems.brake_nm - 5.0 * 1736.35 * 0.2413).abs() < 1e-9);
    }

    #[test]
    fn test_brake_torque_monotonic() {
        let params = Params::default();
        let mut prev = 0.0;

        for i in 0..200 {
            let error = -0.05 * i as f64;
            let torque = decel_brake_torque(&params, error);
            assert!(torque >= params.hold_brake_nm);
            assert!(torque >= prev);
            prev = torque;
        }
    }

    #[test]
    fn test_throttle() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        // Slow target, throttle scaled down: 0.3 * 1.0 * 0.25
        let (dems, report) = tc.control(&input(2.0, 3.0, t0));
        assert!((dems.throttle - 0.075).abs() < 1e-9);
        assert_eq!(dems.brake_nm, 0.0);
        assert_eq!(report.brake_mode, BrakeMode::Released);
        assert!(!report.filter_bypassed);

        // Fast target, filter bypassed and throttle saturates at the limit
        let mut tc = TwistCtrl::default();
        let (dems, report) = tc.control(&input(8.0, 11.0, t0));
        assert_eq!(dems.throttle, 0.4);
        assert!(report.filter_bypassed);
        assert_eq!(report.filtered_vel_ms, 8.0);
    }

    #[test]
    fn test_filter_smooths_low_speed() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        tc.control(&input(2.0, 3.0, t0));
        let (_, report) = tc.control(&input(3.0, 3.0, t0 + Duration::from_millis(20)));

        let a = 0.02 / 0.52;
        assert!((report.filtered_vel_ms - (a * 3.0 + (1.0 - a) * 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sample_times() {
        let mut tc = TwistCtrl::default();
        let t0 = Instant::now();

        let (_, report) = tc.control(&input(2.0, 3.0, t0));
        assert_eq!(report.sample_time_s, None);

        let (_, report) = tc.control(&input(2.0, 3.0, t0 + Duration::from_millis(20)));
        assert!((report.sample_time_s.unwrap() - 0.02).abs() < 1e-9);
        let integral = tc.throttle_integral();
        assert!(integral > 0.0);

        // Time going backwards leaves the integral alone
        let (_, report) = tc.control(&input(2.0, 3.0, t0));
        assert!(report.sample_time_s.unwrap() < 0.0);
        assert_eq!(tc.throttle_integral(), integral);
    }
}
