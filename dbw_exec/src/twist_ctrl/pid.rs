//! # Throttle PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller with a bounded output
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Minimum output
    min: f64,

    /// Maximum output
    max: f64,

    /// Sample times above this are treated as invalid
    max_sample_time_s: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains and output limits.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, min: f64, max: f64, max_sample_time_s: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            min, max,
            max_sample_time_s,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `sample_time_s` is the time since the previous step, or `None` if
    /// there was no previous step. If the sample time is missing, not
    /// positive, or longer than the maximum sample time, this step uses the
    /// proportional term only and leaves the integral untouched.
    ///
    /// While the output is saturated the integral only changes if the error
    /// pushes the output back into range, or if it winds an existing
    /// integral back towards zero. It is also bounded so that the integral
    /// term alone can't exceed the output limits.
    pub fn step(&mut self, error: f64, sample_time_s: Option<f64>) -> f64 {
        let dt = match sample_time_s {
            Some(t) if t > 0.0 && t <= self.max_sample_time_s => Some(t),
            Some(t) => {
                debug!("Skipping integral and derivative for sample time {} s", t);
                None
            },
            None => None
        };

        // Candidate integral, see the saturation rules above
        let integral = match dt {
            Some(t) => self.clamp_integral(self.integral + error * t),
            None => self.integral
        };

        let deriv = match (dt, self.prev_error) {
            (Some(t), Some(e)) => (error - e) / t,
            _ => 0f64
        };

        let raw = 
            self.k_p * error 
            + self.k_i * integral 
            + self.k_d * deriv;
        
        let out = raw.max(self.min).min(self.max);

        if out == raw 
            || (raw > self.max && error < 0.0) 
            || (raw < self.min && error > 0.0) 
        {
            self.integral = integral;
        }
        else {
            // Unwinding stops at zero
            let unwound = if self.integral > 0.0 {
                integral.max(0.0)
            }
            else {
                integral.min(0.0)
            };
            if unwound.abs() < self.integral.abs() {
                self.integral = unwound;
            }
        }

        self.prev_error = Some(error);

        out
    }

    /// Clear the integral and derivative memory.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    /// The current integral accumulation.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    fn clamp_integral(&self, integral: f64) -> f64 {
        if self.k_i > 0.0 {
            integral.max(self.min / self.k_i).min(self.max / self.k_i)
        }
        else {
            integral
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pid_terms() {
        let mut pid = PidController::new(0.3, 0.1, 0.05, -10.0, 10.0, 1.0);

        // First step has no sample time, proportional only
        assert!(approx(pid.step(2.0, None), 0.6));
        assert_eq!(pid.integral(), 0.0);

        // Second step: integral 1 * 0.5, derivative (1 - 2) / 0.5
        let out = pid.step(1.0, Some(0.5));
        assert!(approx(pid.integral(), 0.5));
        assert!(approx(out, 0.3 * 1.0 + 0.1 * 0.5 - 0.05 * 2.0));
    }

    #[test]
    fn test_invalid_sample_times() {
        for dt in [0.0, -0.1, 5.0, std::f64::NAN].iter() {
            let mut pid = PidController::new(0.3, 0.1, 1.0, -10.0, 10.0, 1.0);
            pid.step(1.0, None);

            let out = pid.step(3.0, Some(*dt));
            assert!(approx(out, 0.9), "dt {} gave {}", dt, out);
            assert_eq!(pid.integral(), 0.0);
        }
    }

    #[test]
    fn test_anti_windup() {
        let mut pid = PidController::new(0.3, 0.0001, 0.0, 0.0, 0.4, 1.0);
        pid.step(20.0, None);

        // Large error saturates the output, the integral must not grow
        for _ in 0..1000 {
            assert_eq!(pid.step(20.0, Some(0.02)), 0.4);
        }
        assert_eq!(pid.integral(), 0.0);

        // Small error in range accumulates
        pid.step(0.5, Some(0.02));
        assert!(approx(pid.integral(), 0.01));
    }

    #[test]
    fn test_integral_unwinds_while_saturated() {
        let mut pid = PidController::new(0.3, 1.0, 0.0, 0.0, 1.0, 1.0);
        pid.step(1.0, None);
        pid.step(1.0, Some(0.5));
        assert!(approx(pid.integral(), 0.5));

        // Saturated high with a positive error, no further growth
        assert_eq!(pid.step(1.0, Some(0.5)), 1.0);
        assert!(approx(pid.integral(), 0.5));

        // Saturated low but the integral is still positive, so it unwinds
        assert_eq!(pid.step(-5.0, Some(0.5)), 0.0);
        assert_eq!(pid.integral(), 0.0);

        // Unwinding doesn't overshoot past zero
        let mut pid = PidController::new(0.3, 1.0, 0.0, -1.0, 1.0, 1.0);
        pid.step(1.0, None);
        pid.step(1.0, Some(0.5));
        assert_eq!(pid.step(-5.0, Some(0.5)), -1.0);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.step(-5.0, Some(0.5)), -1.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn test_integral_grows_against_saturation() {
        let mut pid = PidController::new(0.1, 1.0, 1.0, -1.0, 1.0, 1.0);
        pid.step(5.0, None);

        // Derivative drives the output to the minimum but the error is still
        // positive, so the integral keeps accumulating
        assert_eq!(pid.step(0.1, Some(0.5)), -1.0);
        assert!(approx(pid.integral(), 0.05));
    }

    #[test]
    fn test_integral_bound() {
        // Proportional gain of zero means only the integral can saturate
        let mut pid = PidController::new(0.0, 1.0, 0.0, -1.0, 1.0, 1.0);
        pid.step(1.0, None);
        for _ in 0..10 {
            pid.step(1.0, Some(0.5));
        }
        assert!(approx(pid.integral(), 1.0));
        assert!(approx(pid.step(1.0, Some(0.5)), 1.0));
    }

    #[test]
    fn test_reset() {
        let mut pid = PidController::new(0.3, 0.1, 1.0, -10.0, 10.0, 1.0);
        pid.step(1.0, None);
        pid.step(1.0, Some(0.1));
        pid.step(1.0, Some(0.1));
        assert!(pid.integral() > 0.0);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);

        // No derivative kick from the error before the reset
        assert!(approx(pid.step(5.0, Some(0.1)), 0.3 * 5.0 + 0.1 * 0.5 + 1.0 * 0.0));
    }
}
