//! Velocity low pass filter

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single pole low pass filter.
///
/// Each new sample is blended with the previous output using the weight
/// `a = ts / (tau + ts)`. The first sample after creation or a reset is passed
/// through unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct LowPassFilter {
    /// Weight of the new sample
    a: f64,

    /// Weight of the previous output
    b: f64,

    /// Previous output, `None` until the first sample
    last_val: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LowPassFilter {

    /// Create a filter with time constant `tau_s` sampled every `ts_s`.
    ///
    /// A zero time constant gives a filter which passes samples straight
    /// through.
    pub fn new(tau_s: f64, ts_s: f64) -> Self {
        let a = ts_s / (tau_s + ts_s);

        Self {
            a,
            b: 1.0 - a,
            last_val: None
        }
    }

    /// Filter a new sample, returning the smoothed value.
    pub fn filt(&mut self, val: f64) -> f64 {
        let out = match self.last_val {
            Some(last) => self.a * val + self.b * last,
            None => val
        };

        self.last_val = Some(out);
        out
    }

    /// Set the filter's memory to `val` without filtering, so that filtering
    /// resumes from this value.
    pub fn seed(&mut self, val: f64) {
        self.last_val = Some(val);
    }

    /// Forget all previous samples.
    pub fn reset(&mut self) {
        self.last_val = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_filter() {
        let mut lpf = LowPassFilter::new(0.5, 0.02);
        let a = 0.02 / 0.52;

        // First sample passes through
        assert_eq!(lpf.filt(1.0), 1.0);

        // Then a step to zero decays by (1 - a) per sample
        let out = lpf.filt(0.0);
        assert!((out - (1.0 - a)).abs() < 1e-12);
        let out = lpf.filt(0.0);
        assert!((out - (1.0 - a).powi(2)).abs() < 1e-12);

        // A constant input is a fixed point
        lpf.seed(3.0);
        for _ in 0..10 {
            assert!((lpf.filt(3.0) - 3.0).abs() < 1e-12);
        }

        lpf.reset();
        assert_eq!(lpf.filt(-2.0), -2.0);
    }

    #[test]
    fn test_zero_time_constant() {
        let mut lpf = LowPassFilter::new(0.0, 0.02);
        lpf.filt(5.0);
        assert_eq!(lpf.filt(1.0), 1.0);
    }
}
