//! Parameters structure for TlDetector

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;

use super::{
    ClassifierMode, TlDetectorError, 
    DEFAULT_LOOKAHEAD_WPS, DEFAULT_STATE_COUNT_THRESHOLD
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the traffic light detector.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Number of consecutive cycles the same colour must be observed before
    /// it is committed and published.
    #[serde(default = "default_state_count_threshold")]
    pub state_count_threshold: u32,

    /// Maximum number of waypoints ahead of the vehicle a stop line may be to
    /// be considered.
    #[serde(default = "default_lookahead_wps")]
    pub lookahead_wps: usize,

    /// Where light colours come from.
    #[serde(default)]
    pub classifier: ClassifierMode,

    /// Position of the stop line for each intersection, in the same order as
    /// the traffic lights reported by the traffic light source.
    ///
    /// Units: meters,
    /// Frame: Map
    pub stop_line_positions: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            state_count_threshold: DEFAULT_STATE_COUNT_THRESHOLD,
            lookahead_wps: DEFAULT_LOOKAHEAD_WPS,
            classifier: ClassifierMode::default(),
            stop_line_positions: Vec::new()
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), TlDetectorError> {
        if self.lookahead_wps == 0 {
            return Err(TlDetectorError::InvalidParams(
                "lookahead_wps must be greater than zero".into()
            ))
        }

        if let Some(i) = self.stop_line_positions
            .iter()
            .position(|p| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(TlDetectorError::InvalidParams(
                format!("stop line {} is not finite", i)
            ))
        }

        Ok(())
    }

    /// The stop line positions as vectors.
    pub fn stop_lines(&self) -> Vec<Vector2<f64>> {
        self.stop_line_positions
            .iter()
            .map(|p| Vector2::new(p[0], p[1]))
            .collect()
    }
}

fn default_state_count_threshold() -> u32 {
    DEFAULT_STATE_COUNT_THRESHOLD
}

fn default_lookahead_wps() -> usize {
    DEFAULT_LOOKAHEAD_WPS
}
