//! # Traffic Light Detector module
//!
//! Runs once per perception cycle (on every camera image). Finds the nearest
//! traffic light ahead of the vehicle, classifies its colour, and publishes
//! the waypoint of its stop line if it is red.
//!
//! The published value is debounced: a colour must be seen on several
//! consecutive cycles before it replaces the previously published state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod classifier;
mod debounce;
mod light_selector;
mod params;
mod state;
mod waypoint_index;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use classifier::*;
pub use debounce::*;
pub use light_selector::*;
pub use params::*;
pub use state::*;
pub use waypoint_index::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive cycles a colour must persist for before it is used.
pub const DEFAULT_STATE_COUNT_THRESHOLD: u32 = 2;

/// Number of waypoints ahead of the vehicle in which lights are considered.
pub const DEFAULT_LOOKAHEAD_WPS: usize = 130;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TlDetector initialisation.
#[derive(Debug, thiserror::Error)]
pub enum TlDetectorError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
