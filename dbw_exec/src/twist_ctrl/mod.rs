//! # Twist Controller module
//!
//! Runs once per control cycle. Converts the target linear and angular
//! velocity of the vehicle into throttle, brake and steering demands for the
//! drive-by-wire system:
//!
//! - The measured velocity is smoothed at low speed by a low pass filter.
//! - Throttle comes from a PID controller on the velocity error.
//! - Steering comes from a feed-forward bicycle model.
//! - Braking is decided by a fixed policy on the target and error.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod lowpass;
mod params;
mod pid;
mod state;
mod yaw_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use lowpass::*;
pub use params::*;
pub use pid::*;
pub use state::*;
pub use yaw_ctrl::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TwistCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum TwistCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
