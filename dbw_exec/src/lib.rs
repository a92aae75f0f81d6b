//! # Drive-by-wire library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the drive-by-wire crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - holds the latest value of every input and output of the cycles
pub mod data_store;

/// Executable parameters
pub mod params;

/// Simulated vehicle - integrates actuation demands into a pose and velocity
pub mod sim_vehicle;

/// Telecommand processor - applies telecommands to the data store
pub mod tc_processor;

/// Traffic light detector - decides whether the vehicle must stop for a red light
pub mod tl_detector;

/// Twist controller - converts target velocities into throttle, brake and steering demands
pub mod twist_ctrl;
