//! # Communications interface crate.
//!
//! Provides the interface types shared between the drive-by-wire core and
//! the systems around it: pose and waypoint sources, the traffic light
//! source, cameras and the drive-by-wire equipment itself.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Command and sensor definitions for equipment (cameras, drive-by-wire)
pub mod eqpt;

/// Navigation types - pose and waypoints
pub mod nav;

/// Traffic light types
pub mod tl;
