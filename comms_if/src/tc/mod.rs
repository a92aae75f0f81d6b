//! # Telecommand module
//!
//! Telecommands are the instructions which drive the executable when it isn't
//! connected to a live vehicle: they stand in for the waypoint, traffic light,
//! pose, camera and twist sources, and for the safety driver's enable switch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json;
use thiserror::Error;

// Internal
use crate::{
    eqpt::{cam::CamFrame, dbw::TwistCmd},
    nav::{Pose, Waypoint},
    tl::TrafficLight,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Does nothing, keeps a link alive
    Heartbeat,

    /// Hand control of the vehicle to drive-by-wire
    DbwEnable,

    /// Take control back from drive-by-wire
    DbwDisable,

    /// Set the target velocities of the vehicle
    TwistCmd(TwistCmd),

    /// Replace the base waypoints
    SetWaypoints(Vec<Waypoint>),

    /// Replace the traffic light snapshot
    SetTrafficLights(Vec<TrafficLight>),

    /// Teleport the vehicle to the given pose
    SetPose(Pose),

    /// A new frame from the front camera
    CamFrame(CamFrame),
}

/// Errors that can occur while parsing a telecommand
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("Could not parse the telecommand JSON: {0}")]
    JsonError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a telecommand from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::JsonError)
    }

    /// Serialise this telecommand into a JSON string
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::JsonError)
    }
}
