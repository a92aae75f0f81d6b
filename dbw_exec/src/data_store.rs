//! # Data Store

use comms_if::{
    eqpt::{cam::CamImage, dbw::{DbwDems, TwistCmd}},
    nav::Pose,
    tl::StopWaypoint,
};
use log::info;
use serde::Serialize;

use crate::{
    sim_vehicle::SimVehicle,
    tl_detector,
    twist_ctrl,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// Holds the latest value of everything exchanged between the two cycles.
/// Perception only ever reads the latest pose and image, and control only
/// ever reads the latest twist command and stop waypoint.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this control cycle also runs perception
    pub is_perception_cycle: bool,

    /// Simulation elapsed time
    pub sim_time_s: f64,

    // Vehicle interface
    /// True if the safety driver has handed over control
    pub dbw_enabled: bool,

    /// Latest target velocities
    pub twist_cmd: TwistCmd,

    /// Latest pose of the vehicle, `None` until one is received
    pub pose: Option<Pose>,

    /// Latest camera image, consumed by the next perception cycle
    pub cam_image: Option<CamImage>,

    // TlDetector
    pub tl_detector: tl_detector::TlDetector,
    pub stop_wp: StopWaypoint,
    pub tl_detector_status_rpt: tl_detector::StatusReport,

    // TwistCtrl
    pub twist_ctrl: twist_ctrl::TwistCtrl,
    pub dbw_dems: DbwDems,
    pub twist_ctrl_status_rpt: twist_ctrl::StatusReport,

    // Simulation
    pub sim_vehicle: SimVehicle,

    // Monitoring
    /// Every change of the published stop waypoint
    pub stop_wp_changes: Vec<StopWpChange>,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,
}

/// A change in the published stop waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StopWpChange {
    pub sim_time_s: f64,
    pub stop_wp: StopWaypoint,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous cycle and sets the perception cycle
    /// flag. The stop waypoint is kept, as control always uses the latest
    /// published value.
    pub fn cycle_start(&mut self, perception_period_cycles: u32, cycle_period_s: f64) {
        self.is_perception_cycle = 
            self.num_cycles % (perception_period_cycles.max(1) as u128) == 0;

        self.dbw_dems = DbwDems::default();
        self.twist_ctrl_status_rpt = twist_ctrl::StatusReport::default();

        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Record a newly published stop waypoint, logging if it changed.
    pub fn publish_stop_wp(&mut self, stop_wp: StopWaypoint) {
        if stop_wp != self.stop_wp {
            if stop_wp.is_stop() {
                info!("Stopping for red light at waypoint {}", stop_wp.as_msg());
            }
            else {
                info!("Red light stop at waypoint {} cleared", self.stop_wp.as_msg());
            }
            self.stop_wp_changes.push(StopWpChange {
                sim_time_s: self.sim_time_s,
                stop_wp
            });
        }
        self.stop_wp = stop_wp;
    }
}
