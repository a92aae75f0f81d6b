//! # Telecommand processor module
//!
//! The telecommand processor handles telecommands coming from the script.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};

// Internal
use comms_if::tc::Tc;
use crate::data_store::DataStore;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub fn exec(ds: &mut DataStore, tc: &Tc) {

    // Handle different Tcs
    match tc {
        Tc::Heartbeat => {
            trace!("Recieved Heartbeat");
        },
        Tc::DbwEnable => {
            info!("Recieved DbwEnable command");
            ds.dbw_enabled = true;
        },
        Tc::DbwDisable => {
            info!("Recieved DbwDisable command");
            ds.dbw_enabled = false;
        },
        Tc::TwistCmd(t) => {
            debug!(
                "New twist command: {:.2} m/s, {:.3} rad/s", 
                t.linear_ms, t.angular_rads
            );
            ds.twist_cmd = *t;
        },
        Tc::SetWaypoints(w) => {
            info!("Recieved {} base waypoints", w.len());
            ds.tl_detector.set_waypoints(w);
        },
        Tc::SetTrafficLights(l) => {
            debug!("Recieved {} traffic lights", l.len());
            ds.tl_detector.set_traffic_lights(l.clone());
        },
        Tc::SetPose(p) => {
            ds.sim_vehicle.set_pose(*p);
            ds.pose = Some(*p);
        },
        Tc::CamFrame(f) => {
            let expected_cam = ds.tl_detector.params.classifier.cam_id();
            if f.cam_id != expected_cam {
                debug!("Ignoring {:?} frame, classifier uses {:?}", f.cam_id, expected_cam);
                return;
            }

            match f.to_cam_image() {
                // Only the latest image is kept for the next perception cycle
                Ok(image) => if ds.cam_image.replace(image).is_some() {
                    debug!("Dropped an unprocessed {:?} image", f.cam_id);
                },
                Err(e) => warn!("Could not decode {:?} frame, dropping it: {}", f.cam_id, e)
            }
        }
    }

}
