//! Main drive-by-wire executable entry point.
//! 
//! # Architecture
//! 
//! The general execution methodology consists of:
//! 
//!     - Initialise all modules
//!     - Main loop, once per control cycle:
//!         - Telecommand processing from the script
//!         - Vehicle input acquisition (simulated vehicle)
//!         - Perception processing, on every N-th cycle:
//!             - Traffic light detection
//!         - Control processing:
//!             - Twist control
//!         - Simulated vehicle update
//! 
//! # Modules
//! 
//! All modules (e.g. `twist_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use dbw_lib::{
    *, 
    data_store::{DataStore, StopWpChange}, 
    params::DbwExecParams, 
    sim_vehicle::SimVehicle
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use comms_if::{nav::Pose, tl::StopWaypoint};
use util::{
    host, 
    module::State,
    logger::{logger_init, parse_level_filter, LevelFilter},
    session::Session,
    script_interpreter::{ScriptInterpreter, PendingTcs},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Drive-by-wire executable
#[derive(Debug, StructOpt)]
#[structopt(name = "dbw_exec")]
struct Opt {
    /// Telecommand script to execute
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Minimum log level, one of `info`, `debug` or `trace`
    #[structopt(short, long, default_value = "debug", parse(try_from_str = parse_level_filter))]
    log_level: LevelFilter,

    /// Run cycles back to back instead of in real time
    #[structopt(short, long)]
    fast: bool,
}

/// Summary of a run, saved into the session at the end of execution.
#[derive(Debug, Serialize)]
struct RunSummary {
    num_cycles: u128,
    num_perception_cycles: u128,
    num_cycle_overruns: u64,
    sim_time_s: f64,
    final_stop_wp: StopWaypoint,
    stop_wp_changes: Vec<StopWpChange>,
    final_pose: Option<Pose>,
    final_vel_ms: f64,
    odometer_m: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "dbw_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger, keeping the control cycle's per-cycle output out of
    // the log unless trace is requested
    logger_init(
        opt.log_level, 
        &[("dbw_lib::twist_ctrl", LevelFilter::Debug)], 
        &session
    ).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Drive-by-wire Executable\n");
    info!("Running on: {}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: DbwExecParams = util::params::load(
        "exec.toml"
    ).wrap_err("Could not load exec params")?;

    exec_params.validate()
        .map_err(|e| eyre!("Invalid exec params: {}", e))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    info!("Loading script from {:?}", &opt.script);

    let mut si = ScriptInterpreter::new(&opt.script)
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.tl_detector.init("tl_detector.toml", &session)
        .wrap_err("Failed to initialise TlDetector")?;
    info!("TlDetector init complete");

    ds.twist_ctrl.init("twist_ctrl.toml", &session)
        .wrap_err("Failed to initialise TwistCtrl")?;
    info!("TwistCtrl init complete");

    ds.sim_vehicle = SimVehicle::new(
        ds.twist_ctrl.vehicle_params().clone(), 
        exec_params.sim
    );
    info!("SimVehicle init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let sim_epoch = Instant::now();
    let mut num_perception_cycles = 0u128;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.perception_period_cycles, exec_params.cycle_period_s);

        // ---- TELECOMMAND PROCESSING ----

        match si.get_pending_tcs(ds.sim_time_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break
            }
        }

        // ---- DATA INPUT ----

        if ds.pose.is_some() {
            ds.pose = Some(ds.sim_vehicle.pose);
        }
        let sens_data = ds.sim_vehicle.sens_data(ds.dbw_enabled);

        // ---- PERCEPTION PROCESSING ----

        if ds.is_perception_cycle {
            let input = tl_detector::InputData {
                pose: ds.pose,
                image: ds.cam_image.take()
            };

            match ds.tl_detector.proc(&input) {
                Ok((stop_wp, r)) => {
                    ds.publish_stop_wp(stop_wp);
                    ds.tl_detector_status_rpt = r;
                },
                Err(e) => warn!("Error during TlDetector processing: {}", e)
            }

            num_perception_cycles += 1;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // Control time follows the simulation clock, not the wall clock
        let control_input = twist_ctrl::InputData {
            current_vel_ms: sens_data.current_vel_ms,
            dbw_enabled: sens_data.dbw_enabled,
            twist: ds.twist_cmd,
            time: sim_epoch + Duration::from_secs_f64(ds.sim_time_s)
        };

        match ds.twist_ctrl.proc(&control_input) {
            Ok((o, r)) => {
                ds.dbw_dems = o;
                ds.twist_ctrl_status_rpt = r;
            },
            Err(e) => warn!("Error during TwistCtrl processing: {}", e)
        };

        // ---- VEHICLE UPDATE ----

        // With drive-by-wire disabled the safety driver is in control, which
        // the simulation treats as coasting.
        ds.sim_vehicle.step(&ds.dbw_dems, exec_params.cycle_period_s);

        if ds.is_perception_cycle {
            debug!(
                "t = {:.2} s, vel {:.2} m/s, stop wp {}, dems {:?}",
                ds.sim_time_s,
                ds.sim_vehicle.vel_ms,
                ds.stop_wp.as_msg(),
                ds.dbw_dems
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                if !opt.fast {
                    thread::sleep(d);
                }
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s", 
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
                ds.num_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns", 
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    let summary = RunSummary {
        num_cycles: ds.num_cycles,
        num_perception_cycles,
        num_cycle_overruns: ds.num_cycle_overruns,
        sim_time_s: ds.sim_time_s,
        final_stop_wp: ds.stop_wp,
        stop_wp_changes: ds.stop_wp_changes.clone(),
        final_pose: ds.pose,
        final_vel_ms: ds.sim_vehicle.vel_ms,
        odometer_m: ds.sim_vehicle.odometer_m,
    };

    info!(
        "Ran {} cycles ({} perception) over {:.2} s, travelled {:.1} m",
        summary.num_cycles,
        summary.num_perception_cycles,
        summary.sim_time_s,
        summary.odometer_m
    );

    session.save("run_summary.json", summary);

    info!("End of execution");

    session.exit();

    Ok(())
}
