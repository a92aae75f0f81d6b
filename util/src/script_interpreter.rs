//! # Drive-by-wire script interpreter module
//!
//! This module provides an interpreter for drive scripts, allowing 
//! telecommands to be executed at fixed times without a ground station.
//!
//! A script is a list of entries of the form `<time_s>: <json tc>;`, for
//! example:
//!
//! ```text
//! 0.0: "DbwEnable";
//! 0.5: {"TwistCmd": {"linear_ms": 4.0, "angular_rads": 0.0}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::Path;
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use 
/// `.get_pending_tcs` to acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError)
}

#[derive(Debug)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Check that the script file exists.
        if !script_path.as_ref().exists() {
            return Err(ScriptError::ScriptNotFound(
                script_path.as_ref().display().to_string()
            ));
        }

        let script = fs::read_to_string(script_path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::from_script(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {

        // Empty queue of commands
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            // Parse the exec time
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = tc_queue.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(prev.exec_time_s, exec_time_s))
                }
            }

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command {
                exec_time_s,
                tc
            });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            cmds: tc_queue
        })
    }

    /// Return the TCs which are due at `current_time_s`.
    ///
    /// Once every TC has been returned `PendingTcs::EndOfScript` is returned.
    pub fn get_pending_tcs(&mut self, current_time_s: f64) -> PendingTcs {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Pop items from the queue while the head's exec time has passed
        while self.cmds
            .front()
            .map(|c| c.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        }
        else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        0.0: "DbwEnable";
        0.5: {"TwistCmd": {"linear_ms": 4.0, "angular_rads": 0.0}};
        0.5: "DbwDisable";
        2.0: {"TwistCmd": {"linear_ms": 0.0, "angular_rads": 0.0}};
    "#;

    #[test]
    fn test_script_timing() {
        let mut si = ScriptInterpreter::from_script(SCRIPT).unwrap();

        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 2.0);

        match si.get_pending_tcs(0.1) {
            PendingTcs::Some(tcs) => assert_eq!(tcs, vec![Tc::DbwEnable]),
            p => panic!("Expected the enable TC, got {:?}", p)
        }
        assert!(matches!(si.get_pending_tcs(0.2), PendingTcs::None));
        match si.get_pending_tcs(1.0) {
            PendingTcs::Some(tcs) => assert_eq!(tcs.len(), 2),
            p => panic!("Expected two TCs, got {:?}", p)
        }
        assert!(matches!(si.get_pending_tcs(5.0), PendingTcs::Some(_)));
        assert!(matches!(si.get_pending_tcs(5.1), PendingTcs::EndOfScript));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_script("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script("1.0: \"DbwEnable\";\n0.5: \"DbwDisable\";"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::from_script("1.0: {\"Launch\": 3};"),
            Err(ScriptError::InvalidTc(_, _))
        ));
    }
}
