//! # Drive-by-wire Executable Parameters
//!
//! This module provide parameters for the drive-by-wire executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use crate::sim_vehicle::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbwExecParams {

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of control cycles per perception cycle
    pub perception_period_cycles: u32,

    /// Number of consecutive overruns after which the executable stops
    pub max_consec_cycle_overruns: u64,

    /// Simulated vehicle parameters
    pub sim: SimParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DbwExecParams {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.cycle_period_s > 0.0) {
            return Err(format!("cycle_period_s must be positive, found {}", self.cycle_period_s));
        }
        if self.perception_period_cycles == 0 {
            return Err("perception_period_cycles must be at least 1".into());
        }
        Ok(())
    }
}
