//! Light state debouncing
//!
//! Single misclassified frames must not make the vehicle brake or release
//! the brake, so a colour is only committed once it has been observed on
//! enough consecutive cycles. Until then the previously committed stop is
//! published again.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use serde::Serialize;

use comms_if::tl::{LightState, StopWaypoint};
use super::DEFAULT_STATE_COUNT_THRESHOLD;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Hysteresis filter between the raw classified colour and the published stop.
#[derive(Debug, Clone, Serialize)]
pub struct LightStateDebouncer {
    /// Number of repeats required before a colour is committed
    threshold: u32,

    /// Colour currently being counted
    state: LightState,

    /// Number of consecutive observations of `state` before this one
    count: u32,

    /// Last committed colour
    stable_state: LightState,

    /// Last committed stop, only ever `Some` if `stable_state` is red
    stable_wp: StopWaypoint,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LightStateDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_COUNT_THRESHOLD)
    }
}

impl LightStateDebouncer {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            state: LightState::Unknown,
            count: 0,
            stable_state: LightState::Unknown,
            stable_wp: StopWaypoint::NONE,
        }
    }

    /// Feed one raw observation, returning the stop to publish this cycle.
    ///
    /// `light_wp` is the stop line waypoint of the observed light, or `None`
    /// if no light was selected (in which case `state` should be `Unknown`).
    ///
    /// - A colour different to the one being counted restarts the count.
    /// - A colour already seen more than `threshold` times in a row is
    ///   committed, and its stop is published (no stop unless it is red).
    /// - Otherwise the last committed stop is published.
    pub fn observe(&mut self, state: LightState, light_wp: Option<usize>) -> StopWaypoint {
        debug!(
            "Light observation {:?} at {:?} (counting {:?}, count {})", 
            state, light_wp, self.state, self.count
        );

        if state != self.state {
            self.state = state;
            self.count = 0;
        }
        else if self.count >= self.threshold {
            let stop_wp = match state {
                LightState::Red => StopWaypoint(light_wp),
                _ => StopWaypoint::NONE
            };

            if state != self.stable_state || stop_wp != self.stable_wp {
                info!(
                    "Light state committed: {:?}, stop waypoint {}", 
                    state, stop_wp.as_msg()
                );
            }

            self.stable_state = state;
            self.stable_wp = stop_wp;
        }

        self.count = self.count.saturating_add(1);

        self.stable_wp
    }

    /// The last committed colour.
    pub fn stable_state(&self) -> LightState {
        self.stable_state
    }

    /// The last committed stop.
    pub fn stable_wp(&self) -> StopWaypoint {
        self.stable_wp
    }

    /// The colour currently being counted and its count.
    pub fn candidate(&self) -> (LightState, u32) {
        (self.state, self.count)
    }
}
