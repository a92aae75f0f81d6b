//! Nearest waypoint lookup

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use nalgebra::Vector2;

use comms_if::nav::Waypoint;
use util::kdtree::KdTree;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Spatial index over the base waypoints.
///
/// The index is empty until the first set of waypoints is received. Replacing
/// the waypoints builds a complete new tree before swapping it in, so a query
/// never sees a partially built index.
#[derive(Debug, Clone, Default)]
pub struct WaypointIndex {
    tree: Option<KdTree>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointIndex {

    /// Build an index from the given waypoints.
    pub fn new(waypoints: &[Waypoint]) -> Self {
        let mut index = Self::default();
        index.rebuild(waypoints);
        index
    }

    /// Replace the indexed waypoints.
    ///
    /// If the waypoints can't be indexed (empty, or containing non-finite
    /// positions) the index becomes unavailable.
    pub fn rebuild(&mut self, waypoints: &[Waypoint]) {
        let positions: Vec<Vector2<f64>> = waypoints
            .iter()
            .map(|w| w.position_m)
            .collect();

        self.tree = match KdTree::build(&positions) {
            Ok(t) => {
                info!("Waypoint index built with {} waypoints", t.len());
                Some(t)
            },
            Err(e) => {
                warn!("Cannot index waypoints, index unavailable: {}", e);
                None
            }
        };
    }

    /// True if the index has been built.
    pub fn is_available(&self) -> bool {
        self.tree.is_some()
    }

    /// Number of indexed waypoints, zero if the index is unavailable.
    pub fn len(&self) -> usize {
        self.tree.as_ref().map(|t| t.len()).unwrap_or(0)
    }

    /// Index of the waypoint closest to `position_m`, or `None` if the index
    /// is unavailable.
    pub fn closest(&self, position_m: &Vector2<f64>) -> Option<usize> {
        self.tree.as_ref().map(|t| t.nearest(position_m).index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_waypoint_index() {
        let mut index = WaypointIndex::default();

        assert!(!index.is_available());
        assert_eq!(index.closest(&Vector2::new(0.0, 0.0)), None);

        let waypoints: Vec<Waypoint> = (0..131)
            .map(|i| Waypoint::new(10.0 * i as f64, 0.0))
            .collect();
        index.rebuild(&waypoints);

        assert_eq!(index.len(), 131);
        for (i, w) in waypoints.iter().enumerate() {
            assert_eq!(index.closest(&w.position_m), Some(i));
        }
        assert_eq!(index.closest(&Vector2::new(151.0, 3.0)), Some(15));
        assert_eq!(index.closest(&Vector2::new(-50.0, 0.0)), Some(0));

        // Replacing with an empty list leaves the index unavailable
        index.rebuild(&[]);
        assert!(!index.is_available());
        assert_eq!(index.closest(&Vector2::new(151.0, 3.0)), None);
    }
}
