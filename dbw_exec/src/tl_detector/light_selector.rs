//! Selection of the traffic light which matters to the vehicle

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use comms_if::tl::TrafficLight;
use super::WaypointIndex;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The light chosen by `select_light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedLight {
    /// Index of the light in the traffic light snapshot
    pub light_index: usize,

    /// Index of the waypoint closest to the light's stop line
    pub stop_wp: usize,

    /// Number of waypoints between the vehicle and the stop line
    pub distance_wps: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the nearest traffic light ahead of the vehicle.
///
/// Each light is paired with the stop line at the same position in
/// `stop_lines`, lights without a stop line are ignored. A light is a
/// candidate if its stop line waypoint is at most
/// `min(number of waypoints, lookahead_wps) - 1` waypoints ahead of the
/// vehicle's waypoint `car_wp`. Lights behind the vehicle are never selected.
/// The closest candidate is chosen, ties going to the first light in the
/// snapshot.
///
/// Returns `None` if the vehicle's waypoint isn't known, the index is
/// unavailable, or there is no candidate.
pub fn select_light(
    index: &WaypointIndex,
    car_wp: Option<usize>,
    lights: &[TrafficLight],
    stop_lines: &[Vector2<f64>],
    lookahead_wps: usize
) -> Option<SelectedLight> {

    let car_wp = car_wp?;

    if !index.is_available() {
        return None
    }

    let horizon = index.len().min(lookahead_wps);

    let mut selected: Option<SelectedLight> = None;

    for (light_index, (_, stop_line)) in lights.iter().zip(stop_lines.iter()).enumerate() {
        let stop_wp = match index.closest(stop_line) {
            Some(w) => w,
            None => continue
        };

        // Behind the vehicle
        if stop_wp < car_wp {
            continue
        }
        let distance_wps = stop_wp - car_wp;

        let best_wps = selected.map(|s| s.distance_wps).unwrap_or(horizon);
        if distance_wps < best_wps {
            selected = Some(SelectedLight {
                light_index,
                stop_wp,
                distance_wps
            });
        }
    }

    selected
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::{nav::Waypoint, tl::LightState};

    fn straight_road() -> WaypointIndex {
        let waypoints: Vec<Waypoint> = (0..131)
            .map(|i| Waypoint::new(10.0 * i as f64, 0.0))
            .collect();
        WaypointIndex::new(&waypoints)
    }

    fn light() -> TrafficLight {
        TrafficLight::new(0.0, 0.0, 5.0, LightState::Red)
    }

    #[test]
    fn test_nearest_ahead() {
        let index = straight_road();
        let lights = vec![light(), light(), light()];
        let stop_lines = vec![
            Vector2::new(600.0, 0.0),
            Vector2::new(150.0, 0.0),
            Vector2::new(40.0, 0.0),
        ];

        // Car at waypoint 10, the light at waypoint 4 is behind
        let sel = select_light(&index, Some(10), &lights, &stop_lines, 130).unwrap();
        assert_eq!(sel, SelectedLight { light_index: 1, stop_wp: 15, distance_wps: 5 });

        // Car at waypoint 0, which is a valid position
        let sel = select_light(&index, Some(0), &lights, &stop_lines, 130).unwrap();
        assert_eq!(sel.light_index, 2);
        assert_eq!(sel.stop_wp, 4);

        // Stop line exactly at the car is a candidate
        let sel = select_light(&index, Some(4), &lights, &stop_lines, 130).unwrap();
        assert_eq!(sel.distance_wps, 0);
    }

    #[test]
    fn test_horizon() {
        let index = straight_road();
        let lights = vec![light()];

        // 100 waypoints ahead is inside the default horizon but not a short one
        let stop_lines = vec![Vector2::new(1000.0, 0.0)];
        assert!(select_light(&index, Some(0), &lights, &stop_lines, 130).is_some());
        assert!(select_light(&index, Some(0), &lights, &stop_lines, 100).is_none());
        assert!(select_light(&index, Some(0), &lights, &stop_lines, 101).is_some());

        // The horizon is also limited by the number of waypoints
        let short = WaypointIndex::new(
            &(0..20).map(|i| Waypoint::new(10.0 * i as f64, 0.0)).collect::<Vec<_>>()
        );
        let stop_lines = vec![Vector2::new(190.0, 0.0)];
        assert!(select_light(&short, Some(0), &lights, &stop_lines, 130).is_some());
        assert!(select_light(&short, Some(0), &[light()], &[Vector2::new(500.0, 0.0)], 130)
            .map(|s| s.stop_wp) == Some(19));
    }

    #[test]
    fn test_ties_and_missing_stop_lines() {
        let index = straight_road();

        // Two lights sharing a stop line waypoint, the first wins
        let lights = vec![light(), light(), light()];
        let stop_lines = vec![Vector2::new(151.0, 1.0), Vector2::new(149.0, -1.0)];
        let sel = select_light(&index, Some(0), &lights, &stop_lines, 130).unwrap();
        assert_eq!(sel.light_index, 0);

        // More lights than stop lines is not an error, the extra light is ignored
        let stop_lines = vec![Vector2::new(900.0, 0.0)];
        let lights = vec![light(), light()];
        let sel = select_light(&index, Some(0), &lights, &stop_lines, 130).unwrap();
        assert_eq!(sel.light_index, 0);
    }

    #[test]
    fn test_nothing_to_select() {
        let index = straight_road();
        let stop_lines = vec![Vector2::new(150.0, 0.0)];

        assert!(select_light(&index, None, &[light()], &stop_lines, 130).is_none());
        assert!(select_light(&index, Some(0), &[], &stop_lines, 130).is_none());
        assert!(
            select_light(&WaypointIndex::default(), Some(0), &[light()], &stop_lines, 130)
                .is_none()
        );
        // Only light is behind
        assert!(select_light(&index, Some(16), &[light()], &stop_lines, 130).is_none());
    }
}
