//! Implementations for the TlDetector state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use log::{debug, info, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{
    select_light, Classifier, ClassifierMode, LightClassifier, LightStateDebouncer, 
    Params, SelectedLight, TlDetectorError, WaypointIndex
};
use comms_if::{
    eqpt::cam::CamImage,
    nav::{Pose, Waypoint},
    tl::{LightState, StopWaypoint, TrafficLight},
};
use util::{
    params, 
    module::State,
    session::Session,
    time::duration_to_seconds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Traffic light detector module state
#[derive(Debug, Default)]
pub struct TlDetector {

    pub(crate) params: Params,

    /// Stop line positions from the parameters
    stop_lines: Vec<Vector2<f64>>,

    /// Index over the latest base waypoints
    index: WaypointIndex,

    /// Latest traffic light snapshot
    lights: Vec<TrafficLight>,

    classifier: Classifier,

    debouncer: LightStateDebouncer,

    /// Used to only warn once about being unable to localise
    localised: bool,
}

/// Input data to the traffic light detector.
#[derive(Default)]
pub struct InputData {
    /// The latest pose of the vehicle, if one has been received
    pub pose: Option<Pose>,

    /// The camera image which triggered this cycle, if any
    pub image: Option<CamImage>,
}

/// Status report for TlDetector processing.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Waypoint closest to the vehicle
    pub car_wp: Option<usize>,

    /// The light which was considered, if any
    pub selected: Option<SelectedLight>,

    /// The colour observed this cycle
    pub raw_state: LightState,

    /// The committed colour after this cycle
    pub stable_state: LightState,

    /// Consecutive observations of the colour being counted
    pub state_count: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for TlDetector {
    type InitData = &'static str;
    type InitError = TlDetectorError;
    
    type InputData = InputData;
    type OutputData = StopWaypoint;
    type StatusReport = StatusReport;
    type ProcError = TlDetectorError;

    /// Initialise the TlDetector module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) 
        -> Result<(), Self::InitError> 
    {
        let params: Params = params::load(init_data)
            .map_err(TlDetectorError::ParamLoadError)?;

        info!(
            "TlDetector using {:?} classification ({:?} images) with {} stop lines",
            params.classifier,
            params.classifier.cam_id(),
            params.stop_line_positions.len()
        );

        // Keep any waypoints, lights or classifier set before init
        let mut new = Self::new(params)?;
        new.index = std::mem::take(&mut self.index);
        new.lights = std::mem::take(&mut self.lights);
        let keep_classifier = new.params.classifier == ClassifierMode::External
            && matches!(self.classifier, Classifier::External(_));
        if keep_classifier {
            new.classifier = std::mem::take(&mut self.classifier);
        }
        *self = new;

        if let Classifier::Unavailable = self.classifier {
            warn!("No external classifier installed, all lights will be Unknown");
        }

        Ok(())
    }

    /// Perform one perception cycle.
    ///
    /// Never fails: without a pose, waypoints or a light ahead the cycle
    /// observes `Unknown` and publishes the last committed stop.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> 
    {
        if let Some(ref image) = input_data.image {
            if let Some(age_s) = duration_to_seconds(
                Utc::now().signed_duration_since(image.timestamp)
            ) {
                debug!("{:?} image is {:.3} s old", image.cam_id, age_s);
            }
        }

        let car_wp = input_data.pose
            .as_ref()
            .and_then(|p| self.index.closest(&p.position_m));

        match (car_wp, self.localised) {
            (Some(_), false) => {
                info!("Vehicle localised on the base waypoints");
                self.localised = true;
            },
            (None, true) => {
                warn!("Vehicle position lost, no lights will be selected");
                self.localised = false;
            },
            _ => ()
        }

        let selected = select_light(
            &self.index, 
            car_wp, 
            &self.lights, 
            &self.stop_lines, 
            self.params.lookahead_wps
        );

        let raw_state = match selected {
            Some(s) => self.classifier.get_light_state(
                &self.lights[s.light_index], 
                input_data.image.as_ref()
            ),
            None => LightState::Unknown
        };

        let stop_wp = self.debouncer.observe(raw_state, selected.map(|s| s.stop_wp));

        let report = StatusReport {
            car_wp,
            selected,
            raw_state,
            stable_state: self.debouncer.stable_state(),
            state_count: self.debouncer.candidate().1,
        };

        trace!("TlDetector output: {} ({:?})", stop_wp.as_msg(), report);

        Ok((stop_wp, report))
    }
}

impl TlDetector {

    /// Create a new detector from the given parameters.
    pub fn new(params: Params) -> Result<Self, TlDetectorError> {
        params.validate()?;

        Ok(Self {
            stop_lines: params.stop_lines(),
            classifier: Classifier::from_mode(params.classifier),
            debouncer: LightStateDebouncer::new(params.state_count_threshold),
            index: WaypointIndex::default(),
            lights: Vec::new(),
            localised: false,
            params,
        })
    }

    /// Replace the base waypoints, rebuilding the waypoint index.
    pub fn set_waypoints(&mut self, waypoints: &[Waypoint]) {
        self.index = WaypointIndex::new(waypoints);
    }

    /// Replace the traffic light snapshot.
    pub fn set_traffic_lights(&mut self, lights: Vec<TrafficLight>) {
        if lights.len() > self.stop_lines.len() {
            warn!(
                "Traffic light snapshot has {} lights but only {} stop lines are known",
                lights.len(),
                self.stop_lines.len()
            );
        }
        self.lights = lights;
    }

    /// Install the classifier used in external classification mode.
    pub fn set_classifier(&mut self, classifier: Box<dyn LightClassifier>) {
        self.classifier = Classifier::External(classifier);
    }

    /// Index of the waypoint closest to the given pose.
    pub fn closest_waypoint(&self, pose: &Pose) -> Option<usize> {
        self.index.closest(&pose.position_m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn detector() -> TlDetector {
        let mut tl = TlDetector::new(Params {
            stop_line_positions: vec![[150.0, 0.0], [600.0, 0.0]],
            ..Params::default()
        }).unwrap();

        tl.set_waypoints(
            &(0..131).map(|i| Waypoint::new(10.0 * i as f64, 0.0)).collect::<Vec<_>>()
        );
        tl
    }

    #[test]
    fn test_no_inputs_is_quiescent() {
        let mut tl = TlDetector::default();

        for _ in 0..5 {
            let (stop, report) = tl.proc(&InputData {
                pose: Some(Pose::new(0.0, 0.0, 0.0)),
                image: None
            }).unwrap();

            assert_eq!(stop, StopWaypoint::NONE);
            assert_eq!(report.car_wp, None);
            assert_eq!(report.raw_state, LightState::Unknown);
        }
    }

    #[test]
    fn test_red_light_ahead() {
        let mut tl = detector();
        tl.set_traffic_lights(vec![
            TrafficLight::new(160.0, 5.0, 5.0, LightState::Red),
            TrafficLight::new(610.0, 5.0, 5.0, LightState::Green),
        ]);

        let input = InputData {
            pose: Some(Pose::new(2.0, 1.0, 0.0)),
            image: None
        };

        let (stop, report) = tl.proc(&input).unwrap();
        assert_eq!(stop, StopWaypoint::NONE);
        assert_eq!(report.car_wp, Some(0));
        assert_eq!(report.selected.map(|s| s.stop_wp), Some(15));
        assert_eq!(report.raw_state, LightState::Red);

        tl.proc(&input).unwrap();
        let (stop, report) = tl.proc(&input).unwrap();
        assert_eq!(stop, StopWaypoint(Some(15)));
        assert_eq!(report.stable_state, LightState::Red);

        // Once past the first stop line the green light is next
        let past = InputData {
            pose: Some(Pose::new(200.0, 0.0, 0.0)),
            image: None
        };
        let (_, report) = tl.proc(&past).unwrap();
        assert_eq!(report.selected.map(|s| s.light_index), Some(1));
        assert_eq!(report.raw_state, LightState::Green);
    }

    #[test]
    fn test_external_without_classifier() {
        let mut tl = TlDetector::new(Params {
            classifier: ClassifierMode::External,
            stop_line_positions: vec![[150.0, 0.0]],
            ..Params::default()
        }).unwrap();
        tl.set_waypoints(
            &(0..131).map(|i| Waypoint::new(10.0 * i as f64, 0.0)).collect::<Vec<_>>()
        );
        tl.set_traffic_lights(vec![TrafficLight::new(160.0, 5.0, 5.0, LightState::Red)]);

        for _ in 0..5 {
            let (stop, report) = tl.proc(&InputData {
                pose: Some(Pose::new(0.0, 0.0, 0.0)),
                image: None
            }).unwrap();
            assert_eq!(stop, StopWaypoint::NONE);
            assert_eq!(report.raw_state, LightState::Unknown);
        }
    }
}
