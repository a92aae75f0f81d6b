//! Traffic light colour classification
//!
//! The classification model itself lives outside this crate. This module
//! provides the seam it plugs into, and the ground truth source used in
//! simulation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::RgbImage;
use serde::Deserialize;

use comms_if::{
    eqpt::cam::{CamId, CamImage},
    tl::{LightState, TrafficLight},
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A traffic light colour classifier working on camera images.
pub trait LightClassifier: Send {
    /// Classify the colour of the traffic light visible in `image`.
    fn classify(&mut self, image: &RgbImage) -> LightState;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where the detector gets light colours from, selected by parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum ClassifierMode {
    /// Use the colour reported by the traffic light source, only available in
    /// simulation.
    GroundTruth,

    /// Classify camera images with an externally supplied classifier.
    External,
}

/// The classifier in use by the detector.
pub enum Classifier {
    /// Colours come from the traffic light snapshot
    GroundTruth,

    /// Colours come from camera images
    External(Box<dyn LightClassifier>),

    /// External classification was requested but no classifier has been
    /// installed, all lights are `Unknown`.
    Unavailable,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ClassifierMode {
    fn default() -> Self {
        ClassifierMode::GroundTruth
    }
}

impl ClassifierMode {
    /// The camera stream the classifier expects images from.
    pub fn cam_id(&self) -> CamId {
        match self {
            ClassifierMode::GroundTruth => CamId::FrontColour,
            ClassifierMode::External => CamId::FrontRaw,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::GroundTruth
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classifier::GroundTruth => write!(f, "GroundTruth"),
            Classifier::External(_) => write!(f, "External"),
            Classifier::Unavailable => write!(f, "Unavailable"),
        }
    }
}

impl Classifier {
    /// Create the classifier for the given mode. An external classifier must
    /// be installed separately.
    pub fn from_mode(mode: ClassifierMode) -> Self {
        match mode {
            ClassifierMode::GroundTruth => Classifier::GroundTruth,
            ClassifierMode::External => Classifier::Unavailable,
        }
    }

    /// Determine the colour of `light`.
    ///
    /// Without a camera image an external classifier can't say anything, so
    /// the light is `Unknown`.
    pub fn get_light_state(
        &mut self, 
        light: &TrafficLight, 
        image: Option<&CamImage>
    ) -> LightState {
        match self {
            Classifier::GroundTruth => light.state,
            Classifier::External(c) => match image {
                Some(i) => c.classify(&i.image),
                None => LightState::Unknown
            },
            Classifier::Unavailable => LightState::Unknown
        }
    }
}
