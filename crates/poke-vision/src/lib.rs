use poke_capture::{FrameError, Region};
use thiserror::Error;

pub mod classifier;
pub mod config;
pub mod detectors;
pub mod name_reader;
pub mod regions;
pub mod stats;

#[cfg(test)]
mod test_scenes;

pub use classifier::ScreenClassifier;
pub use config::{
    ClassifierConfig, ColorMatch, DetectorThresholds, OcrSettings, Profile, TextPolarity,
};
pub use name_reader::{NameReader, TesseractRecognizer, TextRecognizer};
pub use regions::{RegionCatalog, RegionEntry};

/// Configuration and call-order errors. Negative detections are never errors.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("no region '{name}' registered for profile {profile}")]
    UnknownRegion { name: String, profile: Profile },
    #[error(
        "region '{name}' ({profile}) {region:?} does not fit the {width}x{height} canonical frame"
    )]
    RegionOutOfBounds {
        name: String,
        profile: Profile,
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("no detector thresholds configured for profile {profile}")]
    MissingThresholds { profile: Profile },
    #[error("no OCR settings configured for profile {profile}")]
    MissingOcrSettings { profile: Profile },
    #[error("{field} = {value} is out of range for profile {profile}")]
    InvalidThreshold {
        profile: Profile,
        field: &'static str,
        value: f64,
    },
    #[error("detector '{detector}' is not configured for profile {profile}")]
    MissingDetector {
        detector: &'static str,
        profile: Profile,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}
