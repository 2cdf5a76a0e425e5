//! Vision and image processing module
//!
//! Turns training screen frames into typed facts: region cropping, digit
//! recognition, pixel color probes and template matching.
//!
//! Frames are RGB (`[0] = R, [1] = G, [2] = B`) at the calibrated reference
//! resolution. Raw capture buffers in other channel orders go through
//! [`capture::decode_frame`] first.

pub mod capture;
pub mod color;
pub mod matcher;
pub mod ocr;
pub mod recognition;
pub mod region;
pub mod training;

use crate::config::calibration::{CalibrationError, NamedRegion, Region};

pub use capture::{decode_frame, PixelLayout};
pub use matcher::{MatchResult, NccMatcher, Template, TemplateMatcher};
pub use ocr::{DigitReader, GlyphDigitReader};
pub use recognition::{CardTemplates, SupportCardClassifier};
pub use training::TrainingStatAggregator;

/// One captured screenshot, RGB channel order
pub type Frame = image::RgbImage;

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Invalid frame data")]
    InvalidFrameData,
    #[error("Frame is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    ResolutionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("Region {region:?} lies outside the {width}x{height} frame")]
    RegionOutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("No calibrated region for {0:?}")]
    UnknownRegion(NamedRegion),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
