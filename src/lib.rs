//! Uma Scene - screenshot parsing for Umamusume training automation
//!
//! This library turns captured training screens into typed facts for a
//! decision-making agent: the stat gains a training would give and the
//! support cards present, with their type, favor level and event marker.
//!
//! Recognition is best effort. Digits that can't be read count as zero and
//! slots whose favor gauge can't be read are treated as empty; the control
//! loop is expected to poll again on the next frame. Misuse, such as a frame
//! at the wrong resolution, is reported as an error.

pub mod config;
pub mod game;
pub mod vision;

use image::RgbImage;

use crate::config::{Calibration, NamedRegion};
use crate::game::support_card::SupportCardSlot;
use crate::game::training::{TrainingReadings, TrainingStatDelta};
use crate::vision::matcher::{NccMatcher, TemplateMatcher};
use crate::vision::ocr::DigitReader;
use crate::vision::recognition::{CardTemplates, SupportCardClassifier};
use crate::vision::training::TrainingStatAggregator;
use crate::vision::{region, Frame, VisionError};

/// Scene parser for the training screen
///
/// Owns a validated calibration, the digit reader used for stat numbers and
/// the template matcher and templates used for card types.
pub struct SceneParser<R, M = NccMatcher> {
    calibration: Calibration,
    training: TrainingStatAggregator<R>,
    support: SupportCardClassifier<M>,
}

impl<R: DigitReader> SceneParser<R, NccMatcher> {
    /// Create a parser with the built-in calibration
    pub fn new(reader: R, templates: CardTemplates) -> Self {
        let calibration = Calibration::reference().clone();
        Self::build(calibration, reader, templates, NccMatcher)
    }
}

impl<R: DigitReader, M: TemplateMatcher> SceneParser<R, M> {
    /// Create a parser with a custom calibration and matcher
    pub fn with_calibration(
        calibration: Calibration,
        reader: R,
        templates: CardTemplates,
        matcher: M,
    ) -> Result<Self, VisionError> {
        calibration.validate()?;
        Ok(Self::build(calibration, reader, templates, matcher))
    }

    fn build(calibration: Calibration, reader: R, templates: CardTemplates, matcher: M) -> Self {
        Self {
            training: TrainingStatAggregator::new(calibration.training.clone(), reader),
            support: SupportCardClassifier::new(calibration.support.clone(), templates, matcher),
            calibration,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Read the stat gains shown on a training result screen
    pub fn parse_training_result(&self, frame: &Frame) -> Result<TrainingStatDelta, VisionError> {
        self.check_resolution(frame)?;
        self.training.read(frame)
    }

    /// Like [`SceneParser::parse_training_result`], keeping unreadable bands
    /// apart from zeros
    pub fn parse_training_readings(&self, frame: &Frame) -> Result<TrainingReadings, VisionError> {
        self.check_resolution(frame)?;
        self.training.read_detailed(frame)
    }

    /// Recognize the support cards on a training screen, top to bottom
    pub fn parse_support_cards(&self, frame: &Frame) -> Result<Vec<SupportCardSlot>, VisionError> {
        self.check_resolution(frame)?;
        self.support.classify(frame)
    }

    /// Crop a named region, e.g. the date banner, for the caller to inspect
    pub fn extract_region(&self, frame: &Frame, name: NamedRegion) -> Result<RgbImage, VisionError> {
        self.check_resolution(frame)?;
        region::extract(frame, &self.calibration, name)
    }

    fn check_resolution(&self, frame: &Frame) -> Result<(), VisionError> {
        let (width, height) = frame.dimensions();
        let expected = (
            self.calibration.reference_width,
            self.calibration.reference_height,
        );
        if (width, height) != expected {
            log::error!(
                "Frame is {}x{}, calibration expects {}x{}",
                width,
                height,
                expected.0,
                expected.1
            );
            return Err(VisionError::ResolutionMismatch {
                expected_width: expected.0,
                expected_height: expected.1,
                actual_width: width,
                actual_height: height,
            });
        }
        Ok(())
    }
}
