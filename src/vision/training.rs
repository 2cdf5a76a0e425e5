//! Training result parsing
//!
//! Reads the stat gain preview shown below the training buttons. Each
//! attribute shows a base number and, when a bonus applies, a second number
//! directly above it. Unreadable numbers count as zero: a misread costs one
//! frame, the control loop polls again.

use image::Rgb;

use super::ocr::{read_number, DigitReader};
use super::region::{crop, pad_with_border};
use super::{Frame, VisionError};
use crate::config::calibration::{Region, TrainingLayout};
use crate::game::training::{Attribute, StatReading, TrainingReadings, TrainingStatDelta};

/// Reads the six training stat gains from a frame
pub struct TrainingStatAggregator<R> {
    layout: TrainingLayout,
    reader: R,
}

impl<R: DigitReader> TrainingStatAggregator<R> {
    pub fn new(layout: TrainingLayout, reader: R) -> Self {
        Self { layout, reader }
    }

    /// Read both bands of every attribute, keeping absent readings apart
    /// from zeros
    pub fn read_detailed(&self, frame: &Frame) -> Result<TrainingReadings, VisionError> {
        let mut readings = TrainingReadings::default();
        for attribute in Attribute::ALL {
            readings.readings[attribute.index()] = self.read_attribute(frame, attribute)?;
        }
        Ok(readings)
    }

    /// Read the final stat gains
    pub fn read(&self, frame: &Frame) -> Result<TrainingStatDelta, VisionError> {
        let delta = self.read_detailed(frame)?.total();
        log::debug!("Training result: {:?}", delta.to_array());
        Ok(delta)
    }

    /// Read one attribute's base and bonus numbers
    pub fn read_attribute(
        &self,
        frame: &Frame,
        attribute: Attribute,
    ) -> Result<StatReading, VisionError> {
        let regions = self.layout.regions(attribute);
        let reading = StatReading {
            primary: self.read_band(frame, regions.primary)?,
            extra: self.read_band(frame, regions.extra)?,
        };
        log::trace!("{:?}: {:?}", attribute, reading);
        Ok(reading)
    }

    fn read_band(&self, frame: &Frame, region: Region) -> Result<Option<u32>, VisionError> {
        let band = crop(frame, region)?;
        let padded = pad_with_border(
            &band,
            self.layout.ocr_border,
            Rgb(self.layout.border_color),
        );
        Ok(read_number(&self.reader, &padded))
    }
}
