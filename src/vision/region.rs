//! Region extraction
//!
//! Crops calibrated rectangles out of a frame. Crops are bounds-checked: a
//! rectangle that does not fit the frame is an error rather than a read of
//! unrelated pixels.

use image::{Rgb, RgbImage};

use super::{Frame, VisionError};
use crate::config::calibration::{Calibration, NamedRegion, Region};

/// Crop a region out of a frame
pub fn crop(frame: &Frame, region: Region) -> Result<RgbImage, VisionError> {
    let (width, height) = frame.dimensions();
    if !region.fits_within(width, height) {
        return Err(VisionError::RegionOutOfBounds {
            region,
            width,
            height,
        });
    }

    Ok(image::imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image())
}

/// Crop a named region using the calibration table
pub fn extract(
    frame: &Frame,
    calibration: &Calibration,
    name: NamedRegion,
) -> Result<RgbImage, VisionError> {
    let region = calibration
        .region(name)
        .ok_or(VisionError::UnknownRegion(name))?;
    crop(frame, region)
}

/// Surround an image with a solid border of `border` pixels on every side
///
/// Digit recognition degrades badly when glyphs touch the image edge, so
/// every OCR crop goes through this first.
pub fn pad_with_border(image: &RgbImage, border: u32, fill: Rgb<u8>) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(width + 2 * border, height + 2 * border, fill);
    image::imageops::replace(&mut canvas, image, border as i64, border as i64);
    canvas
}
