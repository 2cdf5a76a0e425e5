//! Frame decoding
//!
//! Screen capture backends hand over raw buffers in whatever channel order
//! the platform uses. Everything downstream reads RGB, so the conversion
//! happens once here.

use image::{ImageBuffer, Rgb};

use super::{Frame, VisionError};

/// Channel order of a raw capture buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
    /// OpenCV and most Windows capture APIs
    Bgr8,
    Bgra8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::Rgba8 | PixelLayout::Bgra8 => 4,
        }
    }

    fn to_rgb(self, px: &[u8]) -> [u8; 3] {
        match self {
            PixelLayout::Rgb8 | PixelLayout::Rgba8 => [px[0], px[1], px[2]],
            PixelLayout::Bgr8 | PixelLayout::Bgra8 => [px[2], px[1], px[0]],
        }
    }
}

/// Build an RGB frame from a raw capture buffer
pub fn decode_frame(
    data: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
) -> Result<Frame, VisionError> {
    let bpp = layout.bytes_per_pixel();
    let expected_size = width as usize * height as usize * bpp;
    if data.len() != expected_size || expected_size == 0 {
        return Err(VisionError::InvalidFrameData);
    }

    let rgb: Vec<u8> = data
        .chunks_exact(bpp)
        .flat_map(|px| layout.to_rgb(px))
        .collect();

    ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, rgb).ok_or(VisionError::InvalidFrameData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rgba() {
        let width = 10u32;
        let height = 10u32;
        let frame_data = [10u8, 20, 30, 255].repeat((width * height) as usize);

        let frame = decode_frame(&frame_data, width, height, PixelLayout::Rgba8).unwrap();
        assert_eq!(frame.dimensions(), (width, height));
        assert_eq!(frame.get_pixel(9, 9), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_decode_bgr_swaps_channels() {
        let frame_data = [130u8, 70, 255].repeat(4);
        let frame = decode_frame(&frame_data, 2, 2, PixelLayout::Bgr8).unwrap();
        assert_eq!(frame.get_pixel(0, 1), &Rgb([255, 70, 130]));

        let frame = decode_frame(&[1, 2, 3, 0], 1, 1, PixelLayout::Bgra8).unwrap();
        assert_eq!(frame.get_pixel(0, 0), &Rgb([3, 2, 1]));
    }

    #[test]
    fn test_invalid_frame_data() {
        // Wrong size data
        let frame_data = vec![255u8; 100];
        let result = decode_frame(&frame_data, 10, 10, PixelLayout::Rgba8);
        assert!(matches!(result, Err(VisionError::InvalidFrameData)));

        assert!(decode_frame(&[], 0, 0, PixelLayout::Rgb8).is_err());
    }
}
