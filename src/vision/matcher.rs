//! Template matching
//!
//! Reports whether a reference icon appears inside a grayscale image.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::find_extremes;

/// Score map produced by [`match_zero_mean`]
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A reference image with its own acceptance threshold
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: GrayImage,
    /// Minimum confidence (0-1) for a match
    pub threshold: f32,
}

impl Template {
    /// Default acceptance threshold
    pub const DEFAULT_THRESHOLD: f32 = 0.9;

    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Set the confidence threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// Result of a template match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Whether the best score reached the template threshold
    pub found: bool,
    /// Best score (0.0 - 1.0)
    pub confidence: f32,
    /// Top-left corner of the best match
    pub location: Option<(u32, u32)>,
}

impl MatchResult {
    /// Create a not-found result
    pub fn not_found() -> Self {
        Self {
            found: false,
            confidence: 0.0,
            location: None,
        }
    }
}

/// Something that can look for a template inside an image
pub trait TemplateMatcher {
    fn match_template(&self, image: &GrayImage, template: &Template) -> MatchResult;
}

/// Zero-mean normalized cross-correlation of `template` at every position
/// of `image`
///
/// Both the window and the template have their mean removed before
/// correlating, so overall brightness does not count as similarity. Scores
/// lie in -1..=1; a window or template without any contrast scores 0.
///
/// An empty template or one larger than the image yields an empty map.
pub fn match_zero_mean(image: &GrayImage, template: &GrayImage) -> ScoreMap {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    let (Some(dx), Some(dy)) = (iw.checked_sub(tw), ih.checked_sub(th)) else {
        return ImageBuffer::new(0, 0);
    };
    if tw == 0 || th == 0 {
        return ImageBuffer::new(0, 0);
    }
    let (out_width, out_height) = (dx + 1, dy + 1);

    let n = f64::from(tw) * f64::from(th);
    let template_mean = template.pixels().map(|p| f64::from(p[0])).sum::<f64>() / n;
    let centered: Vec<f64> = template
        .pixels()
        .map(|p| f64::from(p[0]) - template_mean)
        .collect();
    let template_energy: f64 = centered.iter().map(|v| v * v).sum();
    if template_energy <= 0.0 {
        return ImageBuffer::new(out_width, out_height);
    }

    let sums = integral_image::<_, u64>(image);
    let squares = integral_squared_image::<_, u64>(image);

    ImageBuffer::from_fn(out_width, out_height, |x, y| {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let sum = sum_image_pixels(&sums, x, y, right, bottom)[0] as f64;
        let sum_sq = sum_image_pixels(&squares, x, y, right, bottom)[0] as f64;
        let window_energy = sum_sq - sum * sum / n;
        if window_energy <= 0.0 {
            return Luma([0.0]);
        }

        let mut numerator = 0.0;
        for (ty, row) in centered.chunks(tw as usize).enumerate() {
            for (tx, &t) in row.iter().enumerate() {
                numerator += f64::from(image.get_pixel(x + tx as u32, y + ty as u32)[0]) * t;
            }
        }
        Luma([(numerator / (template_energy * window_energy).sqrt()) as f32])
    })
}

/// Zero-mean normalized cross-correlation matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct NccMatcher;

impl TemplateMatcher for NccMatcher {
    fn match_template(&self, image: &GrayImage, template: &Template) -> MatchResult {
        let (iw, ih) = image.dimensions();
        let (tw, th) = template.image.dimensions();
        if tw == 0 || th == 0 || tw > iw || th > ih {
            log::warn!(
                "Template '{}' ({}x{}) does not fit image ({}x{})",
                template.name,
                tw,
                th,
                iw,
                ih
            );
            return MatchResult::not_found();
        }

        let scores = match_zero_mean(image, &template.image);
        let extremes = find_extremes(&scores);
        let confidence = if extremes.max_value.is_finite() {
            extremes.max_value.clamp(0.0, 1.0)
        } else {
            0.0
        };

        log::trace!(
            "Template '{}' best score {:.3} at {:?}",
            template.name,
            confidence,
            extremes.max_value_location
        );

        MatchResult {
            found: confidence >= template.threshold,
            confidence,
            location: Some(extremes.max_value_location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, y| Luma([(30 + (x * 7 + y * 13) % 200) as u8]))
    }

    #[test]
    fn test_finds_embedded_template() {
        let template = Template::new("pattern", pattern(8, 6));
        let mut image: GrayImage = ImageBuffer::from_pixel(40, 30, Luma([128]));
        image::imageops::replace(&mut image, &template.image, 10, 5);

        let result = NccMatcher.match_template(&image, &template);
        assert!(result.found);
        assert!(result.confidence > 0.99);
        assert_eq!(result.location, Some((10, 5)));
    }

    #[test]
    fn test_rejects_different_pattern() {
        // Vertical stripes template against horizontal stripes image
        let template = Template::new(
            "vertical",
            ImageBuffer::from_fn(8, 8, |x, _| Luma([if x % 2 == 0 { 50 } else { 200 }])),
        );
        let image: GrayImage =
            ImageBuffer::from_fn(20, 20, |_, y| Luma([if y % 2 == 0 { 50 } else { 200 }]));

        let result = NccMatcher.match_template(&image, &template);
        assert!(!result.found);
        assert!(result.confidence < 0.8);
    }

    /// Low-contrast diagonal ramp, values 100..=160
    fn soft_ramp(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, y| Luma([(100 + (x * 3 + y * 5) % 61) as u8]))
    }

    /// Low-contrast texture unrelated to [`soft_ramp`], values 100..=160
    fn soft_swirl(width: u32, height: u32) -> GrayImage {
        ImageBuffer::from_fn(width, height, |x, y| Luma([(100 + (x * x + y * 7) % 61) as u8]))
    }

    #[test]
    fn test_flat_image_does_not_match_texture() {
        let template = Template::new("ramp", soft_ramp(20, 20));
        let image: GrayImage = ImageBuffer::from_pixel(105, 115, Luma([200]));

        let result = NccMatcher.match_template(&image, &template);
        assert!(!result.found);
        assert!(result.confidence < 0.1);
    }

    #[test]
    fn test_low_contrast_textures_are_told_apart() {
        let mut image: GrayImage = ImageBuffer::from_pixel(40, 30, Luma([130]));
        image::imageops::replace(&mut image, &soft_ramp(20, 20), 10, 5);

        let ramp = NccMatcher.match_template(&image, &Template::new("ramp", soft_ramp(20, 20)));
        assert!(ramp.found);
        assert!(ramp.confidence > 0.99);
        assert_eq!(ramp.location, Some((10, 5)));

        let swirl = NccMatcher.match_template(&image, &Template::new("swirl", soft_swirl(20, 20)));
        assert!(!swirl.found);
        assert!(swirl.confidence < 0.5);
    }

    #[test]
    fn test_brightness_offset_still_matches() {
        let template = Template::new("ramp", soft_ramp(12, 10));
        let brighter: GrayImage =
            ImageBuffer::from_fn(12, 10, |x, y| Luma([template.image.get_pixel(x, y)[0] + 60]));
        let mut image: GrayImage = ImageBuffer::from_pixel(30, 30, Luma([90]));
        image::imageops::replace(&mut image, &brighter, 4, 7);

        let result = NccMatcher.match_template(&image, &template);
        assert!(result.found);
        assert_eq!(result.location, Some((4, 7)));
    }

    #[test]
    fn test_flat_template_scores_zero() {
        let scores = match_zero_mean(&soft_ramp(10, 10), &ImageBuffer::from_pixel(3, 3, Luma([7])));
        assert_eq!(scores.dimensions(), (8, 8));
        assert!(scores.pixels().all(|p| p[0] == 0.0));
    }

    #[test]
    fn test_oversized_template_gives_empty_map() {
        assert_eq!(match_zero_mean(&soft_ramp(4, 4), &soft_ramp(5, 3)).dimensions(), (0, 0));
        assert_eq!(match_zero_mean(&soft_ramp(4, 4), &GrayImage::new(0, 0)).dimensions(), (0, 0));
    }

    #[test]
    fn test_threshold_is_per_template() {
        let template = Template::new("vertical", pattern(8, 8)).with_threshold(0.5);
        assert_eq!(template.threshold, 0.5);
        assert_eq!(Template::new("x", pattern(2, 2)).threshold, 0.9);
        assert_eq!(Template::new("x", pattern(2, 2)).with_threshold(3.0).threshold, 1.0);
    }

    #[test]
    fn test_oversized_template_not_found() {
        let template = Template::new("big", pattern(50, 50));
        let image = pattern(10, 10);
        assert_eq!(
            NccMatcher.match_template(&image, &template),
            MatchResult::not_found()
        );
    }
}
