//! Pixel color probes
//!
//! Small, cheap classifiers that look at single pixels instead of whole
//! regions. All pixels are RGB.

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::config::calibration::FavorRule;
use crate::game::support_card::FavorLevel;

/// Check if two colors match within a per-channel tolerance
pub fn color_matches(a: &Rgb<u8>, b: &Rgb<u8>, tolerance: u8) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(&x, &y)| x.abs_diff(y) <= tolerance)
}

/// Inclusive per-channel bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub red: (u8, u8),
    pub green: (u8, u8),
    pub blue: (u8, u8),
}

impl ColorRange {
    pub fn contains(&self, pixel: &Rgb<u8>) -> bool {
        let [r, g, b] = pixel.0;
        in_range(r, self.red) && in_range(g, self.green) && in_range(b, self.blue)
    }

    pub fn is_well_formed(&self) -> bool {
        self.red.0 <= self.red.1 && self.green.0 <= self.green.1 && self.blue.0 <= self.blue.1
    }
}

fn in_range(value: u8, (min, max): (u8, u8)) -> bool {
    (min..=max).contains(&value)
}

/// Ordered favor color rules; the first rule with a matching color wins
#[derive(Debug, Clone)]
pub struct FavorPalette {
    rules: Vec<(Vec<Rgb<u8>>, FavorLevel)>,
    tolerance: u8,
}

impl FavorPalette {
    pub fn new(rules: &[FavorRule], tolerance: u8) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| {
                    let colors = rule.colors.iter().map(|&c| Rgb(c)).collect::<Vec<_>>();
                    (colors, rule.level)
                })
                .collect(),
            tolerance,
        }
    }

    /// Classify one pixel, `Unknown` if no reference color is close enough
    pub fn classify(&self, pixel: &Rgb<u8>) -> FavorLevel {
        self.rules
            .iter()
            .find(|(colors, _)| {
                colors
                    .iter()
                    .any(|reference| color_matches(pixel, reference, self.tolerance))
            })
            .map_or(FavorLevel::Unknown, |&(_, level)| level)
    }
}
