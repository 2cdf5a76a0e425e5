//! Digit recognition
//!
//! The scene parser only ever reads numbers. Recognition itself is behind the
//! [`DigitReader`] trait; this module adds the post-processing every reading
//! goes through and a glyph-template reader usable without an OCR backend.

use std::collections::BTreeMap;

use image::{GrayImage, RgbImage};

use super::matcher::match_zero_mean;

/// Something that turns an image into recognized text
///
/// Output may contain stray punctuation; callers filter it.
pub trait DigitReader {
    fn read_digits(&self, image: &RgbImage) -> String;
}

impl<F> DigitReader for F
where
    F: Fn(&RgbImage) -> String,
{
    fn read_digits(&self, image: &RgbImage) -> String {
        self(image)
    }
}

/// Keep only ASCII digits
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Longest digit string accepted as a reading
///
/// Stat gains never reach five digits; anything longer is a misread.
pub const MAX_DIGITS: usize = 4;

/// Parse raw recognizer output into a number
///
/// `None` means no numeral was present. A digit string longer than
/// [`MAX_DIGITS`] is also treated as unreadable.
pub fn parse_digits(raw: &str) -> Option<u32> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return None;
    }
    if digits.len() > MAX_DIGITS {
        log::warn!(
            "Discarding digit reading '{}': more than {} digits",
            digits,
            MAX_DIGITS
        );
        return None;
    }

    digits.parse().ok()
}

/// Read a number from an image region
pub fn read_number<R: DigitReader + ?Sized>(reader: &R, image: &RgbImage) -> Option<u32> {
    let raw = reader.read_digits(image);
    let value = parse_digits(&raw);
    log::trace!("OCR raw '{}' -> {:?}", raw, value);
    value
}

#[derive(Debug, Clone, Copy)]
struct GlyphMatch {
    digit: char,
    x: u32,
    confidence: f32,
}

/// Digit reader based on per-digit glyph templates
///
/// Every glyph is matched across the whole image; overlapping hits are
/// resolved in favor of the most confident one and the survivors are read
/// left to right.
#[derive(Debug, Clone)]
pub struct GlyphDigitReader {
    glyphs: BTreeMap<char, Vec<GrayImage>>,
    threshold: f32,
}

impl GlyphDigitReader {
    /// Default match threshold
    pub const DEFAULT_THRESHOLD: f32 = 0.95;

    pub fn new() -> Self {
        Self {
            glyphs: BTreeMap::new(),
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Set the match threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Register a glyph variant for a digit; non-digits are ignored
    pub fn add_glyph(&mut self, digit: char, glyph: GrayImage) {
        if !digit.is_ascii_digit() {
            log::warn!("Ignoring glyph for non-digit '{}'", digit);
            return;
        }
        self.glyphs.entry(digit).or_default().push(glyph);
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.values().map(Vec::len).sum()
    }

    fn find_matches(&self, image: &GrayImage) -> Vec<GlyphMatch> {
        let (iw, ih) = image.dimensions();
        let mut matches = Vec::new();

        for (&digit, variants) in &self.glyphs {
            for glyph in variants {
                let (gw, gh) = glyph.dimensions();
                if gw == 0 || gh == 0 || gw > iw || gh > ih {
                    continue;
                }

                let scores = match_zero_mean(image, glyph);
                for (x, _, score) in scores.enumerate_pixels() {
                    let confidence = score[0];
                    if confidence >= self.threshold {
                        matches.push(GlyphMatch {
                            digit,
                            x,
                            confidence,
                        });
                    }
                }
            }
        }

        matches
    }

    /// Keep the most confident match among those closer than `min_gap`
    fn suppress_overlaps(mut matches: Vec<GlyphMatch>, min_gap: u32) -> Vec<GlyphMatch> {
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut kept: Vec<GlyphMatch> = Vec::new();
        for candidate in matches {
            if kept.iter().all(|m| m.x.abs_diff(candidate.x) >= min_gap) {
                kept.push(candidate);
            }
        }

        kept.sort_by_key(|m| m.x);
        kept
    }

    fn min_glyph_width(&self) -> u32 {
        self.glyphs
            .values()
            .flatten()
            .map(|g| g.width())
            .min()
            .unwrap_or(1)
            .max(1)
    }
}

impl Default for GlyphDigitReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitReader for GlyphDigitReader {
    fn read_digits(&self, image: &RgbImage) -> String {
        if self.glyphs.is_empty() {
            return String::new();
        }

        let gray = image::imageops::grayscale(image);
        let matches = self.find_matches(&gray);
        Self::suppress_overlaps(matches, self.min_glyph_width())
            .iter()
            .map(|m| m.digit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    const INK: u8 = 0;
    const PAPER: u8 = 255;

    /// 5x7 "1": a vertical stroke on a short base
    fn glyph_one() -> GrayImage {
        ImageBuffer::from_fn(5, 7, |x, y| {
            let stroke = x == 2 || (y == 6 && (1..=3).contains(&x));
            Luma([if stroke { INK } else { PAPER }])
        })
    }

    /// 5x7 "0": a rectangular outline
    fn glyph_zero() -> GrayImage {
        ImageBuffer::from_fn(5, 7, |x, y| {
            let edge = x == 0 || x == 4 || y == 0 || y == 6;
            Luma([if edge { INK } else { PAPER }])
        })
    }

    fn draw(canvas: &mut RgbImage, glyph: &GrayImage, left: u32, top: u32) {
        for (x, y, pixel) in glyph.enumerate_pixels() {
            let v = pixel[0];
            canvas.put_pixel(left + x, top + y, Rgb([v, v, v]));
        }
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+12"), "12");
        assert_eq!(digits_only(" 3,4.5 "), "345");
        assert_eq!(digits_only("abc"), "");
        assert_eq!(digits_only(""), "");
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("12"), Some(12));
        assert_eq!(parse_digits("+7"), Some(7));
        assert_eq!(parse_digits("0"), Some(0));
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("--"), None);
        assert_eq!(parse_digits("9999"), Some(9999));
        assert_eq!(parse_digits("0042"), Some(42));
    }

    #[test]
    fn test_parse_digits_rejects_oversized_readings() {
        assert_eq!(parse_digits("10000"), None);
        assert_eq!(parse_digits("4000000000"), None);
        assert_eq!(parse_digits("99999999999999"), None);

        let reader = |_: &RgbImage| "+4000000000".to_string();
        assert_eq!(read_number(&reader, &RgbImage::new(4, 4)), None);
    }

    #[test]
    fn test_closure_reader() {
        let reader = |_: &RgbImage| "+15!".to_string();
        let image = RgbImage::new(4, 4);
        assert_eq!(read_number(&reader, &image), Some(15));

        let blank = |_: &RgbImage| String::new();
        assert_eq!(read_number(&blank, &image), None);
    }

    #[test]
    fn test_glyph_reader_reads_left_to_right() {
        let mut reader = GlyphDigitReader::new();
        reader.add_glyph('1', glyph_one());
        reader.add_glyph('0', glyph_zero());
        assert_eq!(reader.glyph_count(), 2);

        let mut canvas = RgbImage::from_pixel(40, 27, Rgb([PAPER, PAPER, PAPER]));
        draw(&mut canvas, &glyph_one(), 10, 10);
        draw(&mut canvas, &glyph_zero(), 22, 10);

        assert_eq!(reader.read_digits(&canvas), "10");
    }

    #[test]
    fn test_glyph_reader_ignores_ink_shade() {
        let mut reader = GlyphDigitReader::new();
        reader.add_glyph('1', glyph_one());
        reader.add_glyph('0', glyph_zero());

        // Grey ink on a tinted band instead of black on white
        let shaded = |glyph: GrayImage| -> GrayImage {
            ImageBuffer::from_fn(glyph.width(), glyph.height(), |x, y| {
                Luma([if glyph.get_pixel(x, y)[0] == INK { 90 } else { 200 }])
            })
        };
        let mut canvas = RgbImage::from_pixel(40, 27, Rgb([200, 200, 200]));
        draw(&mut canvas, &shaded(glyph_zero()), 8, 9);
        draw(&mut canvas, &shaded(glyph_one()), 20, 9);

        assert_eq!(reader.read_digits(&canvas), "01");
    }

    #[test]
    fn test_glyph_reader_blank_image() {
        let mut reader = GlyphDigitReader::new();
        reader.add_glyph('1', glyph_one());
        reader.add_glyph('x', glyph_zero());
        assert_eq!(reader.glyph_count(), 1);

        let canvas = RgbImage::from_pixel(30, 20, Rgb([PAPER, PAPER, PAPER]));
        assert_eq!(reader.read_digits(&canvas), "");
        assert_eq!(GlyphDigitReader::new().read_digits(&canvas), "");
    }
}
