//! Screen calibration tables
//!
//! All crop rectangles, probe points, reference colors and thresholds used by
//! the scene parser live here. Coordinates are absolute pixels against the
//! 720x1280 reference resolution. Values were measured on one game build and
//! may need re-deriving for another; a replacement table can be loaded from
//! JSON.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::game::support_card::FavorLevel;
use crate::game::training::Attribute;
use crate::vision::color::ColorRange;

/// Reference screen width in pixels
pub const REFERENCE_WIDTH: u32 = 720;
/// Reference screen height in pixels
pub const REFERENCE_HEIGHT: u32 = 1280;
/// Support card slots shown next to the training buttons
pub const MAX_SUPPORT_SLOTS: usize = 5;

static REFERENCE: Lazy<Calibration> = Lazy::new(Calibration::default);

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from half-open column and row ranges
    pub const fn from_spans(x: (u32, u32), y: (u32, u32)) -> Self {
        Self::new(x.0, y.0, x.1 - x.0, y.1 - y.0)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies entirely inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Whether an offset from the top-left corner falls inside the region
    pub fn contains(&self, point: Point) -> bool {
        (point.x as u64) < self.width as u64 && (point.y as u64) < self.height as u64
    }
}

/// Pixel offset, relative to whatever image it is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Logical regions of the training screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedRegion {
    /// Base stat gain number
    StatPrimary(Attribute),
    /// Bonus stat gain number shown above the base number
    StatExtra(Attribute),
    /// Support card icon (slot index 0 = top)
    SupportIcon(usize),
    /// In-game date banner
    Date,
    /// "Turns until race" counter
    TurnToRace,
}

/// The two number bands of one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRegions {
    pub primary: Region,
    pub extra: Region,
}

/// Layout of the training result numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLayout {
    /// Number bands, ordered as [`Attribute::ALL`]
    pub stats: [StatRegions; 6],
    /// Border added around each band before digit recognition
    pub ocr_border: u32,
    /// Border fill color (RGB)
    pub border_color: [u8; 3],
}

impl TrainingLayout {
    pub fn regions(&self, attribute: Attribute) -> StatRegions {
        self.stats[attribute.index()]
    }
}

impl Default for TrainingLayout {
    fn default() -> Self {
        const PRIMARY_ROWS: (u32, u32) = (800, 830);
        const EXTRA_ROWS: (u32, u32) = (760, 800);
        const COLUMNS: [(u32, u32); 6] = [
            (30, 140),
            (140, 250),
            (250, 360),
            (360, 470),
            (470, 580),
            (588, 695),
        ];

        Self {
            stats: COLUMNS.map(|cols| StatRegions {
                primary: Region::from_spans(cols, PRIMARY_ROWS),
                extra: Region::from_spans(cols, EXTRA_ROWS),
            }),
            ocr_border: 20,
            border_color: [255, 255, 255],
        }
    }
}

/// Reference colors that identify one favor level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavorRule {
    pub level: FavorLevel,
    /// Any of these colors (RGB) selects the level
    pub colors: Vec<[u8; 3]>,
}

/// Layout and color rules of the support card column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportLayout {
    /// Top-left corner of the first icon
    pub origin: Point,
    pub icon_width: u32,
    pub icon_height: u32,
    /// Vertical distance between consecutive icons
    pub stride: u32,
    pub slot_count: usize,
    /// Favor gauge probe points inside the icon, tried in order
    pub favor_probes: Vec<Point>,
    /// Favor rules in priority order, highest level first
    pub favor_rules: Vec<FavorRule>,
    /// Maximum per-channel difference for a favor color match
    pub color_tolerance: u8,
    /// Event marker probe point inside the icon
    pub event_probe: Point,
    /// Channel ranges of the event marker color
    pub event_color: ColorRange,
}

impl SupportLayout {
    /// Icon rectangle of a slot in frame coordinates
    ///
    /// The offset saturates, so a slot pushed past `u32::MAX` rows yields a
    /// region that fits no frame.
    pub fn icon_region(&self, slot: usize) -> Region {
        let slot = u32::try_from(slot).unwrap_or(u32::MAX);
        let top = self.stride.saturating_mul(slot).saturating_add(self.origin.y);
        Region::new(self.origin.x, top, self.icon_width, self.icon_height)
    }
}

impl Default for SupportLayout {
    fn default() -> Self {
        Self {
            origin: Point::new(590, 177),
            icon_width: 105,
            icon_height: 115,
            stride: 115,
            slot_count: MAX_SUPPORT_SLOTS,
            favor_probes: vec![Point::new(16, 106), Point::new(20, 106)],
            favor_rules: vec![
                FavorRule {
                    level: FavorLevel::Level4,
                    colors: vec![[255, 235, 120]],
                },
                FavorRule {
                    level: FavorLevel::Level3,
                    colors: vec![[255, 173, 30]],
                },
                FavorRule {
                    level: FavorLevel::Level2,
                    colors: vec![[162, 230, 30]],
                },
                FavorRule {
                    level: FavorLevel::Level1,
                    // Blue gauge, or grey when the gauge is still empty
                    colors: vec![[42, 192, 255], [109, 108, 117]],
                },
            ],
            color_tolerance: 10,
            event_probe: Point::new(83, 5),
            event_color: ColorRange {
                red: (250, 255),
                green: (55, 90),
                blue: (115, 150),
            },
        }
    }
}

/// Miscellaneous screen regions read by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRegions {
    pub date: Region,
    pub turn_to_race: Region,
}

impl Default for ScreenRegions {
    fn default() -> Self {
        Self {
            date: Region::from_spans((160, 280), (40, 70)),
            turn_to_race: Region::from_spans((30, 90), (70, 120)),
        }
    }
}

/// Complete calibration for one game build and resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub reference_width: u32,
    pub reference_height: u32,
    pub training: TrainingLayout,
    pub support: SupportLayout,
    pub screens: ScreenRegions,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            reference_width: REFERENCE_WIDTH,
            reference_height: REFERENCE_HEIGHT,
            training: TrainingLayout::default(),
            support: SupportLayout::default(),
            screens: ScreenRegions::default(),
        }
    }
}

impl Calibration {
    /// Shared instance of the built-in calibration
    pub fn reference() -> &'static Calibration {
        &REFERENCE
    }

    /// Parse and validate a calibration from JSON
    pub fn from_json(json: &str) -> Result<Self, CalibrationError> {
        let calibration: Calibration = serde_json::from_str(json)?;
        calibration.validate()?;
        Ok(calibration)
    }

    pub fn to_json(&self) -> Result<String, CalibrationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up the rectangle of a logical region
    ///
    /// Returns `None` for a support slot beyond `slot_count`.
    pub fn region(&self, name: NamedRegion) -> Option<Region> {
        match name {
            NamedRegion::StatPrimary(attribute) => Some(self.training.regions(attribute).primary),
            NamedRegion::StatExtra(attribute) => Some(self.training.regions(attribute).extra),
            NamedRegion::SupportIcon(slot) if slot < self.support.slot_count => {
                Some(self.support.icon_region(slot))
            }
            NamedRegion::SupportIcon(_) => None,
            NamedRegion::Date => Some(self.screens.date),
            NamedRegion::TurnToRace => Some(self.screens.turn_to_race),
        }
    }

    /// Check that every region fits the reference frame and the rule tables
    /// are well formed
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let (width, height) = (self.reference_width, self.reference_height);
        if width == 0 || height == 0 {
            return Err(CalibrationError::Invalid(
                "reference resolution must be non-zero".into(),
            ));
        }
        let slots = self.support.slot_count;
        if slots == 0 || slots > MAX_SUPPORT_SLOTS {
            return Err(CalibrationError::Invalid(format!(
                "slot_count {} outside 1..={}",
                slots, MAX_SUPPORT_SLOTS
            )));
        }

        let mut named = Vec::new();
        for attribute in Attribute::ALL {
            named.push(NamedRegion::StatPrimary(attribute));
            named.push(NamedRegion::StatExtra(attribute));
        }
        named.extend((0..self.support.slot_count).map(NamedRegion::SupportIcon));
        named.push(NamedRegion::Date);
        named.push(NamedRegion::TurnToRace);

        for name in named {
            let Some(region) = self.region(name) else {
                continue;
            };
            if region.is_empty() {
                return Err(CalibrationError::Invalid(format!("{:?} is empty", name)));
            }
            if !region.fits_within(width, height) {
                return Err(CalibrationError::Invalid(format!(
                    "{:?} {:?} exceeds {}x{}",
                    name, region, width, height
                )));
            }
        }

        self.validate_support()
    }

    fn validate_support(&self) -> Result<(), CalibrationError> {
        let support = &self.support;
        let icon = support.icon_region(0);
        if support.favor_probes.is_empty() {
            return Err(CalibrationError::Invalid("no favor probe points".into()));
        }
        for probe in support.favor_probes.iter().chain([&support.event_probe]) {
            if !icon.contains(*probe) {
                return Err(CalibrationError::Invalid(format!(
                    "probe {:?} lies outside the {}x{} icon",
                    probe, icon.width, icon.height
                )));
            }
        }

        if support.favor_rules.is_empty() {
            return Err(CalibrationError::Invalid("no favor rules".into()));
        }
        let mut previous: Option<FavorLevel> = None;
        for rule in &support.favor_rules {
            if !rule.level.is_known() {
                return Err(CalibrationError::Invalid(
                    "favor rule for Unknown level".into(),
                ));
            }
            if rule.colors.is_empty() {
                return Err(CalibrationError::Invalid(format!(
                    "favor rule {:?} has no colors",
                    rule.level
                )));
            }
            if previous.is_some_and(|p| p <= rule.level) {
                return Err(CalibrationError::Invalid(
                    "favor rules must be ordered from highest to lowest level".into(),
                ));
            }
            previous = Some(rule.level);
        }

        if !support.event_color.is_well_formed() {
            return Err(CalibrationError::Invalid(
                "event color range has min > max".into(),
            ));
        }

        Ok(())
    }
}

/// Calibration loading errors
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("Failed to parse calibration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid calibration: {0}")]
    Invalid(String),
}
