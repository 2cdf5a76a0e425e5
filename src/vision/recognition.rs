//! Support card recognition
//!
//! Classifies the support cards shown in the column next to the training
//! buttons. Three independent heuristics run per slot: favor gauge color,
//! event marker color and card type icon.

use std::collections::HashMap;

use image::{Rgb, RgbImage};

use super::color::FavorPalette;
use super::matcher::{Template, TemplateMatcher};
use super::region::crop;
use super::{Frame, VisionError};
use crate::config::calibration::{Point, SupportLayout};
use crate::game::support_card::{CardType, FavorLevel, SupportCardSlot};

/// Reference icons for card type matching
#[derive(Debug, Clone, Default)]
pub struct CardTemplates {
    templates: HashMap<CardType, Template>,
}

impl CardTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the template of a card type, replacing any previous one
    pub fn insert(&mut self, card_type: CardType, template: Template) {
        if card_type == CardType::Unknown {
            log::warn!("Ignoring template '{}' for Unknown card type", template.name);
            return;
        }
        self.templates.insert(card_type, template);
    }

    pub fn with(mut self, card_type: CardType, template: Template) -> Self {
        self.insert(card_type, template);
        self
    }

    pub fn get(&self, card_type: CardType) -> Option<&Template> {
        self.templates.get(&card_type)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in matching priority order
    pub fn by_priority(&self) -> impl Iterator<Item = (CardType, &Template)> {
        CardType::MATCH_PRIORITY
            .into_iter()
            .filter_map(|card_type| self.get(card_type).map(|t| (card_type, t)))
    }
}

/// Classifies the support card slots of a training screen
pub struct SupportCardClassifier<M> {
    layout: SupportLayout,
    palette: FavorPalette,
    templates: CardTemplates,
    matcher: M,
}

impl<M: TemplateMatcher> SupportCardClassifier<M> {
    pub fn new(layout: SupportLayout, templates: CardTemplates, matcher: M) -> Self {
        let palette = FavorPalette::new(&layout.favor_rules, layout.color_tolerance);
        if templates.len() < CardType::MATCH_PRIORITY.len() {
            log::warn!(
                "Only {} of {} card type templates loaded",
                templates.len(),
                CardType::MATCH_PRIORITY.len()
            );
        }

        Self {
            layout,
            palette,
            templates,
            matcher,
        }
    }

    /// Recognize all support cards in the frame, top to bottom
    ///
    /// Slots whose favor gauge can't be read are treated as empty and left
    /// out, so the result index does not correspond to the slot position.
    pub fn classify(&self, frame: &Frame) -> Result<Vec<SupportCardSlot>, VisionError> {
        let mut cards = Vec::new();

        for position in 0..self.layout.slot_count {
            let icon = crop(frame, self.layout.icon_region(position))?;
            if let Some(card) = self.classify_icon(&icon, position) {
                cards.push(card);
            }
        }

        log::debug!("Recognized {} support cards", cards.len());
        Ok(cards)
    }

    /// Classify a single cropped icon, `None` if the slot looks empty
    pub fn classify_icon(&self, icon: &RgbImage, position: usize) -> Option<SupportCardSlot> {
        let favor = self.detect_favor(icon);
        if !favor.is_known() {
            log::trace!("Slot {}: no favor gauge, skipping", position);
            return None;
        }

        let has_event = self.detect_event(icon);
        let card_type = self.detect_type(icon);
        log::debug!(
            "Slot {}: {:?} {:?} event={}",
            position,
            card_type,
            favor,
            has_event
        );

        Some(SupportCardSlot::new(card_type, favor, has_event, position))
    }

    /// Read the favor gauge, trying each probe point until one resolves
    pub fn detect_favor(&self, icon: &RgbImage) -> FavorLevel {
        self.layout
            .favor_probes
            .iter()
            .filter_map(|&probe| probe_pixel(icon, probe))
            .map(|pixel| self.palette.classify(&pixel))
            .find(FavorLevel::is_known)
            .unwrap_or(FavorLevel::Unknown)
    }

    /// Check the event marker pixel
    pub fn detect_event(&self, icon: &RgbImage) -> bool {
        probe_pixel(icon, self.layout.event_probe)
            .is_some_and(|pixel| self.layout.event_color.contains(&pixel))
    }

    /// Match the icon against the type templates in priority order
    pub fn detect_type(&self, icon: &RgbImage) -> CardType {
        let gray = image::imageops::grayscale(icon);
        self.templates
            .by_priority()
            .find(|(_, template)| self.matcher.match_template(&gray, template).found)
            .map_or(CardType::Unknown, |(card_type, _)| card_type)
    }
}

fn probe_pixel(icon: &RgbImage, probe: Point) -> Option<Rgb<u8>> {
    icon.get_pixel_checked(probe.x, probe.y).copied()
}
