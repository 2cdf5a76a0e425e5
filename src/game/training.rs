//! Training result values
//!
//! After a training is selected the game previews how much each attribute
//! will grow. The preview is split into a base number and a bonus number
//! shown above it; both are captured here.

use serde::{Deserialize, Serialize};

/// Trainable attributes, in on-screen order (left to right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Speed,
    Stamina,
    Power,
    Will,
    Intelligence,
    SkillPoints,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Speed,
        Attribute::Stamina,
        Attribute::Power,
        Attribute::Will,
        Attribute::Intelligence,
        Attribute::SkillPoints,
    ];

    /// Position of this attribute in [`Attribute::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Attribute::Speed => 0,
            Attribute::Stamina => 1,
            Attribute::Power => 2,
            Attribute::Will => 3,
            Attribute::Intelligence => 4,
            Attribute::SkillPoints => 5,
        }
    }
}

/// Stat gains of one training, one value per attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStatDelta {
    pub speed: u32,
    pub stamina: u32,
    pub power: u32,
    pub will: u32,
    pub intelligence: u32,
    pub skill_points: u32,
}

impl TrainingStatDelta {
    /// Build from values ordered as [`Attribute::ALL`]
    pub fn from_array(values: [u32; 6]) -> Self {
        let [speed, stamina, power, will, intelligence, skill_points] = values;
        Self {
            speed,
            stamina,
            power,
            will,
            intelligence,
            skill_points,
        }
    }

    /// Values ordered as [`Attribute::ALL`]
    pub fn to_array(&self) -> [u32; 6] {
        [
            self.speed,
            self.stamina,
            self.power,
            self.will,
            self.intelligence,
            self.skill_points,
        ]
    }

    pub fn get(&self, attribute: Attribute) -> u32 {
        self.to_array()[attribute.index()]
    }
}

/// Raw readings of one attribute's two number bands
///
/// `None` means the band held no readable digits, `Some(0)` means a zero
/// was actually read. Both count as zero in the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatReading {
    pub primary: Option<u32>,
    pub extra: Option<u32>,
}

impl StatReading {
    /// Base plus bonus, saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.primary
            .unwrap_or(0)
            .saturating_add(self.extra.unwrap_or(0))
    }

    /// Whether neither band produced any digits
    pub fn is_blank(&self) -> bool {
        self.primary.is_none() && self.extra.is_none()
    }
}

/// Readings of all six attributes, ordered as [`Attribute::ALL`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReadings {
    pub readings: [StatReading; 6],
}

impl TrainingReadings {
    pub fn get(&self, attribute: Attribute) -> StatReading {
        self.readings[attribute.index()]
    }

    /// Collapse the readings into final per-attribute gains
    pub fn total(&self) -> TrainingStatDelta {
        TrainingStatDelta::from_array(self.readings.map(|r| r.total()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_index_matches_order() {
        for (i, attribute) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), i);
        }
    }

    #[test]
    fn test_stat_reading_total() {
        let reading = StatReading {
            primary: Some(12),
            extra: None,
        };
        assert_eq!(reading.total(), 12);
        assert!(!reading.is_blank());

        let blank = StatReading::default();
        assert_eq!(blank.total(), 0);
        assert!(blank.is_blank());

        let zero = StatReading {
            primary: Some(0),
            extra: None,
        };
        assert_eq!(zero.total(), 0);
        assert!(!zero.is_blank());
    }

    #[test]
    fn test_readings_collapse_to_delta() {
        let mut readings = TrainingReadings::default();
        readings.readings[Attribute::Power.index()] = StatReading {
            primary: Some(9),
            extra: Some(4),
        };
        readings.readings[Attribute::SkillPoints.index()] = StatReading {
            primary: Some(5),
            extra: None,
        };

        let delta = readings.total();
        assert_eq!(delta.power, 13);
        assert_eq!(delta.skill_points, 5);
        assert_eq!(delta.get(Attribute::Power), 13);
        assert_eq!(delta.to_array(), [0, 0, 13, 0, 0, 5]);
    }

    #[test]
    fn test_stat_reading_total_saturates() {
        let reading = StatReading {
            primary: Some(4_000_000_000),
            extra: Some(4_000_000_000),
        };
        assert_eq!(reading.total(), u32::MAX);
    }
}
