//! Game data types
//!
//! Plain values produced by the scene parser: support card slots and
//! training stat gains.

pub mod support_card;
pub mod training;

pub use support_card::{CardType, FavorLevel, SupportCardSlot};
pub use training::{Attribute, StatReading, TrainingReadings, TrainingStatDelta};
