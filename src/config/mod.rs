//! Configuration module
//!
//! Holds the screen calibration: crop rectangles, probe points, reference
//! colors and thresholds.

pub mod calibration;

pub use calibration::{Calibration, CalibrationError, NamedRegion, Point, Region};
