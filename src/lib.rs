//! Decide whether a watermark laid over the bottom of an image should be
//! white or black.

pub mod config;
pub mod decision;
pub mod error;
pub mod hsv;
pub mod region;

pub use config::{BrightnessChannels, DecisionConfig};
pub use decision::{analyze, decide, Analysis, Tone};
pub use error::ToneError;
