//! Tunable constants of the watermark tone decision
//!
//! The defaults reproduce the stock behavior: a reddish/skin-tone HSV range,
//! a mid-gray brightness cut at 127 and a dynamic color threshold of
//! mean + 2 standard deviations. A JSON file may override any subset.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which channels contribute to the bottom region brightness
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessChannels {
    /// Mean over every channel of every pixel
    #[default]
    All,
    /// Mean of the blue channel only
    Blue,
}

/// Parameters of the decision procedure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DecisionConfig {
    /// Inclusive lower HSV bound of the color mask (hue is 0..=180)
    pub hsv_lower: [u8; 3],

    /// Inclusive upper HSV bound of the color mask
    pub hsv_upper: [u8; 3],

    /// Regions at or below this mean brightness count as dark
    pub brightness_threshold: f64,

    /// Multiplier applied to the color luminosity standard deviation
    pub std_multiplier: f64,

    pub brightness_channels: BrightnessChannels,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            hsv_lower: [0, 50, 50],
            hsv_upper: [20, 255, 255],
            brightness_threshold: 127.0,
            std_multiplier: 2.0,
            brightness_channels: BrightnessChannels::All,
        }
    }
}

impl DecisionConfig {
    /// Load a configuration from a JSON file. Missing fields keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        const CHANNELS: [&str; 3] = ["hue", "saturation", "value"];

        for (i, name) in CHANNELS.iter().enumerate() {
            if self.hsv_lower[i] > self.hsv_upper[i] {
                anyhow::bail!(
                    "Lower {} bound {} is above upper bound {}",
                    name,
                    self.hsv_lower[i],
                    self.hsv_upper[i]
                );
            }
        }

        if !self.brightness_threshold.is_finite() {
            anyhow::bail!("brightness_threshold must be a finite number");
        }
        if !self.std_multiplier.is_finite() {
            anyhow::bail!("std_multiplier must be a finite number");
        }

        Ok(())
    }
}
