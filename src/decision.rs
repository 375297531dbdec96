use crate::config::{BrightnessChannels, DecisionConfig};
use crate::error::ToneError;
use crate::hsv;
use crate::region::{self, Quadrant, RegionBounds};
use image::{GrayImage, RgbImage};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Watermark color chosen for the bottom region
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    #[serde(rename = "blanco")]
    White,
    #[serde(rename = "negro")]
    Black,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::White => "blanco",
            Tone::Black => "negro",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything measured while deciding the tone of one image
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    pub decision: Tone,
    /// Mean intensity of the bottom region
    pub brightness: f64,
    /// Mean of the color mask (0..=255)
    pub color_luminosity: f64,
    pub color_luminosity_mean: f64,
    pub color_luminosity_std: f64,
    pub color_threshold: f64,
    pub region: RegionBounds,
}

impl Analysis {
    /// The `<decision> <brightness>` result line
    pub fn summary(&self) -> String {
        // Debug formatting keeps the decimal point on whole numbers (0.0, 255.0)
        format!("{} {:?}", self.decision, self.brightness)
    }
}

/// Load the image at `path` and decide the watermark tone for its bottom
/// region.
pub fn decide(
    path: &Path,
    scale_factor: f64,
    config: &DecisionConfig,
) -> Result<Analysis, ToneError> {
    let image = load_image(path)?;
    analyze(&image, scale_factor, config)
}

/// Decode any supported format into an 8-bit, 3-channel buffer
pub fn load_image(path: &Path) -> Result<RgbImage, ToneError> {
    let image = image::open(path).map_err(|source| ToneError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(ToneError::EmptyImage(path.to_path_buf()));
    }

    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(image.to_rgb8())
}

pub fn analyze(
    image: &RgbImage,
    scale_factor: f64,
    config: &DecisionConfig,
) -> Result<Analysis, ToneError> {
    let (width, height) = image.dimensions();

    let quadrant = Quadrant::new(width, height, scale_factor);
    if quadrant.height > i64::from(height) || quadrant.width > i64::from(width) {
        warn!(
            "Scale factor {} yields a {}x{} quadrant larger than the {}x{} image",
            scale_factor, quadrant.width, quadrant.height, width, height
        );
    }

    let bounds = quadrant.resolve(width, height);
    debug!("Quadrant {:?} resolved to {:?}", quadrant, bounds);
    if bounds.is_empty() {
        return Err(ToneError::EmptyRegion(scale_factor));
    }

    let bottom = region::crop(image, bounds);

    let hsv = hsv::to_hsv(&bottom);
    let mask = hsv::in_range(&hsv, config.hsv_lower, config.hsv_upper);
    let color_luminosity = mask_mean(&mask);

    // Statistics over the single aggregate value: mean equals the value and
    // the deviation is zero
    let color_luminosity_mean = mean(&[color_luminosity]);
    let color_luminosity_std = std_dev(&[color_luminosity]);
    let color_threshold = color_luminosity_mean + config.std_multiplier * color_luminosity_std;

    let brightness = region_brightness(&bottom, config.brightness_channels);

    let decision = if brightness <= config.brightness_threshold
        && color_luminosity_mean <= color_threshold
    {
        Tone::White
    } else {
        Tone::Black
    };

    debug!(
        "color luminosity {:.3} (threshold {:.3}), brightness {:.3} -> {}",
        color_luminosity, color_threshold, brightness, decision
    );

    Ok(Analysis {
        decision,
        brightness,
        color_luminosity,
        color_luminosity_mean,
        color_luminosity_std,
        color_threshold,
        region: bounds,
    })
}

fn mask_mean(mask: &GrayImage) -> f64 {
    let sum: u64 = mask.as_raw().iter().map(|&v| u64::from(v)).sum();
    sum as f64 / mask.as_raw().len() as f64
}

/// Mean intensity of a non-empty region
pub fn region_brightness(region: &RgbImage, channels: BrightnessChannels) -> f64 {
    match channels {
        BrightnessChannels::All => {
            let sum: u64 = region.as_raw().iter().map(|&v| u64::from(v)).sum();
            sum as f64 / region.as_raw().len() as f64
        }
        BrightnessChannels::Blue => {
            let sum: u64 = region.pixels().map(|p| u64::from(p.0[2])).sum();
            sum as f64 / (u64::from(region.width()) * u64::from(region.height())) as f64
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
fn std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
