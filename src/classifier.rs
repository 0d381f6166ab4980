//! Background classification
//!
//! Decides whether an image's dominant background is light or dark from its
//! mean grayscale brightness.
//!
//! Grayscale uses ITU-R BT.601 luma weights (0.299, 0.587, 0.114) in 16-bit
//! fixed point with round-to-nearest, so every pixel maps to an integer in
//! `0..=255` before averaging. Pure white maps to 255 and pure black to 0.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const LUMA_R: u32 = 19_595;
const LUMA_G: u32 = 38_470;
const LUMA_B: u32 = 7_471;
const LUMA_ROUND: u32 = 1 << 15;

/// Detected background type of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    /// Mean brightness at or above the threshold
    Light,
    /// Mean brightness below the threshold
    Dark,
}

impl BackgroundType {
    /// Pixel value written for background pixels of this type
    ///
    /// Alpha is always 0; RGB is normalized to white for light backgrounds
    /// and black for dark ones.
    #[must_use]
    pub fn sentinel(self) -> Rgba<u8> {
        match self {
            Self::Light => Rgba([255, 255, 255, 0]),
            Self::Dark => Rgba([0, 0, 0, 0]),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundType {
    type Err = crate::error::BgClearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(crate::error::BgClearError::invalid_config(format!(
                "Unknown background type '{}' (expected 'light' or 'dark')",
                other
            ))),
        }
    }
}

/// BT.601 luma of an RGB triple
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_R * u32::from(r) + LUMA_G * u32::from(g) + LUMA_B * u32::from(b);
    // Weights sum to 65536, so the shifted value never exceeds 255.
    ((weighted + LUMA_ROUND) >> 16) as u8
}

/// Arithmetic mean of per-pixel luma over the whole image
///
/// Alpha is ignored. An image without pixels has a mean of `0.0`.
#[must_use]
pub fn mean_brightness(image: &RgbaImage) -> f64 {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 {
        return 0.0;
    }

    let total: u64 = image
        .pixels()
        .map(|p| u64::from(luminance(p[0], p[1], p[2])))
        .sum();

    total as f64 / pixel_count as f64
}

/// Classify an image's background against a brightness threshold
///
/// Returns [`BackgroundType::Light`] when the mean brightness is greater than
/// or equal to `threshold`, otherwise [`BackgroundType::Dark`].
#[must_use]
pub fn classify_background(image: &RgbaImage, threshold: u8) -> BackgroundType {
    classify_brightness(mean_brightness(image), threshold)
}

/// Threshold comparison shared by [`classify_background`] and callers that
/// already computed the mean
#[must_use]
pub fn classify_brightness(mean: f64, threshold: u8) -> BackgroundType {
    if mean >= f64::from(threshold) {
        BackgroundType::Light
    } else {
        BackgroundType::Dark
    }
}
