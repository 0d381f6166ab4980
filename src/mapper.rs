//! Per-pixel transparency mapping
//!
//! Each pixel is tested on its own against the reference color of the
//! detected background: distance from pure white for light backgrounds,
//! average brightness for dark ones. Matching pixels are replaced by the
//! background's transparent sentinel; everything else passes through
//! untouched, including its original alpha.

use crate::classifier::BackgroundType;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Largest meaningful light tolerance: three channels each 255 away from white
pub const MAX_LIGHT_TOLERANCE: u16 = 765;

/// Color tolerances for both background types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Maximum summed channel distance from white (0-765)
    pub light: u16,
    /// Maximum average channel brightness (0-255)
    pub dark: u8,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            light: 200,
            dark: 50,
        }
    }
}

impl Tolerances {
    #[must_use]
    pub fn new(light: u16, dark: u8) -> Self {
        Self { light, dark }
    }

    /// Whether `pixel` counts as background for the given background type
    #[must_use]
    pub fn is_background(&self, pixel: &Rgba<u8>, background: BackgroundType) -> bool {
        match background {
            BackgroundType::Light => light_distance(pixel) <= self.light,
            // (r + g + b) / 3 <= tol, kept in integers to avoid rounding
            BackgroundType::Dark => channel_sum(pixel) <= 3 * u16::from(self.dark),
        }
    }
}

/// Summed absolute channel distance from pure white, alpha ignored
#[must_use]
pub fn light_distance(pixel: &Rgba<u8>) -> u16 {
    pixel.0.iter().take(3).map(|&c| u16::from(255 - c)).sum()
}

/// Average of the RGB channels, alpha ignored
#[must_use]
pub fn dark_brightness(pixel: &Rgba<u8>) -> f64 {
    f64::from(channel_sum(pixel)) / 3.0
}

fn channel_sum(pixel: &Rgba<u8>) -> u16 {
    pixel.0.iter().take(3).map(|&c| u16::from(c)).sum()
}

/// Pixel counts from a mapping pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStats {
    pub total_pixels: u64,
    pub transparent_pixels: u64,
}

impl MappingStats {
    /// Fraction of pixels made transparent, `0.0` for an empty image
    #[must_use]
    pub fn transparent_ratio(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.transparent_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// Produce a new image with background pixels made transparent
///
/// The output has the input's dimensions and pixel order. Pixels that are
/// already transparent are re-evaluated like any other and may have their
/// RGB normalized to the sentinel color.
#[must_use]
pub fn apply_transparency(
    image: &RgbaImage,
    background: BackgroundType,
    tolerances: Tolerances,
) -> RgbaImage {
    let mut output = image.clone();
    apply_transparency_in_place(&mut output, background, tolerances);
    output
}

/// In-place variant of [`apply_transparency`]
///
/// Returns counts of total and rewritten pixels.
pub fn apply_transparency_in_place(
    image: &mut RgbaImage,
    background: BackgroundType,
    tolerances: Tolerances,
) -> MappingStats {
    let sentinel = background.sentinel();
    let mut stats = MappingStats::default();

    for pixel in image.pixels_mut() {
        stats.total_pixels += 1;
        if tolerances.is_background(pixel, background) {
            *pixel = sentinel;
            stats.transparent_pixels += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(r: u8, g: u8, b: u8) -> Rgba<u8> {
        Rgba([r, g, b, 255])
    }

    #[test]
    fn test_light_distance() {
        assert_eq!(light_distance(&opaque(255, 255, 255)), 0);
        assert_eq!(light_distance(&opaque(254, 255, 255)), 1);
        assert_eq!(light_distance(&opaque(0, 0, 0)), MAX_LIGHT_TOLERANCE);
        assert_eq!(light_distance(&Rgba([200, 210, 220, 0])), 55 + 45 + 35);
    }

    #[test]
    fn test_dark_brightness() {
        assert_eq!(dark_brightness(&opaque(20, 20, 20)), 20.0);
        assert_eq!(dark_brightness(&opaque(0, 0, 1)), 1.0 / 3.0);
    }

    #[test]
    fn test_zero_light_tolerance_only_exact_white() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, opaque(255, 255, 255));
        image.put_pixel(1, 0, opaque(254, 255, 255));

        let out = apply_transparency(&image, BackgroundType::Light, Tolerances::new(0, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
        assert_eq!(*out.get_pixel(1, 0), opaque(254, 255, 255));
    }

    #[test]
    fn test_max_light_tolerance_clears_everything() {
        let mut image = RgbaImage::new(3, 1);
        image.put_pixel(0, 0, opaque(0, 0, 0));
        image.put_pixel(1, 0, opaque(255, 0, 128));
        image.put_pixel(2, 0, Rgba([12, 34, 56, 78]));

        let out = apply_transparency(
            &image,
            BackgroundType::Light,
            Tolerances::new(MAX_LIGHT_TOLERANCE, 0),
        );
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 0])));
    }

    #[test]
    fn test_zero_dark_tolerance_only_exact_black() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, opaque(0, 0, 0));
        image.put_pixel(1, 0, opaque(0, 0, 1));

        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::new(200, 0));
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), opaque(0, 0, 1));
    }

    #[test]
    fn test_max_dark_tolerance_clears_everything() {
        let image = RgbaImage::from_pixel(2, 2, opaque(255, 255, 255));
        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::new(0, 255));
        assert!(out.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_dark_gray_pixel_with_default_tolerance() {
        let image = RgbaImage::from_pixel(1, 1, opaque(20, 20, 20));
        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::default());
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_dark_boundary_uses_exact_average() {
        // (50 + 50 + 51) / 3 = 50.33 > 50
        let image = RgbaImage::from_pixel(1, 1, opaque(50, 50, 51));
        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::new(0, 50));
        assert_eq!(*out.get_pixel(0, 0), opaque(50, 50, 51));

        let image = RgbaImage::from_pixel(1, 1, opaque(49, 50, 51));
        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::new(0, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_foreground_keeps_original_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([10, 200, 30, 77]));
        let out = apply_transparency(&image, BackgroundType::Light, Tolerances::default());
        assert_eq!(*out.get_pixel(0, 0), Rgba([10, 200, 30, 77]));
    }

    #[test]
    fn test_transparent_input_is_normalized() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([250, 250, 250, 0]));
        let out = apply_transparency(&image, BackgroundType::Light, Tolerances::default());
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
    }

    #[test]
    fn test_light_scenario_from_two_pixels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, opaque(255, 255, 255));
        image.put_pixel(1, 0, opaque(10, 10, 10));

        let out = apply_transparency(&image, BackgroundType::Light, Tolerances::new(10, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 0]));
        assert_eq!(*out.get_pixel(1, 0), opaque(10, 10, 10));
    }

    #[test]
    fn test_shape_and_order_preserved() {
        let image = RgbaImage::from_fn(7, 5, |x, y| opaque((x * 30) as u8, (y * 50) as u8, 90));
        let out = apply_transparency(&image, BackgroundType::Dark, Tolerances::new(0, 40));

        assert_eq!(out.dimensions(), image.dimensions());
        for (x, y, pixel) in image.enumerate_pixels() {
            let mapped = out.get_pixel(x, y);
            if mapped[3] == 0 && pixel[3] != 0 {
                assert_eq!(*mapped, Rgba([0, 0, 0, 0]));
            } else {
                assert_eq!(mapped, pixel);
            }
        }
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let image = RgbaImage::from_fn(16, 16, |x, y| opaque((x * 16) as u8, (y * 16) as u8, 200));
        let tol = Tolerances::new(120, 60);
        let first = apply_transparency(&image, BackgroundType::Light, tol);
        let second = apply_transparency(&image, BackgroundType::Light, tol);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_in_place_stats() {
        let mut image = RgbaImage::from_pixel(4, 1, opaque(255, 255, 255));
        image.put_pixel(3, 0, opaque(0, 0, 0));

        let stats =
            apply_transparency_in_place(&mut image, BackgroundType::Light, Tolerances::default());
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.transparent_pixels, 3);
        assert!((stats.transparent_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(MappingStats::default().transparent_ratio(), 0.0);
    }
}
