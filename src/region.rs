//! Geometry of the bottom-centered analysis region

use image::RgbImage;
use serde::Serialize;

/// Signed quadrant geometry derived from the image size and scale factor.
/// The start coordinates may fall outside the image for large or negative
/// scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    pub height: i64,
    pub width: i64,
    pub y_start: i64,
    pub x_start: i64,
}

impl Quadrant {
    pub fn new(image_width: u32, image_height: u32, scale_factor: f64) -> Self {
        let image_width = i64::from(image_width);
        let image_height = i64::from(image_height);

        // Past three times the image size every slice bound already sits on
        // an edge, so clamping there leaves the resolved region unchanged
        let side = |dim: i64| {
            let span = (dim as f64 * scale_factor * 2.0).trunc() as i64;
            span.clamp(-3 * dim, 3 * dim)
        };
        let height = side(image_height);
        let width = side(image_width);

        Self {
            height,
            width,
            y_start: image_height - height,
            x_start: (image_width - width).div_euclid(2),
        }
    }

    /// Resolve the quadrant against the image as rows `[y_start..]` and
    /// columns `[x_start..x_start + width]`.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> RegionBounds {
        let (y0, y1) = slice_range(self.y_start, None, image_height);
        let (x0, x1) = slice_range(self.x_start, Some(self.x_start + self.width), image_width);

        RegionBounds {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// The part of the image actually analysed
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RegionBounds {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Turn a `start..stop` pair into a concrete range over `len` elements.
/// Negative bounds count back from the end, then everything is clamped to
/// `0..=len`. A stop at or before the start gives an empty range.
fn slice_range(start: i64, stop: Option<i64>, len: u32) -> (u32, u32) {
    let len = i64::from(len);
    let clamp = |index: i64| {
        if index < 0 {
            (index + len).max(0)
        } else {
            index.min(len)
        }
    };

    let start = clamp(start);
    let stop = stop.map_or(len, clamp).max(start);

    // Both ends are within 0..=len, which came from a u32
    (start as u32, stop as u32)
}

/// Copy the bottom region out of the image
pub fn crop(image: &RgbImage, bounds: RegionBounds) -> RgbImage {
    image::imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_quadrant_quarter_scale() {
        let quadrant = Quadrant::new(200, 100, 0.25);
        assert_eq!(
            quadrant,
            Quadrant {
                height: 50,
                width: 100,
                y_start: 50,
                x_start: 50,
            }
        );

        let bounds = quadrant.resolve(200, 100);
        assert_eq!(
            bounds,
            RegionBounds {
                x: 50,
                y: 50,
                width: 100,
                height: 50,
            }
        );
    }

    #[test]
    fn test_quadrant_truncates_toward_zero() {
        // 101 * 0.1 * 2 = 20.2, 33 * 0.1 * 2 = 6.6
        let quadrant = Quadrant::new(33, 101, 0.1);
        assert_eq!(quadrant.height, 20);
        assert_eq!(quadrant.width, 6);
        assert_eq!(quadrant.y_start, 81);
        assert_eq!(quadrant.x_start, 13);
    }

    #[test]
    fn test_odd_margin_rounds_down() {
        let quadrant = Quadrant::new(11, 10, 0.25);
        assert_eq!(quadrant.width, 5);
        assert_eq!(quadrant.x_start, 3);
        assert_eq!(quadrant.resolve(11, 10).width, 5);
    }

    #[test]
    fn test_half_scale_covers_whole_image() {
        let bounds = Quadrant::new(64, 48, 0.5).resolve(64, 48);
        assert_eq!(
            bounds,
            RegionBounds {
                x: 0,
                y: 0,
                width: 64,
                height: 48,
            }
        );
    }

    #[test]
    fn test_oversized_scale_wraps_negative_starts() {
        // height 100 * 0.75 * 2 = 150 -> y_start = -50 -> row 50
        // width 200 * 0.75 * 2 = 300 -> x_start = -50 -> column 150, stop 250 -> 200
        let quadrant = Quadrant::new(200, 100, 0.75);
        assert_eq!(quadrant.y_start, -50);
        assert_eq!(quadrant.x_start, -50);

        let bounds = quadrant.resolve(200, 100);
        assert_eq!(
            bounds,
            RegionBounds {
                x: 150,
                y: 50,
                width: 50,
                height: 50,
            }
        );
    }

    #[test]
    fn test_far_oversized_scale_clamps_to_zero() {
        // 100 * 2 * 2 = 400 -> y_start = -300 -> clamped to 0
        // x_start = (200 - 800) / 2 = -300 -> 0, stop 500 -> 200
        let bounds = Quadrant::new(200, 100, 2.0).resolve(200, 100);
        assert_eq!(
            bounds,
            RegionBounds {
                x: 0,
                y: 0,
                width: 200,
                height: 100,
            }
        );
    }

    #[test]
    fn test_huge_scale_factors_saturate() {
        let quadrant = Quadrant::new(200, 100, 1e300);
        assert_eq!(quadrant.height, 300);
        assert_eq!(quadrant.width, 600);
        assert_eq!(
            quadrant.resolve(200, 100),
            Quadrant::new(200, 100, 2.0).resolve(200, 100)
        );
        assert_eq!(
            quadrant.resolve(200, 100),
            RegionBounds {
                x: 0,
                y: 0,
                width: 200,
                height: 100,
            }
        );

        let quadrant = Quadrant::new(200, 100, -1e300);
        assert_eq!(quadrant.height, -300);
        assert_eq!(quadrant.width, -600);
        assert!(quadrant.resolve(200, 100).is_empty());
    }

    #[test]
    fn test_clamp_matches_unclamped_geometry() {
        // Reference computed without clamping, for spans that fit in i64
        let reference = |width: u32, height: u32, scale: f64| {
            let (w, h) = (i64::from(width), i64::from(height));
            let span_h = (h as f64 * scale * 2.0).trunc() as i64;
            let span_w = (w as f64 * scale * 2.0).trunc() as i64;
            let x_start = (w - span_w).div_euclid(2);
            let (y0, y1) = slice_range(h - span_h, None, height);
            let (x0, x1) = slice_range(x_start, Some(x_start + span_w), width);
            (x0, y0, x1 - x0, y1 - y0)
        };

        for (width, height) in [(1, 1), (7, 3), (200, 100), (33, 101)] {
            for scale in [-40.0, -2.5, -1.0, -0.6, 0.75, 1.2, 1.5, 1.6, 2.0, 3.3, 40.0] {
                let bounds = Quadrant::new(width, height, scale).resolve(width, height);
                assert_eq!(
                    (bounds.x, bounds.y, bounds.width, bounds.height),
                    reference(width, height, scale),
                    "{width}x{height} at {scale}"
                );
            }
        }
    }

    #[test]
    fn test_non_positive_scale_is_empty() {
        assert!(Quadrant::new(200, 100, 0.0).resolve(200, 100).is_empty());
        assert!(Quadrant::new(200, 100, -0.1).resolve(200, 100).is_empty());
        // Too small to cover a single row
        assert!(Quadrant::new(200, 100, 0.001).resolve(200, 100).is_empty());
    }

    #[test]
    fn test_in_range_scale_stays_in_bounds() {
        for (width, height) in [(1, 1), (3, 7), (200, 100), (641, 479)] {
            for step in 1..50 {
                let scale = f64::from(step) / 100.0;
                let quadrant = Quadrant::new(width, height, scale);
                assert!(quadrant.height >= 0 && quadrant.width >= 0);

                let bounds = quadrant.resolve(width, height);
                assert!(bounds.x + bounds.width <= width);
                assert!(bounds.y + bounds.height <= height);
                assert_eq!(bounds.y + bounds.height, height, "anchored to the bottom");

                if quadrant.height > 0 && quadrant.width > 0 {
                    assert!(!bounds.is_empty());
                    assert_eq!(i64::from(bounds.height), quadrant.height);
                    assert_eq!(i64::from(bounds.width), quadrant.width);
                }
            }
        }
    }

    #[test]
    fn test_crop_copies_region_pixels() {
        let image = RgbImage::from_fn(4, 4, |x, y| Rgb([x as u8, y as u8, 0]));
        let bounds = RegionBounds {
            x: 1,
            y: 2,
            width: 2,
            height: 2,
        };
        let region = crop(&image, bounds);

        assert_eq!(region.dimensions(), (2, 2));
        assert_eq!(region.get_pixel(0, 0), &Rgb([1, 2, 0]));
        assert_eq!(region.get_pixel(1, 1), &Rgb([2, 3, 0]));
    }
}
