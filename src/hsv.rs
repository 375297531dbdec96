//! 8-bit HSV conversion and range masking
//!
//! Hue is stored halved (0..=180) so that it fits a byte, saturation and
//! value span 0..=255. Division goes through fixed-point reciprocal tables
//! with 12 fractional bits, which keeps results identical to the common
//! integer implementation used by image processing libraries.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use std::sync::OnceLock;

pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

const HSV_SHIFT: u32 = 12;
const HUE_RANGE: i32 = 180;

struct DivTables {
    saturation: [i32; 256],
    hue: [i32; 256],
}

fn div_tables() -> &'static DivTables {
    static TABLES: OnceLock<DivTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut saturation = [0; 256];
        let mut hue = [0; 256];
        for (i, (s, h)) in saturation.iter_mut().zip(hue.iter_mut()).enumerate().skip(1) {
            let d = i as f64;
            *s = (f64::from(255 << HSV_SHIFT) / d).round_ties_even() as i32;
            *h = (f64::from(HUE_RANGE << HSV_SHIFT) / (6.0 * d)).round_ties_even() as i32;
        }
        DivTables { saturation, hue }
    })
}

/// Convert one RGB pixel to `[h, s, v]`
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let tables = div_tables();
    let [r, g, b] = pixel.0.map(i32::from);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let round = 1 << (HSV_SHIFT - 1);
    let s = (diff * tables.saturation[v as usize] + round) >> HSV_SHIFT;

    let h = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let mut h = (h * tables.hue[diff as usize] + round) >> HSV_SHIFT;
    if h < 0 {
        h += HUE_RANGE;
    }

    [h as u8, s as u8, v as u8]
}

pub fn to_hsv(image: &RgbImage) -> HsvImage {
    let mut hsv = HsvImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv(*src));
    }
    hsv
}

/// Binary mask: 255 where every channel lies within `lower..=upper`, else 0
pub fn in_range(hsv: &HsvImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        let pixel = hsv.get_pixel(x, y).0;
        let inside = (0..3).all(|c| lower[c] <= pixel[c] && pixel[c] <= upper[c]);
        Luma([if inside { 255 } else { 0 }])
    })
}
