//! Geometric edits over a [`RasterImage`].
//!
//! [`apply`] runs the steps in a fixed order:
//!
//! ```text
//! crop → rotate → flip horizontal → flip vertical → pad → background
//! ```
//!
//! Flips act on the already rotated axes, and padding and background are
//! laid out around the final orientation. Each step with nothing to do
//! passes its input through untouched.

use image::imageops;
use log::{debug, warn};
use palette::Srgb;

use crate::composite::flatten_onto;
use crate::raster::{RasterImage, RectPx};

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Snaps an arbitrary angle in degrees to the nearest quarter turn.
    pub fn from_degrees(degrees: f32) -> Self {
        let quarters = (degrees.rem_euclid(360.0) / 90.0).round() as u32 % 4;
        match quarters {
            1 => Self::Cw90,
            2 => Self::Cw180,
            3 => Self::Cw270,
            _ => Self::None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Returns true for the rotations that swap width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }
}

/// A crop rectangle in normalized `[0, 1]` coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle covering the whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Converts to pixels for an image of the given size, clamped to its bounds.
    pub fn to_pixels(&self, width: u32, height: u32) -> RectPx {
        let to_px = |v: f32, extent: u32| -> u32 {
            let px = (v * extent as f32).round();
            if px.is_nan() {
                0
            } else {
                px.clamp(0.0, extent as f32) as u32
            }
        };

        let left = to_px(self.x, width);
        let top = to_px(self.y, height);
        let right = to_px(self.x + self.width, width);
        let bottom = to_px(self.y + self.height, height);

        RectPx::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
        .intersect(&RectPx::from_size(width, height))
    }
}

/// All edits applied by [`apply`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditParameters {
    /// Opaque fill painted behind the result. `None` keeps transparency.
    pub background: Option<Srgb<u8>>,
    /// Transparent border added on every side, in pixels.
    pub padding: u32,
    pub rotation: Rotation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub crop: Option<NormalizedRect>,
}

impl EditParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if [`apply`] would return its input unchanged.
    pub fn is_identity(&self) -> bool {
        self.background.is_none()
            && self.padding == 0
            && self.rotation == Rotation::None
            && !self.flip_horizontal
            && !self.flip_vertical
            && self.crop.is_none_or(|c| c == NormalizedRect::full())
    }
}

/// Applies every edit in `params` to `image` and returns a new image.
pub fn apply(image: &RasterImage, params: &EditParameters) -> RasterImage {
    debug!(
        "applying edits to {}x{}: {:?}",
        image.width(),
        image.height(),
        params
    );

    let mut current = match params.crop {
        Some(rect) => crop(image, rect),
        None => image.clone(),
    };
    current = rotate(&current, params.rotation);
    if params.flip_horizontal {
        current = flip_horizontal(&current);
    }
    if params.flip_vertical {
        current = flip_vertical(&current);
    }
    current = pad(&current, params.padding);
    match params.background {
        Some(color) => flatten_onto(&current, color),
        None => current,
    }
}

/// Crops to a normalized rectangle. An empty clamped rectangle is a no-op.
pub fn crop(image: &RasterImage, rect: NormalizedRect) -> RasterImage {
    let px = rect.to_pixels(image.width(), image.height());
    if px.is_empty() {
        return image.clone();
    }
    if px == image.bounds() {
        return image.clone();
    }
    let view = imageops::crop_imm(image.as_rgba(), px.x, px.y, px.width, px.height);
    RasterImage::new(view.to_image())
}

pub fn rotate(image: &RasterImage, rotation: Rotation) -> RasterImage {
    let data = image.as_rgba();
    match rotation {
        Rotation::None => image.clone(),
        Rotation::Cw90 => RasterImage::new(imageops::rotate90(data)),
        Rotation::Cw180 => RasterImage::new(imageops::rotate180(data)),
        Rotation::Cw270 => RasterImage::new(imageops::rotate270(data)),
    }
}

/// Mirrors left to right.
pub fn flip_horizontal(image: &RasterImage) -> RasterImage {
    RasterImage::new(imageops::flip_horizontal(image.as_rgba()))
}

/// Mirrors top to bottom.
pub fn flip_vertical(image: &RasterImage) -> RasterImage {
    RasterImage::new(imageops::flip_vertical(image.as_rgba()))
}

/// Grows the canvas by `padding` transparent pixels on every side.
pub fn pad(image: &RasterImage, padding: u32) -> RasterImage {
    if padding == 0 {
        return image.clone();
    }
    let grow = |side: u32| padding.checked_mul(2).and_then(|extra| side.checked_add(extra));
    let (Some(width), Some(height)) = (grow(image.width()), grow(image.height())) else {
        warn!("padding {padding} overflows the canvas size, skipping");
        return image.clone();
    };
    let mut canvas = RasterImage::transparent(width, height).into_rgba();
    imageops::replace(&mut canvas, image.as_rgba(), padding as i64, padding as i64);
    RasterImage::new(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// 3x2 image where every pixel is distinct.
    fn sample() -> RasterImage {
        let mut img = RgbaImage::new(3, 2);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 60) as u8, (y * 100) as u8, 7, 200 + x as u8]);
        }
        RasterImage::new(img)
    }

    #[test]
    fn four_quarter_turns_is_identity() {
        let img = sample();
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate(&out, Rotation::Cw90);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let out = rotate(&sample(), Rotation::Cw90);
        assert_eq!((out.width(), out.height()), (2, 3));
        // Top-left of a clockwise turn is the old bottom-left.
        assert_eq!(out.pixel(0, 0), sample().pixel(0, 1));
    }

    #[test]
    fn double_flips_are_identity() {
        let img = sample();
        assert_eq!(flip_horizontal(&flip_horizontal(&img)), img);
        assert_eq!(flip_vertical(&flip_vertical(&img)), img);
        assert_ne!(flip_horizontal(&img), img);
    }

    #[test]
    fn full_crop_is_identity() {
        let img = sample();
        assert_eq!(crop(&img, NormalizedRect::full()), img);
    }

    #[test]
    fn crop_uses_pixel_dimensions() {
        let img = RasterImage::transparent(200, 100);
        let out = crop(&img, NormalizedRect::new(0.25, 0.5, 0.5, 0.5));
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn crop_is_clamped_to_bounds() {
        let img = RasterImage::transparent(10, 10);
        let out = crop(&img, NormalizedRect::new(0.5, -0.5, 1.0, 1.0));
        assert_eq!((out.width(), out.height()), (5, 5));
    }

    #[test]
    fn empty_crop_is_noop() {
        let img = sample();
        assert_eq!(crop(&img, NormalizedRect::new(2.0, 2.0, 0.5, 0.5)), img);
        assert_eq!(crop(&img, NormalizedRect::new(0.2, 0.2, 0.0, 0.5)), img);
    }

    #[test]
    fn crop_runs_before_rotation() {
        // 4x2: cropping the left half first leaves a 2x2 square, rotating
        // first would have left a 1x4 strip.
        let mut img = RgbaImage::new(4, 2);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgba([(x * 50) as u8, (y * 100) as u8, 0, 255]);
        }
        let img = RasterImage::new(img);
        let params = EditParameters {
            crop: Some(NormalizedRect::new(0.0, 0.0, 0.5, 1.0)),
            rotation: Rotation::Cw90,
            ..Default::default()
        };

        let out = apply(&img, &params);
        assert_eq!((out.width(), out.height()), (2, 2));
        let cropped = crop(&img, NormalizedRect::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(out, rotate(&cropped, Rotation::Cw90));
        // Clockwise: new top-left is the cropped bottom-left.
        assert_eq!(out.pixel(0, 0), img.pixel(0, 1));
        assert_eq!(out.pixel(1, 0), img.pixel(0, 0));
    }

    #[test]
    fn oversized_padding_is_skipped() {
        let img = sample();
        assert_eq!(pad(&img, u32::MAX), img);
    }

    #[test]
    fn padding_centers_content() {
        let img = RasterImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let out = pad(&img, 3);
        assert_eq!((out.width(), out.height()), (8, 8));
        assert_eq!(out.pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(out.pixel(3, 3), Rgba([1, 2, 3, 255]));
        assert_eq!(out.pixel(4, 4), Rgba([1, 2, 3, 255]));
        assert_eq!(out.pixel(5, 5), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn background_fills_padding() {
        let img = RasterImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let params = EditParameters {
            padding: 1,
            background: Some(Srgb::new(255, 0, 0)),
            ..EditParameters::default()
        };
        let out = apply(&img, &params);
        assert!(!out.has_alpha());
        assert_eq!(out.pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(out.pixel(1, 1), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn flips_follow_rotation() {
        // Rotating first then flipping horizontally is a transpose.
        let img = sample();
        let params = EditParameters {
            rotation: Rotation::Cw90,
            flip_horizontal: true,
            ..EditParameters::default()
        };
        let out = apply(&img, &params);
        for y in 0..out.height() {
            for x in 0..out.width() {
                assert_eq!(out.pixel(x, y), img.pixel(y, x));
            }
        }
    }

    #[test]
    fn default_parameters_pass_through() {
        let img = sample();
        let params = EditParameters::new();
        assert!(params.is_identity());
        assert_eq!(apply(&img, &params), img);
    }

    #[test]
    fn rotation_snaps_to_quarter_turns() {
        assert_eq!(Rotation::from_degrees(90.0), Rotation::Cw90);
        assert_eq!(Rotation::from_degrees(-90.0), Rotation::Cw270);
        assert_eq!(Rotation::from_degrees(359.0), Rotation::None);
        assert_eq!(Rotation::from_degrees(540.0), Rotation::Cw180);
        assert!(Rotation::Cw270.swaps_axes());
    }
}
