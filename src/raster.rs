//! The owned pixel buffer every pipeline stage consumes and produces.
//!
//! All dimensions in this crate are device pixels. Logical/point sizes
//! belong to the UI layer and never reach these types.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// A rectangle defined in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the image
    pub x: u32,
    /// Y offset from the top edge of the image
    pub y: u32,
    /// Width of the rectangle
    pub width: u32,
    /// Height of the rectangle
    pub height: u32,
}

impl RectPx {
    /// Creates a new rectangle with the given position and dimensions.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Creates a rectangle starting at origin (0, 0) with the given dimensions.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Returns true if the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersects two rectangles. Disjoint rectangles yield an empty one.
    pub fn intersect(&self, other: &RectPx) -> RectPx {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        RectPx::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// An RGBA raster with 8-bit channels.
///
/// Every transform takes a `&RasterImage` and returns a freshly allocated
/// one; nothing in the crate mutates an image after it has been handed out.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    data: RgbaImage,
}

impl RasterImage {
    /// Wraps an existing RGBA buffer.
    pub fn new(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Creates an image filled with a single color.
    pub fn from_pixel(width: u32, height: u32, pixel: Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, pixel))
    }

    /// Creates a fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(RgbaImage::new(width, height))
    }

    /// Decodes any format `image` understands into an RGBA raster.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
        Ok(Self::new(img.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Returns the pixel dimensions of the image.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Returns the full-image rectangle.
    pub fn bounds(&self) -> RectPx {
        RectPx::from_size(self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.data.get_pixel(x, y)
    }

    /// Returns true if any pixel is less than fully opaque.
    pub fn has_alpha(&self) -> bool {
        self.data.pixels().any(|p| p[3] < 255)
    }

    /// Borrows the underlying buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.data
    }

    /// Consumes the image and returns the underlying buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.data
    }

    /// Encodes the image as a 32-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(Cursor::new(&mut bytes))
            .write_image(
                self.data.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::encode("png", e))?;
        Ok(bytes)
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(data: RgbaImage) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_px_new() {
        let rect = RectPx::new(10, 20, 100, 200);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 220);
        assert!(!rect.is_empty());
    }

    #[test]
    fn rect_intersection_clamps_to_bounds() {
        let bounds = RectPx::from_size(100, 50);
        let rect = RectPx::new(80, 40, 50, 50);
        assert_eq!(rect.intersect(&bounds), RectPx::new(80, 40, 20, 10));

        let outside = RectPx::new(200, 200, 10, 10);
        assert!(outside.intersect(&bounds).is_empty());
    }

    #[test]
    fn size_px_is_square() {
        assert!(SizePx::new(100, 100).is_square());
        assert!(!SizePx::new(100, 200).is_square());
    }

    #[test]
    fn alpha_detection() {
        let opaque = RasterImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        assert!(!opaque.has_alpha());

        let mut data = opaque.clone().into_rgba();
        data.put_pixel(1, 1, Rgba([10, 20, 30, 254]));
        assert!(RasterImage::new(data).has_alpha());
        assert!(RasterImage::transparent(2, 2).has_alpha());
    }

    #[test]
    fn png_encode_then_decode_keeps_pixels() {
        let img = RasterImage::from_pixel(3, 2, Rgba([200, 100, 50, 128]));
        let bytes = img.encode_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(RasterImage::decode(&bytes).unwrap(), img);
    }
}
