//! Masks for blending inpainted regions back into an original image.
//!
//! A [`Mask`] is a grayscale buffer at the pixel size of the image it
//! describes. Bright pixels (above [`PAINT_THRESHOLD`]) mean "edit here",
//! dark pixels mean "keep the original". Back-ends that expect the opposite
//! convention get an explicit [`Mask::to_polarity`] conversion.

pub mod stroke;

pub use stroke::{MaskStroke, StrokeHistory, StrokePoint, rasterize};

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma, Rgba, RgbaImage, imageops};

use crate::error::{Error, Result};
use crate::raster::{RasterImage, SizePx};

/// Brightness strictly above this value classifies a mask pixel as painted.
pub const PAINT_THRESHOLD: u8 = 127;

/// Which color a binary mask uses for "edit here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum MaskPolarity {
    /// Painted pixels are white on a black background.
    #[default]
    PaintOnWhite,
    /// Painted pixels are black on a white background.
    PaintOnBlack,
}

impl MaskPolarity {
    pub fn from_inverted(inverted: bool) -> Self {
        if inverted {
            Self::PaintOnBlack
        } else {
            Self::PaintOnWhite
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, Self::PaintOnBlack)
    }
}

/// A single-channel mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    data: GrayImage,
}

impl Mask {
    pub fn new(data: GrayImage) -> Self {
        Self { data }
    }

    /// A mask with nothing painted.
    pub fn empty(size: SizePx) -> Self {
        Self::new(GrayImage::new(size.width, size.height))
    }

    /// A mask with every pixel painted.
    pub fn full(size: SizePx) -> Self {
        Self::new(GrayImage::from_pixel(size.width, size.height, Luma([255])))
    }

    /// Builds a mask from an RGBA buffer using its luma.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        Self::new(imageops::grayscale(image))
    }

    /// Builds a mask from premultiplied RGBA coverage data, white brush on
    /// a clear canvas. Coverage is the alpha byte of each pixel.
    pub(crate) fn from_coverage(size: SizePx, rgba: &[u8]) -> Self {
        let values: Vec<u8> = rgba.chunks_exact(4).map(|px| px[3]).collect();
        GrayImage::from_raw(size.width, size.height, values)
            .map(Self::new)
            .unwrap_or_else(|| Self::empty(size))
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.width(), self.height())
    }

    /// Raw brightness at a pixel.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.data.get_pixel(x, y)[0]
    }

    pub fn is_painted(&self, x: u32, y: u32) -> bool {
        self.value(x, y) > PAINT_THRESHOLD
    }

    /// Fraction of pixels classified as painted.
    pub fn painted_fraction(&self) -> f32 {
        let total = self.data.pixels().len();
        if total == 0 {
            return 0.0;
        }
        let painted = self.data.pixels().filter(|p| p[0] > PAINT_THRESHOLD).count();
        painted as f32 / total as f32
    }

    /// Thresholds into a strictly black/white mask in the given polarity.
    ///
    /// The input is read as paint-on-white. Converting a
    /// [`MaskPolarity::PaintOnBlack`] result to `PaintOnBlack` again gives
    /// back the paint-on-white binary mask.
    pub fn to_polarity(&self, polarity: MaskPolarity) -> Mask {
        let inverted = polarity.is_inverted();
        let mut out = GrayImage::new(self.width(), self.height());
        for (src, dst) in self.data.pixels().zip(out.pixels_mut()) {
            let painted = src[0] > PAINT_THRESHOLD;
            *dst = Luma([if painted != inverted { 255 } else { 0 }]);
        }
        Mask::new(out)
    }

    /// Opaque RGBA rendition, gray levels copied into every color channel.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (src, dst) in self.data.pixels().zip(out.pixels_mut()) {
            let v = src[0];
            *dst = Rgba([v, v, v, 255]);
        }
        out
    }

    /// Encodes as an 8-bit grayscale PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(Cursor::new(&mut bytes))
            .write_image(
                self.data.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::L8,
            )
            .map_err(|e| Error::encode("mask png", e))?;
        Ok(bytes)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.data
    }
}

/// Blends an externally edited image back into `original`.
///
/// Painted pixels take RGB from `edited` and alpha from `original`; every
/// other pixel is copied from `original` unchanged. `edited` and `mask`
/// may differ in size from `original`, in which case they are sampled at
/// the proportional nearest pixel.
pub fn composite_preserving_alpha(
    original: &RasterImage,
    edited: &RasterImage,
    mask: &Mask,
) -> RasterImage {
    let (width, height) = (original.width(), original.height());
    let mut out = original.as_rgba().clone();

    if edited.width() == 0 || edited.height() == 0 || mask.width() == 0 || mask.height() == 0 {
        return RasterImage::new(out);
    }

    for (x, y, px) in out.enumerate_pixels_mut() {
        let mx = scale_index(x, width, mask.width());
        let my = scale_index(y, height, mask.height());
        if !mask.is_painted(mx, my) {
            continue;
        }
        let ex = scale_index(x, width, edited.width());
        let ey = scale_index(y, height, edited.height());
        let src = edited.pixel(ex, ey);
        *px = Rgba([src[0], src[1], src[2], px[3]]);
    }

    RasterImage::new(out)
}

fn scale_index(i: u32, from: u32, to: u32) -> u32 {
    if from == to {
        return i;
    }
    ((i as u64 * to as u64) / from as u64).min(to as u64 - 1) as u32
}
