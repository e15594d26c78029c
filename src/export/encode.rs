//! Exact-size resizing and PNG encoding of export targets.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, Rgba32FImage, RgbaImage};
use palette::Srgb;

use super::bundle::ExportTarget;
use super::ico::{IcoEntry, encode_ico};
use crate::composite::flatten_to_rgb;
use crate::error::{Error, Result};
use crate::raster::RasterImage;

/// Background used when a target must not carry alpha.
pub const OPAQUE_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Premultiplied values are stored at this scale so Lanczos overshoot is
/// not clipped before the color is recovered.
const FILTER_HEADROOM: f32 = 0.5;

/// Resamples to exactly `width` x `height` pixels.
///
/// Filtering runs on premultiplied alpha so fully transparent neighbours
/// do not bleed their color into the edges of the artwork.
pub fn resize_exact(image: &RasterImage, width: u32, height: u32) -> RasterImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    let premultiplied = premultiply(image.as_rgba());
    let resized = imageops::resize(&premultiplied, width, height, FilterType::Lanczos3);
    RasterImage::new(RgbaImage::from_fn(width, height, |x, y| {
        unpremultiply(*resized.get_pixel(x, y))
    }))
}

fn premultiply(image: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let a = p[3] as f32 / 255.0 * FILTER_HEADROOM;
        let channel = |c: u8| c as f32 / 255.0 * a;
        Rgba([channel(p[0]), channel(p[1]), channel(p[2]), a])
    })
}

fn unpremultiply(p: Rgba<f32>) -> Rgba<u8> {
    let a = p[3];
    let alpha = (a / FILTER_HEADROOM * 255.0).round().clamp(0.0, 255.0) as u8;
    if alpha == 0 || a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |c: f32| (c / a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(p[0]), channel(p[1]), channel(p[2]), alpha])
}

/// Resizes `image` for `target` and encodes it as PNG.
///
/// Opaque targets are flattened onto white and written as 24-bit RGB.
pub fn render_target(image: &RasterImage, target: &ExportTarget) -> Result<Vec<u8>> {
    let resized = resize_exact(image, target.width, target.height);
    if !target.opaque {
        return resized
            .encode_png()
            .map_err(|e| retarget(e, &target.filename));
    }

    let flat = flatten_to_rgb(&resized, Srgb::from(OPAQUE_BACKGROUND));
    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes))
        .write_image(
            flat.as_raw(),
            flat.width(),
            flat.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| Error::encode(target.filename.clone(), e))?;
    Ok(bytes)
}

/// Renders square PNGs at each of `sizes` and packs them into an `.ico`.
pub fn render_ico(image: &RasterImage, sizes: &[u32]) -> Result<Vec<u8>> {
    let entries = sizes
        .iter()
        .map(|&size| {
            let png = resize_exact(image, size, size).encode_png()?;
            Ok(IcoEntry::new(size, size, png))
        })
        .collect::<Result<Vec<_>>>()?;
    encode_ico(&entries)
}

fn retarget(error: Error, filename: &str) -> Error {
    match error {
        Error::Encode { source, .. } => Error::encode(filename, source),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ColorType;

    /// Left half solid red, right half fully transparent black.
    fn half_red() -> RasterImage {
        let mut img = RgbaImage::new(64, 64);
        for (x, _, p) in img.enumerate_pixels_mut() {
            if x < 32 {
                *p = Rgba([220, 40, 40, 255]);
            }
        }
        RasterImage::new(img)
    }

    #[test]
    fn resize_hits_exact_pixel_size() {
        let img = RasterImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let out = resize_exact(&img, 16, 24);
        assert_eq!((out.width(), out.height()), (16, 24));
    }

    #[test]
    fn transparent_neighbours_do_not_darken_edges() {
        let out = resize_exact(&half_red(), 16, 16);
        let mut edge_pixels = 0;
        for p in out.as_rgba().pixels().filter(|p| p[3] > 0) {
            if p[3] < 255 {
                edge_pixels += 1;
            }
            for (got, want) in p.0[..3].iter().zip([220u8, 40, 40]) {
                assert!(got.abs_diff(want) <= 2, "{p:?}");
            }
        }
        assert!(edge_pixels > 0);
    }

    #[test]
    fn opaque_edges_blend_toward_white() {
        let target = ExportTarget::square(16, "edge.png").opaque();
        let bytes = render_target(&half_red(), &target).unwrap();
        let flat = image::load_from_memory(&bytes).unwrap().to_rgb8();
        for p in flat.pixels() {
            assert!(p[0] >= 218, "{p:?}");
            assert_eq!(p[1], p[2], "{p:?}");
        }
    }

    #[test]
    fn opaque_target_has_no_alpha_channel() {
        let img = RasterImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let target = ExportTarget::square(16, "red.png").opaque();

        let bytes = render_target(&img, &target).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (16, 16));

        let rgba = decoded.to_rgba8();
        assert!(rgba.pixels().all(|p| p[3] == 255));
        assert_eq!(rgba.get_pixel(8, 8).0, [255, 0, 0, 255]);
    }

    #[test]
    fn opaque_target_flattens_onto_white() {
        let img = RasterImage::transparent(4, 4);
        let bytes = render_target(&img, &ExportTarget::square(4, "clear.png").opaque()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn regular_target_keeps_alpha() {
        let img = RasterImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let bytes = render_target(&img, &ExportTarget::new(5, 3, "clear.png")).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgba8);
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }

    #[test]
    fn ico_embeds_requested_sizes() {
        let img = RasterImage::from_pixel(64, 64, Rgba([9, 9, 9, 255]));
        let bytes = render_ico(&img, &[16, 32, 48]).unwrap();
        assert_eq!(&bytes[..6], &[0, 0, 1, 0, 3, 0]);
        assert_eq!(&bytes[6..8], &[16, 16]);
        assert_eq!(&bytes[22..24], &[32, 32]);
        assert_eq!(&bytes[38..40], &[48, 48]);
    }
}
