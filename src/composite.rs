//! Source-over alpha compositing and flattening onto solid colors.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use palette::Srgb;

use crate::raster::RasterImage;

/// Composites a source image onto a destination image at the specified position.
///
/// Uses standard alpha blending (source over destination). Source pixels that
/// land outside the destination are skipped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let dest_width = dest.width() as i32;
    let dest_height = dest.height() as i32;

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        let dx = x + sx as i32;
        let dy = y + sy as i32;

        if dx < 0 || dy < 0 || dx >= dest_width || dy >= dest_height {
            continue;
        }

        let dst_pixel = dest.get_pixel(dx as u32, dy as u32);
        let blended = alpha_blend(*src_pixel, *dst_pixel);
        dest.put_pixel(dx as u32, dy as u32, blended);
    }
}

/// Alpha blends two RGBA pixels (source over destination).
pub fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Paints `image` over an opaque fill of `color`.
///
/// The result is fully opaque and keeps the RGBA layout.
pub fn flatten_onto(image: &RasterImage, color: Srgb<u8>) -> RasterImage {
    let background = Rgba([color.red, color.green, color.blue, 255]);
    let mut canvas = RgbaImage::from_pixel(image.width(), image.height(), background);
    composite_over(&mut canvas, image.as_rgba(), 0, 0);
    RasterImage::new(canvas)
}

/// Flattens `image` onto `color` and drops the alpha channel.
///
/// Blending first keeps semi-transparent edges from turning into dark
/// fringes, which is what a plain channel drop would produce.
pub fn flatten_to_rgb(image: &RasterImage, color: Srgb<u8>) -> RgbImage {
    let flat = flatten_onto(image, color);
    let mut out = RgbImage::new(flat.width(), flat.height());
    for (x, y, p) in flat.as_rgba().enumerate_pixels() {
        out.put_pixel(x, y, Rgb([p[0], p[1], p[2]]));
    }
    out
}
