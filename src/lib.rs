//! logo-raster: local image pipeline for generated logos
//!
//! This crate holds the deterministic part of a logo editor: geometric
//! edits, brush masks for blending inpainted regions back into an original,
//! dominant-color extraction, and export to platform icon bundles. It works
//! on decoded RGBA buffers only; fetching images from inference services is
//! the host's job.
//!
//! # Example
//!
//! ```
//! use image::Rgba;
//! use logo_raster::{
//!     EditParameters, MaskPolarity, MaskStroke, QuantizerOptions, RasterImage, Rotation,
//!     composite_preserving_alpha, extract_palette, rasterize_strokes, transform,
//! };
//!
//! let logo = RasterImage::from_pixel(64, 64, Rgba([30, 90, 200, 255]));
//!
//! // Geometry
//! let params = EditParameters { rotation: Rotation::Cw90, padding: 8, ..Default::default() };
//! let edited = transform::apply(&logo, &params);
//! assert_eq!(edited.width(), 80);
//!
//! // Masking: strokes drawn on a 32x32 preview of the 64x64 image
//! let strokes = [MaskStroke::paint([(8.0, 8.0), (24.0, 24.0)], 4.0)];
//! let mask = rasterize_strokes(&strokes, logo.dimensions(), (32.0, 32.0));
//! let for_backend = mask.to_polarity(MaskPolarity::PaintOnBlack);
//! assert_eq!(for_backend.dimensions(), logo.dimensions());
//!
//! let inpainted = RasterImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
//! let merged = composite_preserving_alpha(&logo, &inpainted, &mask);
//! assert_eq!(merged.pixel(32, 32), Rgba([255, 255, 255, 255]));
//!
//! // Palette
//! let palette = extract_palette(&logo, &QuantizerOptions::new(4));
//! assert_eq!(palette[0].hex, "#1E5AC8");
//! ```
//!
//! # Export
//!
//! ```no_run
//! use std::path::Path;
//! use logo_raster::{Bundle, Exporter, RasterImage, WebManifest};
//!
//! # fn run(logo: RasterImage) -> logo_raster::Result<()> {
//! let bundles = [Bundle::ios(), Bundle::android(), Bundle::favicon(WebManifest::default())];
//! let report = Exporter::new().export(&logo, &bundles, Path::new("out"), |p| {
//!     println!("{}/{} {}", p.completed, p.total, p.path.display());
//! })?;
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.bundle, failure.error);
//! }
//! # Ok(())
//! # }
//! ```

mod composite;
mod error;
mod raster;
mod settings;

pub mod export;
pub mod mask;
pub mod quantize;
pub mod transform;

pub use composite::{alpha_blend, composite_over, flatten_onto, flatten_to_rgb};
pub use error::{Error, Result};
pub use export::{
    Bundle, BundleContent, BundleFailure, BundleKind, Companion, ExportProgress, ExportReport,
    ExportTarget, Exporter, IconSetManifest, Vectorizer, WebManifest, create_timestamped_root,
};
pub use mask::{
    Mask, MaskPolarity, MaskStroke, StrokeHistory, StrokePoint, composite_preserving_alpha,
    rasterize as rasterize_strokes,
};
pub use quantize::{ColorSwatch, Palette, QuantizerOptions, Seed, extract as extract_palette};
pub use raster::{RasterImage, RectPx, SizePx};
pub use settings::{
    CropSettings, EditSettings, ExportOptions, PipelineProfile, format_hex_color, parse_hex_color,
};
pub use transform::{EditParameters, NormalizedRect, Rotation};
