//! Freehand brush strokes and their rasterization into a [`Mask`].
//!
//! Strokes are authored in whatever coordinate space the editor displays
//! (usually the on-screen logical size of the image). [`rasterize`] scales
//! them into the pixel grid of the target image.

use log::debug;
use resvg::tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::Mask;
use crate::raster::SizePx;

/// Number of feather rings drawn around a soft stroke.
const FEATHER_PASSES: u32 = 4;

/// Peak opacity of the innermost feather ring.
const FEATHER_OPACITY: f32 = 0.5;

/// A point in authoring space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for StrokePoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// One committed brush stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskStroke {
    pub points: Vec<StrokePoint>,
    /// Brush radius in authoring-space units.
    pub radius: f32,
    /// Clears previously painted area instead of adding to it.
    pub erase: bool,
    /// Adds a feathered falloff around paint strokes.
    pub soft_edges: bool,
}

impl MaskStroke {
    /// A hard-edged paint stroke.
    pub fn paint(points: impl IntoIterator<Item = impl Into<StrokePoint>>, radius: f32) -> Self {
        Self {
            points: points.into_iter().map(Into::into).collect(),
            radius,
            erase: false,
            soft_edges: false,
        }
    }

    /// An eraser stroke.
    pub fn erase(points: impl IntoIterator<Item = impl Into<StrokePoint>>, radius: f32) -> Self {
        Self {
            erase: true,
            ..Self::paint(points, radius)
        }
    }

    pub fn with_soft_edges(mut self, soft: bool) -> Self {
        self.soft_edges = soft;
        self
    }
}

/// Append-only list of committed strokes with single-step undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeHistory {
    strokes: Vec<MaskStroke>,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a stroke. Strokes with no points are ignored.
    pub fn push(&mut self, stroke: MaskStroke) {
        if !stroke.points.is_empty() {
            self.strokes.push(stroke);
        }
    }

    /// Removes and returns the most recent stroke.
    pub fn undo(&mut self) -> Option<MaskStroke> {
        self.strokes.pop()
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaskStroke> {
        self.strokes.iter()
    }

    pub fn as_slice(&self) -> &[MaskStroke] {
        &self.strokes
    }

    /// Rasterizes the history, see [`rasterize`].
    pub fn rasterize(&self, target: SizePx, source_space: (f32, f32)) -> Mask {
        rasterize(&self.strokes, target, source_space)
    }
}

/// Renders `strokes` into a mask of exactly `target` pixels.
///
/// `source_space` is the width and height of the space the strokes were
/// drawn in. Point coordinates are scaled per axis; brush radii scale by
/// the horizontal ratio. Strokes are drawn in order, so a later eraser
/// always wins over an earlier paint stroke.
pub fn rasterize(strokes: &[MaskStroke], target: SizePx, source_space: (f32, f32)) -> Mask {
    let Some(mut pixmap) = Pixmap::new(target.width, target.height) else {
        return Mask::empty(target);
    };

    let scale_x = axis_scale(target.width, source_space.0);
    let scale_y = axis_scale(target.height, source_space.1);

    for stroke in strokes {
        let radius = stroke.radius * scale_x;
        if stroke.points.is_empty() || !(radius > 0.0) {
            continue;
        }

        let points: Vec<StrokePoint> = stroke
            .points
            .iter()
            .map(|p| StrokePoint::new(p.x * scale_x, p.y * scale_y))
            .collect();

        let path = if points.len() > 1 { polyline(&points) } else { None };
        match path {
            Some(path) => {
                if stroke.soft_edges && !stroke.erase {
                    draw_feather(&mut pixmap, &path, radius);
                }
                let paint = brush_paint(1.0, stroke.erase);
                let core = round_stroke(radius * 2.0);
                pixmap.stroke_path(&path, &paint, &core, Transform::identity(), None);
            }
            None => draw_dot(&mut pixmap, points[0], radius, stroke.erase),
        }
    }

    debug!(
        "rasterized {} strokes into {}x{} mask",
        strokes.len(),
        target.width,
        target.height
    );

    Mask::from_coverage(target, pixmap.data())
}

fn axis_scale(pixels: u32, space: f32) -> f32 {
    if space > 0.0 && space.is_finite() {
        pixels as f32 / space
    } else {
        1.0
    }
}

fn polyline(points: &[StrokePoint]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.iter().all(|p| p == first) {
        return None;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for p in rest {
        builder.line_to(p.x, p.y);
    }
    builder.finish()
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn brush_paint(opacity: f32, erase: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    paint.set_color_rgba8(255, 255, 255, alpha);
    paint.anti_alias = true;
    if erase {
        paint.blend_mode = BlendMode::Clear;
    }
    paint
}

fn draw_dot(pixmap: &mut Pixmap, center: StrokePoint, radius: f32, erase: bool) {
    if let Some(circle) = PathBuilder::from_circle(center.x, center.y, radius) {
        let paint = brush_paint(1.0, erase);
        pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Concentric rings outside the core width, fading toward the edge.
fn draw_feather(pixmap: &mut Pixmap, path: &Path, radius: f32) {
    let core = radius * 2.0;
    for ring in (1..=FEATHER_PASSES).rev() {
        let t = ring as f32 / FEATHER_PASSES as f32;
        let width = core + core * t;
        let opacity = FEATHER_OPACITY * (1.0 - ring as f32 / (FEATHER_PASSES + 1) as f32);
        let paint = brush_paint(opacity, false);
        pixmap.stroke_path(path, &paint, &round_stroke(width), Transform::identity(), None);
    }
}
