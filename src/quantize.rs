//! Dominant-color extraction by k-means clustering.
//!
//! The image is downsampled to a [`SAMPLE_GRID`] square, mostly transparent
//! pixels are dropped, and the rest are clustered in RGB space. Clusters
//! below [`MIN_COVERAGE`] are discarded and near-identical colors merged.
//!
//! Output is reproducible: the centroid seed comes from [`Seed`], which
//! defaults to a fixed value.

use image::imageops::{self, FilterType};
use log::debug;
use palette::Srgb;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// Side length of the downsampled grid clustering runs on.
pub const SAMPLE_GRID: u32 = 50;

/// Fixed number of assignment/update rounds.
pub const ITERATIONS: usize = 10;

/// Clusters covering less than this fraction of samples are dropped.
pub const MIN_COVERAGE: f32 = 0.01;

/// Colors closer than this (Euclidean, 0-255 RGB) count as duplicates.
pub const DUPLICATE_DISTANCE: f32 = 30.0;

/// Extra candidate clusters beyond the requested color count.
const EXTRA_CLUSTERS: usize = 2;

/// Pixels with alpha below this are not part of the subject.
const MIN_ALPHA: u8 = 128;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 0x5EED_C010;

/// Source of randomness for centroid initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Seed {
    /// Reproducible results.
    Fixed(u64),
    /// Different results on every run.
    Entropy,
}

impl Default for Seed {
    fn default() -> Self {
        Self::Fixed(DEFAULT_SEED)
    }
}

impl Seed {
    fn rng(&self) -> StdRng {
        match self {
            Self::Fixed(seed) => StdRng::seed_from_u64(*seed),
            Self::Entropy => StdRng::from_entropy(),
        }
    }
}

/// Settings for [`extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct QuantizerOptions {
    /// Maximum number of swatches returned.
    pub max_colors: usize,

    #[serde(default)]
    pub seed: Seed,
}

impl Default for QuantizerOptions {
    fn default() -> Self {
        Self {
            max_colors: 6,
            seed: Seed::default(),
        }
    }
}

impl QuantizerOptions {
    pub fn new(max_colors: usize) -> Self {
        Self {
            max_colors,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }
}

/// One palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSwatch {
    pub color: Srgb<u8>,
    /// `#RRGGBB`, uppercase.
    pub hex: String,
    /// Fraction of sampled pixels assigned to this color.
    pub coverage: f32,
}

impl ColorSwatch {
    pub fn new(color: Srgb<u8>, coverage: f32) -> Self {
        Self {
            hex: format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue),
            color,
            coverage,
        }
    }

    /// Relative luminance in `[0, 1]`, handy for picking readable text colors.
    pub fn luminance(&self) -> f32 {
        let lin: palette::LinSrgb = self.color.into_format::<f32>().into_linear();
        0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue
    }
}

/// Swatches ordered by descending coverage.
pub type Palette = Vec<ColorSwatch>;

/// Extracts up to `options.max_colors` dominant colors from `image`.
pub fn extract(image: &RasterImage, options: &QuantizerOptions) -> Palette {
    if options.max_colors == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let samples = sample_pixels(image);
    if samples.is_empty() {
        debug!("no opaque pixels to sample");
        return Vec::new();
    }

    let k = options.max_colors.saturating_add(EXTRA_CLUSTERS);
    let mut rng = options.seed.rng();
    let mut centroids = initial_centroids(&samples, k, &mut rng);
    let mut assignments = vec![0usize; samples.len()];

    for _ in 0..ITERATIONS {
        for (sample, slot) in samples.iter().zip(assignments.iter_mut()) {
            *slot = nearest(&centroids, sample);
        }

        let mut sums = vec![[0f64; 3]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (sample, &cluster) in samples.iter().zip(&assignments) {
            for c in 0..3 {
                sums[cluster][c] += sample[c] as f64;
            }
            counts[cluster] += 1;
        }
        for (centroid, (sum, &count)) in centroids.iter_mut().zip(sums.iter().zip(&counts)) {
            if count > 0 {
                *centroid = sum.map(|s| (s / count as f64) as f32);
            }
        }
    }

    // Coverage reflects the final centroids.
    let mut counts = vec![0usize; centroids.len()];
    for sample in &samples {
        counts[nearest(&centroids, sample)] += 1;
    }

    let total = samples.len() as f32;
    let mut kept: Vec<([f32; 3], f32)> = Vec::new();
    for (centroid, &count) in centroids.iter().zip(&counts) {
        let coverage = count as f32 / total;
        if coverage < MIN_COVERAGE {
            continue;
        }
        if kept.iter().any(|(c, _)| distance(c, centroid) < DUPLICATE_DISTANCE) {
            continue;
        }
        kept.push((*centroid, coverage));
    }

    kept.sort_by(|a, b| b.1.total_cmp(&a.1));
    kept.truncate(options.max_colors);

    debug!(
        "extracted {} colors from {} samples (k = {k})",
        kept.len(),
        samples.len()
    );

    kept.into_iter()
        .map(|(c, coverage)| ColorSwatch::new(to_srgb(c), coverage))
        .collect()
}

fn sample_pixels(image: &RasterImage) -> Vec<[f32; 3]> {
    let small = imageops::resize(image.as_rgba(), SAMPLE_GRID, SAMPLE_GRID, FilterType::Nearest);
    small
        .pixels()
        .filter(|p| p[3] >= MIN_ALPHA)
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect()
}

fn initial_centroids(samples: &[[f32; 3]], k: usize, rng: &mut StdRng) -> Vec<[f32; 3]> {
    if samples.len() <= k {
        return samples.to_vec();
    }
    index::sample(rng, samples.len(), k)
        .into_iter()
        .map(|i| samples[i])
        .collect()
}

/// Index of the closest centroid; ties go to the lowest index.
fn nearest(centroids: &[[f32; 3]], sample: &[f32; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = distance_sq(c, sample);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (0..3).map(|i| (a[i] - b[i]).powi(2)).sum()
}

fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    distance_sq(a, b).sqrt()
}

fn to_srgb(c: [f32; 3]) -> Srgb<u8> {
    let channel = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    Srgb::new(channel(c[0]), channel(c[1]), channel(c[2]))
}
