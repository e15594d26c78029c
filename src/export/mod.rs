//! Writing a finished logo out as platform icon bundles.
//!
//! An [`Exporter`] takes one source raster and a list of [`Bundle`]s and
//! writes every bundle into its own folder below an export root:
//!
//! ```text
//! LogoExport_2026-10-18_09-30-00/
//! ├── ios/AppIcon.appiconset/   PNGs + Contents.json
//! ├── android/mipmap-*/         ic_launcher.png per density
//! ├── favicon/                  PNGs, favicon.ico, site.webmanifest
//! └── svg/logo.svg              from the vectorizer
//! ```
//!
//! Bundles are written best-effort: a bundle stops at its first failing
//! file and is recorded in [`ExportReport::failures`], and the remaining
//! bundles are still attempted. Only failing to create the export root
//! aborts the whole export.

pub mod bundle;
pub mod encode;
pub mod ico;
pub mod manifest;

pub use bundle::{Bundle, BundleContent, BundleKind, Companion, ExportTarget, IosIcon};
pub use encode::{render_ico, render_target, resize_exact};
pub use ico::{IcoEntry, encode_ico};
pub use manifest::{IconSetManifest, WebManifest};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::raster::RasterImage;

/// Converts a raster into vector bytes (for example SVG markup).
///
/// Implementations live outside this crate; the exporter writes whatever
/// bytes they return verbatim.
pub trait Vectorizer {
    fn vectorize(&self, image: &RasterImage) -> Result<Vec<u8>>;
}

impl<F> Vectorizer for F
where
    F: Fn(&RasterImage) -> Result<Vec<u8>>,
{
    fn vectorize(&self, image: &RasterImage) -> Result<Vec<u8>> {
        self(image)
    }
}

/// Reported after each resized file or vector file is written.
#[derive(Debug, Clone, Copy)]
pub struct ExportProgress<'a> {
    pub completed: usize,
    pub total: usize,
    pub bundle: &'a str,
    pub path: &'a Path,
}

impl ExportProgress<'_> {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

/// A bundle that could not be written completely.
#[derive(Debug)]
pub struct BundleFailure {
    pub bundle: String,
    pub error: Error,
}

/// Outcome of an export.
#[derive(Debug)]
pub struct ExportReport {
    /// Folder the bundles were written into.
    pub root: PathBuf,
    /// Every file written, manifests included.
    pub written: Vec<PathBuf>,
    pub failures: Vec<BundleFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Writes bundles to disk. Holds no state between exports.
#[derive(Default)]
pub struct Exporter {
    vectorizer: Option<Box<dyn Vectorizer>>,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the collaborator used for [`BundleContent::Vector`] bundles.
    pub fn with_vectorizer(mut self, vectorizer: impl Vectorizer + 'static) -> Self {
        self.vectorizer = Some(Box::new(vectorizer));
        self
    }

    /// Exports into a new timestamped folder inside `destination`, see
    /// [`create_timestamped_root`].
    pub fn export(
        &self,
        image: &RasterImage,
        bundles: &[Bundle],
        destination: &Path,
        progress: impl FnMut(&ExportProgress),
    ) -> Result<ExportReport> {
        let root = create_timestamped_root(destination)?;
        self.export_into(image, bundles, &root, progress)
    }

    /// Exports directly into `root`, creating it if needed.
    pub fn export_into(
        &self,
        image: &RasterImage,
        bundles: &[Bundle],
        root: &Path,
        mut progress: impl FnMut(&ExportProgress),
    ) -> Result<ExportReport> {
        fs::create_dir_all(root).map_err(|e| Error::io("create export folder", root, e))?;

        let mut run = Run {
            total: bundles.iter().map(Bundle::unit_count).sum(),
            completed: 0,
            written: Vec::new(),
        };
        let mut failures = Vec::new();

        for bundle in bundles {
            debug!("exporting bundle {}", bundle.name);
            if let Err(error) = self.export_bundle(image, bundle, root, &mut run, &mut progress) {
                warn!("bundle {} failed: {error}", bundle.name);
                failures.push(BundleFailure {
                    bundle: bundle.name.clone(),
                    error,
                });
            }
        }

        Ok(ExportReport {
            root: root.to_path_buf(),
            written: run.written,
            failures,
        })
    }

    fn export_bundle(
        &self,
        image: &RasterImage,
        bundle: &Bundle,
        root: &Path,
        run: &mut Run,
        progress: &mut impl FnMut(&ExportProgress),
    ) -> Result<()> {
        let dir = root.join(&bundle.directory);
        create_dir(&dir)?;

        match &bundle.content {
            BundleContent::Raster {
                targets,
                companions,
            } => {
                for target in targets {
                    let path = dir.join(target.relative_path());
                    if let Some(parent) = path.parent() {
                        create_dir(parent)?;
                    }
                    let bytes = render_target(image, target)?;
                    run.write(&path, &bytes)?;
                    run.tick(&bundle.name, &path, progress);
                }
                for companion in companions {
                    write_companion(image, companion, &dir, run)?;
                }
            }
            BundleContent::Vector { filename } => {
                let vectorizer = self
                    .vectorizer
                    .as_ref()
                    .ok_or_else(|| Error::Vectorize("no vectorizer configured".into()))?;
                let bytes = vectorizer.vectorize(image)?;
                let path = dir.join(filename);
                run.write(&path, &bytes)?;
                run.tick(&bundle.name, &path, progress);
            }
        }
        Ok(())
    }
}

/// Bookkeeping for one export call.
struct Run {
    total: usize,
    completed: usize,
    written: Vec<PathBuf>,
}

impl Run {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|e| Error::io("write file", path, e))?;
        debug!("wrote {} ({} bytes)", path.display(), bytes.len());
        self.written.push(path.to_path_buf());
        Ok(())
    }

    fn tick(&mut self, bundle: &str, path: &Path, progress: &mut impl FnMut(&ExportProgress)) {
        self.completed += 1;
        progress(&ExportProgress {
            completed: self.completed,
            total: self.total,
            bundle,
            path,
        });
    }
}

/// Creates a fresh `LogoExport_<local time>` folder inside `destination`.
///
/// The name has one-second resolution; when it is already taken a `_2`,
/// `_3`, ... suffix is appended, so two exports never share a folder.
pub fn create_timestamped_root(destination: &Path) -> Result<PathBuf> {
    let name = chrono::Local::now()
        .format("LogoExport_%Y-%m-%d_%H-%M-%S")
        .to_string();
    create_unique_dir(destination, &name)
}

fn create_unique_dir(destination: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(destination)
        .map_err(|e| Error::io("create export destination", destination, e))?;

    let mut attempt = 1u32;
    loop {
        let candidate = match attempt {
            1 => destination.join(name),
            n => destination.join(format!("{name}_{n}")),
        };
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("{} exists, trying next suffix", candidate.display());
                attempt += 1;
            }
            Err(e) => return Err(Error::io("create export folder", candidate, e)),
        }
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io("create bundle folder", dir, e))
}

fn write_companion(
    image: &RasterImage,
    companion: &Companion,
    dir: &Path,
    run: &mut Run,
) -> Result<()> {
    match companion {
        Companion::IconSetManifest => {
            let json = IconSetManifest::ios().to_json_pretty()?;
            run.write(&dir.join("Contents.json"), json.as_bytes())
        }
        Companion::WebManifest(manifest) => {
            let json = manifest.to_json_pretty()?;
            run.write(&dir.join("site.webmanifest"), json.as_bytes())
        }
        Companion::IcoContainer { filename, sizes } => {
            let bytes = render_ico(image, sizes)?;
            run.write(&dir.join(filename), &bytes)
        }
    }
}
