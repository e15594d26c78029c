//! Platform bundles and their fixed size tables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::manifest::WebManifest;

/// One raster file a bundle writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub width: u32,
    pub height: u32,
    pub filename: String,
    /// Directory inside the bundle folder, e.g. `mipmap-hdpi`.
    pub subfolder: Option<String>,
    /// Flatten onto white and write without an alpha channel.
    pub opaque: bool,
}

impl ExportTarget {
    pub fn new(width: u32, height: u32, filename: impl Into<String>) -> Self {
        Self {
            width,
            height,
            filename: filename.into(),
            subfolder: None,
            opaque: false,
        }
    }

    pub fn square(size: u32, filename: impl Into<String>) -> Self {
        Self::new(size, size, filename)
    }

    pub fn in_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = Some(subfolder.into());
        self
    }

    pub fn opaque(mut self) -> Self {
        self.opaque = true;
        self
    }

    /// Path relative to the bundle folder.
    pub fn relative_path(&self) -> PathBuf {
        match &self.subfolder {
            Some(sub) => PathBuf::from(sub).join(&self.filename),
            None => PathBuf::from(&self.filename),
        }
    }
}

/// Extra files written next to a bundle's images.
#[derive(Debug, Clone, PartialEq)]
pub enum Companion {
    /// `Contents.json` describing the iOS icon table.
    IconSetManifest,
    /// `site.webmanifest` for the favicon set.
    WebManifest(WebManifest),
    /// Multi-resolution `.ico` built from square PNG renditions.
    IcoContainer { filename: String, sizes: Vec<u32> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BundleContent {
    Raster {
        targets: Vec<ExportTarget>,
        companions: Vec<Companion>,
    },
    /// A single file produced by the external vectorizer.
    Vector { filename: String },
}

/// A named set of output files written into one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub name: String,
    /// Directory relative to the export root.
    pub directory: PathBuf,
    pub content: BundleContent,
}

impl Bundle {
    /// A raster bundle with no companion files.
    pub fn custom(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        targets: Vec<ExportTarget>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            content: BundleContent::Raster {
                targets,
                companions: Vec::new(),
            },
        }
    }

    pub fn ios() -> Self {
        Self {
            name: "ios".into(),
            directory: PathBuf::from("ios").join("AppIcon.appiconset"),
            content: BundleContent::Raster {
                targets: IOS_ICONS.iter().map(IosIcon::target).collect(),
                companions: vec![Companion::IconSetManifest],
            },
        }
    }

    pub fn android() -> Self {
        let mut targets: Vec<ExportTarget> = ANDROID_DENSITIES
            .iter()
            .map(|(bucket, size)| {
                ExportTarget::square(*size, "ic_launcher.png").in_subfolder(*bucket)
            })
            .collect();
        targets.push(ExportTarget::square(512, "ic_launcher-playstore.png"));

        Self {
            name: "android".into(),
            directory: PathBuf::from("android"),
            content: BundleContent::Raster {
                targets,
                companions: Vec::new(),
            },
        }
    }

    pub fn favicon(manifest: WebManifest) -> Self {
        Self {
            name: "favicon".into(),
            directory: PathBuf::from("favicon"),
            content: BundleContent::Raster {
                targets: vec![
                    ExportTarget::square(16, "favicon-16x16.png"),
                    ExportTarget::square(32, "favicon-32x32.png"),
                    ExportTarget::square(180, "apple-touch-icon.png"),
                    ExportTarget::square(192, "android-chrome-192x192.png"),
                    ExportTarget::square(512, "android-chrome-512x512.png"),
                ],
                companions: vec![
                    Companion::IcoContainer {
                        filename: "favicon.ico".into(),
                        sizes: FAVICON_ICO_SIZES.to_vec(),
                    },
                    Companion::WebManifest(manifest),
                ],
            },
        }
    }

    pub fn vector() -> Self {
        Self {
            name: "svg".into(),
            directory: PathBuf::from("svg"),
            content: BundleContent::Vector {
                filename: "logo.svg".into(),
            },
        }
    }

    /// Number of progress units: one per raster target, one for a vector file.
    pub fn unit_count(&self) -> usize {
        match &self.content {
            BundleContent::Raster { targets, .. } => targets.len(),
            BundleContent::Vector { .. } => 1,
        }
    }
}

/// The standard bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum BundleKind {
    Ios,
    Android,
    Favicon,
    Vector,
}

impl BundleKind {
    pub const ALL: [BundleKind; 4] = [Self::Ios, Self::Android, Self::Favicon, Self::Vector];

    /// Builds the bundle, using `manifest` for the favicon set.
    pub fn bundle(&self, manifest: &WebManifest) -> Bundle {
        match self {
            Self::Ios => Bundle::ios(),
            Self::Android => Bundle::android(),
            Self::Favicon => Bundle::favicon(manifest.clone()),
            Self::Vector => Bundle::vector(),
        }
    }
}

// ============================================================================
// Size tables
// ============================================================================

/// One entry of the iOS app icon set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IosIcon {
    /// Size in points.
    pub points: f32,
    pub scale: u32,
    pub idiom: &'static str,
    pub filename: &'static str,
}

impl IosIcon {
    pub fn pixels(&self) -> u32 {
        (self.points * self.scale as f32).round() as u32
    }

    /// Store artwork must not carry an alpha channel.
    pub fn is_marketing(&self) -> bool {
        self.idiom == "ios-marketing"
    }

    pub fn target(&self) -> ExportTarget {
        let target = ExportTarget::square(self.pixels(), self.filename);
        if self.is_marketing() {
            target.opaque()
        } else {
            target
        }
    }
}

const fn ios(points: f32, scale: u32, idiom: &'static str, filename: &'static str) -> IosIcon {
    IosIcon {
        points,
        scale,
        idiom,
        filename,
    }
}

pub const IOS_ICONS: &[IosIcon] = &[
    ios(20.0, 2, "iphone", "Icon-App-20x20@2x.png"),
    ios(20.0, 3, "iphone", "Icon-App-20x20@3x.png"),
    ios(29.0, 2, "iphone", "Icon-App-29x29@2x.png"),
    ios(29.0, 3, "iphone", "Icon-App-29x29@3x.png"),
    ios(40.0, 2, "iphone", "Icon-App-40x40@2x.png"),
    ios(40.0, 3, "iphone", "Icon-App-40x40@3x.png"),
    ios(60.0, 2, "iphone", "Icon-App-60x60@2x.png"),
    ios(60.0, 3, "iphone", "Icon-App-60x60@3x.png"),
    ios(20.0, 1, "ipad", "Icon-App-20x20@1x~ipad.png"),
    ios(20.0, 2, "ipad", "Icon-App-20x20@2x~ipad.png"),
    ios(29.0, 1, "ipad", "Icon-App-29x29@1x~ipad.png"),
    ios(29.0, 2, "ipad", "Icon-App-29x29@2x~ipad.png"),
    ios(40.0, 1, "ipad", "Icon-App-40x40@1x~ipad.png"),
    ios(40.0, 2, "ipad", "Icon-App-40x40@2x~ipad.png"),
    ios(76.0, 1, "ipad", "Icon-App-76x76@1x~ipad.png"),
    ios(76.0, 2, "ipad", "Icon-App-76x76@2x~ipad.png"),
    ios(83.5, 2, "ipad", "Icon-App-83.5x83.5@2x~ipad.png"),
    ios(1024.0, 1, "ios-marketing", "Icon-App-1024x1024@1x.png"),
];

/// Launcher icon density buckets and their pixel sizes.
pub const ANDROID_DENSITIES: &[(&str, u32)] = &[
    ("mipmap-mdpi", 48),
    ("mipmap-hdpi", 72),
    ("mipmap-xhdpi", 96),
    ("mipmap-xxhdpi", 144),
    ("mipmap-xxxhdpi", 192),
];

/// Resolutions embedded in `favicon.ico`.
pub const FAVICON_ICO_SIZES: [u32; 3] = [16, 32, 48];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ios_pixel_sizes() {
        let sizes: Vec<u32> = IOS_ICONS.iter().map(IosIcon::pixels).collect();
        assert!(sizes.contains(&167));
        assert!(sizes.contains(&180));
        assert_eq!(sizes.last(), Some(&1024));
    }

    #[test]
    fn ios_filenames_are_unique() {
        let mut names: Vec<&str> = IOS_ICONS.iter().map(|i| i.filename).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), IOS_ICONS.len());
    }

    #[test]
    fn only_marketing_icon_is_opaque() {
        let bundle = Bundle::ios();
        let BundleContent::Raster { targets, .. } = &bundle.content else {
            panic!("ios bundle is raster");
        };
        let opaque: Vec<_> = targets.iter().filter(|t| t.opaque).collect();
        assert_eq!(opaque.len(), 1);
        assert_eq!(opaque[0].width, 1024);
    }

    #[test]
    fn android_targets_use_density_folders() {
        let bundle = Bundle::android();
        let BundleContent::Raster { targets, .. } = &bundle.content else {
            panic!("android bundle is raster");
        };
        assert_eq!(
            targets[0].relative_path(),
            PathBuf::from("mipmap-mdpi").join("ic_launcher.png")
        );
        assert_eq!(targets.len(), ANDROID_DENSITIES.len() + 1);
        assert_eq!(bundle.unit_count(), 6);
    }

    #[test]
    fn vector_bundle_counts_one_unit() {
        assert_eq!(Bundle::vector().unit_count(), 1);
    }

    #[test]
    fn bundle_kind_serializes_lowercase() {
        let json = serde_json::to_string(&BundleKind::ALL).unwrap();
        assert_eq!(json, r#"["ios","android","favicon","vector"]"#);
    }
}
