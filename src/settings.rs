//! Serializable pipeline settings.
//!
//! A [`PipelineProfile`] captures edit, palette and export settings in a
//! JSON-friendly form so a host UI can persist or send them between
//! processes. Conversion into the typed parameters validates colors.
//!
//! # Example
//!
//! ```
//! use logo_raster::{EditSettings, PipelineProfile};
//!
//! let profile = PipelineProfile::new().with_edit(EditSettings {
//!     background_color: Some("#1a1a2e".into()),
//!     padding: 16,
//!     ..EditSettings::default()
//! });
//!
//! let json = profile.to_json().unwrap();
//! let restored = PipelineProfile::from_json(&json).unwrap();
//! let params = restored.edit.to_parameters().unwrap();
//! assert_eq!(params.padding, 16);
//! ```

use std::path::{Path, PathBuf};

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::{Bundle, BundleKind, WebManifest, create_timestamped_root};
use crate::quantize::QuantizerOptions;
use crate::transform::{EditParameters, NormalizedRect, Rotation};

/// Parses `#RRGGBB` or `#RGB` (the `#` is optional).
pub fn parse_hex_color(value: &str) -> Result<Srgb<u8>> {
    value
        .trim()
        .parse::<Srgb<u8>>()
        .map_err(|_| Error::InvalidColor(value.to_string()))
}

/// Formats a color as lowercase `#rrggbb`.
pub fn format_hex_color(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

// ============================================================================
// Edit Settings
// ============================================================================

/// Serializable crop rectangle in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CropSettings {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Serializable form of [`EditParameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct EditSettings {
    /// Hex background color. `None` keeps transparency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default)]
    pub padding: u32,

    /// Degrees, snapped to the nearest quarter turn.
    #[serde(default)]
    pub rotation: f32,

    #[serde(default)]
    pub flip_horizontal: bool,

    #[serde(default)]
    pub flip_vertical: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropSettings>,
}

impl EditSettings {
    pub fn to_parameters(&self) -> Result<EditParameters> {
        let background = self
            .background_color
            .as_deref()
            .map(parse_hex_color)
            .transpose()?;

        Ok(EditParameters {
            background,
            padding: self.padding,
            rotation: Rotation::from_degrees(self.rotation),
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
            crop: self
                .crop
                .map(|c| NormalizedRect::new(c.x, c.y, c.width, c.height)),
        })
    }
}

impl From<&EditParameters> for EditSettings {
    fn from(params: &EditParameters) -> Self {
        Self {
            background_color: params.background.map(format_hex_color),
            padding: params.padding,
            rotation: params.rotation.degrees() as f32,
            flip_horizontal: params.flip_horizontal,
            flip_vertical: params.flip_vertical,
            crop: params.crop.map(|c| CropSettings {
                x: c.x,
                y: c.y,
                width: c.width,
                height: c.height,
            }),
        }
    }
}

// ============================================================================
// Export Options
// ============================================================================

/// Which bundles to export and how to fill the web manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ExportOptions {
    #[serde(default = "all_bundles")]
    pub bundles: Vec<BundleKind>,

    /// Write into a new `LogoExport_<time>` folder instead of the
    /// destination itself.
    #[serde(default = "default_true")]
    pub timestamped_folder: bool,

    #[serde(default)]
    pub app_name: String,

    #[serde(default = "default_white")]
    pub theme_color: String,

    #[serde(default = "default_white")]
    pub background_color: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            bundles: all_bundles(),
            timestamped_folder: true,
            app_name: String::new(),
            theme_color: default_white(),
            background_color: default_white(),
        }
    }
}

impl ExportOptions {
    /// Builds the selected bundles. Manifest colors must be valid hex.
    pub fn to_bundles(&self) -> Result<Vec<Bundle>> {
        let theme = parse_hex_color(&self.theme_color)?;
        let background = parse_hex_color(&self.background_color)?;
        let manifest = WebManifest::new(
            self.app_name.clone(),
            format_hex_color(theme),
            format_hex_color(background),
        );
        Ok(self.bundles.iter().map(|kind| kind.bundle(&manifest)).collect())
    }

    /// Resolves the folder bundles are written into, creating the
    /// timestamped folder when enabled. Pass the result to
    /// [`Exporter::export_into`](crate::Exporter::export_into).
    pub fn output_root(&self, destination: &Path) -> Result<PathBuf> {
        if self.timestamped_folder {
            create_timestamped_root(destination)
        } else {
            Ok(destination.to_path_buf())
        }
    }
}

fn all_bundles() -> Vec<BundleKind> {
    BundleKind::ALL.to_vec()
}

fn default_true() -> bool {
    true
}

fn default_white() -> String {
    "#ffffff".into()
}

// ============================================================================
// PipelineProfile
// ============================================================================

/// All pipeline settings in one serializable document.
///
/// # JSON Format
///
/// ```json
/// {
///   "edit": { "backgroundColor": "#ffffff", "padding": 8, "rotation": 90.0 },
///   "palette": { "maxColors": 5, "seed": { "fixed": 7 } },
///   "export": { "bundles": ["ios", "favicon"], "appName": "Acme", "timestampedFolder": false }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct PipelineProfile {
    #[serde(default)]
    pub edit: EditSettings,

    #[serde(default)]
    pub palette: QuantizerOptions,

    #[serde(default)]
    pub export: ExportOptions,
}

impl PipelineProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edit(mut self, edit: EditSettings) -> Self {
        self.edit = edit;
        self
    }

    pub fn with_palette(mut self, palette: QuantizerOptions) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::Seed;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), Srgb::new(255, 128, 0));
        assert_eq!(parse_hex_color("00ff00").unwrap(), Srgb::new(0, 255, 0));
        assert_eq!(format_hex_color(Srgb::new(1, 2, 255)), "#0102ff");
        assert!(matches!(
            parse_hex_color("tomato"),
            Err(Error::InvalidColor(_))
        ));
    }

    #[test]
    fn edit_settings_convert() {
        let settings = EditSettings {
            background_color: Some("#000000".into()),
            padding: 4,
            rotation: 270.0,
            flip_horizontal: true,
            flip_vertical: false,
            crop: Some(CropSettings {
                x: 0.1,
                y: 0.2,
                width: 0.5,
                height: 0.5,
            }),
        };
        let params = settings.to_parameters().unwrap();
        assert_eq!(params.background, Some(Srgb::new(0, 0, 0)));
        assert_eq!(params.rotation, Rotation::Cw270);
        assert_eq!(params.crop, Some(NormalizedRect::new(0.1, 0.2, 0.5, 0.5)));

        assert_eq!(EditSettings::from(&params), settings);
    }

    #[test]
    fn bad_background_is_rejected() {
        let settings = EditSettings {
            background_color: Some("#12".into()),
            ..EditSettings::default()
        };
        assert!(settings.to_parameters().is_err());
    }

    #[test]
    fn profile_serialization_roundtrip() {
        let profile = PipelineProfile::new()
            .with_edit(EditSettings {
                padding: 12,
                ..EditSettings::default()
            })
            .with_palette(QuantizerOptions::new(4).with_seed(Seed::Fixed(7)))
            .with_export(ExportOptions {
                bundles: vec![BundleKind::Ios, BundleKind::Favicon],
                app_name: "Acme".into(),
                ..ExportOptions::default()
            });

        let json = profile.to_json_pretty().unwrap();
        assert!(json.contains("\"maxColors\""));
        assert!(json.contains("\"appName\""));
        assert!(!json.contains("backgroundColor\": null"));

        assert_eq!(PipelineProfile::from_json(&json).unwrap(), profile);
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = PipelineProfile::from_json("{}").unwrap();
        assert_eq!(profile, PipelineProfile::default());
        assert_eq!(profile.export.bundles.len(), 4);
    }

    #[test]
    fn export_options_fill_missing_fields() {
        let profile = PipelineProfile::from_json(r#"{"export":{"appName":"A"}}"#).unwrap();
        assert_eq!(profile.export.app_name, "A");
        assert_eq!(profile.export.bundles, BundleKind::ALL.to_vec());
        assert!(profile.export.timestamped_folder);

        let flat = PipelineProfile::from_json(r#"{"export":{"timestampedFolder":false}}"#).unwrap();
        assert!(!flat.export.timestamped_folder);
    }

    #[test]
    fn output_root_follows_timestamp_toggle() {
        let tmp = tempfile::tempdir().unwrap();

        let flat = ExportOptions {
            timestamped_folder: false,
            ..ExportOptions::default()
        };
        assert_eq!(flat.output_root(tmp.path()).unwrap(), tmp.path());

        let root = ExportOptions::default().output_root(tmp.path()).unwrap();
        assert_eq!(root.parent(), Some(tmp.path()));
        assert!(root.is_dir());
        let name = root.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("LogoExport_"), "{name}");
    }

    #[test]
    fn export_options_build_bundles() {
        let options = ExportOptions {
            bundles: vec![BundleKind::Favicon, BundleKind::Vector],
            app_name: "Acme".into(),
            theme_color: "#ABC".into(),
            ..ExportOptions::default()
        };
        let bundles = options.to_bundles().unwrap();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].name, "favicon");

        let crate::export::BundleContent::Raster { companions, .. } = &bundles[0].content else {
            panic!("favicon bundle is raster");
        };
        assert!(companions.iter().any(|c| matches!(
            c,
            crate::export::Companion::WebManifest(m) if m.theme_color == "#aabbcc"
        )));
    }
}
