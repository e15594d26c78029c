//! JSON manifests written alongside icon bundles.

use serde::{Deserialize, Serialize};

use super::bundle::IOS_ICONS;

/// `Contents.json` of an `.appiconset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSetManifest {
    pub images: Vec<IconSetImage>,
    pub info: IconSetInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSetImage {
    /// Points, e.g. `"83.5x83.5"`.
    pub size: String,
    pub idiom: String,
    pub filename: String,
    /// e.g. `"2x"`.
    pub scale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconSetInfo {
    pub version: u32,
    pub author: String,
}

impl IconSetManifest {
    /// The manifest for [`IOS_ICONS`].
    pub fn ios() -> Self {
        let images = IOS_ICONS
            .iter()
            .map(|icon| IconSetImage {
                size: format!("{}x{}", icon.points, icon.points),
                idiom: icon.idiom.to_string(),
                filename: icon.filename.to_string(),
                scale: format!("{}x", icon.scale),
            })
            .collect();

        Self {
            images,
            info: IconSetInfo {
                version: 1,
                author: "xcode".into(),
            },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `site.webmanifest` for the favicon bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub icons: Vec<WebManifestIcon>,
    pub theme_color: String,
    pub background_color: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl WebManifestIcon {
    fn png(size: u32) -> Self {
        Self {
            src: format!("android-chrome-{size}x{size}.png"),
            sizes: format!("{size}x{size}"),
            mime_type: "image/png".into(),
        }
    }
}

impl Default for WebManifest {
    fn default() -> Self {
        Self::new("", "#ffffff", "#ffffff")
    }
}

impl WebManifest {
    pub fn new(
        name: impl Into<String>,
        theme_color: impl Into<String>,
        background_color: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            short_name: name.clone(),
            name,
            icons: vec![WebManifestIcon::png(192), WebManifestIcon::png(512)],
            theme_color: theme_color.into(),
            background_color: background_color.into(),
            display: "standalone".into(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
