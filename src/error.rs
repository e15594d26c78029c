//! Error types shared by the encoding and export stages.
//!
//! Geometric transforms, mask rasterization and palette extraction are
//! total functions and never produce these errors. Only encoding and
//! file-system work can fail.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pixel buffer could not be encoded to the requested format.
    #[error("failed to encode {target}: {source}")]
    Encode {
        target: String,
        #[source]
        source: image::ImageError,
    },

    /// A buffer could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// A directory could not be created or a file could not be written.
    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external vectorization collaborator failed or was not supplied.
    #[error("vectorization failed: {0}")]
    Vectorize(String),

    /// A color string was not a `#RRGGBB` or `#RGB` hex code.
    #[error("invalid color {0:?}")]
    InvalidColor(String),

    /// Settings or manifest JSON could not be (de)serialized.
    #[error("settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// An icon container was given no images, or an image too large to describe.
    #[error("icon container: {0}")]
    IconContainer(String),
}

impl Error {
    pub(crate) fn io(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn encode(target: impl Into<String>, source: image::ImageError) -> Self {
        Self::Encode {
            target: target.into(),
            source,
        }
    }
}
