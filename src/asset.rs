use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("No model URL. Set SHOWCASE_3D_ASSET_URL or use --model …")]
    Empty,
    #[error("Unsupported format. Use .glb or .gltf, or set SHOWCASE_3D_ASSET_URL.")]
    UnsupportedFormat(String),
    #[error("Invalid model URL {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// `.glb`
    Binary,
    /// `.gltf`
    Text,
}

impl AssetFormat {
    /// Recognise the format from a reference's suffix, ignoring case
    pub fn detect(reference: &str) -> Option<AssetFormat> {
        let lower = reference.to_ascii_lowercase();
        if lower.ends_with(".glb") {
            Some(AssetFormat::Binary)
        } else if lower.ends_with(".gltf") {
            Some(AssetFormat::Text)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(Url),
    Local(PathBuf),
    /// Compiled into the binary, looked up by name
    Bundled(String),
}

/// Prefix naming a model compiled into the binary
pub const BUNDLED_SCHEME: &str = "bundled:";

/// A validated asset reference, ready to hand to the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub reference: String,
    pub format: AssetFormat,
    pub location: AssetLocation,
}

impl AssetRequest {
    /// Validate a reference before any I/O happens
    pub fn parse(reference: &str) -> Result<AssetRequest, AssetError> {
        let clean = reference.trim();
        if clean.is_empty() {
            return Err(AssetError::Empty);
        }

        let format = AssetFormat::detect(clean)
            .ok_or_else(|| AssetError::UnsupportedFormat(clean.to_string()))?;

        Ok(AssetRequest {
            reference: clean.to_string(),
            format,
            location: locate(clean)?,
        })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, AssetLocation::Remote(_))
    }
}

fn locate(reference: &str) -> Result<AssetLocation, AssetError> {
    if let Some(name) = reference.strip_prefix(BUNDLED_SCHEME) {
        return Ok(AssetLocation::Bundled(name.to_string()));
    }

    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let url = Url::parse(reference).map_err(|e| AssetError::InvalidUrl(format!("{reference}: {e}")))?;
        return Ok(AssetLocation::Remote(url));
    }

    if lower.starts_with("file://") {
        let url = Url::parse(reference).map_err(|e| AssetError::InvalidUrl(format!("{reference}: {e}")))?;
        let path = url
            .to_file_path()
            .map_err(|_| AssetError::InvalidUrl(reference.to_string()))?;
        return Ok(AssetLocation::Local(path));
    }

    Ok(AssetLocation::Local(PathBuf::from(reference)))
}
