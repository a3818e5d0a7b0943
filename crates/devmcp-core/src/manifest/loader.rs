//! Manifest decoding from local TOML and JSON files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::Manifest;

/// Encoding of a manifest document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Some(ManifestFormat::Toml),
            Some("json") => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// Anything that can produce a decoded manifest from a source string.
///
/// Remote and repository origins plug in here; synthesis only sees the
/// decoded [`Manifest`].
pub trait ManifestSource {
    fn load(&self, source: &str) -> Result<Manifest>;
}

/// Loads manifests from files, resolving relative sources against a base
/// directory (usually the project root).
#[derive(Debug, Clone)]
pub struct FileManifestSource {
    base_dir: PathBuf,
}

impl FileManifestSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl ManifestSource for FileManifestSource {
    fn load(&self, source: &str) -> Result<Manifest> {
        let path = self.resolve(source);
        let format = ManifestFormat::from_path(&path).ok_or_else(|| Error::Parse {
            path: path.clone(),
            message: "manifest must have a .toml or .json extension".to_string(),
        })?;
        let content =
            std::fs::read_to_string(&path).map_err(|e| Error::io("read manifest", &path, e))?;
        tracing::debug!("loaded manifest source {}", path.display());
        parse_manifest_str(&content, format).map_err(|message| Error::Parse { path, message })
    }
}

/// Decode manifest text; the error is a human-readable parser message.
pub fn parse_manifest_str(
    content: &str,
    format: ManifestFormat,
) -> std::result::Result<Manifest, String> {
    match format {
        ManifestFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ManifestFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}
