//! Configuration system
//!
//! Renderer options are plain serde structs that can be loaded from and saved
//! to `.toml` or `.ron` files through the [`Config`] trait.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::api::GraphicsApi;

/// On-disk formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Serde-backed settings that round-trip through `.toml` or `.ron` files
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors from reading or writing configuration files
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The contents did not deserialize
    #[error("parse error: {0}")]
    Parse(String),

    /// The value did not serialize
    #[error("serialization error: {0}")]
    Serialize(String),

    /// The extension is neither `.toml` nor `.ron`
    #[error("unsupported config format: '{}'", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Default number of quads (and circles) per batch
pub const DEFAULT_MAX_PRIMITIVES: u32 = 1000;

/// Default size of the sampler array in the batch shaders
pub const DEFAULT_MAX_TEXTURE_SLOTS: u32 = 16;

/// Default glyph rasterization size in pixels
pub const DEFAULT_GLYPH_PIXEL_SIZE: u32 = 48;

/// # Renderer Configuration
///
/// Options recognized by the renderer core. Every field has a default so a
/// partial config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Graphics backend selected at initialization
    pub graphics_api: GraphicsApi,
    /// Maximum quads accumulated before a batch is flushed
    pub max_quads: u32,
    /// Maximum circles accumulated before a batch is flushed
    pub max_circles: u32,
    /// Texture slots per batch, slot 0 included
    pub max_texture_slots: u32,
    /// Pixel height used when rasterizing font glyphs
    pub glyph_pixel_size: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            graphics_api: GraphicsApi::Headless,
            max_quads: DEFAULT_MAX_PRIMITIVES,
            max_circles: DEFAULT_MAX_PRIMITIVES,
            max_texture_slots: DEFAULT_MAX_TEXTURE_SLOTS,
            glyph_pixel_size: DEFAULT_GLYPH_PIXEL_SIZE,
        }
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = RendererConfig::default();
        assert_eq!(config.max_quads, 1000);
        assert_eq!(config.max_circles, 1000);
        assert_eq!(config.max_texture_slots, 16);
        assert_eq!(config.glyph_pixel_size, 48);
        assert_eq!(config.graphics_api, GraphicsApi::Headless);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RendererConfig = toml::from_str("max_quads = 64\n").unwrap();
        assert_eq!(config.max_quads, 64);
        assert_eq!(config.max_texture_slots, DEFAULT_MAX_TEXTURE_SLOTS);
    }

    #[test]
    fn test_save_and_load_toml_and_ron() {
        let config = RendererConfig {
            max_quads: 10,
            max_circles: 20,
            max_texture_slots: 8,
            ..Default::default()
        };

        for ext in ["toml", "ron"] {
            let path = std::env::temp_dir().join(format!("ikan_{}_renderer.{ext}", std::process::id()));
            config.save_to_file(&path).unwrap();
            let loaded = RendererConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).ok();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RendererConfig::load_from_file("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("exist.toml"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = RendererConfig::default().save_to_file("renderer.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
