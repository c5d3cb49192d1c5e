//! Configuration management for docrectify

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::corners::default_corners;
use crate::geometry::{Point, Quad};
use crate::transform::RectifyOptions;

/// Crop corners stored relative to the image size
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropConfig {
    /// Corners of the document in the photo, normalized (0.0 to 1.0)
    /// Order: top-left, top-right, bottom-right, bottom-left
    #[serde(default = "default_corners")]
    pub corners: [Point; 4],
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            corners: default_corners(),
        }
    }
}

impl CropConfig {
    /// Source corners in pixel coordinates for an image of the given size
    pub fn source_corners(&self, width: u32, height: u32) -> Quad {
        Quad {
            corners: self.corners.map(|p| p.to_pixels(width, height)),
        }
    }

    /// Store pixel corners as normalized coordinates
    pub fn set_from_pixels(&mut self, quad: &Quad, width: u32, height: u32) {
        self.corners = quad
            .corners
            .map(|p| Point::normalized_from_pixels(p.x, p.y, width, height));
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub rectify: RectifyOptions,

    #[serde(default)]
    pub crop: CropConfig,
}

impl Config {
    /// Load configuration from a file, or create default if it doesn't exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            tracing::info!("Created default configuration at {:?}", path);
            Ok(config)
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
