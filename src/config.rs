//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! runnable setup that uses only the built-in procedural assets.
//!
//! ```toml
//! start_mode = "mapping"
//! obj_path = "assets/bunny.obj"
//! supersampling = 2
//!
//! [window]
//! width = 1024
//! height = 768
//!
//! [textures]
//! earth = "textures/earth.png"
//!
//! [environments]
//! bridge = "textures/bridge"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::camera::DEFAULT_FAR;
use crate::configurator::DemoMode;
use crate::error::ConfigError;
use crate::render::SHADOW_MAP_SIZE;
use crate::supersample::SampleLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "shadelab".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Mode name or index, see [`DemoMode::parse`].
    pub start_mode: String,
    /// Mesh shown for the "imported" object kind.
    pub obj_path: Option<PathBuf>,
    /// Image files selectable as texture, normal or displacement maps.
    pub textures: BTreeMap<String, PathBuf>,
    /// Directories holding the six faces of a cube map.
    pub environments: BTreeMap<String, PathBuf>,
    /// Replacement images for the visible mip chain, finest first.
    pub visible_mips: Option<Vec<PathBuf>>,
    /// Far plane used by the logarithmic depth buffer.
    pub depth_far: f32,
    /// Texels along each face of the light's shadow map.
    pub shadow_map_size: u32,
    /// Start-up supersampling level; fractions truncate, out-of-range
    /// values clamp.
    pub supersampling: Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            start_mode: DemoMode::default().name().to_string(),
            obj_path: None,
            textures: BTreeMap::new(),
            environments: BTreeMap::new(),
            visible_mips: None,
            depth_far: DEFAULT_FAR,
            shadow_map_size: SHADOW_MAP_SIZE,
            supersampling: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The configured start-up supersampling level, if any.
    pub fn supersampling(&self) -> Option<SampleLevel> {
        self.supersampling.map(SampleLevel::from_f32)
    }

    /// The configured start mode.
    pub fn start_mode(&self) -> Result<DemoMode, ConfigError> {
        DemoMode::parse(&self.start_mode)
            .ok_or_else(|| ConfigError::UnknownMode(self.start_mode.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.start_mode().unwrap(), DemoMode::Illumination);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            start_mode = "aliasing"

            [window]
            width = 320

            [textures]
            earth = "textures/earth.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 320);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.start_mode().unwrap(), DemoMode::Aliasing);
        assert_eq!(config.textures["earth"], PathBuf::from("textures/earth.png"));
        assert!(config.environments.is_empty());
    }

    #[test]
    fn supersampling_clamps_into_range() {
        assert_eq!(AppConfig::default().supersampling(), None);
        let config = AppConfig::from_toml("supersampling = 2.7").unwrap();
        assert_eq!(config.supersampling(), Some(SampleLevel::new(2)));
        let config = AppConfig::from_toml("supersampling = 40").unwrap();
        assert_eq!(config.supersampling(), Some(SampleLevel::new(5)));
        let config = AppConfig::from_toml("supersampling = -1\nshadow_map_size = 128").unwrap();
        assert_eq!(config.supersampling(), Some(SampleLevel::new(0)));
        assert_eq!(config.shadow_map_size, 128);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            AppConfig::from_toml("window = 3"),
            Err(ConfigError::Parse(_))
        ));
        let config = AppConfig {
            start_mode: "torus".into(),
            ..Default::default()
        };
        assert!(matches!(config.start_mode(), Err(ConfigError::UnknownMode(_))));
        assert!(matches!(
            AppConfig::load("/nonexistent/shadelab.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
