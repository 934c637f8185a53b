//! Testbed configuration loaded from TOML
//!
//! Every section is optional; missing sections and keys fall back to the
//! engine defaults.

use std::fs;
use std::path::{Path, PathBuf};

use escher_core::CameraConfig;
use escher_physics::CharacterControllerConfig;
use escher_renderer::TraversalConfig;
use escher_world::CrossingConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the headless run is driven
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks: u64,
    /// Width over height of the virtual viewport
    pub aspect: f32,
    /// Walk forward every tick
    pub walk: bool,
    /// Rooms in the generated ring when no world file is given
    pub scene_rooms: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            aspect: 16.0 / 9.0,
            walk: false,
            scene_rooms: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    pub simulation: SimulationConfig,
    pub controller: CharacterControllerConfig,
    pub crossing: CrossingConfig,
    pub traversal: TraversalConfig,
    pub camera: CameraConfig,
}

impl TestbedConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.aspect.is_nan() || self.simulation.aspect <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "aspect must be positive, got {}",
                self.simulation.aspect
            )));
        }
        if self.simulation.scene_rooms == 0 {
            return Err(ConfigError::Invalid("scene needs at least one room".into()));
        }
        if self.traversal.max_depth == 0 {
            return Err(ConfigError::Invalid("traversal max_depth must be at least 1".into()));
        }
        if self.camera.z_near <= 0.0 || self.camera.z_far <= self.camera.z_near {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < z_near < z_far, got {} and {}",
                self.camera.z_near, self.camera.z_far
            )));
        }
        if self.camera.fov <= 0.0 || self.camera.fov >= std::f32::consts::PI {
            return Err(ConfigError::Invalid(format!(
                "camera fov must be inside (0, pi), got {}",
                self.camera.fov
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_is_default() {
        let config = TestbedConfig::from_toml_str("").unwrap();
        assert_eq!(config, TestbedConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = TestbedConfig::from_toml_str(
            r#"
[simulation]
ticks = 42
walk = true

[traversal]
max_depth = 6

[controller]
move_speed = 0.0625
"#,
        )
        .unwrap();

        assert_eq!(config.simulation.ticks, 42);
        assert!(config.simulation.walk);
        assert_eq!(config.simulation.scene_rooms, 4);
        assert_eq!(config.traversal.max_depth, 6);
        assert_eq!(config.traversal.stencil_bits, 8);
        assert_eq!(config.controller.move_speed, 0.0625);
        assert_eq!(config.controller.slide_iterations, 8);
        assert_eq!(config.crossing, CrossingConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = TestbedConfig::from_toml_str("[traversal]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TestbedConfig::from_toml_str("[simulation]\naspect = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TestbedConfig::from_toml_str("[simulation\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nz_far = 64.0").unwrap();

        let config = TestbedConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.z_far, 64.0);

        let missing = TestbedConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_written_config_loads_back() {
        let mut config = TestbedConfig::default();
        config.simulation.ticks = 7;
        config.traversal.stencil_bits = 4;
        let text = config.to_toml_string().unwrap();
        assert_eq!(TestbedConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = TestbedConfig::from_toml_str(include_str!("../config/testbed.toml")).unwrap();
        assert!(config.simulation.walk);
    }
}
