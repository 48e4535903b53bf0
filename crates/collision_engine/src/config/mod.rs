//! Configuration system
//!
//! [`CollisionConfig`] carries the tunables of the collision core. Like every
//! [`Config`] it can be loaded from and saved to `.toml` or `.ron` files.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// On-disk formats a [`Config`] can be stored in, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format for `path`, from its extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Default number of hit infos each keeper can hold per query
pub const DEFAULT_STRIKE_INFO_CAPACITY: usize = 32;

/// Default tolerance for "the three axis scales are equal" and scale-change checks
pub const DEFAULT_EQUAL_SCALE_TOLERANCE: f32 = 0.001;

/// Tunables for the collision director and everything it creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Capacity of each keeper's shared hit-info buffer.
    ///
    /// A line query stops collecting once this many hits were written, so
    /// the closest hit is only guaranteed when fewer candidates exist.
    pub strike_info_capacity: usize,

    /// Tolerance used by the scale normalization policies
    pub equal_scale_tolerance: f32,

    /// Probe length used by `calc_map_ground_default`
    pub ground_probe_height: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            strike_info_capacity: DEFAULT_STRIKE_INFO_CAPACITY,
            equal_scale_tolerance: DEFAULT_EQUAL_SCALE_TOLERANCE,
            ground_probe_height: 1000.0,
        }
    }
}

impl Config for CollisionConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: CollisionConfig = toml::from_str("strike_info_capacity = 8").unwrap();

        assert_eq!(config.strike_info_capacity, 8);
        assert_eq!(config.equal_scale_tolerance, DEFAULT_EQUAL_SCALE_TOLERANCE);
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("collision_config_{}.ron", std::process::id()));
        let config = CollisionConfig {
            strike_info_capacity: 64,
            ..Default::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = CollisionConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("collision.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("dir/collision.ron")).unwrap(), ConfigFormat::Ron);
        assert!(ConfigFormat::from_path(Path::new("collision")).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = CollisionConfig::default().save_to_file("collision.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
