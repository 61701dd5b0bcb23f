//! Session configuration, loadable from YAML or JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use blockspace_author::BuildConfig;
use blockspace_feedback::FeedbackConfig;
use blockspace_locomotion::TeleportConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Initial placement of the ground, rig, head and controllers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    pub ground_half_extent: f32,
    pub rig_position: Vec3,
    /// Head offset from the rig.
    pub head_offset: Vec3,
    /// Right controller offset from the rig; the left one is mirrored in x.
    pub controller_offset: Vec3,
    /// Downward tilt of both controllers.
    pub controller_pitch_degrees: f32,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            ground_half_extent: 50.0,
            rig_position: Vec3::new(0.0, 0.0, 5.0),
            head_offset: Vec3::new(0.0, 1.6, 0.0),
            controller_offset: Vec3::new(0.3, 1.2, -0.4),
            controller_pitch_degrees: -45.0,
        }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub build: BuildConfig,
    pub teleport: TeleportConfig,
    pub feedback: FeedbackConfig,
    pub layout: SceneLayout,
}

impl SessionConfig {
    /// Load from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    /// Parse YAML without validating.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reject values that would break grid snapping, teleporting or scene
    /// layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.grid_size.is_nan() || self.build.grid_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "build.grid_size must be positive, got {}",
                self.build.grid_size
            )));
        }
        if !(0.0..1.0).contains(&self.teleport.threshold) {
            return Err(ConfigError::Invalid(format!(
                "teleport.threshold must be in [0, 1), got {}",
                self.teleport.threshold
            )));
        }
        if !self.teleport.distance.is_finite() || self.teleport.distance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "teleport.distance must be positive, got {}",
                self.teleport.distance
            )));
        }
        let finite = [
            ("build.block_half_height", self.build.block_half_height),
            ("build.feedback_lift", self.build.feedback_lift),
            ("teleport.ring_drop", self.teleport.ring_drop),
            ("layout.controller_pitch_degrees", self.layout.controller_pitch_degrees),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let offsets = [
            ("layout.rig_position", self.layout.rig_position),
            ("layout.head_offset", self.layout.head_offset),
            ("layout.controller_offset", self.layout.controller_offset),
        ];
        for (name, value) in offsets {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        if self.layout.ground_half_extent.is_nan() || self.layout.ground_half_extent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.ground_half_extent must be positive, got {}",
                self.layout.ground_half_extent
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
    fn defaults_match_session_constants() {
        let c = SessionConfig::default();
        assert_eq!(c.build.grid_size, 1.0);
        assert_eq!(c.build.block_half_height, 0.5);
        assert_eq!(c.teleport.distance, 2.0);
        assert_eq!(c.teleport.threshold, 0.8);
        assert_eq!(c.feedback.selection_ms, 1500);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = SessionConfig::from_yaml_str("teleport:\n  distance: 3.5\n").unwrap();
        assert_eq!(c.teleport.distance, 3.5);
        assert_eq!(c.teleport.threshold, 0.8);
        assert_eq!(c.feedback, FeedbackConfig::default());
    }

    #[test]
    fn load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"feedback": {{"placement_ms": 50}}, "layout": {{"rig_position": [1.0, 0.0, 2.0]}}}}"#).unwrap();
        let c = SessionConfig::load(file.path()).unwrap();
        assert_eq!(c.feedback.placement_ms, 50);
        assert_eq!(c.feedback.removal_ms, 300);
        assert_eq!(c.layout.rig_position, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "build:\n  grid_size: 2.0").unwrap();
        let c = SessionConfig::load(file.path()).unwrap();
        assert_eq!(c.build.grid_size, 2.0);
    }

    #[test]
    fn unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            SessionConfig::load(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        let c = SessionConfig::from_yaml_str("build:\n  grid_size: 0\n").unwrap();
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
        let c = SessionConfig::from_yaml_str("teleport:\n  threshold: 1.5\n").unwrap();
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn non_finite_values_rejected() {
        for yaml in [
            "build:\n  grid_size: .nan\n",
            "build:\n  block_half_height: .inf\n",
            "teleport:\n  distance: .nan\n",
            "teleport:\n  threshold: .nan\n",
            "layout:\n  rig_position: [0.0, .nan, 0.0]\n",
        ] {
            let c = SessionConfig::from_yaml_str(yaml).unwrap();
            assert!(
                matches!(c.validate(), Err(ConfigError::Invalid(_))),
                "accepted {yaml:?}"
            );
        }
    }
}
