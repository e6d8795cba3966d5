use crate::anatomy::error::ConfigError;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub lighting: LightingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Tridosha Anatomy".to_string(),
            width: 1400,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: [f32; 3],
    pub target: [f32; 3],
    pub damping: f32,
    pub auto_rotate: bool,
    /// Radians per second.
    pub auto_rotate_speed: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            start_position: [0.0, 1.0, 16.0],
            target: [0.0, 0.0, 0.0],
            damping: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.21,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_distance: 4.0,
            max_distance: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    pub ambient_brightness: f32,
    pub directional_illuminance: f32,
    pub directional_position: [f32; 3],
    pub clear_color: (f32, f32, f32),
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            ambient_brightness: 600.0,
            directional_illuminance: 12_000.0,
            directional_position: [5.0, 10.0, 10.0],
            clear_color: (0.06, 0.07, 0.09),
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fov_degrees.is_finite() && self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(format!("fov_degrees must be in (0, 180), got {}", self.fov_degrees));
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(format!("near must be > 0, got {}", self.near));
        }
        if !(self.far.is_finite() && self.far > self.near) {
            return Err(format!("far must be greater than near, got {}", self.far));
        }
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(format!("min_distance must be > 0, got {}", self.min_distance));
        }
        if !(self.max_distance.is_finite() && self.max_distance >= self.min_distance) {
            return Err(format!(
                "max_distance ({}) must be >= min_distance ({})",
                self.max_distance, self.min_distance
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(format!("damping must be in (0, 1], got {}", self.damping));
        }
        let finite = [
            self.auto_rotate_speed,
            self.rotate_sensitivity,
            self.zoom_sensitivity,
        ]
        .iter()
        .chain(self.start_position.iter())
        .chain(self.target.iter())
        .all(|value| value.is_finite());
        if !finite {
            return Err("camera positions and speeds must be finite".to_string());
        }
        Ok(())
    }
}

pub fn parse_viewer_config(text: &str, path: &Path) -> Result<ViewerConfig, ConfigError> {
    let config = ron::de::from_str::<ViewerConfig>(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config
        .camera
        .validate()
        .map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
    Ok(config)
}

pub fn load_viewer_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_viewer_config(&text, path)
}

/// Reads `path`, falling back to built-in defaults on any error.
pub fn load_viewer_config_or_default(path: &Path) -> ViewerConfig {
    match load_viewer_config(path) {
        Ok(config) => {
            info!("loaded viewer config from {}", path.display());
            config
        }
        Err(err) => {
            warn!("falling back to built-in viewer config: {err}");
            ViewerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let text = r#"(
            window: (title: "Test", width: 800),
            camera: (auto_rotate: false),
        )"#;
        let config = parse_viewer_config(text, Path::new("inline.ron")).unwrap();

        assert_eq!(config.window.title, "Test");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, WindowSettings::default().height);
        assert!(!config.camera.auto_rotate);
        assert_eq!(config.lighting, LightingSettings::default());
    }

    #[test]
    fn malformed_config_reports_the_path() {
        let err = parse_viewer_config("(window: 12", Path::new("broken.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = PathBuf::from("config/definitely_not_here.ron");
        assert!(matches!(load_viewer_config(&path), Err(ConfigError::Read { .. })));
        assert_eq!(load_viewer_config_or_default(&path), ViewerConfig::default());
    }

    #[test]
    fn inverted_distance_limits_fall_back_to_defaults() {
        let text = "(camera: (min_distance: 70.0, max_distance: 60.0))";
        let err = parse_viewer_config(text, Path::new("inverted.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("max_distance"));

        let dir = std::env::temp_dir().join(format!("tridosha-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("inverted.ron");
        fs::write(&path, text).unwrap();
        assert_eq!(load_viewer_config_or_default(&path), ViewerConfig::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rejects_non_positive_near_plane() {
        let text = "(camera: (near: 0.0))";
        assert!(matches!(
            parse_viewer_config(text, Path::new("near.ron")),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn shipped_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::anatomy::CONFIG_PATH);
        let config = load_viewer_config(&path).unwrap();
        assert_eq!(config.camera.fov_degrees, 45.0);
    }
}
