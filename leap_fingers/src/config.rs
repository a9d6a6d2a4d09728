//! Application configuration.
//!
//! Window placement is fixed at compile time; everything else can be
//! overridden from an optional TOML file whose keys mirror [`AppConfig`].

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::render::ColorA;
use crate::tracking::FingerFilter;

// ════════════════════════════════════════════════════════════════════════════
// Window geometry
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_X: isize = 50;
pub const WIN_Y: isize = 50;
pub const WIN_W: usize = 1280;
pub const WIN_H: usize = 700;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the frame presenter.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub font_name:      String,
    pub font_size:      f32,
    pub eye:            [f32; 3],
    pub target:         [f32; 3],
    pub fov_deg:        f32,
    pub near:           f32,
    pub far:            f32,
    /// Radius of each fingertip sphere, in tracking millimetres.
    pub sphere_radius:  f32,
    /// Material restored after the spheres are drawn (RGBA).
    pub restore_diffuse: [f32; 4],
    pub finger_filter:  FingerFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            font_name:       "YuGothic".to_string(),
            font_size:       20.0,
            eye:             [0.0, 250.0, 500.0],
            target:          [0.0, 250.0, 0.0],
            fov_deg:         45.0,
            near:            5.0,
            far:             3000.0,
            sphere_radius:   10.0,
            restore_diffuse: [0.8, 0.8, 0.8, 1.0],
            finger_filter:   FingerFilter::Index,
        }
    }
}

impl AppConfig {
    /// Read a TOML file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject camera values the projection cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(ConfigError::Invalid(format!("near must be > 0, got {}", self.near)));
        }
        if !(self.far.is_finite() && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "far must be > near ({}), got {}", self.near, self.far,
            )));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_deg must be in (0, 180), got {}", self.fov_deg,
            )));
        }
        Ok(())
    }

    pub fn restore_diffuse(&self) -> ColorA {
        let [r, g, b, a] = self.restore_diffuse;
        ColorA::new(r, g, b, a)
    }

    pub fn aspect_ratio() -> f32 { WIN_W as f32 / WIN_H as f32 }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = AppConfig::from_toml(
            "sphere_radius = 6.5\nfinger_filter = \"extended_index\"\n",
        ).unwrap();
        assert_eq!(cfg.sphere_radius, 6.5);
        assert_eq!(cfg.finger_filter, FingerFilter::ExtendedIndex);
        assert_eq!(cfg.font_size, 20.0);
        assert_eq!(cfg.eye, [0.0, 250.0, 500.0]);
    }

    #[test]
    fn bad_filter_name_is_parse_error() {
        let err = AppConfig::from_toml("finger_filter = \"pinky\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn coincident_clip_planes_are_rejected() {
        let err = AppConfig::from_toml("near = 10.0\nfar = 10.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_positive_near_is_rejected() {
        let err = AppConfig::from_toml("near = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn out_of_range_fov_is_rejected() {
        for fov in ["0.0", "180.0", "-30.0"] {
            let err = AppConfig::from_toml(&format!("fov_deg = {}", fov)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "fov_deg = {}", fov);
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "font_size = 32.0").unwrap();
        writeln!(file, "target = [0.0, 100.0, 0.0]").unwrap();
        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.font_size, 32.0);
        assert_eq!(cfg.target, [0.0, 100.0, 0.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load("/nonexistent/leap_fingers.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn restore_diffuse_defaults_to_grey() {
        assert_eq!(AppConfig::default().restore_diffuse(), ColorA::new(0.8, 0.8, 0.8, 1.0));
    }
}
