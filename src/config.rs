//! Demo configuration.
//!
//! Read from an optional JSON file; every field falls back to the built-in default, so an empty
//! object (or, via [`Config::load`] returning `None`, no file at all) gives the classic 640x480 "Hello World" window.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pulse::DEFAULT_STEP;

/// Which step of the progression to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Demo {
    /// Inline shaders, one triangle, direct array draw.
    Triangle,
    /// Vertex and index buffers for a quad with a pulsing colour.
    IndexedQuad,
    /// The quad again, with shaders read from the shader file.
    ShaderFile,
    /// A JSON mesh under an orthographic projection.
    Teapot,
}

/// Title and size of the demo window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hello World".to_string(),
            width: 640,
            height: 480,
        }
    }
}

/// Settings for one run of the demo binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window: WindowConfig,
    pub demo: Demo,
    /// Combined `#shader` file used by the file-based demos.
    pub shader_path: PathBuf,
    /// JSON mesh document drawn by the teapot demo.
    pub mesh_path: PathBuf,
    /// Per-frame step of the colour animation.
    pub pulse_step: f32,
    /// A `log` level name such as `info` or `debug`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            demo: Demo::Teapot,
            shader_path: PathBuf::from("res/Basic.shader"),
            mesh_path: PathBuf::from("res/teapot.json"),
            pulse_step: DEFAULT_STEP,
            log_level: "info".to_string(),
        }
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Loads `path`. `Ok(None)` means the file does not exist and the caller should fall back to
    /// [`Config::default`].
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => text.parse().map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| Error::Config(format!("unknown log level `{}`", self.log_level)))
    }

    fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }
        if !self.pulse_step.is_finite() || self.pulse_step <= 0.0 {
            return Err(Error::Config(format!(
                "pulse_step must be a positive number, got {}",
                self.pulse_step
            )));
        }
        self.log_level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = "{}".parse().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.demo, Demo::Teapot);
    }

    #[test]
    fn test_partial_override() {
        let config: Config = r#"{ "demo": "indexed-quad", "window": { "width": 800 } }"#
            .parse()
            .unwrap();
        assert_eq!(config.demo, Demo::IndexedQuad);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.window.title, "Hello World");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!("{ \"pulse_step\": 0.0 }".parse::<Config>(), Err(Error::Config(_))));
        assert!(matches!(
            "{ \"window\": { \"height\": 0 } }".parse::<Config>(),
            Err(Error::Config(_))
        ));
        assert!(matches!("{ \"log_level\": \"loud\" }".parse::<Config>(), Err(Error::Config(_))));
        assert!(matches!("{ \"demo\": \"cube\" }".parse::<Config>(), Err(Error::Config(_))));
        assert!(matches!("{ \"fullscreen\": true }".parse::<Config>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load(dir.path().join("glsteps.json")).unwrap();
        assert_eq!(loaded, None);
        assert_eq!(loaded.unwrap_or_default(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glsteps.json");
        std::fs::write(&path, r#"{ "demo": "triangle", "log_level": "debug" }"#).unwrap();

        let config = Config::load(&path).unwrap().unwrap();
        assert_eq!(config.demo, Demo::Triangle);
        assert_eq!(config.log_level().unwrap(), log::LevelFilter::Debug);
    }
}
