use crate::error::{DotfieldError, Result};
use crate::field::Mode;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Config file format version this build reads and writes
pub const CONFIG_VERSION: u32 = 1;

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Construction parameters of every component
    pub settings: Settings,
    /// Splash mode at startup
    pub mode: Mode,
}

impl AppConfig {
    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Import config from a JSON file; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        if config.version > CONFIG_VERSION {
            return Err(DotfieldError::Version {
                found: config.version,
                path: path.to_path_buf(),
            });
        }
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            settings: Settings::default(),
            mode: Mode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Palette, Rgb};
    use crate::halftone::DotStrategy;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_save_and_load() {
        let mut config = AppConfig::default();
        config.mode = Mode::Seek;
        config.settings.field.ball_radius = 40.0;
        config.settings.field.palette = Palette::Dusk;
        config.settings.halftone.text = "studio".to_string();
        config.settings.halftone.strategy = DotStrategy::Brightness;
        config.settings.breathing.dot_color = Rgb::new(1, 2, 3);

        let temp_file = NamedTempFile::new().unwrap();
        config.save_to_file(temp_file.path()).unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r##"{"settings": {"halftone": {"text": "hi", "dot_color": "#00ff00"}}}"##,
        )
        .unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.version, CONFIG_VERSION);
        assert_eq!(loaded.mode, Mode::Normal);
        assert_eq!(loaded.settings.halftone.text, "hi");
        assert_eq!(loaded.settings.halftone.dot_color, Rgb::new(0, 255, 0));
        assert_eq!(loaded.settings.halftone.spacing, 3.0);
        assert_eq!(loaded.settings.field, Default::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"version": 99}"#).unwrap();
        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(DotfieldError::Version { found: 99, .. })));
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(DotfieldError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(DotfieldError::Io(_))));
    }
}
