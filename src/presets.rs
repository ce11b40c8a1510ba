use crate::error::{DotfieldError, Result};
use crate::settings::FieldSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A named set of particle field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub field: FieldSettings,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, field: FieldSettings) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            field,
        }
    }
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the platform config directory
    pub fn new() -> Self {
        Self::with_dir(Self::default_dir())
    }

    /// Built-ins plus user presets from `dir`, if any
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dotfield").join("presets"))
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load user presets from disk; unreadable files are skipped
    fn load_user_presets(&mut self) {
        let Some(dir) = self.dir.as_ref() else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(DotfieldError::from)
                .and_then(|content| Ok(serde_json::from_str::<Preset>(&content)?));
            match parsed {
                Ok(preset) => self.user.push(preset),
                Err(err) => warn!(path = %path.display(), %err, "skipping unreadable preset"),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = self.user.len(), "user presets loaded");
    }

    fn file_for(dir: &Path, name: &str) -> PathBuf {
        let filename = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        dir.join(format!("{}.json", filename))
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<PathBuf> {
        let dir = self.dir.clone().ok_or(DotfieldError::NoConfigDir)?;
        fs::create_dir_all(&dir)?;

        let path = Self::file_for(&dir, &preset.name);
        fs::write(&path, serde_json::to_string_pretty(&preset)?)?;

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }
        Ok(path)
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<()> {
        let dir = self.dir.clone().ok_or(DotfieldError::NoConfigDir)?;
        self.user.retain(|p| p.name != name);

        let path = Self::file_for(&dir, name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name, case-insensitively
    pub fn find(&self, name: &str) -> Result<&Preset> {
        self.all_presets()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DotfieldError::UnknownPreset(name.to_string()))
    }
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("Calm", "Gentle drift home, soft pointer push", FieldSettings::default()),
        Preset::new(
            "Springy",
            "Snappy return with overshoot around the pointer",
            FieldSettings {
                max_speed: 2.5,
                max_force: 0.3,
                slowing_radius: 12.0,
                flee_weight: 4.0,
                ..Default::default()
            },
        ),
        Preset::new(
            "Swarm",
            "Wide, fast ring in seek mode",
            FieldSettings {
                seek_max_speed: 4.0,
                seek_max_force: 0.5,
                ball_radius: 36.0,
                flee_radius: 28.0,
                ..Default::default()
            },
        ),
        Preset::new(
            "Dense",
            "Tight grid of small particles",
            FieldSettings {
                spacing: 4.0,
                particle_radius: 0.7,
                flee_radius: 14.0,
                ..Default::default()
            },
        ),
    ]
}
