use crate::color::{Palette, Rgb};
use crate::halftone::DotStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction-time parameters of the splash particle field.
///
/// Distances are in canvas pixels (one Braille dot in the terminal),
/// speeds in pixels per frame and forces in pixels per frame squared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    // === Grid ===
    /// Distance between neighbouring home positions
    pub spacing: f32,
    /// Radius of each rendered particle
    pub particle_radius: f32,
    /// Initial random speed range
    pub initial_speed_min: f32,
    pub initial_speed_max: f32,

    // === Normal mode ===
    /// Speed cap in normal mode
    pub max_speed: f32,
    /// Per-behaviour steering clamp in normal mode
    pub max_force: f32,
    /// Arrive decelerates linearly inside this distance from home
    pub slowing_radius: f32,
    /// Flee only acts within this distance of the pointer
    pub flee_radius: f32,
    /// Multiplier applied to the clamped flee force
    pub flee_weight: f32,

    // === Seek mode ===
    /// Speed cap in seek mode
    pub seek_max_speed: f32,
    /// Steering clamp in seek mode
    pub seek_max_force: f32,
    /// Particles closer than this to the pointer are pushed back out
    pub ball_radius: f32,

    // === Visual ===
    /// Halo ellipse radii as fractions of canvas width/height
    pub halo_radius_x: f32,
    pub halo_radius_y: f32,
    /// Opacity at the very centre of the halo
    pub halo_min_alpha: f32,
    /// Seconds for one full turn of the gradient
    pub gradient_period_secs: f32,
    pub palette: Palette,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            spacing: 6.0,
            particle_radius: 0.9,
            initial_speed_min: 0.5,
            initial_speed_max: 1.5,

            max_speed: 1.5,
            max_force: 0.15,
            slowing_radius: 30.0,
            flee_radius: 18.0,
            flee_weight: 3.0,

            seek_max_speed: 3.0,
            seek_max_force: 0.4,
            ball_radius: 24.0,

            halo_radius_x: 0.32,
            halo_radius_y: 0.2,
            halo_min_alpha: 0.06,
            gradient_period_secs: 60.0,
            palette: Palette::default(),
        }
    }
}

impl FieldSettings {
    pub fn adjust_spacing(&mut self, delta: f32) {
        self.spacing = (self.spacing + delta).clamp(3.0, 40.0);
    }

    pub fn adjust_particle_radius(&mut self, delta: f32) {
        self.particle_radius = (self.particle_radius + delta).clamp(0.3, 6.0);
    }

    pub fn adjust_max_speed(&mut self, delta: f32) {
        self.max_speed = (self.max_speed + delta).clamp(0.2, 10.0);
    }

    pub fn adjust_seek_max_speed(&mut self, delta: f32) {
        self.seek_max_speed = (self.seek_max_speed + delta).clamp(0.2, 20.0);
    }

    pub fn adjust_flee_radius(&mut self, delta: f32) {
        self.flee_radius = (self.flee_radius + delta).clamp(0.0, 120.0);
    }

    pub fn adjust_flee_weight(&mut self, delta: f32) {
        self.flee_weight = (self.flee_weight + delta).clamp(0.0, 10.0);
    }

    pub fn adjust_ball_radius(&mut self, delta: f32) {
        self.ball_radius = (self.ball_radius + delta).clamp(4.0, 120.0);
    }

    /// One full gradient turn
    pub fn gradient_period(&self) -> Duration {
        Duration::from_secs_f32(self.gradient_period_secs.max(0.001))
    }
}

/// Construction-time parameters of the halftone wordmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalftoneSettings {
    pub text: String,
    pub dot_color: Rgb,
    /// Distance between dot centres
    pub spacing: f32,
    /// Largest dot radius as a fraction of spacing
    pub max_radius_ratio: f32,
    /// Radius gained per unit of edge distance (distance-field strategy)
    pub distance_factor: f32,
    /// Dots smaller than this are not drawn
    pub min_visible_radius: f32,
    /// Length of the reveal animation
    pub duration_ms: u64,
    /// Visible fraction that starts the reveal
    pub visibility_threshold: f32,
    /// Canvas height as a fraction of its width
    pub height_ratio: f32,
    pub strategy: DotStrategy,
}

impl Default for HalftoneSettings {
    fn default() -> Self {
        Self {
            text: "supomelo".to_string(),
            dot_color: Rgb::new(0xFF, 0x77, 0x4D),
            spacing: 3.0,
            max_radius_ratio: 0.52,
            distance_factor: 0.7,
            min_visible_radius: 0.3,
            duration_ms: 1400,
            visibility_threshold: 0.2,
            height_ratio: 0.2,
            strategy: DotStrategy::default(),
        }
    }
}

impl HalftoneSettings {
    pub fn max_radius(&self) -> f32 {
        self.spacing * self.max_radius_ratio
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn adjust_spacing(&mut self, delta: f32) {
        self.spacing = (self.spacing + delta).clamp(2.0, 24.0);
    }

    pub fn adjust_duration(&mut self, delta_ms: i64) {
        self.duration_ms = (self.duration_ms as i64 + delta_ms).clamp(100, 10_000) as u64;
    }
}

/// Construction-time parameters of the breathing background grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingSettings {
    pub dot_color: Rgb,
    pub spacing: f32,
    /// Dot radius at rest
    pub base_radius: f32,
    /// Dots within this distance of the pointer swell
    pub proximity_radius: f32,
}

impl Default for BreathingSettings {
    fn default() -> Self {
        Self {
            dot_color: Rgb::new(0xD4, 0xD4, 0xD4),
            spacing: 6.0,
            base_radius: 0.6,
            proximity_radius: 40.0,
        }
    }
}

impl BreathingSettings {
    pub fn adjust_spacing(&mut self, delta: f32) {
        self.spacing = (self.spacing + delta).clamp(3.0, 40.0);
    }
}

/// Everything the page needs to build its components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field: FieldSettings,
    pub halftone: HalftoneSettings,
    pub breathing: BreathingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_clamps() {
        let mut field = FieldSettings::default();
        field.adjust_spacing(-100.0);
        assert_eq!(field.spacing, 3.0);
        field.adjust_flee_weight(100.0);
        assert_eq!(field.flee_weight, 10.0);
        field.adjust_ball_radius(-1000.0);
        assert_eq!(field.ball_radius, 4.0);

        let mut halftone = HalftoneSettings::default();
        halftone.adjust_duration(-5000);
        assert_eq!(halftone.duration_ms, 100);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "field": { "spacing": 12.0 }, "halftone": { "text": "studio" } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.field.spacing, 12.0);
        assert_eq!(settings.field.max_speed, FieldSettings::default().max_speed);
        assert_eq!(settings.halftone.text, "studio");
        assert_eq!(settings.breathing, BreathingSettings::default());
    }

    #[test]
    fn test_halftone_derived_values() {
        let halftone = HalftoneSettings {
            spacing: 10.0,
            ..Default::default()
        };
        assert!((halftone.max_radius() - 5.2).abs() < 1e-6);
        assert_eq!(halftone.duration(), Duration::from_millis(1400));
    }
}
