use crate::canvas::Canvas;
use crate::distance::{DistanceField, Mask};
use crate::settings::HalftoneSettings;
use crate::text::FontFace;
use glam::Vec2;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a grid cell's dot radius is derived from the rasterized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DotStrategy {
    /// Radius grows with Manhattan distance from the letter edge
    #[default]
    DistanceField,
    /// Radius proportional to sampled brightness; flatter letterforms
    Brightness,
}

impl DotStrategy {
    pub fn name(&self) -> &str {
        match self {
            DotStrategy::DistanceField => "Distance",
            DotStrategy::Brightness => "Brightness",
        }
    }

    pub fn next(&self) -> DotStrategy {
        match self {
            DotStrategy::DistanceField => DotStrategy::Brightness,
            DotStrategy::Brightness => DotStrategy::DistanceField,
        }
    }

    pub fn parse(s: &str) -> DotStrategy {
        match s.to_lowercase().as_str() {
            "brightness" | "bright" | "flat" => DotStrategy::Brightness,
            _ => DotStrategy::DistanceField,
        }
    }

    /// Turn the offscreen text buffer into whatever this strategy samples
    pub fn prepare(&self, offscreen: GrayImage) -> DotSource {
        match self {
            DotStrategy::DistanceField => {
                let field = DistanceField::compute(&Mask::from_luma(&offscreen));
                debug!(
                    width = field.width,
                    height = field.height,
                    max = field.max_distance(),
                    "distance field computed"
                );
                DotSource::Distance(field)
            }
            DotStrategy::Brightness => DotSource::Brightness(offscreen),
        }
    }
}

/// Per-draw sample data for one strategy
pub enum DotSource {
    Distance(DistanceField),
    Brightness(GrayImage),
}

impl DotSource {
    /// Un-eased dot radius for the pixel at (px, py); 0 means no dot
    pub fn dot_radius(&self, px: u32, py: u32, settings: &HalftoneSettings) -> f32 {
        let max_radius = settings.max_radius();
        match self {
            DotSource::Distance(field) => {
                let d = field.get(px as usize, py as usize);
                if d == 0 {
                    return 0.0;
                }
                max_radius.min(d as f32 * settings.distance_factor)
            }
            DotSource::Brightness(image) => {
                if px >= image.width() || py >= image.height() {
                    return 0.0;
                }
                max_radius * image.get_pixel(px, py).0[0] as f32 / 255.0
            }
        }
    }
}

/// One dot to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub center: Vec2,
    pub radius: f32,
}

/// Turns a text string into a halftone dot pattern.
///
/// The offscreen rasterization and strategy sample data are cached per
/// canvas size; only the dot radii change with reveal progress.
pub struct HalftoneRenderer {
    pub settings: HalftoneSettings,
    face: FontFace,
    cache: Option<(u32, u32, DotSource)>,
}

impl HalftoneRenderer {
    pub fn new(settings: HalftoneSettings, face: FontFace) -> Self {
        Self {
            settings,
            face,
            cache: None,
        }
    }

    pub fn set_settings(&mut self, settings: HalftoneSettings) {
        self.settings = settings;
        self.cache = None;
    }

    /// Rebuild the cached source if the canvas size changed
    fn prepare_source(&mut self, width: u32, height: u32) {
        let stale = !matches!(&self.cache, Some((w, h, _)) if *w == width && *h == height);
        if stale {
            self.cache = self.face.rasterize(&self.settings.text, width, height).map(|offscreen| {
                (width, height, self.settings.strategy.prepare(offscreen))
            });
        }
    }

    /// Dots for a `width` x `height` canvas at eased `progress`
    pub fn dots(&mut self, width: u32, height: u32, progress: f32) -> Vec<Dot> {
        let spacing = self.settings.spacing;
        if width == 0 || height == 0 || spacing <= 0.0 {
            return Vec::new();
        }
        self.prepare_source(width, height);
        let settings = &self.settings;
        let Some((_, _, source)) = &self.cache else {
            return Vec::new();
        };

        let cols = (width as f32 / spacing).ceil() as u32 + 1;
        let rows = (height as f32 / spacing).ceil() as u32 + 1;
        let mut dots = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let center = Vec2::new(
                    col as f32 * spacing + spacing / 2.0,
                    row as f32 * spacing + spacing / 2.0,
                );
                let px = (center.x.floor() as u32).min(width - 1);
                let py = (center.y.floor() as u32).min(height - 1);
                let base = source.dot_radius(px, py, settings);
                if base <= 0.0 {
                    continue;
                }
                let radius = base * progress;
                if radius < settings.min_visible_radius {
                    continue;
                }
                dots.push(Dot { center, radius });
            }
        }
        dots
    }

    /// Clear `canvas` and draw the pattern at eased `progress`
    pub fn draw(&mut self, canvas: &mut Canvas, progress: f32) {
        canvas.clear();
        let color = self.settings.dot_color;
        for dot in self.dots(canvas.width(), canvas.height(), progress) {
            canvas.fill_circle(dot.center, dot.radius, color, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn settings(strategy: DotStrategy) -> HalftoneSettings {
        HalftoneSettings {
            text: "HI".to_string(),
            spacing: 4.0,
            strategy,
            ..Default::default()
        }
    }

    #[test]
    fn test_distance_strategy_radius() {
        let s = settings(DotStrategy::DistanceField);
        let source = DotSource::Distance(DistanceField::compute(&Mask::from_rows(&[
            ".......", ".#####.", ".#####.", ".#####.", ".......",
        ])));
        assert_eq!(source.dot_radius(0, 0, &s), 0.0);
        assert!((source.dot_radius(1, 1, &s) - 0.7).abs() < 1e-6);
        // d = 2 at the centre, 1.4 < max radius 2.08
        assert!((source.dot_radius(3, 2, &s) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_distance_radius_capped() {
        let s = settings(DotStrategy::DistanceField);
        let mut rows = vec![".".repeat(22)];
        for _ in 0..20 {
            rows.push(format!(".{}.", "#".repeat(20)));
        }
        rows.push(".".repeat(22));
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let source = DotSource::Distance(DistanceField::compute(&Mask::from_rows(&refs)));
        assert!((source.dot_radius(10, 10, &s) - s.max_radius()).abs() < 1e-6);
    }

    #[test]
    fn test_brightness_strategy_radius() {
        let s = settings(DotStrategy::Brightness);
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(1, 0, Luma([255]));
        let source = DotSource::Brightness(img);
        assert_eq!(source.dot_radius(0, 0, &s), 0.0);
        assert!((source.dot_radius(1, 0, &s) - s.max_radius()).abs() < 1e-6);
        assert_eq!(source.dot_radius(5, 5, &s), 0.0);
    }

    #[test]
    fn test_progress_zero_draws_nothing() {
        for strategy in [DotStrategy::DistanceField, DotStrategy::Brightness] {
            let mut renderer = HalftoneRenderer::new(settings(strategy), FontFace::bold_mono());
            assert!(renderer.dots(80, 20, 0.0).is_empty());
            assert!(!renderer.dots(80, 20, 1.0).is_empty());
        }
    }

    #[test]
    fn test_radius_scales_with_progress() {
        let mut renderer =
            HalftoneRenderer::new(settings(DotStrategy::DistanceField), FontFace::bold_mono());
        let full = renderer.dots(80, 20, 1.0);
        let half = renderer.dots(80, 20, 0.5);
        assert!(half.len() <= full.len());
        let max_full = full.iter().map(|d| d.radius).fold(0.0f32, f32::max);
        let max_half = half.iter().map(|d| d.radius).fold(0.0f32, f32::max);
        assert!((max_half - max_full * 0.5).abs() < 1e-5);
        for dot in &full {
            assert!(dot.radius <= renderer.settings.max_radius() + 1e-6);
            assert!(dot.radius >= renderer.settings.min_visible_radius);
        }
    }

    #[test]
    fn test_source_cached_per_size() {
        let mut renderer =
            HalftoneRenderer::new(settings(DotStrategy::DistanceField), FontFace::bold_mono());
        let first = renderer.dots(80, 20, 1.0);
        assert!(matches!(renderer.cache, Some((80, 20, _))));
        assert_eq!(renderer.dots(80, 20, 1.0), first);

        let wider = renderer.dots(120, 20, 1.0);
        assert!(matches!(renderer.cache, Some((120, 20, _))));
        assert_ne!(wider, first);

        // New settings drop the cache and pick up the new text
        renderer.set_settings(HalftoneSettings {
            text: "OK".to_string(),
            ..renderer.settings.clone()
        });
        assert!(renderer.cache.is_none());
        assert_ne!(renderer.dots(120, 20, 1.0), wider);
    }

    #[test]
    fn test_zero_canvas_short_circuits() {
        let mut renderer =
            HalftoneRenderer::new(settings(DotStrategy::DistanceField), FontFace::bold_mono());
        assert!(renderer.dots(0, 20, 1.0).is_empty());
        assert!(renderer.dots(20, 0, 1.0).is_empty());
        let mut canvas = Canvas::new(0, 0);
        renderer.draw(&mut canvas, 1.0);
    }

    #[test]
    fn test_draw_uses_dot_color() {
        let mut renderer =
            HalftoneRenderer::new(settings(DotStrategy::Brightness), FontFace::bold_mono());
        let mut canvas = Canvas::new(80, 20);
        renderer.draw(&mut canvas, 1.0);
        let color = renderer.settings.dot_color;
        let painted = canvas
            .image()
            .pixels()
            .find(|p| p.0[3] == 255)
            .expect("some dot is fully covered");
        assert_eq!(&painted.0[..3], &[color.r, color.g, color.b]);
    }

    #[test]
    fn test_strategy_cycle_and_parse() {
        assert_eq!(DotStrategy::DistanceField.next(), DotStrategy::Brightness);
        assert_eq!(DotStrategy::Brightness.next(), DotStrategy::DistanceField);
        assert_eq!(DotStrategy::parse("flat"), DotStrategy::Brightness);
        assert_eq!(DotStrategy::parse("anything"), DotStrategy::DistanceField);
    }
}
