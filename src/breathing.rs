use crate::canvas::Canvas;
use crate::settings::BreathingSettings;
use glam::Vec2;

/// Background grid of dots that swell in a slow rolling wave and brighten
/// near the pointer
pub struct BreathingGrid {
    pub settings: BreathingSettings,
}

/// Radius and alpha of one dot at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingDot {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

impl BreathingGrid {
    pub fn new(settings: BreathingSettings) -> Self {
        Self { settings }
    }

    /// Dot `(col, row)` at `t` seconds with the pointer at `pointer`
    pub fn dot(&self, col: u32, row: u32, t: f32, pointer: Vec2) -> BreathingDot {
        let spacing = self.settings.spacing;
        let center = Vec2::new(
            col as f32 * spacing + spacing / 2.0,
            row as f32 * spacing + spacing / 2.0,
        );
        let wave =
            ((col as f32 * 0.45 + t * 0.7).sin() * (row as f32 * 0.45 + t * 0.5).cos() + 1.0) / 2.0;
        let proximity = if self.settings.proximity_radius > 0.0 {
            (1.0 - pointer.distance(center) / self.settings.proximity_radius).max(0.0)
        } else {
            0.0
        };
        let radius = self.settings.base_radius * (0.4 + wave * 0.9 + proximity * 2.5);
        let alpha = (0.12 + wave * 0.38 + proximity * 0.55).min(1.0);
        BreathingDot {
            center,
            radius: radius.max(0.1),
            alpha,
        }
    }

    pub fn render(&self, canvas: &mut Canvas, t: f32, pointer: Vec2) {
        canvas.clear();
        let spacing = self.settings.spacing;
        if canvas.is_empty() || spacing <= 0.0 {
            return;
        }
        let cols = (canvas.width() as f32 / spacing).ceil() as u32 + 1;
        let rows = (canvas.height() as f32 / spacing).ceil() as u32 + 1;
        let color = self.settings.dot_color;
        for row in 0..rows {
            for col in 0..cols {
                let dot = self.dot(col, row, t, pointer);
                canvas.fill_circle(dot.center, dot.radius, color, dot.alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::OFF_CANVAS;

    #[test]
    fn test_wave_bounds_without_pointer() {
        let grid = BreathingGrid::new(BreathingSettings::default());
        let base = grid.settings.base_radius;
        for t in [0.0, 1.3, 17.0] {
            for col in 0..10 {
                for row in 0..10 {
                    let dot = grid.dot(col, row, t, OFF_CANVAS);
                    assert!(dot.radius >= base * 0.4 - 1e-5);
                    assert!(dot.radius <= base * 1.3 + 1e-5);
                    assert!(dot.alpha >= 0.12 - 1e-5 && dot.alpha <= 0.5 + 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_pointer_boosts_nearby_dot() {
        let grid = BreathingGrid::new(BreathingSettings::default());
        let idle = grid.dot(3, 3, 2.0, OFF_CANVAS);
        let hovered = grid.dot(3, 3, 2.0, idle.center);
        assert!((hovered.radius - (idle.radius + grid.settings.base_radius * 2.5)).abs() < 1e-5);
        assert!(hovered.alpha > idle.alpha);
        assert!(hovered.alpha <= 1.0);
    }

    #[test]
    fn test_render_tolerates_empty_canvas() {
        let grid = BreathingGrid::new(BreathingSettings::default());
        let mut canvas = Canvas::new(0, 10);
        grid.render(&mut canvas, 0.0, OFF_CANVAS);
        let mut canvas = Canvas::new(30, 30);
        grid.render(&mut canvas, 0.0, OFF_CANVAS);
        assert!(canvas.image().pixels().any(|p| p.0[3] > 0));
    }
}
