use crate::canvas::Canvas;
use crate::color::ColorLut;
use crate::pointer::PointerState;
use crate::settings::FieldSettings;
use crate::steering;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::time::Duration;

/// Global behaviour shared by every particle in a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Oscillate around home, fleeing the pointer
    #[default]
    Normal,
    /// Converge on the pointer, held off at the ball radius
    Seek,
}

impl Mode {
    pub fn name(&self) -> &str {
        match self {
            Mode::Normal => "Normal",
            Mode::Seek => "Seek",
        }
    }

    pub fn toggled(&self) -> Mode {
        match self {
            Mode::Normal => Mode::Seek,
            Mode::Seek => Mode::Normal,
        }
    }
}

/// Pointer and mode, owned by the component and handed to each step
#[derive(Debug, Clone, Copy, Default)]
pub struct Interaction {
    pub pointer: PointerState,
    pub mode: Mode,
}

impl Interaction {
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }
}

/// One steering particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Anchor assigned at grid build time
    pub home: Vec2,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Column/row counts and the centring offset of a particle grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub offset: Vec2,
}

impl GridLayout {
    /// Grid that fully tiles a `width` x `height` canvas at `spacing`,
    /// centred with a symmetric offset. Empty for a zero-area canvas.
    pub fn new(width: f32, height: f32, spacing: f32) -> Self {
        if width <= 0.0 || height <= 0.0 || spacing <= 0.0 {
            return Self {
                cols: 0,
                rows: 0,
                offset: Vec2::ZERO,
            };
        }
        let cols = (width / spacing).ceil() as usize + 1;
        let rows = (height / spacing).ceil() as usize + 1;
        let offset = Vec2::new(
            (width - (cols - 1) as f32 * spacing) / 2.0,
            (height - (rows - 1) as f32 * spacing) / 2.0,
        );
        Self { cols, rows, offset }
    }

    pub fn len(&self) -> usize {
        self.cols * self.rows
    }
}

/// The splash screen's grid of steering particles
pub struct ParticleField {
    pub settings: FieldSettings,
    pub width: f32,
    pub height: f32,
    pub layout: GridLayout,
    particles: Vec<Particle>,
    lut: ColorLut,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(settings: FieldSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Field with a fixed random seed (reproducible initial velocities)
    pub fn with_seed(settings: FieldSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: FieldSettings, rng: StdRng) -> Self {
        let lut = settings.palette.build_lut();
        Self {
            settings,
            width: 0.0,
            height: 0.0,
            layout: GridLayout::new(0.0, 0.0, 1.0),
            particles: Vec::new(),
            lut,
            rng,
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Replace settings and rebuild at the current size
    pub fn set_settings(&mut self, settings: FieldSettings) {
        self.lut = settings.palette.build_lut();
        self.settings = settings;
        self.build_grid(self.width, self.height);
    }

    /// Discard every particle and lay out a fresh grid.
    ///
    /// Homes are a pure function of (width, height, spacing); only the
    /// initial velocity direction and magnitude are random.
    pub fn build_grid(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let spacing = self.settings.spacing;
        self.layout = GridLayout::new(width, height, spacing);

        let (min_speed, max_speed) = (
            self.settings.initial_speed_min,
            self.settings.initial_speed_max.max(self.settings.initial_speed_min),
        );
        self.particles = Vec::with_capacity(self.layout.len());
        for row in 0..self.layout.rows {
            for col in 0..self.layout.cols {
                let home = self.layout.offset + Vec2::new(col as f32, row as f32) * spacing;
                let angle = self.rng.gen_range(0.0..TAU);
                let speed = if max_speed > min_speed {
                    self.rng.gen_range(min_speed..max_speed)
                } else {
                    min_speed
                };
                self.particles.push(Particle {
                    home,
                    position: home,
                    velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
                });
            }
        }
        tracing::debug!(
            width,
            height,
            cols = self.layout.cols,
            rows = self.layout.rows,
            "particle grid rebuilt"
        );
    }

    /// Speed cap for a mode
    pub fn speed_cap(&self, mode: Mode) -> f32 {
        match mode {
            Mode::Normal => self.settings.max_speed,
            Mode::Seek => self.settings.seek_max_speed,
        }
    }

    /// Advance every particle by one frame
    pub fn step(&mut self, interaction: &Interaction) {
        let s = &self.settings;
        let pointer = interaction.pointer.position;
        let cap = self.speed_cap(interaction.mode);
        // Seek needs a target; without one the field drifts home instead
        let seeking = interaction.mode == Mode::Seek && interaction.pointer.is_present();

        for p in &mut self.particles {
            match interaction.mode {
                Mode::Seek if !seeking => {
                    p.velocity += steering::arrive(
                        p.position,
                        p.velocity,
                        p.home,
                        s.slowing_radius,
                        s.max_speed,
                        s.max_force,
                    );
                }
                Mode::Seek => {
                    let distance = p.position.distance(pointer);
                    let force = if distance < s.ball_radius {
                        steering::flee(
                            p.position,
                            p.velocity,
                            pointer,
                            s.ball_radius,
                            s.seek_max_speed,
                            s.seek_max_force,
                        )
                    } else {
                        steering::seek(
                            p.position,
                            p.velocity,
                            pointer,
                            s.seek_max_speed,
                            s.seek_max_force,
                        )
                    };
                    p.velocity += force;
                }
                Mode::Normal => {
                    let home = steering::arrive(
                        p.position,
                        p.velocity,
                        p.home,
                        s.slowing_radius,
                        s.max_speed,
                        s.max_force,
                    );
                    let away = steering::flee(
                        p.position,
                        p.velocity,
                        pointer,
                        s.flee_radius,
                        s.max_speed,
                        s.max_force,
                    ) * s.flee_weight;
                    // Summed without a combined clamp; the overshoot is what
                    // makes the field spring back and forth.
                    p.velocity += home + away;
                }
            }
            p.velocity = p.velocity.clamp_length_max(cap);
            p.position += p.velocity;
        }
    }

    /// Opacity of a particle at `position`: faded inside the central halo
    /// ellipse so text over the middle of the canvas stays legible
    pub fn opacity_at(&self, position: Vec2) -> f32 {
        let rx = self.width * self.settings.halo_radius_x;
        let ry = self.height * self.settings.halo_radius_y;
        if rx <= 0.0 || ry <= 0.0 {
            return 1.0;
        }
        let center = Vec2::new(self.width / 2.0, self.height / 2.0);
        let d = position - center;
        let e = ((d.x / rx).powi(2) + (d.y / ry).powi(2)).sqrt();
        if e >= 1.0 {
            return 1.0;
        }
        let min = self.settings.halo_min_alpha.clamp(0.0, 1.0);
        min + (1.0 - min) * e
    }

    /// Gradient direction at `elapsed` (one full turn per period)
    pub fn gradient_angle(&self, elapsed: Duration) -> f32 {
        let period = self.settings.gradient_period().as_secs_f32();
        TAU * (elapsed.as_secs_f32() % period) / period
    }

    /// Position along the rotated gradient, 0 at one edge and 1 at the other
    pub fn gradient_t(&self, position: Vec2, angle: f32) -> f32 {
        let dir = Vec2::new(angle.cos(), angle.sin());
        let half = (self.width * dir.x.abs() + self.height * dir.y.abs()) / 2.0;
        if half <= 0.0 {
            return 0.0;
        }
        let center = Vec2::new(self.width / 2.0, self.height / 2.0);
        (0.5 + (position - center).dot(dir) / (2.0 * half)).clamp(0.0, 1.0)
    }

    /// Clear the canvas and draw every particle
    pub fn render(&self, canvas: &mut Canvas, elapsed: Duration) {
        canvas.clear();
        if canvas.is_empty() || self.is_empty() {
            return;
        }
        let angle = self.gradient_angle(elapsed);
        for p in &self.particles {
            let color = self.lut.get(self.gradient_t(p.position, angle));
            canvas.fill_circle(
                p.position,
                self.settings.particle_radius,
                color,
                self.opacity_at(p.position),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{PointerEvent, OFF_CANVAS};

    fn field_100(spacing: f32, seed: u64) -> ParticleField {
        let settings = FieldSettings {
            spacing,
            ..Default::default()
        };
        let mut field = ParticleField::with_seed(settings, seed);
        field.build_grid(100.0, 100.0);
        field
    }

    fn interaction(mode: Mode, pointer: Vec2) -> Interaction {
        let mut i = Interaction {
            mode,
            ..Default::default()
        };
        i.pointer.apply(&PointerEvent::Move(pointer));
        i
    }

    #[test]
    fn test_grid_100_by_100_spacing_20() {
        let field = field_100(20.0, 1);
        assert_eq!(field.layout.cols, 6);
        assert_eq!(field.layout.rows, 6);
        assert_eq!(field.len(), 36);
        assert_eq!(field.layout.offset, Vec2::ZERO);
        assert_eq!(field.particles()[0].home, Vec2::ZERO);
        assert_eq!(field.particles()[35].home, Vec2::new(100.0, 100.0));
        for p in field.particles() {
            assert_eq!(p.position, p.home);
        }
    }

    #[test]
    fn test_grid_offset_is_symmetric() {
        let layout = GridLayout::new(90.0, 50.0, 20.0);
        // ceil(4.5)+1 = 6 columns spanning 100, ceil(2.5)+1 = 4 rows spanning 60
        assert_eq!((layout.cols, layout.rows), (6, 4));
        assert_eq!(layout.offset, Vec2::new(-5.0, -5.0));
    }

    #[test]
    fn test_homes_deterministic_velocities_random() {
        let a = field_100(20.0, 1);
        let b = field_100(20.0, 2);
        let homes_a: Vec<Vec2> = a.particles().iter().map(|p| p.home).collect();
        let homes_b: Vec<Vec2> = b.particles().iter().map(|p| p.home).collect();
        assert_eq!(homes_a, homes_b);
        assert!(a
            .particles()
            .iter()
            .zip(b.particles())
            .any(|(pa, pb)| pa.velocity != pb.velocity));

        // Rebuilding the same field gives the same homes again
        let mut c = field_100(20.0, 3);
        c.build_grid(100.0, 100.0);
        let homes_c: Vec<Vec2> = c.particles().iter().map(|p| p.home).collect();
        assert_eq!(homes_a, homes_c);
    }

    #[test]
    fn test_initial_speed_in_range() {
        let field = field_100(10.0, 7);
        let s = &field.settings;
        for p in field.particles() {
            let speed = p.velocity.length();
            assert!(speed >= s.initial_speed_min - 1e-4);
            assert!(speed <= s.initial_speed_max + 1e-4);
        }
    }

    #[test]
    fn test_zero_size_yields_empty_field() {
        let mut field = field_100(20.0, 1);
        field.build_grid(0.0, 80.0);
        assert!(field.is_empty());
        field.step(&interaction(Mode::Normal, Vec2::new(5.0, 5.0)));
        field.step(&interaction(Mode::Seek, Vec2::new(5.0, 5.0)));
        let mut canvas = Canvas::new(0, 80);
        field.render(&mut canvas, Duration::from_secs(1));
    }

    #[test]
    fn test_normal_mode_settles_home() {
        let mut field = field_100(20.0, 11);
        let input = Interaction::default();
        assert_eq!(input.pointer.position, OFF_CANVAS);
        for _ in 0..1500 {
            field.step(&input);
        }
        for p in field.particles() {
            assert!(p.position.distance(p.home) < 0.01);
            assert!(p.velocity.length() < 0.01);
        }
    }

    #[test]
    fn test_flee_pushes_away_then_returns() {
        let mut field = field_100(20.0, 5);
        let pointer = Vec2::new(50.0, 50.0);
        let near = interaction(Mode::Normal, pointer);
        for _ in 0..200 {
            field.step(&near);
        }
        // The particle at (40, 40) sits inside the flee radius and is pushed out
        let displaced = field
            .particles()
            .iter()
            .map(|p| p.position.distance(p.home))
            .fold(0.0f32, f32::max);
        assert!(displaced > 1.0);

        let idle = Interaction::default();
        for _ in 0..1500 {
            field.step(&idle);
        }
        for p in field.particles() {
            assert!(p.position.distance(p.home) < 0.01);
        }
    }

    #[test]
    fn test_seek_mode_forms_ring() {
        for pointer in [Vec2::new(50.0, 50.0), Vec2::new(30.0, 70.0), Vec2::new(83.0, 12.0)] {
            let mut field = field_100(20.0, 9);
            let s = field.settings.clone();
            let input = interaction(Mode::Seek, pointer);
            for _ in 0..600 {
                field.step(&input);
            }
            let band = s.seek_max_speed.powi(2) / (2.0 * s.seek_max_force) + 2.0 * s.seek_max_speed;
            let mut total = 0.0;
            let mut count = 0;
            for _ in 0..300 {
                field.step(&input);
                for p in field.particles() {
                    let d = p.position.distance(pointer);
                    assert!(d > s.ball_radius - band, "collapsed to {d}");
                    assert!(d < s.ball_radius + band, "escaped to {d}");
                    total += d;
                    count += 1;
                }
            }
            let mean = total / count as f32;
            assert!((mean - s.ball_radius).abs() < 3.0, "mean ring radius {mean}");
        }
    }

    #[test]
    fn test_seek_without_pointer_stays_home() {
        let mut field = field_100(20.0, 13);
        let mut input = Interaction::default();
        input.toggle_mode();
        assert_eq!(input.mode, Mode::Seek);
        assert!(!input.pointer.is_present());
        for _ in 0..600 {
            field.step(&input);
        }
        let drift = field
            .particles()
            .iter()
            .map(|p| p.position.distance(p.home))
            .fold(0.0f32, f32::max);
        assert!(drift < 1.0, "drifted {drift} from home");

        // Pointer leaving mid-seek brings the ring back home
        input.pointer.apply(&PointerEvent::Move(Vec2::new(50.0, 50.0)));
        for _ in 0..300 {
            field.step(&input);
        }
        input.pointer.apply(&PointerEvent::Leave);
        for _ in 0..1500 {
            field.step(&input);
        }
        for p in field.particles() {
            assert!(p.position.distance(p.home) < 0.5);
        }
    }

    #[test]
    fn test_velocity_never_exceeds_cap() {
        let mut field = field_100(10.0, 21);
        field.settings.flee_weight = 50.0;
        let pointers = [
            Vec2::new(50.0, 50.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(101.0, 37.0),
            OFF_CANVAS,
        ];
        let mut input = Interaction::default();
        for frame in 0..400 {
            if frame % 50 == 0 {
                input.toggle_mode();
            }
            input.pointer.apply(&PointerEvent::Move(pointers[frame % pointers.len()]));
            field.step(&input);
            let cap = field.speed_cap(input.mode);
            for p in field.particles() {
                assert!(p.velocity.length() <= cap + 1e-4);
            }
        }
    }

    #[test]
    fn test_mode_toggle() {
        let mut input = Interaction::default();
        assert_eq!(input.mode, Mode::Normal);
        input.toggle_mode();
        assert_eq!(input.mode, Mode::Seek);
        input.toggle_mode();
        assert_eq!(input.mode, Mode::Normal);
    }

    #[test]
    fn test_halo_opacity() {
        let field = field_100(20.0, 1);
        let min = field.settings.halo_min_alpha;
        assert!((field.opacity_at(Vec2::new(50.0, 50.0)) - min).abs() < 1e-6);
        assert_eq!(field.opacity_at(Vec2::new(0.0, 0.0)), 1.0);
        // Wider than tall: same offset is inside horizontally, outside vertically
        let horizontal = field.opacity_at(Vec2::new(70.0, 50.0));
        let vertical = field.opacity_at(Vec2::new(50.0, 70.0));
        assert!(horizontal < 1.0);
        assert_eq!(vertical, 1.0);
        // Linear in elliptical distance: halfway out is halfway faded
        let half = field.opacity_at(Vec2::new(50.0 + 16.0, 50.0));
        assert!((half - (min + (1.0 - min) * 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_gradient_rotates_over_period() {
        let field = field_100(20.0, 1);
        assert_eq!(field.gradient_angle(Duration::ZERO), 0.0);
        let quarter = field.gradient_angle(Duration::from_secs(15));
        assert!((quarter - TAU / 4.0).abs() < 1e-4);
        let wrapped = field.gradient_angle(Duration::from_secs(75));
        assert!((wrapped - quarter).abs() < 1e-3);

        // Angle 0 runs left to right
        assert_eq!(field.gradient_t(Vec2::new(0.0, 50.0), 0.0), 0.0);
        assert_eq!(field.gradient_t(Vec2::new(100.0, 50.0), 0.0), 1.0);
        assert!((field.gradient_t(Vec2::new(50.0, 50.0), 1.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_render_draws_particles() {
        let field = field_100(20.0, 1);
        let mut canvas = Canvas::new(100, 100);
        field.render(&mut canvas, Duration::ZERO);
        // Corner particle is outside the halo: fully opaque centre pixel
        assert!(canvas.pixel(0, 0).unwrap().0[3] > 100);
        // Between grid points stays clear
        assert_eq!(canvas.pixel(10, 10).unwrap().0[3], 0);
    }
}
