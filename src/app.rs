use crate::braille;
use crate::clock::FrameClock;
use crate::config::AppConfig;
use crate::export;
use crate::pointer::{to_local, PointerEvent};
use crate::scene::{BreathingScene, HalftoneScene, Scene, SplashScene};
use crate::settings::Settings;
use crate::text::FontFace;
use glam::Vec2;
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, trace, warn};

/// The three stacked sections of the page, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Splash,
    Studio,
    Footer,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Splash, Section::Studio, Section::Footer];
}

/// Height in terminal rows of each page section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageLayout {
    pub splash: u16,
    pub studio: u16,
    pub footer: u16,
}

impl PageLayout {
    /// Splash and studio fill the viewport; the footer keeps the wordmark's
    /// aspect ratio (`footer_ratio` = canvas height / width)
    pub fn new(cols: u16, rows: u16, footer_ratio: f32) -> Self {
        let (width, _) = braille::canvas_size(cols, 0);
        let footer_px = (width as f32 * footer_ratio.max(0.0)).ceil();
        let footer = ((footer_px / 4.0).ceil() as u16).clamp(1, rows.max(1));
        Self {
            splash: rows,
            studio: rows,
            footer,
        }
    }

    pub fn rows(&self, section: Section) -> u16 {
        match section {
            Section::Splash => self.splash,
            Section::Studio => self.studio,
            Section::Footer => self.footer,
        }
    }

    /// First page row of a section
    pub fn top(&self, section: Section) -> u16 {
        match section {
            Section::Splash => 0,
            Section::Studio => self.splash,
            Section::Footer => self.splash + self.studio,
        }
    }

    pub fn total(&self) -> u16 {
        self.splash + self.studio + self.footer
    }

    pub fn section_at(&self, page_row: u16) -> Option<Section> {
        Section::ALL.into_iter().find(|&s| {
            let top = self.top(s);
            page_row >= top && page_row < top + self.rows(s)
        })
    }
}

/// Fraction of the span `[top, top + rows)` inside the viewport
/// `[scroll, scroll + view)`
pub fn visible_fraction(top: u16, rows: u16, scroll: u16, view: u16) -> f32 {
    if rows == 0 {
        return 0.0;
    }
    let start = top.max(scroll);
    let end = (top + rows).min(scroll.saturating_add(view));
    end.saturating_sub(start) as f32 / rows as f32
}

/// Focus state for parameter editing in the sidebar
/// Alphabetically ordered for consistent UI display
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    BallRadius,
    Duration,
    FleeRadius,
    FleeWeight,
    GridSpacing,
    HalftoneSpacing,
    MaxSpeed,
    Palette,
    ParticleRadius,
    SeekSpeed,
    Spacing,
    Strategy,
    // Controls box (not a param)
    Controls,
}

const PARAMS: [Focus; 12] = [
    Focus::BallRadius,
    Focus::Duration,
    Focus::FleeRadius,
    Focus::FleeWeight,
    Focus::GridSpacing,
    Focus::HalftoneSpacing,
    Focus::MaxSpeed,
    Focus::Palette,
    Focus::ParticleRadius,
    Focus::SeekSpeed,
    Focus::Spacing,
    Focus::Strategy,
];

impl Focus {
    /// Tab cycles through parameters in alphabetical order
    pub fn next(&self) -> Focus {
        match PARAMS.iter().position(|f| f == self) {
            Some(i) => PARAMS[(i + 1) % PARAMS.len()],
            None => PARAMS[0],
        }
    }

    /// Shift+Tab cycles through parameters in reverse alphabetical order
    pub fn prev(&self) -> Focus {
        match PARAMS.iter().position(|f| f == self) {
            Some(0) | None => PARAMS[PARAMS.len() - 1],
            Some(i) => PARAMS[i - 1],
        }
    }

    /// Line index in the parameters box
    pub fn line_index(&self) -> u16 {
        PARAMS.iter().position(|f| f == self).unwrap_or(0) as u16
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state: the page, its three components and the UI
pub struct App {
    pub settings: Settings,
    pub splash: SplashScene,
    pub studio: BreathingScene,
    pub footer: HalftoneScene,
    pub clock: FrameClock,
    pub layout: PageLayout,
    /// On-screen canvas rectangle, excluding borders
    pub area: Rect,
    pub scroll: u16,
    pub focus: Focus,
    pub paused: bool,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    pub fps: f32,
    pub status_message: Option<String>,
    pub snapshot_dir: PathBuf,
    pending_fonts: Option<FontFace>,
    hovered: Option<Section>,
    fps_frames: u32,
    fps_since: Duration,
}

impl App {
    pub fn new(config: AppConfig, area: Rect) -> Self {
        let settings = config.settings;
        let mut splash = SplashScene::new(settings.field.clone());
        splash.interaction.mode = config.mode;
        let mut app = Self {
            splash,
            studio: BreathingScene::new(settings.breathing.clone()),
            footer: HalftoneScene::new(settings.halftone.clone()),
            layout: PageLayout::new(area.width, area.height, settings.halftone.height_ratio),
            settings,
            clock: FrameClock::new(),
            area,
            scroll: 0,
            focus: Focus::Controls,
            paused: false,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            fps: 0.0,
            status_message: None,
            snapshot_dir: PathBuf::from("."),
            // Delivered on the first tick, like an async font load
            pending_fonts: Some(FontFace::bold_mono()),
            hovered: None,
            fps_frames: 0,
            fps_since: Duration::ZERO,
        };
        app.mount_all();
        app
    }

    fn for_each_scene(&mut self, mut f: impl FnMut(Section, &mut dyn Scene, &mut FrameClock)) {
        f(Section::Splash, &mut self.splash, &mut self.clock);
        f(Section::Studio, &mut self.studio, &mut self.clock);
        f(Section::Footer, &mut self.footer, &mut self.clock);
    }

    fn scene_mut(&mut self, section: Section) -> &mut dyn Scene {
        match section {
            Section::Splash => &mut self.splash,
            Section::Studio => &mut self.studio,
            Section::Footer => &mut self.footer,
        }
    }

    pub fn scene(&self, section: Section) -> &dyn Scene {
        match section {
            Section::Splash => &self.splash,
            Section::Studio => &self.studio,
            Section::Footer => &self.footer,
        }
    }

    fn mount_all(&mut self) {
        let (layout, cols) = (self.layout, self.area.width);
        self.for_each_scene(|section, scene, clock| {
            let (w, h) = braille::canvas_size(cols, layout.rows(section));
            scene.mount(w, h, clock);
        });
        self.update_visibility();
    }

    /// Tear every component down, cancelling pending frames
    pub fn shutdown(&mut self) {
        self.for_each_scene(|_, scene, clock| scene.unmount(clock));
        info!(frames = self.clock.frames(), "page torn down");
    }

    /// Advance one frame of the clock
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        if let Some(face) = self.pending_fonts.take() {
            let now = self.clock.now();
            self.footer.fonts_ready(&face, now);
        }
        let tick = self.clock.tick();
        trace!(fired = tick.fired_count(), "frame");
        self.for_each_scene(|_, scene, clock| scene.frame(&tick, clock));
        self.count_frame(tick.now);
    }

    fn count_frame(&mut self, now: Duration) {
        self.fps_frames += 1;
        let elapsed = now.saturating_sub(self.fps_since);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frames as f32 / elapsed.as_secs_f32();
            self.fps_frames = 0;
            self.fps_since = now;
        }
    }

    /// Canvas moved or changed size on screen
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.layout = PageLayout::new(area.width, area.height, self.settings.halftone.height_ratio);
        self.scroll = self.scroll.min(self.max_scroll());
        let (layout, cols, now) = (self.layout, area.width, self.clock.now());
        self.for_each_scene(|section, scene, _| {
            let (w, h) = braille::canvas_size(cols, layout.rows(section));
            scene.resize(w, h, now);
        });
        self.update_visibility();
    }

    pub fn max_scroll(&self) -> u16 {
        self.layout.total().saturating_sub(self.area.height)
    }

    /// Scroll the page by `delta` rows
    pub fn scroll_by(&mut self, delta: i32) {
        let target = (self.scroll as i32 + delta).clamp(0, self.max_scroll() as i32) as u16;
        if target != self.scroll {
            self.scroll = target;
            self.update_visibility();
        }
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.area.height.max(1) as i32);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.area.height.max(1) as i32));
    }

    fn update_visibility(&mut self) {
        let (layout, scroll, view, now) = (self.layout, self.scroll, self.area.height, self.clock.now());
        self.for_each_scene(|section, scene, clock| {
            if !scene.is_mounted() {
                return;
            }
            let fraction = visible_fraction(layout.top(section), layout.rows(section), scroll, view);
            scene.visibility(fraction, now, clock);
        });
    }

    /// Section under the middle of the viewport
    pub fn section_in_view(&self) -> Section {
        self.layout
            .section_at(self.scroll + self.area.height / 2)
            .unwrap_or(Section::Footer)
    }

    /// Map a screen cell to its section and canvas-local dot coordinates
    pub fn hit_test(&self, column: u16, row: u16) -> Option<(Section, Vec2)> {
        let area = self.area;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let view_row = row - area.y;
        let section = self.layout.section_at(self.scroll + view_row)?;
        // Dot at the centre of the cell, relative to the viewport
        let client = Vec2::new(
            (column - area.x) as f32 * 2.0 + 1.0,
            view_row as f32 * 4.0 + 2.0,
        );
        let offset = Vec2::new(
            0.0,
            (self.layout.top(section) as f32 - self.scroll as f32) * 4.0,
        );
        Some((section, to_local(client, offset)))
    }

    fn route_pointer(&mut self, column: u16, row: u16, make: impl FnOnce(Vec2) -> PointerEvent) {
        let Some((section, local)) = self.hit_test(column, row) else {
            self.pointer_left();
            return;
        };
        if self.hovered != Some(section) {
            self.pointer_left();
            self.hovered = Some(section);
        }
        let scene = self.scene_mut(section);
        if scene.is_mounted() {
            scene.pointer(make(local));
        }
    }

    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        self.route_pointer(column, row, PointerEvent::Move);
    }

    /// Drag with a button held: the terminal's stand-in for a touch move
    pub fn pointer_dragged(&mut self, column: u16, row: u16) {
        self.route_pointer(column, row, |p| PointerEvent::Touch(vec![p]));
    }

    pub fn pointer_pressed(&mut self, column: u16, row: u16) {
        self.route_pointer(column, row, PointerEvent::Press);
    }

    /// Pointer left the canvas (or the terminal lost focus)
    pub fn pointer_left(&mut self) {
        if let Some(section) = self.hovered.take() {
            self.scene_mut(section).pointer(PointerEvent::Leave);
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn toggle_mode(&mut self) {
        self.splash.toggle_mode();
    }

    /// Rebuild the particle grid from scratch
    pub fn rebuild(&mut self) {
        self.splash.rebuild();
    }

    pub fn cycle_palette(&mut self) {
        self.settings.field.palette = self.settings.field.palette.next();
        self.apply_field();
    }

    pub fn cycle_palette_prev(&mut self) {
        self.settings.field.palette = self.settings.field.palette.prev();
        self.apply_field();
    }

    pub fn cycle_strategy(&mut self) {
        self.settings.halftone.strategy = self.settings.halftone.strategy.next();
        self.apply_halftone();
    }

    fn apply_field(&mut self) {
        self.splash.set_settings(self.settings.field.clone());
    }

    fn apply_halftone(&mut self) {
        let now = self.clock.now();
        self.footer.set_settings(self.settings.halftone.clone(), now);
    }

    fn apply_breathing(&mut self) {
        self.studio.set_settings(self.settings.breathing.clone());
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        self.adjust_focused(1.0);
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        self.adjust_focused(-1.0);
    }

    fn adjust_focused(&mut self, sign: f32) {
        let field = &mut self.settings.field;
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::BallRadius => {
                field.adjust_ball_radius(2.0 * sign);
                self.apply_field();
            }
            Focus::FleeRadius => {
                field.adjust_flee_radius(2.0 * sign);
                self.apply_field();
            }
            Focus::FleeWeight => {
                field.adjust_flee_weight(0.5 * sign);
                self.apply_field();
            }
            Focus::MaxSpeed => {
                field.adjust_max_speed(0.1 * sign);
                self.apply_field();
            }
            Focus::ParticleRadius => {
                field.adjust_particle_radius(0.1 * sign);
                self.apply_field();
            }
            Focus::SeekSpeed => {
                field.adjust_seek_max_speed(0.25 * sign);
                self.apply_field();
            }
            Focus::Spacing => {
                field.adjust_spacing(sign);
                self.apply_field();
            }
            Focus::Palette => {
                if sign > 0.0 {
                    self.cycle_palette();
                } else {
                    self.cycle_palette_prev();
                }
            }
            Focus::Duration => {
                self.settings.halftone.adjust_duration(100 * sign as i64);
                self.apply_halftone();
            }
            Focus::HalftoneSpacing => {
                self.settings.halftone.adjust_spacing(sign);
                self.apply_halftone();
            }
            Focus::Strategy => self.cycle_strategy(),
            Focus::GridSpacing => {
                self.settings.breathing.adjust_spacing(sign);
                self.apply_breathing();
            }
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Save the canvas of the section in view as a PNG
    pub fn snapshot(&mut self) {
        let section = self.section_in_view();
        let name = format!(
            "dotfield-{}-{}.png",
            self.scene(section).name().to_lowercase(),
            self.clock.frames()
        );
        let path = self.snapshot_dir.join(name);
        match export::save_png(self.scene(section).canvas(), export::BACKGROUND, &path) {
            Ok(()) => self.status_message = Some(format!("saved {}", path.display())),
            Err(err) => {
                warn!(%err, "snapshot failed");
                self.status_message = Some(format!("snapshot failed: {}", err));
            }
        }
    }

    /// Current config, for `--save-config`
    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings: self.settings.clone(),
            mode: self.splash.mode(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Mode;
    use crate::pointer::OFF_CANVAS;

    fn app() -> App {
        App::new(AppConfig::default(), Rect::new(0, 0, 40, 10))
    }

    #[test]
    fn test_page_layout() {
        let layout = PageLayout::new(40, 10, 0.2);
        // 80 dots wide * 0.2 = 16 dots = 4 rows
        assert_eq!(layout, PageLayout { splash: 10, studio: 10, footer: 4 });
        assert_eq!(layout.top(Section::Footer), 20);
        assert_eq!(layout.total(), 24);
        assert_eq!(layout.section_at(9), Some(Section::Splash));
        assert_eq!(layout.section_at(10), Some(Section::Studio));
        assert_eq!(layout.section_at(23), Some(Section::Footer));
        assert_eq!(layout.section_at(24), None);
    }

    #[test]
    fn test_visible_fraction() {
        assert_eq!(visible_fraction(20, 4, 0, 10), 0.0);
        assert_eq!(visible_fraction(20, 4, 11, 10), 0.25);
        assert_eq!(visible_fraction(20, 4, 14, 10), 1.0);
        assert_eq!(visible_fraction(0, 0, 0, 10), 0.0);
    }

    #[test]
    fn test_mount_sizes_canvases() {
        let app = app();
        assert_eq!(app.splash.canvas().width(), 80);
        assert_eq!(app.splash.canvas().height(), 40);
        assert_eq!(app.footer.canvas().height(), 16);
        assert!(app.scene(Section::Studio).is_mounted());
        assert_eq!(app.clock.pending_count(), 2);
    }

    #[test]
    fn test_scrolling_triggers_reveal_once() {
        let mut app = app();
        assert!(!app.footer.reveal.has_animated());
        app.scroll_by(100);
        assert_eq!(app.scroll, 14);
        assert!(app.footer.reveal.has_animated());
        assert_eq!(app.section_in_view(), Section::Studio);
        app.scroll_by(-100);
        assert_eq!(app.scroll, 0);
        assert_eq!(app.section_in_view(), Section::Splash);
    }

    #[test]
    fn test_pointer_routing() {
        let mut app = app();
        app.pointer_moved(5, 3);
        assert_eq!(app.splash.interaction.pointer.position, Vec2::new(11.0, 14.0));

        app.scroll_by(14);
        app.pointer_moved(5, 8);
        // Moving into the footer makes the splash see a leave
        assert_eq!(app.splash.interaction.pointer.position, OFF_CANVAS);

        app.scroll_by(-14);
        app.pointer_pressed(0, 0);
        assert_eq!(app.splash.mode(), Mode::Seek);

        // Outside the canvas counts as leaving
        app.pointer_moved(50, 50);
        assert_eq!(app.splash.interaction.pointer.position, OFF_CANVAS);
    }

    #[test]
    fn test_drag_routes_as_touch() {
        let mut app = app();
        app.pointer_dragged(5, 3);
        assert_eq!(app.splash.interaction.pointer.position, Vec2::new(11.0, 14.0));
        assert_eq!(app.splash.mode(), Mode::Normal);

        // Nothing reaches a torn-down component
        app.shutdown();
        app.pointer_dragged(6, 3);
        assert_eq!(app.splash.interaction.pointer.position, OFF_CANVAS);
    }

    #[test]
    fn test_hit_test_with_offset_area() {
        let mut app = app();
        app.resize(Rect::new(23, 1, 40, 10));
        assert!(app.hit_test(22, 1).is_none());
        let (section, local) = app.hit_test(23, 1).unwrap();
        assert_eq!(section, Section::Splash);
        assert_eq!(local, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_tick_and_pause() {
        let mut app = app();
        app.tick();
        assert_eq!(app.clock.frames(), 1);
        assert!(app.footer.has_fonts());
        app.toggle_pause();
        app.tick();
        assert_eq!(app.clock.frames(), 1);
    }

    #[test]
    fn test_focus_cycle_and_adjust() {
        let mut app = app();
        assert!(!app.focus.is_param());
        app.next_focus();
        assert_eq!(app.focus, Focus::BallRadius);
        app.prev_focus();
        assert_eq!(app.focus, Focus::Strategy);
        app.adjust_focused_up();
        assert_eq!(app.settings.halftone.strategy, app.footer.settings().strategy);

        app.focus = Focus::BallRadius;
        let before = app.settings.field.ball_radius;
        app.adjust_focused_up();
        assert_eq!(app.settings.field.ball_radius, before + 2.0);
        assert_eq!(app.splash.field.settings.ball_radius, before + 2.0);
    }

    #[test]
    fn test_shutdown_cancels_frames() {
        let mut app = app();
        app.scroll_by(100);
        assert!(app.clock.pending_count() > 0);
        app.shutdown();
        assert_eq!(app.clock.pending_count(), 0);
        assert!(!app.scene(Section::Splash).is_mounted());
    }

    #[test]
    fn test_config_reflects_state() {
        let mut app = app();
        app.toggle_mode();
        app.cycle_palette();
        let config = app.config();
        assert_eq!(config.mode, Mode::Seek);
        assert_eq!(config.settings.field.palette, app.settings.field.palette);
    }
}
