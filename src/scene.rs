use crate::breathing::BreathingGrid;
use crate::canvas::Canvas;
use crate::clock::{FrameClock, FrameHandle, FrameTick};
use crate::field::{Interaction, Mode, ParticleField};
use crate::halftone::HalftoneRenderer;
use crate::pointer::{PointerEvent, PointerState};
use crate::reveal::Reveal;
use crate::settings::{BreathingSettings, FieldSettings, HalftoneSettings};
use crate::text::FontFace;
use std::time::Duration;
use tracing::{debug, info};

/// A self-contained animated component that owns one rendering surface.
///
/// The host mounts it with a size, forwards input while it is mounted and
/// ticks the frame clock; the component decides whether it wants another
/// frame by re-requesting one from inside [`Scene::frame`].
pub trait Scene {
    fn name(&self) -> &'static str;

    fn mount(&mut self, width: u32, height: u32, clock: &mut FrameClock);

    /// Cancel the pending frame request and stop reacting to input
    fn unmount(&mut self, clock: &mut FrameClock);

    fn is_mounted(&self) -> bool;

    fn resize(&mut self, width: u32, height: u32, now: Duration);

    fn pointer(&mut self, event: PointerEvent);

    fn frame(&mut self, tick: &FrameTick, clock: &mut FrameClock);

    /// Visible fraction of the surface changed
    fn visibility(&mut self, _fraction: f32, _now: Duration, _clock: &mut FrameClock) {}

    /// Fonts are available for text measurement
    fn fonts_ready(&mut self, _face: &FontFace, _now: Duration) {}

    fn canvas(&self) -> &Canvas;
}

fn cancel_frame(frame: &mut Option<FrameHandle>, clock: &mut FrameClock) {
    if let Some(handle) = frame.take() {
        clock.cancel(handle);
    }
}

/// Loading splash: the steering particle field
pub struct SplashScene {
    pub field: ParticleField,
    pub interaction: Interaction,
    canvas: Canvas,
    frame: Option<FrameHandle>,
    started: Duration,
    mounted: bool,
}

impl SplashScene {
    pub fn new(settings: FieldSettings) -> Self {
        Self::with_field(ParticleField::new(settings))
    }

    pub fn with_field(field: ParticleField) -> Self {
        Self {
            field,
            interaction: Interaction::default(),
            canvas: Canvas::new(0, 0),
            frame: None,
            started: Duration::ZERO,
            mounted: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode
    }

    pub fn toggle_mode(&mut self) {
        self.interaction.toggle_mode();
        info!(mode = self.interaction.mode.name(), "splash mode toggled");
    }

    pub fn set_settings(&mut self, settings: FieldSettings) {
        self.field.set_settings(settings);
    }

    /// Rebuild the grid at the current size
    pub fn rebuild(&mut self) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.field.build_grid(w as f32, h as f32);
    }
}

impl Scene for SplashScene {
    fn name(&self) -> &'static str {
        "Splash"
    }

    fn mount(&mut self, width: u32, height: u32, clock: &mut FrameClock) {
        self.canvas = Canvas::new(width, height);
        self.field.build_grid(width as f32, height as f32);
        self.started = clock.now();
        self.frame = Some(clock.request());
        self.mounted = true;
        info!(width, height, particles = self.field.len(), "splash mounted");
    }

    fn unmount(&mut self, clock: &mut FrameClock) {
        cancel_frame(&mut self.frame, clock);
        self.interaction.pointer = PointerState::new();
        self.mounted = false;
        debug!("splash unmounted");
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn resize(&mut self, width: u32, height: u32, _now: Duration) {
        if !self.mounted {
            return;
        }
        self.canvas.resize(width, height);
        self.field.build_grid(width as f32, height as f32);
    }

    fn pointer(&mut self, event: PointerEvent) {
        if !self.mounted {
            return;
        }
        if self.interaction.pointer.apply(&event) {
            self.toggle_mode();
        }
    }

    fn frame(&mut self, tick: &FrameTick, clock: &mut FrameClock) {
        if !self.mounted || !tick.fired(self.frame) {
            return;
        }
        self.field.step(&self.interaction);
        self.field
            .render(&mut self.canvas, tick.now.saturating_sub(self.started));
        self.frame = Some(clock.request());
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

/// Studio section background: the breathing dot grid
pub struct BreathingScene {
    pub grid: BreathingGrid,
    pointer: PointerState,
    canvas: Canvas,
    frame: Option<FrameHandle>,
    started: Duration,
    mounted: bool,
}

impl BreathingScene {
    pub fn new(settings: BreathingSettings) -> Self {
        Self {
            grid: BreathingGrid::new(settings),
            pointer: PointerState::new(),
            canvas: Canvas::new(0, 0),
            frame: None,
            started: Duration::ZERO,
            mounted: false,
        }
    }

    pub fn set_settings(&mut self, settings: BreathingSettings) {
        self.grid.settings = settings;
    }
}

impl Scene for BreathingScene {
    fn name(&self) -> &'static str {
        "Studio"
    }

    fn mount(&mut self, width: u32, height: u32, clock: &mut FrameClock) {
        self.canvas = Canvas::new(width, height);
        self.started = clock.now();
        self.frame = Some(clock.request());
        self.mounted = true;
        debug!(width, height, "breathing grid mounted");
    }

    fn unmount(&mut self, clock: &mut FrameClock) {
        cancel_frame(&mut self.frame, clock);
        self.pointer = PointerState::new();
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn resize(&mut self, width: u32, height: u32, _now: Duration) {
        if self.mounted {
            self.canvas.resize(width, height);
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        if self.mounted {
            self.pointer.apply(&event);
        }
    }

    fn frame(&mut self, tick: &FrameTick, clock: &mut FrameClock) {
        if !self.mounted || !tick.fired(self.frame) {
            return;
        }
        let t = tick.now.saturating_sub(self.started).as_secs_f32();
        self.grid.render(&mut self.canvas, t, self.pointer.position);
        self.frame = Some(clock.request());
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

/// Footer wordmark: halftone text with a run-once reveal
pub struct HalftoneScene {
    settings: HalftoneSettings,
    renderer: Option<HalftoneRenderer>,
    pub reveal: Reveal,
    canvas: Canvas,
    frame: Option<FrameHandle>,
    mounted: bool,
}

impl HalftoneScene {
    pub fn new(settings: HalftoneSettings) -> Self {
        let reveal = Reveal::new(settings.duration(), settings.visibility_threshold);
        Self {
            settings,
            renderer: None,
            reveal,
            canvas: Canvas::new(0, 0),
            frame: None,
            mounted: false,
        }
    }

    #[cfg(test)]
    pub fn settings(&self) -> &HalftoneSettings {
        &self.settings
    }

    /// Fonts have been received and the first real draw is allowed
    pub fn has_fonts(&self) -> bool {
        self.renderer.is_some()
    }

    /// Swap settings and redraw at the current progress without replaying
    pub fn set_settings(&mut self, settings: HalftoneSettings, now: Duration) {
        self.reveal.duration = settings.duration();
        self.reveal.threshold = settings.visibility_threshold;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_settings(settings.clone());
        }
        self.settings = settings;
        self.redraw(now);
    }

    fn redraw(&mut self, now: Duration) {
        let progress = self.reveal.eased(now);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.draw(&mut self.canvas, progress);
        }
    }
}

impl Scene for HalftoneScene {
    fn name(&self) -> &'static str {
        "Footer"
    }

    fn mount(&mut self, width: u32, height: u32, clock: &mut FrameClock) {
        self.canvas = Canvas::new(width, height);
        self.mounted = true;
        // Remount picks up wherever the reveal was left
        self.redraw(clock.now());
        if self.reveal.is_running() {
            self.frame = Some(clock.request());
        }
        debug!(width, height, reveal = ?self.reveal.state(), "halftone mounted");
    }

    fn unmount(&mut self, clock: &mut FrameClock) {
        cancel_frame(&mut self.frame, clock);
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn resize(&mut self, width: u32, height: u32, now: Duration) {
        if !self.mounted {
            return;
        }
        self.canvas.resize(width, height);
        self.redraw(now);
    }

    fn pointer(&mut self, _event: PointerEvent) {}

    fn frame(&mut self, tick: &FrameTick, clock: &mut FrameClock) {
        if !self.mounted || !tick.fired(self.frame) {
            return;
        }
        self.redraw(tick.now);
        if self.reveal.advance(tick.now) {
            self.frame = Some(clock.request());
        } else {
            self.frame = None;
            info!("halftone reveal finished");
        }
    }

    fn visibility(&mut self, fraction: f32, now: Duration, clock: &mut FrameClock) {
        if !self.mounted {
            return;
        }
        if self.reveal.observe(fraction, now) {
            info!(fraction, "halftone reveal started");
            self.frame = Some(clock.request());
        }
    }

    fn fonts_ready(&mut self, face: &FontFace, now: Duration) {
        if self.renderer.is_none() {
            self.renderer = Some(HalftoneRenderer::new(self.settings.clone(), face.clone()));
        }
        if self.mounted {
            self.redraw(now);
        }
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}
