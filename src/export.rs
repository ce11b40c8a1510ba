//! Headless rendering to files: PNG snapshots and GIF recordings.

use crate::canvas::Canvas;
use crate::clock::FrameClock;
use crate::color::Rgb;
use crate::error::{DotfieldError, Result};
use crate::field::{Mode, ParticleField};
use crate::pointer::PointerEvent;
use crate::scene::{HalftoneScene, Scene, SplashScene};
use crate::settings::{FieldSettings, HalftoneSettings};
use crate::text::FontFace;
use glam::Vec2;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Page background that exported frames are flattened onto
pub const BACKGROUND: Rgb = Rgb::new(0x0A, 0x0A, 0x0C);

/// Largest export dimension accepted
pub const MAX_EXPORT_SIZE: u32 = 4096;

/// Simulated frame interval for headless runs
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Frames kept after a recorded reveal finishes, so the loop rests on the
/// final wordmark
const HOLD_FRAMES: usize = 12;

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width > MAX_EXPORT_SIZE || height > MAX_EXPORT_SIZE {
        return Err(DotfieldError::ExportSize { width, height });
    }
    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a canvas to `path` as PNG, flattened onto `background`
pub fn save_png(canvas: &Canvas, background: Rgb, path: &Path) -> Result<()> {
    check_size(canvas.width(), canvas.height())?;
    create_parent_dir(path)?;
    let flat = canvas.flatten(background);
    image::save_buffer_with_format(
        path,
        flat.as_raw(),
        flat.width(),
        flat.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    info!(path = %path.display(), width = flat.width(), height = flat.height(), "png written");
    Ok(())
}

/// Run the splash field headless for `frames` frames.
///
/// With a `pointer` the field reacts to it as if the mouse rested there.
pub fn render_splash(
    field: ParticleField,
    mode: Mode,
    pointer: Option<Vec2>,
    width: u32,
    height: u32,
    frames: u32,
) -> Result<Canvas> {
    check_size(width, height)?;
    let mut clock = FrameClock::new();
    let mut scene = SplashScene::with_field(field);
    scene.interaction.mode = mode;
    scene.mount(width, height, &mut clock);
    if let Some(p) = pointer {
        scene.pointer(PointerEvent::Move(p));
    }
    let mut now = Duration::ZERO;
    for _ in 0..frames.max(1) {
        now += FRAME_INTERVAL;
        let tick = clock.tick_at(now);
        scene.frame(&tick, &mut clock);
    }
    scene.unmount(&mut clock);
    Ok(scene.canvas().clone())
}

/// Render the splash field and write it as PNG; `seed` makes the start
/// velocities reproducible
pub fn snapshot_png(
    settings: &FieldSettings,
    mode: Mode,
    pointer: Option<Vec2>,
    (width, height): (u32, u32),
    frames: u32,
    seed: Option<u64>,
    path: &Path,
) -> Result<()> {
    let field = match seed {
        Some(seed) => ParticleField::with_seed(settings.clone(), seed),
        None => ParticleField::new(settings.clone()),
    };
    let canvas = render_splash(field, mode, pointer, width, height, frames)?;
    save_png(&canvas, BACKGROUND, path)
}

/// Every frame of the halftone reveal, one per `interval`, followed by a
/// short hold on the finished wordmark
pub fn reveal_frames(
    settings: &HalftoneSettings,
    width: u32,
    height: u32,
    interval: Duration,
) -> Result<Vec<Canvas>> {
    check_size(width, height)?;
    let mut clock = FrameClock::new();
    let mut scene = HalftoneScene::new(settings.clone());
    scene.mount(width, height, &mut clock);
    scene.fonts_ready(&FontFace::bold_mono(), Duration::ZERO);
    scene.visibility(1.0, Duration::ZERO, &mut clock);

    let mut frames = vec![scene.canvas().clone()];
    let mut now = Duration::ZERO;
    while clock.pending_count() > 0 {
        now += interval.max(Duration::from_millis(1));
        let tick = clock.tick_at(now);
        scene.frame(&tick, &mut clock);
        frames.push(scene.canvas().clone());
    }
    if let Some(last) = frames.last().cloned() {
        frames.extend(std::iter::repeat(last).take(HOLD_FRAMES));
    }
    scene.unmount(&mut clock);
    Ok(frames)
}

/// Record the halftone reveal as a looping GIF; returns the frame count
pub fn record_gif(
    settings: &HalftoneSettings,
    (width, height): (u32, u32),
    interval: Duration,
    path: &Path,
) -> Result<usize> {
    check_size(width, height)?;
    let frames = reveal_frames(settings, width, height, interval)?;
    create_parent_dir(path)?;

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = gif::Encoder::new(file, width as u16, height as u16, &[])?;
    encoder.set_repeat(gif::Repeat::Infinite)?;
    // GIF delays are in hundredths of a second
    let delay = (interval.as_millis() / 10).clamp(1, u16::MAX as u128) as u16;
    for canvas in &frames {
        let mut rgba = canvas.flatten(BACKGROUND).into_raw();
        let mut frame = gif::Frame::from_rgba_speed(width as u16, height as u16, &mut rgba, 10);
        frame.delay = delay;
        encoder.write_frame(&frame)?;
    }
    info!(path = %path.display(), frames = frames.len(), "gif written");
    Ok(frames.len())
}
