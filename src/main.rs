mod app;
mod braille;
mod breathing;
mod canvas;
mod clock;
mod color;
mod config;
mod distance;
mod error;
mod export;
mod field;
mod halftone;
mod pointer;
mod presets;
mod reveal;
mod scene;
mod settings;
mod steering;
mod text;
mod ui;

use app::{App, Focus};
use clap::Parser;
use color::Palette;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use field::Mode;
use glam::Vec2;
use halftone::DotStrategy;
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dotfield")]
#[command(about = "Steering-particle splash field and halftone text reveal in the terminal")]
struct Args {
    // === Configuration ===
    /// Load settings from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to a JSON config file; an interactive
    /// session rewrites it at quit with whatever was tuned
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    /// Particle field preset (calm, springy, swarm, dense, or a saved user preset)
    #[arg(long)]
    preset: Option<String>,

    /// Save the effective particle field settings as a user preset
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Delete a saved user preset
    #[arg(long = "delete-preset")]
    delete_preset: Option<String>,

    /// List built-in and user presets, then exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    // === Splash field ===
    /// Distance between particle homes, in dots (3-40)
    #[arg(short = 's', long)]
    spacing: Option<f32>,

    /// Colour palette (ember, dusk, mono)
    #[arg(short = 'p', long)]
    palette: Option<String>,

    /// Pointer flee radius in normal mode (0-120)
    #[arg(long = "flee-radius")]
    flee_radius: Option<f32>,

    /// Ring radius around the pointer in seek mode (4-120)
    #[arg(long = "ball-radius")]
    ball_radius: Option<f32>,

    /// Start in seek mode
    #[arg(long)]
    seek: bool,

    // === Footer wordmark ===
    /// Footer halftone text
    #[arg(short = 't', long)]
    text: Option<String>,

    /// Halftone dot strategy (distance, brightness)
    #[arg(long)]
    strategy: Option<String>,

    /// Reveal duration in milliseconds (100-10000)
    #[arg(long)]
    duration: Option<u64>,

    // === Export ===
    /// Render the splash field headless and write a PNG, then exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Record the footer reveal headless as an animated GIF, then exit
    #[arg(long)]
    record: Option<PathBuf>,

    /// Export width in pixels
    #[arg(long, default_value = "320")]
    width: u32,

    /// Export height in pixels (GIF default keeps the wordmark aspect ratio)
    #[arg(long)]
    height: Option<u32>,

    /// Frames to simulate before taking the snapshot
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Pointer position for the snapshot, as X,Y in pixels
    #[arg(long)]
    pointer: Option<String>,

    /// Seed for the snapshot's random start velocities
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for in-app PNG snapshots (S key)
    #[arg(long = "snapshot-dir", default_value = ".")]
    snapshot_dir: PathBuf,

    // === Diagnostics ===
    /// Write tracing logs to this file (RUST_LOG sets the filter)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_pointer(s: &str) -> Option<Vec2> {
    let (x, y) = s.split_once(',')?;
    Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, EnvFilter};

    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dotfield=debug"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Config file, then preset, then individual flags
fn build_config(args: &Args) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(name) = &args.preset {
        let manager = PresetManager::new();
        config.settings.field = manager.find(name)?.field.clone();
        info!(preset = %name, "preset applied");
    }

    let field = &mut config.settings.field;
    if let Some(spacing) = args.spacing {
        field.spacing = spacing.clamp(3.0, 40.0);
    }
    if let Some(palette) = &args.palette {
        field.palette = Palette::parse(palette);
    }
    if let Some(radius) = args.flee_radius {
        field.flee_radius = radius.clamp(0.0, 120.0);
    }
    if let Some(radius) = args.ball_radius {
        field.ball_radius = radius.clamp(4.0, 120.0);
    }
    if args.seek {
        config.mode = Mode::Seek;
    }

    let halftone = &mut config.settings.halftone;
    if let Some(text) = &args.text {
        halftone.text = text.clone();
    }
    if let Some(strategy) = &args.strategy {
        halftone.strategy = DotStrategy::parse(strategy);
    }
    if let Some(duration) = args.duration {
        halftone.duration_ms = duration.clamp(100, 10_000);
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    if args.list_presets || args.delete_preset.is_some() {
        let mut manager = PresetManager::new();
        if let Some(name) = &args.delete_preset {
            manager.delete_preset(name)?;
            eprintln!("deleted {}", name);
        }
        if args.list_presets {
            if let Some(dir) = manager.dir() {
                eprintln!("user presets: {}", dir.display());
            }
            for preset in manager.all_presets() {
                println!("{:<12} {}", preset.name, preset.description);
            }
        }
        return Ok(());
    }

    let config = build_config(&args)?;

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(name) = &args.save_preset {
        let mut manager = PresetManager::new();
        let path = manager.save_preset(Preset::new(
            name.as_str(),
            "Saved from the command line",
            config.settings.field.clone(),
        ))?;
        eprintln!("wrote {}", path.display());
    }

    // Headless export, no terminal needed
    if args.snapshot.is_some() || args.record.is_some() {
        if let Some(path) = &args.snapshot {
            let pointer = args.pointer.as_deref().and_then(parse_pointer);
            let size = (args.width, args.height.unwrap_or(180));
            export::snapshot_png(
                &config.settings.field,
                config.mode,
                pointer,
                size,
                args.frames,
                args.seed,
                path,
            )?;
            eprintln!("wrote {}", path.display());
        }
        if let Some(path) = &args.record {
            let ratio = config.settings.halftone.height_ratio;
            let height = args
                .height
                .unwrap_or_else(|| ((args.width as f32 * ratio).ceil() as u32).max(1));
            let count = export::record_gif(
                &config.settings.halftone,
                (args.width, height),
                Duration::from_millis(40),
                path,
            )?;
            eprintln!("wrote {} ({} frames)", path.display(), count);
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let frame_rect = Rect::new(0, 0, size.width, size.height);
    let mut app = App::new(config, ui::get_canvas_rect(frame_rect, false));
    app.snapshot_dir = args.snapshot_dir.clone();

    // Run the app
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    // Keep whatever was tuned during the session
    if let Some(path) = &args.save_config {
        app.config().save_to_file(path)?;
        info!(path = %path.display(), "session config saved");
    }

    Ok(())
}

/// Recompute the canvas rectangle after a resize or layout toggle
fn relayout(app: &mut App, width: u16, height: u16) {
    let area = ui::get_canvas_rect(Rect::new(0, 0, width, height), app.fullscreen_mode);
    app.resize(area);
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Handle Ctrl+C
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    app.status_message = None;

                    match key.code {
                        // System controls
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('m') | KeyCode::Char('M') => app.toggle_mode(),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.rebuild(),
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            app.cycle_palette();
                            app.focus = Focus::Palette;
                        }
                        KeyCode::Char('d') | KeyCode::Char('D') => {
                            app.cycle_strategy();
                            app.focus = Focus::Strategy;
                        }
                        KeyCode::Char('s') | KeyCode::Char('S') => app.snapshot(),
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                        KeyCode::Char('v') | KeyCode::Char('V') => {
                            app.toggle_fullscreen();
                            let size = terminal.size()?;
                            relayout(app, size.width, size.height);
                        }

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_up();
                                } else {
                                    app.scroll_controls_up();
                                }
                            }
                        }
                        KeyCode::Down => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_down();
                                } else {
                                    let term_size = terminal.size()?;
                                    let visible = ui::get_controls_visible_lines(term_size.height);
                                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                                }
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            } else {
                                app.scroll_by(1);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            } else {
                                app.scroll_by(-1);
                            }
                        }
                        KeyCode::PageDown => app.page_down(),
                        KeyCode::PageUp => app.page_up(),
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved => app.pointer_moved(mouse.column, mouse.row),
                    MouseEventKind::Drag(_) => app.pointer_dragged(mouse.column, mouse.row),
                    MouseEventKind::Down(MouseButton::Left) => {
                        app.pointer_pressed(mouse.column, mouse.row)
                    }
                    MouseEventKind::ScrollDown => app.scroll_by(1),
                    MouseEventKind::ScrollUp => app.scroll_by(-1),
                    _ => {}
                },
                Event::FocusLost => app.pointer_left(),
                Event::Resize(width, height) => relayout(app, width, height),
                _ => {}
            }
        }

        // Advance the frame clock
        app.tick();
    }
}
