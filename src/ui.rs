use crate::app::{App, Focus, Section};
use crate::braille;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 22;

const STATUS_HEIGHT: u16 = 7;
const PARAMS_HEIGHT: u16 = 14;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 50;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 14;

// UI color scheme
const BORDER_COLOR: Color = Color::Rgb(0xFF, 0x77, 0x4D);
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Screen rectangle of the canvas (excluding borders)
pub fn get_canvas_rect(frame_area: Rect, fullscreen: bool) -> Rect {
    let left = if fullscreen { 0 } else { SIDEBAR_WIDTH.min(frame_area.width) };
    Rect {
        x: frame_area.x + left + 1,
        y: frame_area.y + 1,
        width: frame_area.width.saturating_sub(left + 2),
        height: frame_area.height.saturating_sub(2),
    }
}

/// Visible lines of the controls box for a terminal height
pub fn get_controls_visible_lines(term_height: u16) -> u16 {
    term_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(5), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" dotfield ");

    let now = app.clock.now();
    let progress = app.footer.reveal.progress(now);
    let progress_width = (area.width.saturating_sub(4)) as usize;
    let filled = (progress * progress_width as f32) as usize;
    let empty = progress_width.saturating_sub(filled);

    let reveal_label = if !app.footer.has_fonts() {
        "loading fonts"
    } else if app.footer.reveal.is_running() {
        "revealing"
    } else {
        "reveal"
    };

    let pointer = app.splash.interaction.pointer;
    let pointer_text = if pointer.is_present() {
        format!("  @{:.0},{:.0}", pointer.position.x, pointer.position.y)
    } else {
        String::new()
    };

    let (status_text, status_color) = if app.paused {
        ("PAUSED".to_string(), HIGHLIGHT_COLOR)
    } else {
        (format!("{:.0} fps", app.fps), Color::Green)
    };

    let content = vec![
        Line::from(Span::styled(
            format!(
                "{} / {}",
                app.scene(app.section_in_view()).name(),
                app.splash.mode().name()
            ),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("{} particles{}", app.splash.field.len(), pointer_text),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(reveal_label, Style::default().fg(DIM_TEXT_COLOR))),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(BORDER_COLOR)),
            Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let field = &app.settings.field;
    let halftone = &app.settings.halftone;

    let content = vec![
        make_line("Ball", format!("{:.0}", field.ball_radius), app.focus == Focus::BallRadius),
        make_line("Reveal", format!("{}ms", halftone.duration_ms), app.focus == Focus::Duration),
        make_line("Flee", format!("{:.0}", field.flee_radius), app.focus == Focus::FleeRadius),
        make_line("Weight", format!("{:.1}", field.flee_weight), app.focus == Focus::FleeWeight),
        make_line(
            "Grid",
            format!("{:.0}", app.settings.breathing.spacing),
            app.focus == Focus::GridSpacing,
        ),
        make_line("Dots", format!("{:.0}", halftone.spacing), app.focus == Focus::HalftoneSpacing),
        make_line("Speed", format!("{:.1}", field.max_speed), app.focus == Focus::MaxSpeed),
        make_line("Palette", field.palette.name().to_string(), app.focus == Focus::Palette),
        make_line("Size", format!("{:.1}", field.particle_radius), app.focus == Focus::ParticleRadius),
        make_line("Seek", format!("{:.2}", field.seek_max_speed), app.focus == Focus::SeekSpeed),
        make_line("Spacing", format!("{:.0}", field.spacing), app.focus == Focus::Spacing),
        make_line("Halftone", halftone.strategy.name().to_string(), app.focus == Focus::Strategy),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Space", "pause/resume".to_string()),
        make_control("H", "help".to_string()),
        make_control("Click", "toggle mode".to_string()),
        make_control("M", format!("mode: {}", app.splash.mode().name())),
        make_control("R", "rebuild grid".to_string()),
        make_control("P", format!("palette: {}", app.settings.field.palette.name())),
        make_control("D", format!("dots: {}", app.settings.halftone.strategy.name())),
        make_control("J/K", "scroll page".to_string()),
        make_control("PgUp", "page up/down".to_string()),
        make_control("Tab", "parameters".to_string()),
        make_control("S", "save png".to_string()),
        make_control("V", "fullscreen".to_string()),
        make_control("Esc", "leave params".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let title = match &app.status_message {
        Some(message) => format!(" {} ", message),
        None => String::new(),
    };
    let block = styled_block(&title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Each section contributes the rows of its canvas that are scrolled into view
    for section in Section::ALL {
        let top = app.layout.top(section);
        let rows = app.layout.rows(section);
        let first_row = app.scroll.saturating_sub(top);
        if top + rows <= app.scroll || first_row >= rows {
            continue;
        }
        let screen_top = top + first_row - app.scroll;
        if screen_top >= inner.height {
            continue;
        }
        let visible_rows = (rows - first_row).min(inner.height - screen_top);
        let cells = braille::render_to_braille(app.scene(section).canvas(), first_row, visible_rows);

        for cell in cells {
            let x = inner.x + cell.x;
            let y = inner.y + screen_top + cell.y;

            if x < inner.x + inner.width && y < inner.y + inner.height {
                let cell_rect = Rect {
                    x,
                    y,
                    width: 1,
                    height: 1,
                };
                let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
                let paragraph = Paragraph::new(Line::from(span));
                frame.render_widget(paragraph, cell_rect);
            }
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(36);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SPLASH FIELD", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("A grid of particles steers back to its home positions and scatters away from the mouse."),
        Line::from(""),
        Line::from(Span::styled("Click / M - Mode", Style::default().fg(TEXT_COLOR))),
        Line::from("Normal: particles oscillate home and flee the pointer. Seek: particles swarm the pointer and form a ring around it."),
        Line::from(""),
        Line::from(Span::styled("R - Rebuild", Style::default().fg(TEXT_COLOR))),
        Line::from("Lay out a fresh grid with new random starting velocities."),
        Line::from(""),
        Line::from(Span::styled("P - Palette", Style::default().fg(TEXT_COLOR))),
        Line::from("Ember, Dusk, Mono. The gradient rotates slowly across the field."),
        Line::from(""),
        Line::from(Span::styled("STUDIO GRID", Style::default().fg(BORDER_COLOR))),
        Line::from("Dots breathe in a rolling wave and swell near the pointer."),
        Line::from(""),
        Line::from(Span::styled("FOOTER WORDMARK", Style::default().fg(BORDER_COLOR))),
        Line::from("Halftone dots grow from the letter edges the first time the footer scrolls into view."),
        Line::from(""),
        Line::from(Span::styled("D - Dot strategy", Style::default().fg(TEXT_COLOR))),
        Line::from("Distance (edge distance) or Brightness (flat letterforms)."),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Space=Pause, J/K/Wheel=Scroll, PgUp/PgDn=Page, Tab/Arrows=Adjust, S=Save PNG, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
