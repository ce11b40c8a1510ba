use crate::canvas::Canvas;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Canvas alpha at or above which a pixel lights its Braille dot
pub const DOT_ALPHA_THRESHOLD: u8 = 24;

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Render `rows` cell rows of `canvas`, starting at cell row `first_row`.
///
/// One canvas pixel maps to one dot. Cell y coordinates are relative to
/// `first_row`. The cell colour is the alpha-weighted average of the lit
/// pixels.
pub fn render_to_braille(canvas: &Canvas, first_row: u16, rows: u16) -> Vec<BrailleCell> {
    let (cols, total_rows) = cell_size(canvas);
    let last_row = total_rows.min(first_row.saturating_add(rows));
    let image = canvas.image();
    let mut cells = Vec::new();

    for cy in first_row..last_row {
        for cx in 0..cols {
            let mut pattern: u8 = 0;
            let mut sum = [0u32; 3];
            let mut weight = 0u32;

            let base_x = cx as u32 * 2;
            let base_y = cy as u32 * 4;
            for dx in 0..2 {
                for dy in 0..4 {
                    let (x, y) = (base_x + dx as u32, base_y + dy as u32);
                    if x >= image.width() || y >= image.height() {
                        continue;
                    }
                    let [r, g, b, a] = image.get_pixel(x, y).0;
                    if a < DOT_ALPHA_THRESHOLD {
                        continue;
                    }
                    pattern |= BRAILLE_DOTS[dx][dy];
                    sum[0] += r as u32 * a as u32;
                    sum[1] += g as u32 * a as u32;
                    sum[2] += b as u32 * a as u32;
                    weight += a as u32;
                }
            }

            // Only emit cells that have at least one dot
            if pattern == 0 {
                continue;
            }
            let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
            let color = Color::Rgb(
                (sum[0] / weight) as u8,
                (sum[1] / weight) as u8,
                (sum[2] / weight) as u8,
            );
            cells.push(BrailleCell {
                x: cx,
                y: cy - first_row,
                char: braille_char,
                color,
            });
        }
    }

    cells
}

/// Terminal cells covered by a canvas, rounded up
pub fn cell_size(canvas: &Canvas) -> (u16, u16) {
    (
        canvas.width().div_ceil(2).min(u16::MAX as u32) as u16,
        canvas.height().div_ceil(4).min(u16::MAX as u32) as u16,
    )
}

/// Canvas pixel size for an area of terminal cells
pub fn canvas_size(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32 * 2, rows as u32 * 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_braille_pattern() {
        // Test that single dot patterns work correctly
        assert_eq!(BRAILLE_DOTS[0][0], 0x01); // Top-left
        assert_eq!(BRAILLE_DOTS[1][0], 0x08); // Top-right
        assert_eq!(BRAILLE_DOTS[0][3], 0x40); // Bottom-left
        assert_eq!(BRAILLE_DOTS[1][3], 0x80); // Bottom-right

        // All dots should give 0xFF
        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_braille_char_generation() {
        // Empty pattern
        let empty = char::from_u32(BRAILLE_BASE).unwrap();
        assert_eq!(empty, '\u{2800}');

        // Full pattern (all 8 dots)
        let full = char::from_u32(BRAILLE_BASE + 0xFF).unwrap();
        assert_eq!(full, '\u{28FF}');
    }

    #[test]
    fn test_canvas_pixels_map_to_dots() {
        let mut canvas = Canvas::new(4, 8);
        let red = Rgb::new(255, 0, 0);
        canvas.blend_pixel(0, 0, red, 1.0);
        canvas.blend_pixel(1, 3, red, 1.0);
        // Too faint to light a dot
        canvas.blend_pixel(2, 0, red, 0.05);

        let cells = render_to_braille(&canvas, 0, 2);
        assert_eq!(cells.len(), 1);
        assert_eq!((cells[0].x, cells[0].y), (0, 0));
        assert_eq!(cells[0].char, char::from_u32(BRAILLE_BASE + 0x01 + 0x80).unwrap());
        assert_eq!(cells[0].color, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_row_window_is_relative() {
        let mut canvas = Canvas::new(2, 12);
        canvas.blend_pixel(0, 9, Rgb::new(0, 0, 255), 1.0);
        assert!(render_to_braille(&canvas, 0, 2).is_empty());
        let cells = render_to_braille(&canvas, 2, 5);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].y, 0);
        assert_eq!(cells[0].char, char::from_u32(BRAILLE_BASE + 0x02).unwrap());
    }

    #[test]
    fn test_sizes() {
        assert_eq!(canvas_size(10, 3), (20, 12));
        assert_eq!(cell_size(&Canvas::new(5, 9)), (3, 3));
        assert!(render_to_braille(&Canvas::new(0, 0), 0, 10).is_empty());
    }
}
