use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{GrayImage, Luma};

/// Glyph cell size of the bitmap face, in font units
const GLYPH_SIZE: usize = 8;

/// Horizontal advance per character: the cell plus the bold overhang
const ADVANCE: usize = GLYPH_SIZE + 1;

/// Trial font size as a fraction of the canvas height
const TRIAL_SIZE_RATIO: f32 = 0.8;

/// Fraction of the canvas width the text is stretched across
const TARGET_WIDTH_RATIO: f32 = 0.98;

/// Bold monospace bitmap face.
///
/// Built once from the 8x8 basic Latin table; each glyph is emboldened by
/// OR-ing every row with itself shifted one column right. Building the
/// face is the "font load" step that gates the first real halftone draw.
#[derive(Debug, Clone)]
pub struct FontFace {
    glyphs: Vec<[u16; GLYPH_SIZE]>,
}

impl FontFace {
    pub fn bold_mono() -> Self {
        let glyphs = (0u8..128)
            .map(|code| {
                let plain = BASIC_FONTS.get(code as char).unwrap_or([0; GLYPH_SIZE]);
                // bit 0 is the leftmost pixel
                plain.map(|row| {
                    let row = row as u16;
                    row | row << 1
                })
            })
            .collect();
        Self { glyphs }
    }

    fn glyph(&self, c: char) -> [u16; GLYPH_SIZE] {
        let code = c as usize;
        if code < self.glyphs.len() {
            self.glyphs[code]
        } else {
            self.glyphs['?' as usize]
        }
    }

    /// Whether the glyph for `c` has ink at glyph cell (gx, gy)
    fn ink(&self, c: char, gx: usize, gy: usize) -> bool {
        gx < ADVANCE && gy < GLYPH_SIZE && self.glyph(c)[gy] & (1 << gx) != 0
    }

    /// Advance width of `text` at `size` pixels per em (monospace)
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * ADVANCE as f32 / GLYPH_SIZE as f32
    }

    /// Font size that makes `text` span the target fraction of `width`.
    ///
    /// Measures at a trial size derived from `height`, then rescales by the
    /// ratio of target width to measured width.
    pub fn fit_size(&self, text: &str, width: u32, height: u32) -> f32 {
        let trial = height as f32 * TRIAL_SIZE_RATIO;
        let measured = self.measure(text, trial);
        if measured <= 0.0 {
            return trial;
        }
        trial * (width as f32 * TARGET_WIDTH_RATIO) / measured
    }

    /// Rasterize `text` white-on-black into a buffer of the given size,
    /// centred both ways. Returns `None` for a zero-area buffer.
    pub fn rasterize(&self, text: &str, width: u32, height: u32) -> Option<GrayImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let mut image = GrayImage::new(width, height);
        let size = self.fit_size(text, width, height);
        if size <= 0.0 {
            return Some(image);
        }
        let scale = size / GLYPH_SIZE as f32;
        let chars: Vec<char> = text.chars().collect();
        let origin_x = width as f32 / 2.0 - self.measure(text, size) / 2.0;
        let origin_y = height as f32 / 2.0 - size / 2.0;

        for y in 0..height {
            let fy = (y as f32 + 0.5 - origin_y) / scale;
            if fy < 0.0 || fy >= GLYPH_SIZE as f32 {
                continue;
            }
            for x in 0..width {
                let fx = (x as f32 + 0.5 - origin_x) / scale;
                if fx < 0.0 {
                    continue;
                }
                let index = (fx / ADVANCE as f32) as usize;
                let Some(&c) = chars.get(index) else {
                    continue;
                };
                let gx = fx as usize - index * ADVANCE;
                if self.ink(c, gx, fy as usize) {
                    image.put_pixel(x, y, Luma([255]));
                }
            }
        }
        Some(image)
    }
}
