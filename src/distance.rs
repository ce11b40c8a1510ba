use image::GrayImage;

/// Brightness above which an offscreen pixel counts as ink
pub const INK_THRESHOLD: u8 = 128;

/// Stand-in for "no background reached yet" during the raster passes
const UNREACHED: u32 = u32::MAX / 2;

/// Binary ink/background mask, row-major
#[derive(Debug, Clone)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    ink: Vec<bool>,
}

impl Mask {
    /// Threshold a greyscale buffer at the midpoint
    pub fn from_luma(image: &GrayImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let ink = image.pixels().map(|p| p.0[0] > INK_THRESHOLD).collect();
        Self { width, height, ink }
    }

    /// Build from rows of '#' (ink) and '.' (background)
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut ink = Vec::with_capacity(width * height);
        for row in rows {
            ink.extend(row.chars().map(|c| c == '#'));
        }
        Self { width, height, ink }
    }

    #[cfg(test)]
    pub fn is_ink(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.ink[y * self.width + x]
    }
}

/// Per-pixel Manhattan distance to the nearest background pixel.
///
/// Background pixels hold 0. Ink pixels that cannot reach any background
/// pixel (a mask that is all ink) keep a very large value.
#[derive(Debug, Clone)]
pub struct DistanceField {
    pub width: usize,
    pub height: usize,
    values: Vec<u32>,
}

impl DistanceField {
    /// Two-pass raster distance transform.
    ///
    /// Forward pass (top-left to bottom-right) takes `min(self, up+1, left+1)`,
    /// backward pass (bottom-right to top-left) takes `min(self, down+1, right+1)`.
    /// Background pixels are never updated.
    pub fn compute(mask: &Mask) -> Self {
        let (w, h) = (mask.width, mask.height);
        let mut values: Vec<u32> = mask
            .ink
            .iter()
            .map(|&ink| if ink { UNREACHED } else { 0 })
            .collect();

        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                if values[idx] == 0 {
                    continue;
                }
                let up = if y > 0 { values[idx - w] + 1 } else { UNREACHED };
                let left = if x > 0 { values[idx - 1] + 1 } else { UNREACHED };
                values[idx] = values[idx].min(up).min(left);
            }
        }

        for y in (0..h).rev() {
            for x in (0..w).rev() {
                let idx = y * w + x;
                if values[idx] == 0 {
                    continue;
                }
                let down = if y + 1 < h { values[idx + w] + 1 } else { UNREACHED };
                let right = if x + 1 < w { values[idx + 1] + 1 } else { UNREACHED };
                values[idx] = values[idx].min(down).min(right);
            }
        }

        Self {
            width: w,
            height: h,
            values,
        }
    }

    /// Distance at (x, y); out-of-range reads as background
    pub fn get(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.values[y * self.width + x]
        } else {
            0
        }
    }

    /// Largest finite distance in the field
    pub fn max_distance(&self) -> u32 {
        self.values
            .iter()
            .copied()
            .filter(|&d| d < UNREACHED)
            .max()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.values.chunks(self.width.max(1)).map(|r| r.to_vec()).collect()
    }
}
