use crate::color::Rgb;
use glam::Vec2;
use image::{Rgba, RgbaImage};

/// A 2D raster surface with pixel read/write access.
///
/// Each component owns one. Pixels start fully transparent; drawing uses
/// source-over alpha compositing with a simple one-pixel coverage ramp at
/// circle edges so sub-pixel dots still leave a mark.
#[derive(Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Replace the backing buffer when the size changed (contents are cleared)
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width() || height != self.height() {
            self.image = RgbaImage::new(width, height);
        } else {
            self.clear();
        }
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Composite one pixel over the existing contents
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgb, alpha: f32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let sa = alpha.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(color.r, dst.0[0]),
            mix(color.g, dst.0[1]),
            mix(color.b, dst.0[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Fill a circle centred at `center` (pixel centres sit at +0.5)
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 || self.is_empty() {
            return;
        }
        let reach = radius + 0.5;
        let min_x = (center.x - reach).floor().max(0.0);
        let min_y = (center.y - reach).floor().max(0.0);
        let max_x = (center.x + reach).ceil().min(self.width() as f32 - 1.0);
        let max_y = (center.y + reach).ceil().min(self.height() as f32 - 1.0);
        if max_x < min_x || max_y < min_y {
            return;
        }

        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let pixel_center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (reach - pixel_center.distance(center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, alpha * coverage);
                }
            }
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Flatten against an opaque background, for file export
    pub fn flatten(&self, background: Rgb) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (x, y, px) in self.image.enumerate_pixels() {
            let a = px.0[3] as f32 / 255.0;
            let mix = |s: u8, b: u8| (s as f32 * a + b as f32 * (1.0 - a)).round() as u8;
            out.put_pixel(
                x,
                y,
                Rgba([
                    mix(px.0[0], background.r),
                    mix(px.0[1], background.g),
                    mix(px.0[2], background.b),
                    255,
                ]),
            );
        }
        out
    }
}
