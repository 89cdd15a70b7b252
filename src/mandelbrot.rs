use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{FractalError, Result};
use crate::math::C;
use crate::raster::{Color, RasterBuffer, pixel_count};

/// Region of the complex plane mapped onto the raster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplexWindow {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
}

impl Default for ComplexWindow {
    fn default() -> Self {
        ComplexWindow { re_min: -2.5, re_max: 1.5, im_min: -2.0, im_max: 2.0 }
    }
}

impl ComplexWindow {
    /// Complex coordinate of pixel `(px, py)` on a `width × height` raster.
    pub fn map(&self, px: u32, py: u32, width: u32, height: u32) -> C {
        C::new(
            self.re_min + (self.re_max - self.re_min) * (px as f64 / width as f64),
            self.im_min + (self.im_max - self.im_min) * (py as f64 / height as f64),
        )
    }

    fn validate(&self) -> Result<()> {
        let finite = [self.re_min, self.re_max, self.im_min, self.im_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.re_max <= self.re_min || self.im_max <= self.im_min {
            return Err(FractalError::invalid(format!("empty complex window {self:?}")));
        }
        Ok(())
    }
}

/// Iterations of `z ← z² + c` from `z = 0` until `|z|² > 4`, capped at `max_iter`.
/// A return value of `max_iter` means the orbit never escaped.
pub fn escape_iterations(c: C, max_iter: u32) -> u32 {
    let mut z = C::new(0.0, 0.0);
    for i in 0..max_iter {
        if z.abs_sq() > 4.0 { return i; }
        z = z.square().add(c);
    }
    max_iter
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Intensity `iter / max · 255` on all channels.
    #[default]
    Grayscale,
    /// HSL hue `iter / max · 360`, full saturation, half lightness.
    Hue,
}

impl Palette {
    /// Colour for an iteration count. Non-escaping samples (`0` or `max_iter`) are
    /// always black.
    pub fn color(self, iter: u32, max_iter: u32) -> Color {
        if iter == 0 || iter >= max_iter {
            return Color::BLACK;
        }
        let t = iter as f64 / max_iter as f64;
        match self {
            Palette::Grayscale => {
                let v = (t * 255.0) as u8;
                Color::rgb(v, v, v)
            }
            Palette::Hue => Color::from_hsl(t * 360.0, 1.0, 0.5),
        }
    }
}

/// Escape counts for every pixel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct MandelbrotField {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub counts: Vec<u32>,
}

impl MandelbrotField {
    pub fn generate(width: u32, height: u32, window: ComplexWindow, max_iterations: u32) -> Result<Self> {
        let count = pixel_count(width, height)?;
        if max_iterations == 0 {
            return Err(FractalError::invalid("mandelbrot needs at least one iteration"));
        }
        window.validate()?;

        let mut counts = Vec::with_capacity(count);
        for py in 0..height {
            for px in 0..width {
                counts.push(escape_iterations(window.map(px, py, width, height), max_iterations));
            }
        }
        debug!("mandelbrot {}x{} max_iter {}", width, height, max_iterations);
        Ok(MandelbrotField { width, height, max_iterations, counts })
    }

    pub fn count_at(&self, x: u32, y: u32) -> u32 {
        self.counts[(y * self.width + x) as usize]
    }

    pub fn to_raster(&self, palette: Palette) -> RasterBuffer {
        let pixels = self
            .counts
            .iter()
            .map(|&n| palette.color(n, self.max_iterations).to_u32())
            .collect();
        RasterBuffer::from_pixels(self.width, self.height, pixels)
    }
}
