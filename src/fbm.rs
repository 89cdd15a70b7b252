//! Fractal Brownian motion fields and the shaded terrain view.

use log::debug;

use crate::error::{FractalError, Result};
use crate::math::{lerp, smoothstep_between};
use crate::noise::Noise2D;
use crate::raster::{Color, RasterBuffer, pixel_count};

pub const MAX_OCTAVES: u32 = 16;

/// Floor on `max − min` so a constant field normalises without dividing by zero.
pub const MIN_RANGE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    pub octaves: u32,
    pub base_scale: f64,
    pub persistence: f64,
    pub lacunarity: f64,
    pub seed: u32,
}

impl Default for FbmParams {
    fn default() -> Self {
        FbmParams { octaves: 4, base_scale: 0.008, persistence: 0.5, lacunarity: 2.0, seed: 42 }
    }
}

impl FbmParams {
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(FractalError::invalid(format!(
                "octaves must be in [1, {MAX_OCTAVES}], got {}",
                self.octaves
            )));
        }
        let finite = [self.base_scale, self.persistence, self.lacunarity]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.base_scale <= 0.0 || self.persistence <= 0.0 || self.lacunarity <= 0.0 {
            return Err(FractalError::invalid(format!("fbm parameters must be positive: {self:?}")));
        }
        Ok(())
    }
}

/// Raw octave sum at `(x, y)`: `Σ (2·noise − 1) · persistenceᵒ` with frequency
/// `scale · lacunarityᵒ`. Not normalised.
pub fn fbm_sum(noise: &Noise2D, x: f64, y: f64, octaves: u32, scale: f64, persistence: f64, lacunarity: f64) -> f64 {
    let mut amp = 1.0;
    let mut freq = 1.0;
    let mut value = 0.0;
    for _ in 0..octaves {
        value += (noise.sample(x * scale * freq, y * scale * freq) * 2.0 - 1.0) * amp;
        amp *= persistence;
        freq *= lacunarity;
    }
    value
}

/// Row-major scalar field normalised to `[0, 1]` over its own min and max.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseField {
    pub width: u32,
    pub height: u32,
    values: Vec<f64>,
}

impl NoiseField {
    /// Evaluates `f` on every sample, then min-max normalises the whole field.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f64) -> Result<Self> {
        let mut values = Vec::with_capacity(pixel_count(width, height)?);
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for y in 0..height {
            for x in 0..width {
                let v = f(x, y);
                min = min.min(v);
                max = max.max(v);
                values.push(v);
            }
        }
        let range = (max - min).max(MIN_RANGE);
        for v in values.iter_mut() {
            *v = ((*v - min) / range).clamp(0.0, 1.0);
        }
        Ok(NoiseField { width, height, values })
    }

    pub fn generate(width: u32, height: u32, params: FbmParams) -> Result<Self> {
        params.validate()?;
        let noise = Noise2D::new(params.seed);
        let field = NoiseField::from_fn(width, height, |x, y| {
            fbm_sum(
                &noise,
                x as f64,
                y as f64,
                params.octaves,
                params.base_scale,
                params.persistence,
                params.lacunarity,
            )
        })?;
        debug!("fbm {}x{} octaves {} seed {}", width, height, params.octaves, params.seed);
        Ok(field)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[(y * self.width + x) as usize]
    }

    /// Sample with coordinates clamped to the field edge.
    pub fn get_clamped(&self, x: i64, y: i64) -> f64 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(cx, cy)
    }

    /// Unit surface normal from central differences, steepened by `gain`.
    pub fn normal_at(&self, x: u32, y: u32, gain: f64) -> [f64; 3] {
        let (x, y) = (x as i64, y as i64);
        let nx = (self.get_clamped(x - 1, y) - self.get_clamped(x + 1, y)) * gain;
        let ny = (self.get_clamped(x, y - 1) - self.get_clamped(x, y + 1)) * gain;
        normalize([nx, ny, 1.0])
    }
}

pub fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Light from the north-west, slightly raised.
pub const LIGHT_DIR: [f64; 3] = [-0.6, -0.7, 0.4];

const TERRAIN_NORMAL_GAIN: f64 = 8.0;
const TERRAIN_AMBIENT: f64 = 0.2;
const CONTOUR_STEP: f64 = 0.1;
const CONTOUR_WIDTH: f64 = 0.015;
const CONTOUR_LIFT: u8 = 18;

/// Elevation colour ramp: water to sand, grass, rock, snow.
pub fn terrain_color(t: f64) -> Color {
    let band = |lo: Color, hi: Color, from: f64, width: f64| {
        lo.mix(hi, smoothstep_between(0.0, 1.0, (t - from) / width))
    };
    if t < 0.35 {
        band(Color::rgb(30, 60, 150), Color::rgb(220, 205, 160), 0.0, 0.35)
    } else if t < 0.6 {
        band(Color::rgb(90, 160, 60), Color::rgb(40, 120, 40), 0.35, 0.25)
    } else if t < 0.8 {
        band(Color::rgb(110, 110, 110), Color::rgb(170, 170, 170), 0.6, 0.2)
    } else {
        band(Color::rgb(200, 200, 210), Color::rgb(245, 245, 250), 0.8, 0.2)
    }
}

/// Height field coloured by elevation, lit by `LIGHT_DIR` with an ambient floor, and
/// with lighter contour lines every tenth of the height range.
pub fn shade_terrain(field: &NoiseField) -> RasterBuffer {
    let light = normalize(LIGHT_DIR);
    let (w, h) = (field.width, field.height);
    let mut pixels = Vec::with_capacity(field.values.len());

    for y in 0..h {
        for x in 0..w {
            let n = field.normal_at(x, y, TERRAIN_NORMAL_GAIN);
            let lit = dot(n, light).max(TERRAIN_AMBIENT);
            pixels.push(terrain_color(field.get(x, y)).scale(lit).to_u32());
        }
    }

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let t = field.get(x, y) / CONTOUR_STEP;
            if (t - t.round()).abs() < CONTOUR_WIDTH {
                let i = (y * w + x) as usize;
                pixels[i] = Color(pixels[i]).brighten(CONTOUR_LIFT).to_u32();
            }
        }
    }

    RasterBuffer::from_pixels(w, h, pixels)
}

/// Gray ramp of the raw field, no lighting.
pub fn grayscale(field: &NoiseField) -> RasterBuffer {
    let pixels = field
        .values()
        .iter()
        .map(|&v| {
            let g = lerp(0.0, 255.0, v).round() as u8;
            Color::rgb(g, g, g).to_u32()
        })
        .collect();
    RasterBuffer::from_pixels(field.width, field.height, pixels)
}
