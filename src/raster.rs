use serde::{Deserialize, Serialize};

use crate::error::{FractalError, Result};
use crate::math::{clamp01, lerp};

/// Packed `0x00RRGGBB`, the pixel format the window backend blits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn r(self) -> u8 { (self.0 >> 16) as u8 }
    pub fn g(self) -> u8 { (self.0 >> 8) as u8 }
    pub fn b(self) -> u8 { self.0 as u8 }

    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// `h` in degrees, `s` and `l` in `[0, 1]`.
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h_prime = (h.rem_euclid(360.0)) / 60.0;
        let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
        let (r1, g1, b1) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Color::from_unit(r1 + m, g1 + m, b1 + m)
    }

    fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| (clamp01(v) * 255.0).round() as u8;
        Color::rgb(q(r), q(g), q(b))
    }

    /// Channel-wise linear blend toward `other`.
    pub fn mix(self, other: Color, t: f64) -> Color {
        let ch = |a: u8, b: u8| lerp(a as f64, b as f64, t).round().clamp(0.0, 255.0) as u8;
        Color::rgb(ch(self.r(), other.r()), ch(self.g(), other.g()), ch(self.b(), other.b()))
    }

    /// Every channel multiplied by `k`, rounded and clamped.
    pub fn scale(self, k: f64) -> Color {
        let ch = |v: u8| (v as f64 * k).round().clamp(0.0, 255.0) as u8;
        Color::rgb(ch(self.r()), ch(self.g()), ch(self.b()))
    }

    pub fn brighten(self, amount: u8) -> Color {
        Color::rgb(
            self.r().saturating_add(amount),
            self.g().saturating_add(amount),
            self.b().saturating_add(amount),
        )
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let hex = s.strip_prefix('#').unwrap_or(&s);
        if hex.len() != 6 {
            return Err(format!("expected #rrggbb, got {s:?}"));
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|e| format!("bad colour {s:?}: {e}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        format!("#{:06x}", c.0)
    }
}

/// Largest raster any generator will allocate, 8192 × 8192.
pub const MAX_PIXELS: usize = 1 << 26;

/// Sample count of a `width × height` grid, rejecting empty and oversized grids.
pub fn pixel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(FractalError::invalid(format!("raster {width}x{height} has no pixels")));
    }
    match (width as usize).checked_mul(height as usize) {
        Some(n) if n <= MAX_PIXELS => Ok(n),
        _ => Err(FractalError::invalid(format!(
            "raster {width}x{height} exceeds {MAX_PIXELS} pixels"
        ))),
    }
}

/// Row-major pixel block.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RasterBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Result<Self> {
        let count = pixel_count(width, height)?;
        Ok(RasterBuffer { width, height, pixels: vec![fill.0; count] })
    }

    pub(crate) fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        RasterBuffer { width, height, pixels }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color.0;
        }
    }

    /// One-row strips, top to bottom. Used to schedule rasters progressively.
    pub fn rows(&self) -> Vec<RasterBuffer> {
        self.pixels
            .chunks_exact(self.width as usize)
            .map(|row| RasterBuffer::from_pixels(self.width, 1, row.to_vec()))
            .collect()
    }

    /// Nearest-neighbour resample to `width × height` (blocky look, no smoothing).
    pub fn upscale_nearest(&self, width: u32, height: u32) -> Result<RasterBuffer> {
        let mut out = RasterBuffer::new(width, height, Color::BLACK)?;
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as u32;
                out.pixels[(y * width + x) as usize] = self.pixel(sx, sy);
            }
        }
        Ok(out)
    }

    /// Interleaved RGBA8 bytes, alpha opaque.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            let c = Color(p);
            out.extend_from_slice(&[c.r(), c.g(), c.b(), 0xFF]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_through_serde() {
        let c: Color = serde_json::from_str("\"#60a5fa\"").unwrap();
        assert_eq!(c, Color::rgb(0x60, 0xa5, 0xfa));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#60a5fa\"");
        assert!(serde_json::from_str::<Color>("\"#fff\"").is_err());
    }

    #[test]
    fn oversized_rasters_are_rejected_before_allocating() {
        assert_eq!(pixel_count(8192, 8192).unwrap(), MAX_PIXELS);
        assert!(matches!(pixel_count(8193, 8192), Err(FractalError::InvalidParameter(_))));
        assert!(pixel_count(70_000, 70_000).is_err());
        assert!(pixel_count(u32::MAX, u32::MAX).is_err());
        assert!(pixel_count(0, 5).is_err());
        assert!(RasterBuffer::new(65_536, 65_537, Color::BLACK).is_err());
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::from_hsl(0.0, 1.0, 0.5), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hsl(120.0, 1.0, 0.5), Color::rgb(0, 255, 0));
        assert_eq!(Color::from_hsl(240.0, 1.0, 0.5), Color::rgb(0, 0, 255));
    }

    #[test]
    fn rows_split_in_order() {
        let mut r = RasterBuffer::new(2, 3, Color::BLACK).unwrap();
        r.set_pixel(1, 2, Color::WHITE);
        let rows = r.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].pixel(1, 0), Color::WHITE.0);
        assert_eq!(rows[0].pixel(1, 0), 0);
    }

    #[test]
    fn upscale_repeats_blocks() {
        let mut r = RasterBuffer::new(2, 2, Color::BLACK).unwrap();
        r.set_pixel(1, 1, Color::WHITE);
        let big = r.upscale_nearest(8, 8).unwrap();
        assert_eq!(big.pixel(7, 7), Color::WHITE.0);
        assert_eq!(big.pixel(4, 4), Color::WHITE.0);
        assert_eq!(big.pixel(3, 3), 0);
    }

    #[test]
    fn scale_and_mix_clamp() {
        assert_eq!(Color::rgb(200, 100, 0).scale(2.0), Color::rgb(255, 200, 0));
        assert_eq!(Color::BLACK.mix(Color::WHITE, 0.5), Color::rgb(128, 128, 128));
        assert_eq!(Color::rgb(250, 0, 0).brighten(18), Color::rgb(255, 18, 18));
    }
}
