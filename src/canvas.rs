//! Software rasteriser behind the window and PNG export.

use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::raster::{Color, RasterBuffer};
use crate::surface::Surface;

/// Coordinates further out than this are not worth walking pixel by pixel.
const MAX_COORD: f64 = 1.0e6;

pub struct PixelSurface {
    buffer: RasterBuffer,
    path: Vec<Point>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self> {
        Ok(PixelSurface { buffer: RasterBuffer::new(width, height, background)?, path: Vec::new() })
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut RasterBuffer {
        &mut self.buffer
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64 {
            self.buffer.set_pixel(x as u32, y as u32, color);
        }
    }

    fn stamp(&mut self, x: i64, y: i64, radius: i64, color: Color) {
        if radius == 0 {
            self.plot(x, y, color);
            return;
        }
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.plot(x + dx, y + dy, color);
                }
            }
        }
    }

    /// Bresenham walk from `a` to `b`, stamping a disc of `radius` at each step.
    fn draw_line(&mut self, a: Point, b: Point, radius: i64, color: Color) {
        let ok = |v: f64| v.is_finite() && v.abs() < MAX_COORD;
        if !(ok(a.x) && ok(a.y) && ok(b.x) && ok(b.y)) {
            return;
        }
        let (x0, y0) = (a.x.round() as i64, a.y.round() as i64);
        let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.stamp(x, y, radius, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }
}

impl Surface for PixelSurface {
    fn clear(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = (rect.x + rect.w).round().clamp(0.0, self.width() as f64) as u32;
        let y1 = (rect.y + rect.h).round().clamp(0.0, self.height() as f64) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.buffer.set_pixel(x, y, color);
            }
        }
    }

    fn move_to(&mut self, p: Point) {
        self.path.clear();
        self.path.push(p);
    }

    fn line_to(&mut self, p: Point) {
        self.path.push(p);
    }

    fn stroke(&mut self, color: Color, width: f64) {
        let path = std::mem::take(&mut self.path);
        // a disc wider than the surface paints nothing more
        let limit = self.width().max(self.height()) as f64;
        let radius = ((width - 1.0) / 2.0).round().clamp(0.0, limit) as i64;
        for pair in path.windows(2) {
            self.draw_line(pair[0], pair[1], radius, color);
        }
    }

    /// Even-odd scanline fill sampled at pixel centres.
    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        let row_start = min_y.floor().max(0.0) as u32;
        let row_end = max_y.ceil().clamp(0.0, self.height() as f64) as u32;

        let mut crossings = Vec::with_capacity(points.len());
        for row in row_start..row_end {
            let cy = row as f64 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= cy) != (b.y <= cy) {
                    crossings.push(a.x + (cy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            crossings.sort_by(|l, r| l.total_cmp(r));
            for span in crossings.chunks_exact(2) {
                let from = (span[0] - 0.5).ceil().max(0.0) as i64;
                let to = (span[1] - 0.5).floor().min(self.width() as f64 - 1.0) as i64;
                for x in from..=to {
                    self.plot(x, row as i64, color);
                }
            }
        }
    }

    fn put_pixels(&mut self, raster: &RasterBuffer, x: i64, y: i64) {
        for ry in 0..raster.height() {
            for rx in 0..raster.width() {
                self.plot(x + rx as i64, y + ry as i64, Color(raster.pixel(rx, ry)));
            }
        }
    }
}
