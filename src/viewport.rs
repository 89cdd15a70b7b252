use log::{debug, warn};

use crate::error::{FractalError, Result};
use crate::geometry::{BoundingBox, Point, Rect};

/// Stand-in for a zero bounding-box extent (a single horizontal or vertical segment).
pub const MIN_EXTENT: f64 = 1e-9;

/// Uniform scale plus translation from base space into the draw area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitTransform {
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset_x, p.y * self.scale + self.offset_y)
    }
}

/// Largest aspect-preserving scale that fits `bbox` into `rect`, centred on both axes.
pub fn fit(bbox: &BoundingBox, rect: &Rect) -> Result<FitTransform> {
    if !rect.has_area() || !rect.x.is_finite() || !rect.y.is_finite() {
        return Err(FractalError::invalid(format!("draw area {rect:?} has no area")));
    }
    let (bw, bh) = (bbox.width(), bbox.height());
    if !bw.is_finite() || !bh.is_finite() || !bbox.min_x.is_finite() || !bbox.min_y.is_finite() {
        return Err(FractalError::invalid(format!("bounding box {bbox:?} is not finite")));
    }
    if bw <= 0.0 && bh <= 0.0 {
        return Err(FractalError::invalid(format!("bounding box {bbox:?} is a single point")));
    }
    let bw = if bw <= 0.0 {
        warn!("zero-width bounding box, using extent {MIN_EXTENT}");
        MIN_EXTENT
    } else {
        bw
    };
    let bh = if bh <= 0.0 {
        warn!("zero-height bounding box, using extent {MIN_EXTENT}");
        MIN_EXTENT
    } else {
        bh
    };

    let scale = (rect.w / bw).min(rect.h / bh);
    let offset_x = rect.x + (rect.w - bw * scale) / 2.0 - bbox.min_x * scale;
    let offset_y = rect.y + (rect.h - bh * scale) / 2.0 - bbox.min_y * scale;
    debug!("fit scale {scale:.4} offset ({offset_x:.2}, {offset_y:.2})");
    Ok(FitTransform { scale, offset_x, offset_y })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn bbox(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    #[test]
    fn same_inputs_give_bit_identical_transform() {
        let b = bbox(-0.3, 0.1, 1.7, 0.9);
        let r = Rect::new(48.0, 48.0, 624.0, 624.0);
        let t1 = fit(&b, &r).unwrap();
        let t2 = fit(&b, &r).unwrap();
        assert_eq!(t1.scale.to_bits(), t2.scale.to_bits());
        assert_eq!(t1.offset_x.to_bits(), t2.offset_x.to_bits());
        assert_eq!(t1.offset_y.to_bits(), t2.offset_y.to_bits());
    }

    #[test]
    fn corners_land_inside_and_centred() {
        let b = bbox(-1.0, -0.5, 3.0, 1.5);
        let r = Rect::new(10.0, 20.0, 200.0, 300.0);
        let t = fit(&b, &r).unwrap();
        let lo = t.apply(Point::new(b.min_x, b.min_y));
        let hi = t.apply(Point::new(b.max_x, b.max_y));
        for p in [lo, hi] {
            assert!(p.x >= r.x - EPS && p.x <= r.x + r.w + EPS);
            assert!(p.y >= r.y - EPS && p.y <= r.y + r.h + EPS);
        }
        // width-limited: fills horizontally, centred vertically
        assert!((t.scale - 50.0).abs() < EPS);
        assert!((lo.x - r.x).abs() < EPS && (hi.x - (r.x + r.w)).abs() < EPS);
        let top_gap = lo.y - r.y;
        let bottom_gap = r.y + r.h - hi.y;
        assert!((top_gap - bottom_gap).abs() < EPS);
    }

    #[test]
    fn flat_box_gets_epsilon_extent() {
        let t = fit(&bbox(0.0, 0.0, 1.0, 0.0), &Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert!((t.scale - 100.0).abs() < EPS);
        let p = t.apply(Point::new(0.5, 0.0));
        assert!((p.x - 50.0).abs() < EPS);
        assert!((p.y - 50.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(fit(&bbox(1.0, 1.0, 1.0, 1.0), &r).is_err());
        assert!(fit(&bbox(0.0, 0.0, f64::INFINITY, 1.0), &r).is_err());
        assert!(fit(&bbox(0.0, 0.0, 1.0, 1.0), &Rect::new(0.0, 0.0, 0.0, 100.0)).is_err());
    }
}
