//! Base-space geometry shared by the generators, the fit scaler and the renderer.
//!
//! Generators work in an untransformed space (unit side length, y pointing down like
//! the drawing surface). Every element records the recursion `level` it was emitted
//! at; level 0 is a base case.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn dist_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Something drawable made of base-space vertices.
pub trait Primitive {
    fn visit_vertices(&self, f: &mut dyn FnMut(Point));
    fn level(&self) -> u32;

    fn is_base(&self) -> bool {
        self.level() == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
    pub level: u32,
}

impl Segment {
    pub fn new(a: Point, b: Point, level: u32) -> Self {
        Segment { a, b, level }
    }

    pub fn length(&self) -> f64 {
        self.a.dist_sq(self.b).sqrt()
    }
}

impl Primitive for Segment {
    fn visit_vertices(&self, f: &mut dyn FnMut(Point)) {
        f(self.a);
        f(self.b);
    }

    fn level(&self) -> u32 {
        self.level
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub level: u32,
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point, level: u32) -> Self {
        Triangle { a, b, c, level }
    }

    pub fn area(&self) -> f64 {
        ((self.b.x - self.a.x) * (self.c.y - self.a.y)
            - (self.c.x - self.a.x) * (self.b.y - self.a.y))
            .abs()
            * 0.5
    }
}

impl Primitive for Triangle {
    fn visit_vertices(&self, f: &mut dyn FnMut(Point)) {
        f(self.a);
        f(self.b);
        f(self.c);
    }

    fn level(&self) -> u32 {
        self.level
    }
}

/// Closed outline (Pythagoras squares and caps).
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub level: u32,
}

impl Primitive for Polygon {
    fn visit_vertices(&self, f: &mut dyn FnMut(Point)) {
        for p in &self.points {
            f(*p);
        }
    }

    fn level(&self) -> u32 {
        self.level
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Box over every vertex of `items`; `None` when there are no vertices.
    pub fn of<P: Primitive>(items: &[P]) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for item in items {
            item.visit_vertices(&mut |p| {
                bbox = Some(match bbox {
                    None => BoundingBox { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y },
                    Some(b) => BoundingBox {
                        min_x: b.min_x.min(p.x),
                        min_y: b.min_y.min(p.y),
                        max_x: b.max_x.max(p.x),
                        max_y: b.max_y.max(p.y),
                    },
                });
            });
        }
        bbox
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Target region in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// `inner` px removed from every side, never negative.
    pub fn inset(&self, inner: f64) -> Rect {
        Rect::new(
            self.x + inner,
            self.y + inner,
            (self.w - 2.0 * inner).max(0.0),
            (self.h - 2.0 * inner).max(0.0),
        )
    }

    pub fn has_area(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

/// Element totals reported next to a rendered fractal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationStats {
    pub total: usize,
    pub base: usize,
    pub per_level: BTreeMap<u32, usize>,
}

impl GenerationStats {
    pub fn of<P: Primitive>(items: &[P]) -> Self {
        let mut stats = GenerationStats { total: items.len(), ..Default::default() };
        for item in items {
            *stats.per_level.entry(item.level()).or_insert(0) += 1;
            if item.is_base() {
                stats.base += 1;
            }
        }
        stats
    }
}
