//! Branching trees: the binary fractal tree and the Pythagoras tree.
//!
//! Both grow upward in base space (negative y) and emit in depth-first pre-order, so a
//! parent is always drawn before its children.

use std::f64::consts::{FRAC_PI_2, PI};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{FractalError, Result};
use crate::geometry::{Point, Polygon, Segment};

pub const MAX_TREE_DEPTH: u32 = 15;
pub const MAX_PYTHAGORAS_DEPTH: u32 = 15;

/// Directed root segment of the fractal tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootEdge {
    pub origin: Point,
    pub length: f64,
    /// Heading in radians, counter-clockwise from +x as seen on screen.
    pub heading: f64,
}

impl Default for RootEdge {
    fn default() -> Self {
        RootEdge { origin: Point::new(0.0, 0.0), length: 1.0, heading: FRAC_PI_2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Branch deviation from the parent heading.
    pub angle: f64,
    /// Child length as a fraction of the parent.
    pub shrink: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        TreeParams { angle: PI / 6.0, shrink: 0.67 }
    }
}

impl TreeParams {
    pub fn validate(&self) -> Result<()> {
        if !self.angle.is_finite() {
            return Err(FractalError::invalid("tree angle must be finite"));
        }
        if !(self.shrink.is_finite() && self.shrink > 0.0) {
            return Err(FractalError::invalid(format!(
                "tree shrink factor must be positive, got {}",
                self.shrink
            )));
        }
        Ok(())
    }
}

pub fn tree_segment_count(depth: u32) -> usize {
    (1usize << (depth + 1)) - 1
}

/// Fractal tree. Every branch down to depth 0 is drawn; a branch at depth 0 has no
/// children. Segment `level` is the depth remaining at that branch.
pub fn generate_tree(root: RootEdge, depth: u32, params: TreeParams) -> Result<Vec<Segment>> {
    if depth > MAX_TREE_DEPTH {
        return Err(FractalError::invalid(format!(
            "tree depth {depth} exceeds ceiling {MAX_TREE_DEPTH}"
        )));
    }
    params.validate()?;

    let mut out = Vec::with_capacity(tree_segment_count(depth));
    let mut work = vec![(root.origin, root.length, root.heading, depth)];

    while let Some((start, len, dir, remaining)) = work.pop() {
        let end = Point::new(start.x + dir.cos() * len, start.y - dir.sin() * len);
        out.push(Segment::new(start, end, remaining));
        if remaining == 0 {
            continue;
        }
        let child = len * params.shrink;
        work.push((end, child, dir - params.angle, remaining - 1));
        work.push((end, child, dir + params.angle, remaining - 1));
    }

    debug!("tree depth {} -> {} segments", depth, out.len());
    Ok(out)
}

/// Default Pythagoras base edge: unit length, squares grow toward negative y.
pub fn pythagoras_base() -> (Point, Point) {
    (Point::new(0.5, 0.0), Point::new(-0.5, 0.0))
}

pub fn pythagoras_square_count(depth: u32) -> usize {
    (1usize << depth) - 1
}

/// Pythagoras tree as closed outlines. Each node emits its square, then (when it has
/// children) the right-isosceles cap on the square's far edge; the two cap legs become
/// the children's base edges. Depth 0 emits nothing.
pub fn generate_pythagoras(base: (Point, Point), depth: u32) -> Result<Vec<Polygon>> {
    if depth > MAX_PYTHAGORAS_DEPTH {
        return Err(FractalError::invalid(format!(
            "pythagoras depth {depth} exceeds ceiling {MAX_PYTHAGORAS_DEPTH}"
        )));
    }
    if base.0 == base.1 {
        return Err(FractalError::invalid("pythagoras base edge has zero length"));
    }

    let caps = if depth > 1 { (1usize << (depth - 1)) - 1 } else { 0 };
    let mut out = Vec::with_capacity(pythagoras_square_count(depth) + caps);
    let mut work = vec![(base.0, base.1, depth)];

    while let Some((p1, p2, remaining)) = work.pop() {
        if remaining == 0 {
            continue;
        }
        let level = remaining - 1;
        let (px, py) = (-(p2.y - p1.y), p2.x - p1.x);
        let p3 = Point::new(p2.x + px, p2.y + py);
        let p4 = Point::new(p1.x + px, p1.y + py);
        out.push(Polygon { points: vec![p1, p2, p3, p4], level });

        if level == 0 {
            continue;
        }
        let mid = p4.midpoint(p3);
        let apex = Point::new(mid.x + px * 0.5, mid.y + py * 0.5);
        out.push(Polygon { points: vec![p4, apex, p3], level });
        work.push((apex, p3, level));
        work.push((p4, apex, level));
    }

    debug!("pythagoras depth {} -> {} outlines", depth, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_counts_double_per_level() {
        for n in 0..=10 {
            let segs = generate_tree(RootEdge::default(), n, TreeParams::default()).unwrap();
            assert_eq!(segs.len(), tree_segment_count(n));
            assert_eq!(segs.iter().filter(|s| s.level == 0).count(), 1 << n);
        }
    }

    #[test]
    fn tree_depth_zero_is_the_trunk() {
        let segs = generate_tree(RootEdge::default(), 0, TreeParams::default()).unwrap();
        assert_eq!(segs.len(), 1);
        assert!((segs[0].b.y + 1.0).abs() < 1e-12);
        assert!(segs[0].b.x.abs() < 1e-12);
    }

    #[test]
    fn tree_children_start_at_parent_tip_and_shrink() {
        let params = TreeParams::default();
        let segs = generate_tree(RootEdge::default(), 1, params).unwrap();
        let trunk = segs[0];
        for child in &segs[1..] {
            assert_eq!(child.a, trunk.b);
            assert!((child.length() - params.shrink).abs() < 1e-12);
        }
        // left branch (heading + angle) leans to negative x and comes first
        assert!(segs[1].b.x < segs[2].b.x);
    }

    #[test]
    fn tree_rejects_bad_params() {
        let bad = TreeParams { angle: 0.5, shrink: 0.0 };
        assert!(generate_tree(RootEdge::default(), 3, bad).is_err());
        assert!(generate_tree(RootEdge::default(), MAX_TREE_DEPTH + 1, TreeParams::default()).is_err());
    }

    #[test]
    fn pythagoras_depth_zero_is_empty() {
        assert!(generate_pythagoras(pythagoras_base(), 0).unwrap().is_empty());
    }

    #[test]
    fn pythagoras_counts() {
        for n in 1..=9 {
            let shapes = generate_pythagoras(pythagoras_base(), n).unwrap();
            let squares = shapes.iter().filter(|p| p.points.len() == 4).count();
            let caps = shapes.iter().filter(|p| p.points.len() == 3).count();
            assert_eq!(squares, pythagoras_square_count(n));
            assert_eq!(caps, (1usize << (n - 1)) - 1);
        }
    }

    #[test]
    fn pythagoras_grows_upward_with_halved_areas() {
        let shapes = generate_pythagoras(pythagoras_base(), 2).unwrap();
        let root = &shapes[0];
        assert!(root.points[2].y < 0.0 && root.points[3].y < 0.0);
        let apex = shapes[1].points[1];
        assert!((apex.y + 1.5).abs() < 1e-12);
        let side = |p: &Polygon| p.points[0].dist_sq(p.points[1]);
        // each child square has half the area of its parent
        assert!((side(&shapes[2]) - 0.5).abs() < 1e-12);
        assert!((side(&shapes[3]) - 0.5).abs() < 1e-12);
    }
}
