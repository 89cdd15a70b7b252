//! Koch curve and snowflake.
//!
//! Each edge is split into thirds and an equilateral bump is raised on the middle
//! third. Subdivision runs off an explicit work-list so deep requests cannot grow the
//! native stack, and the output buffer is sized from the closed-form count `k·4ⁿ`.

use log::debug;

use crate::error::{FractalError, Result};
use crate::geometry::{Point, Segment};
use crate::math::{DEG60, rotate};

/// Hard ceiling; 3·4¹⁰ is already over three million segments.
pub const MAX_KOCH_DEPTH: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KochShape {
    /// Single unit edge from (0,0) to (1,0).
    Curve,
    /// Unit equilateral triangle, three edges.
    Snowflake,
}

/// Where the bump apex goes.
#[derive(Clone, Copy, Debug)]
enum Apex {
    /// Of the ±60° candidates, the one farther from this point. Exact ties take −60°.
    AwayFrom(Point),
    /// Always the −60° rotation of the middle third.
    FixedTurn,
}

impl KochShape {
    fn base_edges(self) -> Vec<(Point, Point)> {
        match self {
            KochShape::Curve => vec![(Point::new(0.0, 0.0), Point::new(1.0, 0.0))],
            KochShape::Snowflake => {
                let [a, b, c] = snowflake_corners();
                vec![(a, b), (b, c), (c, a)]
            }
        }
    }

    fn apex_rule(self) -> Apex {
        match self {
            KochShape::Curve => Apex::FixedTurn,
            KochShape::Snowflake => {
                let [a, b, c] = snowflake_corners();
                Apex::AwayFrom(Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0))
            }
        }
    }

    /// Closed-form segment count: `edges · 4^depth`.
    pub fn segment_count(self, depth: u32) -> usize {
        self.base_edges().len() * 4usize.pow(depth)
    }
}

fn snowflake_corners() -> [Point; 3] {
    let h = 3f64.sqrt() / 2.0;
    [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, h)]
}

/// Generates the ordered segment list for `shape` at `depth`.
pub fn generate(shape: KochShape, depth: u32) -> Result<Vec<Segment>> {
    if depth > MAX_KOCH_DEPTH {
        return Err(FractalError::invalid(format!(
            "koch depth {depth} exceeds ceiling {MAX_KOCH_DEPTH}"
        )));
    }

    let apex = shape.apex_rule();
    let mut out = Vec::with_capacity(shape.segment_count(depth));
    let mut work: Vec<(Point, Point, u32)> = shape
        .base_edges()
        .into_iter()
        .rev()
        .map(|(p1, p2)| (p1, p2, depth))
        .collect();

    while let Some((p1, p2, remaining)) = work.pop() {
        if remaining == 0 {
            out.push(Segment::new(p1, p2, 0));
            continue;
        }
        let (a, c, b) = bump(p1, p2, apex);
        // reversed so the pop order is p1→A, A→C, C→B, B→p2
        work.push((b, p2, remaining - 1));
        work.push((c, b, remaining - 1));
        work.push((a, c, remaining - 1));
        work.push((p1, a, remaining - 1));
    }

    debug!("koch {:?} depth {} -> {} segments", shape, depth, out.len());
    Ok(out)
}

/// Thirds `A`, `B` and apex `C` for edge `p1→p2`, returned as `(A, C, B)`.
fn bump(p1: Point, p2: Point, apex: Apex) -> (Point, Point, Point) {
    let dx = (p2.x - p1.x) / 3.0;
    let dy = (p2.y - p1.y) / 3.0;
    let a = Point::new(p1.x + dx, p1.y + dy);
    let b = Point::new(p1.x + 2.0 * dx, p1.y + 2.0 * dy);

    let (nx, ny) = rotate(dx, dy, -DEG60);
    let neg = Point::new(a.x + nx, a.y + ny);
    let c = match apex {
        Apex::FixedTurn => neg,
        Apex::AwayFrom(centre) => {
            let (px, py) = rotate(dx, dy, DEG60);
            let pos = Point::new(a.x + px, a.y + py);
            if pos.dist_sq(centre) > neg.dist_sq(centre) { pos } else { neg }
        }
    };
    (a, c, b)
}

/// Sum of segment lengths.
pub fn total_length(segments: &[Segment]) -> f64 {
    segments.iter().map(Segment::length).sum()
}
