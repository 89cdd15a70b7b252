//! Sierpinski triangle: leaf triangles only, the removed middle is never emitted.

use log::debug;

use crate::error::{FractalError, Result};
use crate::geometry::{Point, Triangle};

pub const MAX_SIERPINSKI_DEPTH: u32 = 12;

/// Unit equilateral triangle `A(0,0) B(1,0) C(½,√3/2)`.
pub fn base_triangle() -> Triangle {
    let h = 3f64.sqrt() / 2.0;
    Triangle::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, h), 0)
}

pub fn triangle_count(depth: u32) -> usize {
    3usize.pow(depth)
}

/// Subdivides `base` `depth` times. Children of `(A,B,C)` are produced in the fixed
/// order `(A,Mab,Mca)`, `(Mab,B,Mbc)`, `(Mca,Mbc,C)`.
pub fn generate(base: Triangle, depth: u32) -> Result<Vec<Triangle>> {
    if depth > MAX_SIERPINSKI_DEPTH {
        return Err(FractalError::invalid(format!(
            "sierpinski depth {depth} exceeds ceiling {MAX_SIERPINSKI_DEPTH}"
        )));
    }

    let mut out = Vec::with_capacity(triangle_count(depth));
    let mut work = vec![(base.a, base.b, base.c, depth)];

    while let Some((a, b, c, remaining)) = work.pop() {
        if remaining == 0 {
            out.push(Triangle::new(a, b, c, 0));
            continue;
        }
        let ab = a.midpoint(b);
        let bc = b.midpoint(c);
        let ca = c.midpoint(a);
        work.push((ca, bc, c, remaining - 1));
        work.push((ab, b, bc, remaining - 1));
        work.push((a, ab, ca, remaining - 1));
    }

    debug!("sierpinski depth {} -> {} triangles", depth, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_powers_of_three() {
        for n in 0..=7 {
            assert_eq!(generate(base_triangle(), n).unwrap().len(), 3usize.pow(n));
        }
    }

    #[test]
    fn depth_two_has_nine_leaves() {
        assert_eq!(generate(base_triangle(), 2).unwrap().len(), 9);
    }

    #[test]
    fn leaf_area_shrinks_by_three_quarters() {
        let s0 = base_triangle().area();
        for n in 0..=6 {
            let area: f64 = generate(base_triangle(), n).unwrap().iter().map(Triangle::area).sum();
            let expected = s0 * 0.75f64.powi(n as i32);
            assert!((area - expected).abs() < 1e-12, "depth {n}: {area} vs {expected}");
        }
    }

    #[test]
    fn first_level_order_is_left_top_right() {
        let base = base_triangle();
        let tris = generate(base, 1).unwrap();
        assert_eq!(tris[0].a, base.a);
        assert_eq!(tris[1].b, base.b);
        assert_eq!(tris[2].c, base.c);
    }

    #[test]
    fn rejects_depth_over_ceiling() {
        assert!(generate(base_triangle(), MAX_SIERPINSKI_DEPTH + 1).is_err());
    }
}
