//! Seeded 2D gradient noise.
//!
//! The permutation table is filled by an xorshift32 stream so a seed always yields the
//! same table; sampling is a pure function of the table and the coordinate.

use crate::math::{clamp01, lerp, smoothstep};

/// xorshift32 cannot leave the all-zero state, so seed 0 is replaced.
const ZERO_SEED_SUBSTITUTE: u32 = 0x9E37_79B9;

#[derive(Clone, Debug)]
pub struct Noise2D {
    perm: [u8; 512],
}

impl Noise2D {
    pub fn new(seed: u32) -> Self {
        let mut x = if seed == 0 { ZERO_SEED_SUBSTITUTE } else { seed };
        let mut p = [0u8; 256];
        for slot in p.iter_mut() {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *slot = (x & 255) as u8;
        }
        let mut perm = [0u8; 512];
        for (i, v) in perm.iter_mut().enumerate() {
            *v = p[i & 255];
        }
        Noise2D { perm }
    }

    pub fn permutation(&self) -> &[u8; 512] {
        &self.perm
    }

    /// Gradient noise at `(x, y)` in `[0, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let fx = x.floor();
        let fy = y.floor();
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let xf = x - fx;
        let yf = y - fy;
        let u = smoothstep(xf);
        let v = smoothstep(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let x1 = lerp(grad(aa, xf, yf), grad(ba, xf - 1.0, yf), u);
        let x2 = lerp(grad(ab, xf, yf - 1.0), grad(bb, xf - 1.0, yf - 1.0), u);
        clamp01((lerp(x1, x2, v) + 1.0) * 0.5)
    }
}

/// Dot product with one of the four diagonal gradients picked by the low hash bits.
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    let u = if hash & 1 != 0 { -x } else { x };
    let v = if hash & 2 != 0 { -y } else { y };
    u + v
}
