use std::f64::consts::PI;

pub const DEG60: f64 = PI / 3.0;

/// Complex number in the escape-time plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct C {
    pub re: f64,
    pub im: f64,
}

impl C {
    pub fn new(re: f64, im: f64) -> Self {
        C { re, im }
    }

    pub fn abs_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn add(&self, other: C) -> C {
        C::new(self.re + other.re, self.im + other.im)
    }

    /// z² via Re = x²−y², Im = 2xy.
    pub fn square(&self) -> C {
        C::new(
            self.re * self.re - self.im * self.im,
            2.0 * self.re * self.im,
        )
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Hermite fade `t²(3−2t)`.
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep of `x` remapped from the edge interval `[a, b]`.
pub fn smoothstep_between(a: f64, b: f64, x: f64) -> f64 {
    smoothstep(clamp01((x - a) / (b - a)))
}

/// Rotates the vector `(vx, vy)` by `angle` radians.
pub fn rotate(vx: f64, vy: f64, angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    (vx * c - vy * s, vx * s + vy * c)
}
