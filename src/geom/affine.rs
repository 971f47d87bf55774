use std::ops::Mul;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::GeomError;

/// A 2D affine transform placing tile pixels in a shared frame.
///
/// Maps local coordinates (x, y) to frame coordinates (x', y'):
///   x' = a * x + b * y + c
///   y' = d * x + e * y + f
///
/// Serialized as the flat array [a, b, c, d, e, f].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self { Self::identity() }
}

impl From<[f64; 6]> for Affine {
    fn from(t: [f64; 6]) -> Self { Self::new(t[0], t[1], t[2], t[3], t[4], t[5]) }
}

impl From<Affine> for [f64; 6] {
    fn from(t: Affine) -> Self { [t.a, t.b, t.c, t.d, t.e, t.f] }
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[inline] pub fn identity() -> Self { Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0) }

    /// Pure translation by (dx, dy).
    #[inline] pub fn translation(dx: f64, dy: f64) -> Self { Self::new(1.0, 0.0, dx, 0.0, 1.0, dy) }

    /// Uniform scale about the origin.
    #[inline] pub fn scale(s: f64) -> Self { Self::new(s, 0.0, 0.0, 0.0, s, 0.0) }

    /// Counter-clockwise rotation about the origin by `radians`.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// Determinant of the linear part.
    #[inline] pub fn det(&self) -> f64 { self.a * self.e - self.b * self.d }

    /// Apply the transform to a single point.
    #[inline]
    pub fn apply(&self, p: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.a * p.x + self.b * p.y + self.c,
            y: self.d * p.x + self.e * p.y + self.f,
        }
    }

    /// Apply the transform to every point in place.
    pub fn apply_all(&self, points: &mut [Coord<f64>]) {
        for p in points.iter_mut() { *p = self.apply(*p) }
    }

    /// Composition `self ∘ rhs`: the result maps a point through `rhs` first, then `self`.
    pub fn compose(&self, rhs: &Affine) -> Affine {
        Affine {
            a: self.a * rhs.a + self.b * rhs.d,
            b: self.a * rhs.b + self.b * rhs.e,
            c: self.a * rhs.c + self.b * rhs.f + self.c,
            d: self.d * rhs.a + self.e * rhs.d,
            e: self.d * rhs.b + self.e * rhs.e,
            f: self.d * rhs.c + self.e * rhs.f + self.f,
        }
    }

    /// Return a copy shifted by (dx, dy) in the output frame.
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64) -> Affine {
        Affine { c: self.c + dx, f: self.f + dy, ..*self }
    }

    /// Compute the inverse affine transform.
    pub fn inverse(&self) -> Result<Affine, GeomError> {
        let det = self.det();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return Err(GeomError::Singular { det });
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }

    /// Rotation angle of the linear part, in radians.
    /// Averages the two off-diagonal terms so mild shear does not bias the result.
    pub fn angle(&self) -> f64 {
        (self.d - self.b).atan2(self.a + self.e)
    }
}

impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine { self.compose(&rhs) }
}
