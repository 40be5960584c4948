//! Plane type and small vector helpers.

use nalgebra::{Point3, Vector3};

use super::cfg::DEGENERATE_EPS;

/// Oriented plane `n·x + d = 0` in R^3.
///
/// Invariants:
/// - `n` is not normalized; `signed_distance` divides by `|n|`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane3 {
    pub n: Vector3<f64>,
    pub d: f64,
}

impl Plane3 {
    #[inline]
    pub fn new(n: Vector3<f64>, d: f64) -> Self {
        Self { n, d }
    }

    /// Plane through `a`, `b`, `c` with normal `(b - a) × (c - a)`.
    #[inline]
    pub fn through(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let n = (b - a).cross(&(c - a));
        let d = -n.dot(&a.coords);
        Self { n, d }
    }

    /// Signed distance of `p`; positive on the side `n` points to.
    ///
    /// Pre: `n` is non-zero (NaN otherwise).
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (self.n.dot(&p.coords) + self.d) / self.n.norm()
    }

    /// Unit normal, or `None` if the plane came from collinear points.
    #[inline]
    pub fn unit_normal(&self) -> Option<Vector3<f64>> {
        unit_or_none(&self.n)
    }

    /// Same plane with the normal reversed.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            n: -self.n,
            d: -self.d,
        }
    }
}

/// Normalize `v`, returning `None` when `|v| <= DEGENERATE_EPS`.
#[inline]
pub fn unit_or_none(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    v.try_normalize(DEGENERATE_EPS)
}

/// Arithmetic mean of `points`. Returns the origin for an empty slice.
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Unsigned volume of the tetrahedron `(apex, a, b, c)`.
#[inline]
pub fn tetra_volume(
    apex: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> f64 {
    let (u, v, w) = (a - apex, b - apex, c - apex);
    u.dot(&v.cross(&w)).abs() / 6.0
}
