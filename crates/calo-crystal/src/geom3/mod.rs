//! 3D value types for crystal geometry.
//!
//! Purpose
//! - Points and vectors are plain nalgebra values (`Point3<f64>`, `Vector3<f64>`).
//! - `Plane3` is the one extra type we need: an oriented plane built from three
//!   points, with signed distances measured in units of length.
//!
//! Conventions
//! - `Plane3::through(a, b, c)` stores `n = (b - a) × (c - a)` (not normalized)
//!   and `d = -n·a`, so `n·x + d = 0` on the plane.
//! - Orientation of `n` follows the winding of the three points; callers that
//!   need an outward normal pick the sign themselves.

mod cfg;
mod types;

pub(crate) use cfg::CONTAINS_EPS;
pub use types::{centroid, tetra_volume, unit_or_none, Plane3};
