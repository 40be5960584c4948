//! Canonical corner ordering for barrel and endcap crystals.
//!
//! The geometry service returns the eight corners in a subsystem-specific
//! order. Both conventions are reduced to one: corners 0..4 on the front face,
//! 4..8 on the back face, corner `i` joined to `i+4` by a lateral edge, both
//! rings wound the same way.
//!
//! Everything here is expressed as an index table `order` with
//! `canonical[i] = source[order[i]]`, so the mapping can be checked without
//! any geometry.

use nalgebra::Point3;

use crate::cell::Subsystem;
use crate::error::CrystalError;

/// Barrel, reference at `z > 0`: source order is already canonical.
pub const BARREL_IDENTITY: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
/// Barrel, reference at `z <= 0`: the -z half is built mirrored.
pub const BARREL_MIRROR: [usize; 8] = [2, 3, 0, 1, 6, 7, 4, 5];

/// Endcap ring offsets for `z > 0`, indexed by `Quadrant as usize`.
pub const ENDCAP_OFFSET_POS_Z: [usize; 4] = [1, 2, 0, 3];
/// Endcap ring offsets for `z <= 0`, indexed by `Quadrant as usize`.
pub const ENDCAP_OFFSET_NEG_Z: [usize; 4] = [3, 2, 0, 1];

/// Quadrant of the transverse plane, by sign of (x, y).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    /// x > 0, y > 0
    PlusPlus = 0,
    /// x < 0, y > 0
    MinusPlus = 1,
    /// x > 0, y < 0
    PlusMinus = 2,
    /// x < 0, y < 0
    MinusMinus = 3,
}

impl Quadrant {
    /// `None` when either coordinate is zero (or NaN).
    pub fn of(x: f64, y: f64) -> Option<Self> {
        match (x > 0.0, x < 0.0, y > 0.0, y < 0.0) {
            (true, _, true, _) => Some(Quadrant::PlusPlus),
            (_, true, true, _) => Some(Quadrant::MinusPlus),
            (true, _, _, true) => Some(Quadrant::PlusMinus),
            (_, true, _, true) => Some(Quadrant::MinusMinus),
            _ => None,
        }
    }
}

/// Endcap order: front corner `i` comes from `(zsign*i + offset) mod 4`,
/// back corner `i+4` from that index plus four.
pub fn endcap_order(offset: usize, zsign: i32) -> [usize; 8] {
    let mut order = [0usize; 8];
    for i in 0..4 {
        let src = (zsign as i64 * i as i64 + offset as i64).rem_euclid(4) as usize;
        order[i] = src;
        order[i + 4] = src + 4;
    }
    order
}

/// Index table mapping source corners to canonical corners.
///
/// `reference` only disambiguates orientation (which half/quadrant of the
/// detector the cell sits in).
pub fn canonical_order(
    subsystem: Subsystem,
    reference: &Point3<f64>,
) -> Result<[usize; 8], CrystalError> {
    match subsystem {
        Subsystem::Barrel => {
            if reference.z > 0.0 {
                Ok(BARREL_IDENTITY)
            } else {
                Ok(BARREL_MIRROR)
            }
        }
        Subsystem::Endcap => {
            let quadrant =
                Quadrant::of(reference.x, reference.y).ok_or(CrystalError::AmbiguousQuadrant {
                    x: reference.x,
                    y: reference.y,
                })?;
            let (table, zsign) = if reference.z > 0.0 {
                (&ENDCAP_OFFSET_POS_Z, 1)
            } else {
                (&ENDCAP_OFFSET_NEG_Z, -1)
            };
            Ok(endcap_order(table[quadrant as usize], zsign))
        }
        Subsystem::Other(_) => Err(CrystalError::UnsupportedSubsystem { subsystem }),
    }
}

/// `canonical[i] = source[order[i]]`; `order` must be a permutation of `0..8`.
#[inline]
pub fn apply(order: &[usize; 8], source: &[Point3<f64>; 8]) -> [Point3<f64>; 8] {
    std::array::from_fn(|i| source[order[i]])
}

/// Inverse of `apply`: rebuild the source ordering from canonical corners.
pub fn unapply(order: &[usize; 8], canonical: &[Point3<f64>; 8]) -> [Point3<f64>; 8] {
    let mut source = [Point3::origin(); 8];
    for (i, &src) in order.iter().enumerate() {
        source[src] = canonical[i];
    }
    source
}
