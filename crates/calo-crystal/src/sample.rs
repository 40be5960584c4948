//! Synthetic crystals in geometry-service corner order (replay tokens).
//!
//! Purpose
//! - Produce realistic barrel/endcap crystals without the geometry service, so
//!   tests, benches and the CLI can drive `Crystal::set_corners` end to end.
//!
//! Model
//! - Build a tapered box (square front face, larger square back face) around
//!   a cell center, its axis pointing away from the interaction point: radial
//!   in the barrel, along ±z in the endcaps.
//! - Jitter each corner by a small uniform offset.
//! - Scatter the canonical corners back into the subsystem's source order
//!   (`canon::unapply`), so canonicalization has real work to do.
//! - Determinism uses a replay token `(seed, index)` mixed into one RNG.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cell::{CellId, Subsystem};
use crate::crystal::canon;
use crate::error::CrystalError;

/// Shape of a sampled crystal (centimetres).
#[derive(Clone, Copy, Debug)]
pub struct TaperCfg {
    /// Half side length of the square front face.
    pub front_half_width: f64,
    /// Half side length of the square back face.
    pub back_half_width: f64,
    /// Front-to-back distance along the axis.
    pub length: f64,
    /// Per-coordinate corner jitter amplitude. Clamped to 10% of the front half width.
    pub jitter: f64,
    /// Distance of the barrel cell center from the beam line.
    pub barrel_radius: f64,
    /// |z| of the endcap cell center.
    pub endcap_z: f64,
}

impl Default for TaperCfg {
    fn default() -> Self {
        Self {
            front_half_width: 1.1,
            back_half_width: 1.3,
            length: 23.0,
            jitter: 0.02,
            barrel_radius: 140.0,
            endcap_z: 330.0,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Corners as the geometry service would hand them out, plus the cell position.
#[derive(Clone, Debug)]
pub struct SampledCrystal {
    pub cell: CellId,
    /// Eight corners in source (non-canonical) order.
    pub corners: Vec<Point3<f64>>,
    /// Cell center; signs select the detector half/quadrant.
    pub reference: Point3<f64>,
    /// Corners in canonical order, for checking canonicalization.
    pub canonical: [Point3<f64>; 8],
}

/// Uniform magnitude in `[lo, hi)` with a random sign.
fn signed_range<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    let m = rng.gen_range(lo..hi);
    if rng.gen::<bool>() {
        m
    } else {
        -m
    }
}

/// Orthonormal pair spanning the plane normal to `u` (unit).
fn transverse_basis(u: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if u.z.abs() < 0.9 {
        Vector3::z()
    } else {
        Vector3::x()
    };
    let e1 = u.cross(&helper).normalize();
    let e2 = u.cross(&e1);
    (e1, e2)
}

/// Draw one crystal of `subsystem`; `Other` subsystems are unsupported.
pub fn draw_crystal(
    subsystem: Subsystem,
    cfg: TaperCfg,
    tok: ReplayToken,
) -> Result<SampledCrystal, CrystalError> {
    let mut rng = tok.to_std_rng();
    let (reference, u) = match subsystem {
        Subsystem::Barrel => {
            let phi = rng.gen::<f64>() * std::f64::consts::TAU;
            let z = signed_range(&mut rng, 1.0, 250.0);
            let r = cfg.barrel_radius.max(1.0);
            (
                Point3::new(r * phi.cos(), r * phi.sin(), z),
                Vector3::new(phi.cos(), phi.sin(), 0.0),
            )
        }
        Subsystem::Endcap => {
            let x = signed_range(&mut rng, 5.0, 150.0);
            let y = signed_range(&mut rng, 5.0, 150.0);
            let z = if rng.gen::<bool>() {
                cfg.endcap_z
            } else {
                -cfg.endcap_z
            };
            (Point3::new(x, y, z), Vector3::new(0.0, 0.0, z.signum()))
        }
        Subsystem::Other(_) => return Err(CrystalError::UnsupportedSubsystem { subsystem }),
    };

    let (e1, e2) = transverse_basis(&u);
    let half_len = 0.5 * cfg.length.max(1e-3);
    let front = reference - u * half_len;
    let back = reference + u * half_len;
    // Ring order (+,+), (-,+), (-,-), (+,-): same winding on both faces.
    let ring = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];
    let jitter = cfg.jitter.clamp(0.0, 0.1 * cfg.front_half_width.abs());
    let mut canonical = [Point3::origin(); 8];
    for (i, &(s1, s2)) in ring.iter().enumerate() {
        canonical[i] = front + (e1 * s1 + e2 * s2) * cfg.front_half_width;
        canonical[i + 4] = back + (e1 * s1 + e2 * s2) * cfg.back_half_width;
    }
    if jitter > 0.0 {
        for p in canonical.iter_mut() {
            *p += Vector3::new(
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
            );
        }
    }

    let order = canon::canonical_order(subsystem, &reference)?;
    let corners = canon::unapply(&order, &canonical).to_vec();
    let cell = CellId::ecal(subsystem, tok.index as u32);
    Ok(SampledCrystal {
        cell,
        corners,
        reference,
        canonical,
    })
}
