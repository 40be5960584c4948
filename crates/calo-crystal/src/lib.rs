//! Calorimeter crystal geometry.
//!
//! One detector crystal is a hexahedron given by eight corner points from the
//! geometry service. This crate puts those corners into a canonical order
//! (front face 0..4, back face 4..8, matching winding) for both barrel and
//! endcap conventions, and derives centers, face planes, outward normals and
//! edge directions for visualization and intersection code.
//!
//! Module map
//! - `geom3`: `Plane3` and small vector helpers on top of nalgebra.
//! - `cell`: raw cell ids and their subsystem.
//! - `direction`: symbolic faces (`Direction`) and lateral `Side`s.
//! - `crystal`: the `Crystal` value object, ordering tables, derived geometry.
//! - `sample`: deterministic synthetic crystals for tests, benches and the CLI.

pub mod cell;
pub mod crystal;
pub mod direction;
pub mod error;
pub mod geom3;
pub mod sample;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cell::{CellId, Subsystem};
pub use crystal::{Crystal, CrystalGeometry, DrawingCoordinates};
pub use direction::{Direction, Side};
pub use error::{CrystalError, Degeneracy};
pub use geom3::Plane3;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cell::{CellId, Subsystem};
    pub use crate::crystal::{canon, Crystal, CrystalGeometry, DrawingCoordinates};
    pub use crate::direction::{Direction, Side};
    pub use crate::error::{CrystalError, Degeneracy};
    pub use crate::geom3::Plane3;
    pub use crate::sample::{draw_crystal, ReplayToken, SampledCrystal, TaperCfg};
    pub use nalgebra::{Point3, Vector3};
}
