//! Tolerance defaults for 3D crystal geometry (internal).
//!
//! Policy
//! - Fixed constants, same as the rest of the crate: no per-call tolerance
//!   arguments. Corner coordinates are in centimetres, so these are far below
//!   any physical crystal dimension.

/// Edge vectors and plane normals at or below this length count as degenerate.
pub(crate) const DEGENERATE_EPS: f64 = 1e-12;
/// Slack for point-in-crystal tests (`n·(p - a) <= CONTAINS_EPS`).
pub(crate) const CONTAINS_EPS: f64 = 1e-9;
