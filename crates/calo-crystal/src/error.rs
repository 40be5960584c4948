//! Error type shared by canonicalization, derivation and queries.

use std::fmt;

use thiserror::Error;

use crate::cell::Subsystem;

/// Errors surfaced by `Crystal` and its helpers.
///
/// Every failure is local to the call that produced it; a crystal keeps its
/// previous state when `set_corners` fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrystalError {
    /// Corner list does not hold exactly eight points.
    #[error("expected 8 corner points, got {got}")]
    InvalidArgument { got: usize },

    /// No corner convention is known for this subsystem.
    #[error("subsystem {subsystem} has no corner convention")]
    UnsupportedSubsystem { subsystem: Subsystem },

    /// Endcap reference position lies on the x or y axis.
    #[error("endcap reference position ({x}, {y}) lies on an axis; quadrant is ambiguous")]
    AmbiguousQuadrant { x: f64, y: f64 },

    /// Lateral side index outside `0..4`.
    #[error("lateral side index {index} is out of range (0..4)")]
    IndexOutOfRange { index: usize },

    /// A corner is not finite, or a direction or face normal would have zero length.
    #[error("degenerate crystal geometry: {what}")]
    DegenerateGeometry { what: Degeneracy },

    /// Query before any successful `set_corners`.
    #[error("crystal has no corners yet")]
    NoGeometry,
}

/// Which part of the hexahedron collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// Corners `from` and `to` coincide.
    Edge { from: usize, to: usize },
    /// Face plane `face` (0..3 lateral, 4 front, 5 back) has collinear defining points.
    Face { face: usize },
    /// Corner `corner` has a NaN or infinite coordinate.
    NonFinite { corner: usize },
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::Edge { from, to } => {
                write!(f, "edge {from}->{to} has zero length")
            }
            Degeneracy::Face { face } => {
                write!(f, "face {face} is spanned by collinear corners")
            }
            Degeneracy::NonFinite { corner } => {
                write!(f, "corner {corner} has a non-finite coordinate")
            }
        }
    }
}
