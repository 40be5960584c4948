//! Calorimeter crystal: canonical corners and derived geometry.
//!
//! Purpose
//! - Turn the eight corner points of one detector cell, in whatever order the
//!   geometry service returns them, into a canonical hexahedron and expose the
//!   faces, planes and outward normals used by shower and track code.
//!
//! Design
//! - `canon` holds the ordering rules as plain index tables.
//! - `CrystalGeometry::derive` is a pure function of the canonical corners.
//! - `Crystal` pairs a cell id with an optional geometry; `set_corners`
//!   replaces the geometry wholesale or leaves it untouched on error.
//!
//! Numeric conventions
//! - Lateral face `i` is bounded by corners `i`, `i+4`, `(i+1)%4 + 4`, `(i+1)%4`.
//! - Edge directions point from the later corner to the earlier one:
//!   `-unit(c[i+1] - c[i])`.
//! - Outward normals keep the three-point plane normal when the center lies
//!   strictly behind the plane and flip it otherwise.

pub mod canon;
mod geometry;

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::cell::{CellId, Subsystem};
use crate::direction::{Direction, Side};
use crate::error::CrystalError;

pub use geometry::{CrystalGeometry, DrawingCoordinates, DRAWING_PATH};

/// One detector crystal.
///
/// Invariants:
/// - `subsystem` is decoded from `cell` once and never changes.
/// - `geometry` is `None` until the first successful `set_corners`, and is
///   only ever replaced as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct Crystal {
    cell: CellId,
    subsystem: Subsystem,
    geometry: Option<CrystalGeometry>,
}

impl Crystal {
    pub fn new(cell: CellId) -> Self {
        Self {
            cell,
            subsystem: cell.subsystem(),
            geometry: None,
        }
    }

    #[inline]
    pub fn cell(&self) -> CellId {
        self.cell
    }
    #[inline]
    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }
    #[inline]
    pub fn geometry(&self) -> Option<&CrystalGeometry> {
        self.geometry.as_ref()
    }

    /// Canonicalize `points` and recompute every derived attribute.
    ///
    /// `reference` is a representative position of the cell (e.g. its nominal
    /// center); only its signs are used, to pick the detector half/quadrant.
    ///
    /// On error the crystal keeps whatever geometry it had before.
    pub fn set_corners(
        &mut self,
        points: &[Point3<f64>],
        reference: &Point3<f64>,
    ) -> Result<&CrystalGeometry, CrystalError> {
        let points: &[Point3<f64>; 8] = points
            .try_into()
            .map_err(|_| CrystalError::InvalidArgument { got: points.len() })?;
        let order = canon::canonical_order(self.subsystem, reference)?;
        tracing::debug!(
            cell = self.cell.raw(),
            subsystem = %self.subsystem,
            ?order,
            "canonical corner order"
        );
        let geometry = CrystalGeometry::derive(canon::apply(&order, points))?;
        let geometry = self.geometry.insert(geometry);
        Ok(&*geometry)
    }

    fn geom(&self) -> Result<&CrystalGeometry, CrystalError> {
        self.geometry.as_ref().ok_or(CrystalError::NoGeometry)
    }

    pub fn corners(&self) -> Result<&[Point3<f64>; 8], CrystalError> {
        Ok(self.geom()?.corners())
    }
    pub fn center(&self) -> Result<Point3<f64>, CrystalError> {
        Ok(self.geom()?.center())
    }
    pub fn front_center(&self) -> Result<Point3<f64>, CrystalError> {
        Ok(self.geom()?.front_center())
    }
    pub fn back_center(&self) -> Result<Point3<f64>, CrystalError> {
        Ok(self.geom()?.back_center())
    }
    pub fn axis(&self) -> Result<Vector3<f64>, CrystalError> {
        Ok(self.geom()?.axis())
    }
    pub fn outward_normal(&self, direction: Direction) -> Result<Vector3<f64>, CrystalError> {
        Ok(self.geom()?.outward_normal(direction))
    }

    pub fn lateral_edge(&self, side: Side) -> Result<(Point3<f64>, Point3<f64>), CrystalError> {
        Ok(self.geom()?.lateral_edge(side))
    }
    /// `lateral_edge` with an unchecked numeric side index.
    pub fn lateral_edge_at(&self, index: usize) -> Result<(Point3<f64>, Point3<f64>), CrystalError> {
        self.lateral_edge(Side::try_from(index)?)
    }

    pub fn front_face(&self) -> Result<[Point3<f64>; 4], CrystalError> {
        Ok(self.geom()?.front_face())
    }
    pub fn back_face(&self) -> Result<[Point3<f64>; 4], CrystalError> {
        Ok(self.geom()?.back_face())
    }
    pub fn lateral_face(&self, side: Side) -> Result<[Point3<f64>; 4], CrystalError> {
        Ok(self.geom()?.lateral_face(side))
    }
    pub fn lateral_face_at(&self, index: usize) -> Result<[Point3<f64>; 4], CrystalError> {
        self.lateral_face(Side::try_from(index)?)
    }
    pub fn face(&self, direction: Direction) -> Result<[Point3<f64>; 4], CrystalError> {
        Ok(self.geom()?.face(direction))
    }

    pub fn drawing_coordinates(&self) -> Result<DrawingCoordinates, CrystalError> {
        Ok(self.geom()?.drawing_coordinates())
    }

    /// Emit the `Display` dump at debug level.
    pub fn log_dump(&self) {
        tracing::debug!(cell = self.cell.raw(), "crystal dump\n{}", self);
    }
}

fn fmt_point(f: &mut fmt::Formatter<'_>, p: &Point3<f64>) -> fmt::Result {
    write!(f, "({:.6}, {:.6}, {:.6})", p.x, p.y, p.z)
}

impl fmt::Display for Crystal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CellID {} ({})", self.cell, self.subsystem)?;
        let Some(g) = &self.geometry else {
            return writeln!(f, " no corners");
        };
        writeln!(f, " Corners")?;
        for p in g.corners() {
            write!(f, "  ")?;
            fmt_point(f, p)?;
            writeln!(f)?;
        }
        write!(f, " Center ")?;
        fmt_point(f, &g.center())?;
        write!(f, "\n Front center ")?;
        fmt_point(f, &g.front_center())?;
        write!(f, "\n Back center ")?;
        fmt_point(f, &g.back_center())?;
        writeln!(f, "\n Outward normals")?;
        for n in g.outward_normals() {
            writeln!(f, "  ({:.6}, {:.6}, {:.6})", n.x, n.y, n.z)?;
        }
        Ok(())
    }
}
