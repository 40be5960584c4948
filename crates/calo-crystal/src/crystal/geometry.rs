//! Derived geometry of one canonical hexahedron.
//!
//! `CrystalGeometry::derive` is a pure function of the eight canonical
//! corners; every attribute below is recomputed from scratch, so there is no
//! way for derived state to drift from the corners.
//!
//! Face indexing (shared by `face_planes` and `outward_normals`):
//! - `0..4`: lateral face `i`, plane through corners `i`, `(i+1)%4`, `i+4`
//! - `4`: front face, plane through corners 0, 1, 2
//! - `5`: back face, plane through corners 4, 5, 6

use nalgebra::{Point3, Vector3};

use crate::direction::{Direction, Side};
use crate::error::{CrystalError, Degeneracy};
use crate::geom3::{centroid, tetra_volume, unit_or_none, Plane3, CONTAINS_EPS};

/// Corner path for a single wireframe polyline: both rings plus the four
/// lateral edges, 16 vertices.
pub const DRAWING_PATH: [usize; 16] = [0, 3, 2, 1, 5, 6, 7, 4, 0, 1, 2, 6, 5, 4, 7, 3];

/// Parallel coordinate lists for plotting, in `DRAWING_PATH` order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawingCoordinates {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

/// Geometry of a crystal whose corners are in canonical order.
#[derive(Clone, Debug, PartialEq)]
pub struct CrystalGeometry {
    corners: [Point3<f64>; 8],
    center: Point3<f64>,
    front_center: Point3<f64>,
    back_center: Point3<f64>,
    axis: Vector3<f64>,
    first_edge_direction: Vector3<f64>,
    fifth_edge_direction: Vector3<f64>,
    lateral_directions: [Vector3<f64>; 4],
    face_planes: [Plane3; 6],
    outward_normals: [Vector3<f64>; 6],
}

/// `-unit(c[to] - c[from])`, or the offending edge.
fn reversed_edge_direction(
    corners: &[Point3<f64>; 8],
    from: usize,
    to: usize,
) -> Result<Vector3<f64>, CrystalError> {
    unit_or_none(&(corners[to] - corners[from]))
        .map(|u| -u)
        .ok_or(CrystalError::DegenerateGeometry {
            what: Degeneracy::Edge { from, to },
        })
}

/// Corner each face plane was anchored on (first defining point).
#[inline]
fn face_anchor(face: usize) -> usize {
    match face {
        0..=3 => face,
        4 => 0,
        _ => 4,
    }
}

impl CrystalGeometry {
    /// Compute all derived attributes from canonical corners.
    ///
    /// Errors with `DegenerateGeometry` when a corner is NaN or infinite, an
    /// edge used for a direction has zero length, or a face plane is spanned
    /// by collinear corners.
    pub fn derive(corners: [Point3<f64>; 8]) -> Result<Self, CrystalError> {
        // Every later check assumes finite coordinates.
        if let Some(corner) = corners
            .iter()
            .position(|p| !p.coords.iter().all(|v| v.is_finite()))
        {
            return Err(CrystalError::DegenerateGeometry {
                what: Degeneracy::NonFinite { corner },
            });
        }
        let c = &corners;
        let center = centroid(c);
        let front_center = centroid(&c[..4]);
        let back_center = centroid(&c[4..]);
        let axis = back_center - front_center;

        let first_edge_direction = reversed_edge_direction(c, 0, 1)?;
        let fifth_edge_direction = reversed_edge_direction(c, 4, 5)?;
        let mut lateral_directions = [Vector3::zeros(); 4];
        for (i, dir) in lateral_directions.iter_mut().enumerate() {
            *dir = reversed_edge_direction(c, i, (i + 1) % 4)?;
        }

        let face_planes: [Plane3; 6] = std::array::from_fn(|i| match i {
            0..=3 => Plane3::through(&c[i], &c[(i + 1) % 4], &c[i + 4]),
            4 => Plane3::through(&c[0], &c[1], &c[2]),
            _ => Plane3::through(&c[4], &c[5], &c[6]),
        });

        // Keep the normal if the center is strictly behind the plane.
        let mut outward_normals = [Vector3::zeros(); 6];
        for (face, plane) in face_planes.iter().enumerate() {
            let unit = plane.unit_normal().ok_or(CrystalError::DegenerateGeometry {
                what: Degeneracy::Face { face },
            })?;
            outward_normals[face] = if plane.signed_distance(&center) < 0.0 {
                unit
            } else {
                -unit
            };
        }

        tracing::trace!(
            center = ?center.coords.as_slice(),
            length = axis.norm(),
            "derived crystal geometry"
        );

        Ok(Self {
            corners,
            center,
            front_center,
            back_center,
            axis,
            first_edge_direction,
            fifth_edge_direction,
            lateral_directions,
            face_planes,
            outward_normals,
        })
    }

    #[inline]
    pub fn corners(&self) -> &[Point3<f64>; 8] {
        &self.corners
    }
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }
    #[inline]
    pub fn front_center(&self) -> Point3<f64> {
        self.front_center
    }
    #[inline]
    pub fn back_center(&self) -> Point3<f64> {
        self.back_center
    }
    /// `back_center - front_center`; not normalized.
    #[inline]
    pub fn axis(&self) -> Vector3<f64> {
        self.axis
    }
    #[inline]
    pub fn first_edge_direction(&self) -> Vector3<f64> {
        self.first_edge_direction
    }
    #[inline]
    pub fn fifth_edge_direction(&self) -> Vector3<f64> {
        self.fifth_edge_direction
    }
    #[inline]
    pub fn lateral_directions(&self) -> &[Vector3<f64>; 4] {
        &self.lateral_directions
    }
    #[inline]
    pub fn lateral_direction(&self, side: Side) -> Vector3<f64> {
        self.lateral_directions[side.index()]
    }
    #[inline]
    pub fn face_planes(&self) -> &[Plane3; 6] {
        &self.face_planes
    }
    #[inline]
    pub fn face_plane(&self, direction: Direction) -> Plane3 {
        self.face_planes[direction.face_index()]
    }
    #[inline]
    pub fn outward_normals(&self) -> &[Vector3<f64>; 6] {
        &self.outward_normals
    }
    #[inline]
    pub fn outward_normal(&self, direction: Direction) -> Vector3<f64> {
        self.outward_normals[direction.face_index()]
    }

    /// Lateral edge of side `i`: `(corner i, corner i+4)`.
    #[inline]
    pub fn lateral_edge(&self, side: Side) -> (Point3<f64>, Point3<f64>) {
        let i = side.index();
        (self.corners[i], self.corners[i + 4])
    }

    #[inline]
    pub fn front_face(&self) -> [Point3<f64>; 4] {
        let c = &self.corners;
        [c[0], c[1], c[2], c[3]]
    }

    #[inline]
    pub fn back_face(&self) -> [Point3<f64>; 4] {
        let c = &self.corners;
        [c[4], c[5], c[6], c[7]]
    }

    /// Quad of side `i`, up one lateral edge and down the next:
    /// `(c[i], c[i+4], c[(i+1)%4 + 4], c[(i+1)%4])`.
    pub fn lateral_face(&self, side: Side) -> [Point3<f64>; 4] {
        let i = side.index();
        let j = side.next().index();
        let c = &self.corners;
        [c[i], c[i + 4], c[j + 4], c[j]]
    }

    /// `Up` is the front face, `Down` the back face, the rest are lateral.
    pub fn face(&self, direction: Direction) -> [Point3<f64>; 4] {
        match direction.side() {
            Some(side) => self.lateral_face(side),
            None if direction == Direction::Up => self.front_face(),
            None => self.back_face(),
        }
    }

    pub fn drawing_coordinates(&self) -> DrawingCoordinates {
        let mut out = DrawingCoordinates {
            x: Vec::with_capacity(DRAWING_PATH.len()),
            y: Vec::with_capacity(DRAWING_PATH.len()),
            z: Vec::with_capacity(DRAWING_PATH.len()),
        };
        for &i in &DRAWING_PATH {
            let p = self.corners[i];
            out.x.push(p.x as f32);
            out.y.push(p.y as f32);
            out.z.push(p.z as f32);
        }
        out
    }

    /// Point lies on the inner side of all six face planes (with `CONTAINS_EPS` slack).
    ///
    /// Exact for planar faces; for slightly warped faces the three-point
    /// planes decide.
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        self.outward_normals
            .iter()
            .enumerate()
            .all(|(face, n)| n.dot(&(*p - self.corners[face_anchor(face)])) <= CONTAINS_EPS)
    }

    /// Volume by coning the 12 face triangles to the center.
    pub fn volume(&self) -> f64 {
        Direction::ALL
            .iter()
            .map(|&d| {
                let [a, b, c, e] = self.face(d);
                tetra_volume(&self.center, &a, &b, &c) + tetra_volume(&self.center, &a, &c, &e)
            })
            .sum()
    }
}
