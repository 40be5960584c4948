//! JSON shapes for crystal outputs.

use calo_crystal::{CellId, CrystalError, CrystalGeometry, Direction, DrawingCoordinates};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Input of `inspect`: one reference position and eight corners in source order.
#[derive(Debug, Deserialize, Serialize)]
pub struct CornerInput {
    pub reference: [f64; 3],
    pub corners: Vec<[f64; 3]>,
}

impl CornerInput {
    pub fn points(&self) -> (Vec<Point3<f64>>, Point3<f64>) {
        let pts = self.corners.iter().map(|&c| Point3::from(c)).collect();
        (pts, Point3::from(self.reference))
    }
}

#[derive(Debug, Serialize)]
pub struct Drawing {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl From<DrawingCoordinates> for Drawing {
    fn from(d: DrawingCoordinates) -> Self {
        Self {
            x: d.x,
            y: d.y,
            z: d.z,
        }
    }
}

/// Everything a downstream consumer needs from one crystal.
#[derive(Debug, Serialize)]
pub struct GeometryReport {
    pub corners: Vec<[f64; 3]>,
    pub center: [f64; 3],
    pub front_center: [f64; 3],
    pub back_center: [f64; 3],
    pub axis: [f64; 3],
    pub length: f64,
    pub volume: f64,
    /// Keyed by face: up, down, north, east, south, west.
    pub outward_normals: Vec<(String, [f64; 3])>,
    pub drawing: Drawing,
}

fn p3(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn v3(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl From<&CrystalGeometry> for GeometryReport {
    fn from(g: &CrystalGeometry) -> Self {
        Self {
            corners: g.corners().iter().map(p3).collect(),
            center: p3(&g.center()),
            front_center: p3(&g.front_center()),
            back_center: p3(&g.back_center()),
            axis: v3(&g.axis()),
            length: g.axis().norm(),
            volume: g.volume(),
            outward_normals: Direction::ALL
                .iter()
                .map(|&d| (format!("{d:?}").to_lowercase(), v3(&g.outward_normal(d))))
                .collect(),
            drawing: g.drawing_coordinates().into(),
        }
    }
}

/// Per-cell outcome of a batch run: geometry or the reason it was rejected.
///
/// `cell` and `subsystem` are absent only when the table row had no usable cell id.
#[derive(Debug, Serialize)]
pub struct CellOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CellOutcome {
    pub fn new(cell: CellId, result: Result<&CrystalGeometry, CrystalError>) -> Self {
        let (geometry, error) = match result {
            Ok(g) => (Some(GeometryReport::from(g)), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            cell: Some(cell.raw()),
            subsystem: Some(cell.subsystem().to_string()),
            geometry,
            error,
        }
    }

    /// Row that never reached `set_corners`.
    pub fn rejected(cell: Option<CellId>, reason: String) -> Self {
        Self {
            cell: cell.map(CellId::raw),
            subsystem: cell.map(|c| c.subsystem().to_string()),
            geometry: None,
            error: Some(reason),
        }
    }
}
