//! CSV layout shared by `batch` and `sample`.
//!
//! One row per cell: `cell, ref_x, ref_y, ref_z, x0, y0, z0, ..., x7, y7, z7`.
//! Corners are in geometry-service order; canonicalization happens on read.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calo_crystal::CellId;
use nalgebra::Point3;
use polars::prelude::*;

/// One crystal as stored in the table.
#[derive(Clone, Debug, PartialEq)]
pub struct CellRow {
    pub cell: CellId,
    pub reference: Point3<f64>,
    pub corners: Vec<Point3<f64>>,
}

fn corner_columns() -> Vec<String> {
    (0..8)
        .flat_map(|k| ["x", "y", "z"].map(|axis| format!("{axis}{k}")))
        .collect()
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .with_context(|| format!("missing column {name}"))?
        .cast(&DataType::Float64)?;
    Ok(col.f64()?.into_iter().collect())
}

fn cell_column(df: &DataFrame) -> Result<Vec<Option<i64>>> {
    let col = df
        .column("cell")
        .context("missing column cell")?
        .cast(&DataType::Int64)?;
    Ok(col.i64()?.into_iter().collect())
}

/// A table row that cannot become a crystal (blank field, bad cell id).
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRow {
    pub row: usize,
    pub cell: Option<CellId>,
    pub reason: String,
}

impl RejectedRow {
    fn new(row: usize, cell: Option<CellId>, reason: impl Into<String>) -> Self {
        Self {
            row,
            cell,
            reason: reason.into(),
        }
    }
}

/// Read all rows of a cell table.
///
/// A missing column fails the whole read; a blank field or an unusable cell
/// id only rejects its own row.
pub fn read_cells(path: &Path) -> Result<Vec<Result<CellRow, RejectedRow>>> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(rows = df.height(), cols = df.width(), "cell_table_shape");

    let cells = cell_column(&df)?;
    // ref_x, ref_y, ref_z, then x0, y0, z0, ..., z7
    let names: Vec<String> = ["ref_x", "ref_y", "ref_z"]
        .iter()
        .map(|n| n.to_string())
        .chain(corner_columns())
        .collect();
    let values: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| f64_column(&df, name))
        .collect::<Result<_>>()?;

    let rows = (0..df.height())
        .map(|r| -> Result<CellRow, RejectedRow> {
            let cell = match cells[r] {
                None => return Err(RejectedRow::new(r, None, "null cell id")),
                Some(raw) => u32::try_from(raw).map(CellId::from_raw).map_err(|_| {
                    RejectedRow::new(r, None, format!("cell id {raw} out of range"))
                })?,
            };
            let value = |k: usize| {
                values[k][r].ok_or_else(|| {
                    RejectedRow::new(r, Some(cell), format!("null in column {}", names[k]))
                })
            };
            let reference = Point3::new(value(0)?, value(1)?, value(2)?);
            let corners = (0..8)
                .map(|k| {
                    let base = 3 + 3 * k;
                    Ok(Point3::new(value(base)?, value(base + 1)?, value(base + 2)?))
                })
                .collect::<Result<Vec<_>, RejectedRow>>()?;
            Ok(CellRow {
                cell,
                reference,
                corners,
            })
        })
        .collect();
    Ok(rows)
}

/// Build the table frame for `rows`; every row must hold 8 corners.
pub fn cells_frame(rows: &[CellRow]) -> Result<DataFrame> {
    if let Some(bad) = rows.iter().find(|r| r.corners.len() != 8) {
        return Err(anyhow!(
            "cell {} has {} corners, expected 8",
            bad.cell,
            bad.corners.len()
        ));
    }
    let mut columns = Vec::with_capacity(28);
    let cells: Vec<i64> = rows.iter().map(|r| r.cell.raw() as i64).collect();
    columns.push(Series::new("cell".into(), cells).into());
    for (a, name) in ["ref_x", "ref_y", "ref_z"].iter().enumerate() {
        let vals: Vec<f64> = rows.iter().map(|r| r.reference[a]).collect();
        columns.push(Series::new((*name).into(), vals).into());
    }
    for (c, name) in corner_columns().iter().enumerate() {
        let (k, a) = (c / 3, c % 3);
        let vals: Vec<f64> = rows.iter().map(|r| r.corners[k][a]).collect();
        columns.push(Series::new(name.as_str().into(), vals).into());
    }
    Ok(DataFrame::new(columns)?)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    ParquetWriter::new(&mut file).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calo_crystal::sample::{draw_crystal, ReplayToken, TaperCfg};
    use calo_crystal::Subsystem;
    use tempfile::tempdir;

    #[test]
    fn corner_columns_are_interleaved() {
        let cols = corner_columns();
        assert_eq!(cols.len(), 24);
        assert_eq!(&cols[..4], &["x0", "y0", "z0", "x1"]);
        assert_eq!(cols[23], "z7");
    }

    #[test]
    fn csv_round_trip_keeps_cells() {
        let rows: Vec<CellRow> = (0..4)
            .map(|i| {
                let s = draw_crystal(Subsystem::Endcap, TaperCfg::default(), ReplayToken::new(5, i))
                    .unwrap();
                CellRow {
                    cell: s.cell,
                    reference: s.reference,
                    corners: s.corners,
                }
            })
            .collect();
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.csv");
        let mut df = cells_frame(&rows).unwrap();
        write_csv(&mut df, &path).unwrap();

        let back = read_cells(&path).unwrap();
        assert_eq!(back.len(), rows.len());
        for (a, b) in rows.iter().zip(&back) {
            let b = b.as_ref().unwrap();
            assert_eq!(a.cell, b.cell);
            assert!((a.reference - b.reference).norm() < 1e-9);
            for (p, q) in a.corners.iter().zip(&b.corners) {
                assert!((p - q).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn blank_fields_reject_only_their_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.csv");
        let header = std::iter::once("cell".to_string())
            .chain(["ref_x", "ref_y", "ref_z"].map(String::from))
            .chain(corner_columns())
            .collect::<Vec<_>>()
            .join(",");
        let full = |cell: i64| {
            std::iter::once(cell.to_string())
                .chain((0..27).map(|k| format!("{}.5", k + 1)))
                .collect::<Vec<_>>()
        };
        let mut blank_z7 = full(101);
        blank_z7[27] = String::new();
        let mut blank_cell = full(0);
        blank_cell[0] = String::new();
        let lines = [
            header,
            full(100).join(","),
            blank_z7.join(","),
            full(-1).join(","),
            blank_cell.join(","),
        ];
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();

        let rows = read_cells(&path).unwrap();
        assert_eq!(rows.len(), 4);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.cell, CellId::from_raw(100));
        assert_eq!(first.reference, Point3::new(1.5, 2.5, 3.5));
        assert_eq!(first.corners[7], Point3::new(25.5, 26.5, 27.5));
        assert_eq!(
            rows[1],
            Err(RejectedRow::new(1, Some(CellId::from_raw(101)), "null in column z7"))
        );
        assert_eq!(
            rows[2],
            Err(RejectedRow::new(2, None, "cell id -1 out of range"))
        );
        assert_eq!(rows[3], Err(RejectedRow::new(3, None, "null cell id")));
    }

    #[test]
    fn frame_rejects_short_rows() {
        let row = CellRow {
            cell: CellId::from_raw(1),
            reference: Point3::origin(),
            corners: vec![Point3::origin(); 7],
        };
        assert!(cells_frame(&[row]).is_err());
    }
}
