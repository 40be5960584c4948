use anyhow::{bail, Context, Result};
use calo_crystal::sample::{draw_crystal, ReplayToken, TaperCfg};
use calo_crystal::{CellId, Crystal, Subsystem};
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod report;
mod table;

use provenance::Payload;
use report::{CellOutcome, CornerInput, GeometryReport};
use table::{CellRow, RejectedRow};

#[derive(Parser)]
#[command(name = "calo-crystal-cli")]
#[command(about = "Canonicalize calorimeter crystal corners and export derived geometry")]
struct Cmd {
    /// Log at debug level (canonical orders, crystal dumps)
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SubsystemArg {
    Barrel,
    Endcap,
}

impl From<SubsystemArg> for Subsystem {
    fn from(s: SubsystemArg) -> Self {
        match s {
            SubsystemArg::Barrel => Subsystem::Barrel,
            SubsystemArg::Endcap => Subsystem::Endcap,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Derive the geometry of one crystal from a JSON corner file
    Inspect {
        /// Raw cell id (decides barrel/endcap convention)
        #[arg(long)]
        cell: u32,
        /// JSON: {"reference": [x,y,z], "corners": [[x,y,z] x 8]}
        #[arg(long)]
        corners: PathBuf,
        /// Output JSON; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Derive geometry for every row of a cell CSV table
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// `.json` for full reports, `.parquet` for a summary table
        #[arg(long)]
        out: PathBuf,
    },
    /// Write synthetic crystals as a cell CSV table
    Sample {
        #[arg(long, value_enum)]
        subsystem: SubsystemArg,
        #[arg(long, default_value_t = 16)]
        count: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Inspect { cell, corners, out } => inspect(cell, &corners, out.as_deref()),
        Action::Batch { input, out } => batch(&input, &out),
        Action::Sample {
            subsystem,
            count,
            seed,
            out,
        } => sample(subsystem.into(), count, seed, &out),
        Action::Report => report(),
    }
}

fn inspect(cell: u32, corners: &Path, out: Option<&Path>) -> Result<()> {
    let cell = CellId::from_raw(cell);
    tracing::info!(cell = cell.raw(), subsystem = %cell.subsystem(), corners = %corners.display(), "inspect");
    let raw = std::fs::read(corners).with_context(|| format!("reading {}", corners.display()))?;
    let input: CornerInput = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing {}", corners.display()))?;
    let (points, reference) = input.points();

    let mut crystal = Crystal::new(cell);
    crystal
        .set_corners(&points, &reference)
        .with_context(|| format!("cell {cell}"))?;
    crystal.log_dump();
    let geometry = crystal
        .geometry()
        .context("geometry missing after set_corners")?;
    let doc = serde_json::to_vec_pretty(&GeometryReport::from(geometry))?;

    match out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
            let payload = Payload::new("inspect", serde_json::json!({ "cell": cell.raw() }))
                .with_input(corners.to_string_lossy());
            provenance::write_sidecar(path, &payload)?;
        }
        None => println!("{}", String::from_utf8_lossy(&doc)),
    }
    Ok(())
}

/// Canonicalize and derive every row; rejected rows are kept with their error.
fn run_rows(rows: &[Result<CellRow, RejectedRow>]) -> Vec<CellOutcome> {
    rows.iter()
        .map(|row| match row {
            Ok(row) => {
                let mut crystal = Crystal::new(row.cell);
                let result = crystal.set_corners(&row.corners, &row.reference);
                if let Err(err) = &result {
                    tracing::warn!(cell = row.cell.raw(), %err, "rejected");
                }
                CellOutcome::new(row.cell, result)
            }
            Err(bad) => {
                tracing::warn!(row = bad.row, reason = %bad.reason, "rejected");
                CellOutcome::rejected(bad.cell, bad.reason.clone())
            }
        })
        .collect()
}

fn summary_frame(outcomes: &[CellOutcome]) -> Result<DataFrame> {
    let cells: Vec<Option<i64>> = outcomes.iter().map(|o| o.cell.map(i64::from)).collect();
    let subsystems: Vec<Option<String>> = outcomes.iter().map(|o| o.subsystem.clone()).collect();
    let errors: Vec<Option<String>> = outcomes.iter().map(|o| o.error.clone()).collect();
    let pick = |f: fn(&GeometryReport) -> f64| -> Vec<Option<f64>> {
        outcomes
            .iter()
            .map(|o| o.geometry.as_ref().map(f))
            .collect()
    };
    let df = DataFrame::new(vec![
        Series::new("cell".into(), cells).into(),
        Series::new("subsystem".into(), subsystems).into(),
        Series::new("center_x".into(), pick(|g| g.center[0])).into(),
        Series::new("center_y".into(), pick(|g| g.center[1])).into(),
        Series::new("center_z".into(), pick(|g| g.center[2])).into(),
        Series::new("length".into(), pick(|g| g.length)).into(),
        Series::new("volume".into(), pick(|g| g.volume)).into(),
        Series::new("error".into(), errors).into(),
    ])?;
    Ok(df)
}

fn batch(input: &Path, out: &Path) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), "batch");
    let rows = table::read_cells(input)?;
    let outcomes = run_rows(&rows);
    let rejected = outcomes.iter().filter(|o| o.error.is_some()).count();
    tracing::info!(rows = rows.len(), rejected, "batch_done");

    ensure_parent(out)?;
    match out.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            std::fs::write(out, serde_json::to_vec_pretty(&outcomes)?)
                .with_context(|| format!("writing {}", out.display()))?;
        }
        Some("parquet") => {
            let mut df = summary_frame(&outcomes)?;
            table::write_parquet(&mut df, out)?;
        }
        other => bail!("unsupported output extension {other:?} (use .json or .parquet)"),
    }

    let payload = Payload::new(
        "batch",
        serde_json::json!({ "rows": rows.len(), "rejected": rejected }),
    )
    .with_input(input.to_string_lossy());
    provenance::write_sidecar(out, &payload)?;
    Ok(())
}

fn sample(subsystem: Subsystem, count: u64, seed: u64, out: &Path) -> Result<()> {
    tracing::info!(%subsystem, count, seed, out = %out.display(), "sample");
    let cfg = TaperCfg::default();
    let rows = (0..count)
        .map(|index| -> Result<CellRow> {
            let s = draw_crystal(subsystem, cfg, ReplayToken::new(seed, index))?;
            Ok(CellRow {
                cell: s.cell,
                reference: s.reference,
                corners: s.corners,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    ensure_parent(out)?;
    let mut df = table::cells_frame(&rows)?;
    table::write_csv(&mut df, out)?;
    let payload = Payload::new(
        "sample",
        serde_json::json!({
            "subsystem": subsystem.to_string(),
            "count": count,
            "seed": seed,
            "taper": {
                "front_half_width": cfg.front_half_width,
                "back_half_width": cfg.back_half_width,
                "length": cfg.length,
                "jitter": cfg.jitter,
            }
        }),
    );
    provenance::write_sidecar(out, &payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&Payload::new("report", serde_json::json!({})), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sample_then_batch_json() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("cells.csv");
        sample(Subsystem::Barrel, 6, 9, &csv).unwrap();
        assert!(dir.path().join("cells.provenance.json").exists());

        let out = dir.path().join("res").join("batch.json");
        batch(&csv, &out).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        let cells = parsed.as_array().unwrap();
        assert_eq!(cells.len(), 6);
        for c in cells {
            assert_eq!(c["subsystem"], "barrel");
            assert!(c.get("error").is_none());
            assert!(c["geometry"]["volume"].as_f64().unwrap() > 0.0);
        }
        assert!(dir.path().join("res").join("batch.provenance.json").exists());
    }

    #[test]
    fn batch_keeps_rejected_rows() {
        let s = draw_crystal(Subsystem::Endcap, TaperCfg::default(), ReplayToken::new(3, 0)).unwrap();
        let mut on_axis = CellRow {
            cell: s.cell,
            reference: s.reference,
            corners: s.corners.clone(),
        };
        on_axis.reference.x = 0.0;
        let good = CellRow {
            cell: s.cell,
            reference: s.reference,
            corners: s.corners,
        };
        let outcomes = run_rows(&[Ok(good), Ok(on_axis)]);
        assert!(outcomes[0].geometry.is_some());
        assert!(outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("quadrant is ambiguous"));
    }

    #[test]
    fn inspect_writes_report_file() {
        let dir = tempdir().unwrap();
        let s = draw_crystal(Subsystem::Endcap, TaperCfg::default(), ReplayToken::new(8, 1)).unwrap();
        let input = CornerInput {
            reference: [s.reference.x, s.reference.y, s.reference.z],
            corners: s.corners.iter().map(|p| [p.x, p.y, p.z]).collect(),
        };
        let corners = dir.path().join("corners.json");
        std::fs::write(&corners, serde_json::to_vec(&input).unwrap()).unwrap();
        let out = dir.path().join("crystal.json");
        inspect(s.cell.raw(), &corners, Some(&out)).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(parsed["corners"].as_array().unwrap().len(), 8);
        assert_eq!(parsed["drawing"]["x"].as_array().unwrap().len(), 16);
    }

    /// Blank one field of a data row (0-based, header excluded) in a written cell table.
    fn blank_field(csv: &Path, data_row: usize, column: &str) {
        let text = std::fs::read_to_string(csv).unwrap();
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        let col = lines[0].split(',').position(|c| c == column).unwrap();
        let mut fields: Vec<&str> = lines[data_row + 1].split(',').collect();
        fields[col] = "";
        lines[data_row + 1] = fields.join(",");
        std::fs::write(csv, lines.join("\n") + "\n").unwrap();
    }

    #[test]
    fn batch_keeps_going_past_a_blank_field() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("cells.csv");
        sample(Subsystem::Barrel, 3, 4, &csv).unwrap();
        blank_field(&csv, 1, "z7");

        let out = dir.path().join("batch.json");
        batch(&csv, &out).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        let cells = parsed.as_array().unwrap();
        assert_eq!(cells.len(), 3);
        assert!(cells[0]["geometry"].is_object());
        assert!(cells[2]["geometry"].is_object());
        assert_eq!(cells[1]["error"], "null in column z7");
        assert!(cells[1].get("geometry").is_none());
        assert_eq!(cells[1]["subsystem"], "barrel");
    }

    #[test]
    fn batch_parquet_summary() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("cells.csv");
        sample(Subsystem::Endcap, 4, 2, &csv).unwrap();
        blank_field(&csv, 2, "ref_y");

        let out = dir.path().join("summary.parquet");
        batch(&csv, &out).unwrap();
        assert!(dir.path().join("summary.provenance.json").exists());

        let df = ParquetReader::new(std::fs::File::open(&out).unwrap())
            .finish()
            .unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            [
                "cell", "subsystem", "center_x", "center_y", "center_z", "length", "volume",
                "error"
            ]
        );
        assert_eq!(df.height(), 4);
        assert_eq!(df.column("cell").unwrap().null_count(), 0);
        for geometry_col in ["center_x", "center_y", "center_z", "length", "volume"] {
            assert_eq!(df.column(geometry_col).unwrap().null_count(), 1, "{geometry_col}");
        }
        assert_eq!(df.column("error").unwrap().null_count(), 3);

        let volume = df.column("volume").unwrap().f64().unwrap();
        assert!(volume.get(2).is_none());
        assert!(volume.get(0).unwrap() > 0.0);
        let error = df.column("error").unwrap().str().unwrap();
        assert_eq!(error.get(2), Some("null in column ref_y"));
        assert_eq!(df.column("subsystem").unwrap().str().unwrap().get(1), Some("endcap"));
    }

    #[test]
    fn batch_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("cells.csv");
        sample(Subsystem::Endcap, 2, 1, &csv).unwrap();
        assert!(batch(&csv, &dir.path().join("out.txt")).is_err());
    }
}
