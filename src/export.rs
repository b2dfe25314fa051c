use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use crate::analysis::calibration::CalibrationReport;
use crate::data::overlay::OverlayTable;

pub const CALIBRATION_HEADERS: [&str; 3] = ["Concentration (mM)", "Ox Peak", "Red Peak"];

// ---------------------------------------------------------------------------
// Tabular intermediate
// ---------------------------------------------------------------------------

/// Column-major table of optional floats, the shape both exports share.
struct Table {
    sheet: &'static str,
    headers: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl Table {
    fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

/// NaN cells are written as missing.
fn cell(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

fn calibration_table(report: &CalibrationReport) -> Table {
    Table {
        sheet: "Calibration",
        headers: CALIBRATION_HEADERS.iter().map(|h| h.to_string()).collect(),
        columns: vec![
            report.points.iter().map(|p| cell(p.concentration)).collect(),
            report.points.iter().map(|p| cell(p.oxidation_peak)).collect(),
            report.points.iter().map(|p| cell(p.reduction_peak)).collect(),
        ],
    }
}

fn overlay_table(overlay: &OverlayTable) -> Table {
    let mut columns = vec![overlay.rows.iter().map(|r| cell(r.potential)).collect()];
    for col in 0..overlay.labels.len() {
        columns.push(
            overlay
                .rows
                .iter()
                .map(|r| r.currents[col].and_then(cell))
                .collect(),
        );
    }
    Table {
        sheet: "Overlay",
        headers: overlay.headers(),
        columns,
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Write the calibration points. Format by extension: `.csv`, `.xlsx` or `.parquet`.
pub fn export_calibration(path: &Path, report: &CalibrationReport) -> Result<()> {
    write_table(path, &calibration_table(report))?;
    log::info!("Wrote {} calibration points to {}", report.points.len(), path.display());
    Ok(())
}

/// Write the wide overlay table. Format by extension: `.csv`, `.xlsx` or `.parquet`.
pub fn export_overlay(path: &Path, overlay: &OverlayTable) -> Result<()> {
    write_table(path, &overlay_table(overlay))?;
    log::info!(
        "Wrote {} overlay rows x {} traces to {}",
        overlay.len(),
        overlay.labels.len(),
        path.display()
    );
    Ok(())
}

fn write_table(path: &Path, table: &Table) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, table),
        "xlsx" => write_xlsx(path, table),
        "parquet" | "pq" => write_parquet(path, table),
        other => bail!("Unsupported export extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(&table.headers).context("writing CSV header")?;

    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|col| col[row].map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Excel writer
// ---------------------------------------------------------------------------

/// One sheet named after the table, headers in row 0, missing cells left empty.
fn write_xlsx(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(table.sheet).context("naming worksheet")?;

    for (col, (header, values)) in table.headers.iter().zip(&table.columns).enumerate() {
        let col = u16::try_from(col).context("too many columns for a worksheet")?;
        sheet
            .write_string(0, col, header.as_str())
            .context("writing sheet header")?;
        for (row, value) in values.iter().enumerate() {
            let Some(v) = value else { continue };
            let row = u32::try_from(row + 1).context("too many rows for a worksheet")?;
            sheet
                .write_number(row, col, *v)
                .with_context(|| format!("writing cell ({row}, {col})"))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

fn write_parquet(path: &Path, table: &Table) -> Result<()> {
    let schema = Arc::new(Schema::new(
        table
            .headers
            .iter()
            .map(|h| Field::new(h, DataType::Float64, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = table
        .columns
        .iter()
        .map(|col| Arc::new(Float64Array::from(col.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::calibration::CalibrationPoint;
    use crate::analysis::fit::LinearFit;

    fn report() -> CalibrationReport {
        let line = LinearFit { slope: 1.0, intercept: 0.0, r_squared: 1.0 };
        CalibrationReport {
            points: vec![
                CalibrationPoint {
                    label: "a".into(),
                    concentration: 1.0,
                    oxidation_peak: 2.5,
                    reduction_peak: f64::NAN,
                },
                CalibrationPoint {
                    label: "b".into(),
                    concentration: 2.0,
                    oxidation_peak: 4.0,
                    reduction_peak: -1.0,
                },
            ],
            oxidation: line,
            reduction: line,
        }
    }

    #[test]
    fn calibration_csv_has_headers_and_blank_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.csv");
        export_calibration(&path, &report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Concentration (mM),Ox Peak,Red Peak", "1,2.5,", "2,4,-1"]);
    }

    #[test]
    fn calibration_xlsx_is_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.XLSX");
        export_calibration(&path, &report()).unwrap();

        // xlsx is a zip container
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_calibration(&dir.path().join("out.txt"), &report()).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }
}
