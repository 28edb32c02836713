use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::InsightError;
use crate::types::InsightReport;

/// Writes the report as pretty JSON to `output_file`, or stdout when `None`.
pub fn report_json(report: &InsightReport, output_file: Option<&Path>) -> Result<(), InsightError> {
    match output_file {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_report(report, &mut writer)?;
            eprintln!("✓ JSON report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_report(report, &mut BufWriter::new(stdout.lock()))?;
        }
    }
    Ok(())
}

fn write_report<W: Write>(report: &InsightReport, writer: &mut W) -> Result<(), InsightError> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
