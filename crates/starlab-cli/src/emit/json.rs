//! `report.json`: the metrics report as pretty-printed JSON

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use starlab_metrics::MetricsReport;

use super::write_atomic;

/// Pretty-printed `report.json`
pub fn write_report(report: &MetricsReport, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    })
}
