//! Report emitter: console tables and file exports

pub mod console;
pub mod csv;
pub mod json;
pub mod parquet;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use starlab_core::Dataset;
use starlab_metrics::MetricsReport;

/// File export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Dataset as `repositories.csv`
    Csv,
    /// Metrics as `report.json`
    Json,
    /// Dataset as `repositories.parquet`
    Parquet,
}

impl Format {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "repositories.csv",
            Self::Json => "report.json",
            Self::Parquet => "repositories.parquet",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Parquet => "parquet",
        })
    }
}

/// Write every requested format into `dir`. Returns the written paths.
pub fn write_outputs(dataset: &Dataset, report: &MetricsReport, dir: &Path, formats: &[Format]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut formats = formats.to_vec();
    formats.sort();
    formats.dedup();

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format.file_name());
        match format {
            Format::Csv => csv::write_dataset(dataset, report.generated_at, &path)?,
            Format::Json => json::write_report(report, &path)?,
            Format::Parquet => parquet::write_dataset(dataset, report.generated_at, &path)?,
        }
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write into `<path>.tmp` and rename over `path` once `write` succeeds.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let tmp = tmp_path(path);
    if tmp.exists() {
        log::warn!("Removing stale tmp file: {}", tmp.display());
        fs::remove_file(&tmp)?;
    }
    let file = File::create(&tmp).with_context(|| format!("Failed to create {}", tmp.display()))?;
    if let Err(e) = write(file) {
        let _ = fs::remove_file(&tmp);
        return Err(e.context(format!("Failed to write {}", path.display())));
    }
    fs::rename(&tmp, path).with_context(|| format!("Failed to move {} into place", tmp.display()))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use starlab_core::{Dataset, DatasetStatus, PrimaryLanguage, RepositoryRecord};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
    }

    pub fn record(id: &str, language: Option<&str>, issues: u64, closed: u64) -> RepositoryRecord {
        let (owner, name) = id.split_once('/').unwrap();
        RepositoryRecord {
            id: id.to_string(),
            name: name.to_string(),
            owner: owner.to_string(),
            url: format!("https://github.com/{id}"),
            created_at: now() - Duration::days(3650),
            updated_at: now() - Duration::days(2),
            stars: 150_000,
            merged_pull_requests: 1200,
            releases: 40,
            primary_language: PrimaryLanguage::from_name(language),
            issues,
            closed_issues: closed,
        }
    }

    pub fn dataset() -> Dataset {
        Dataset::new(
            vec![
                record("freeCodeCamp/freeCodeCamp", Some("TypeScript"), 20000, 19000),
                record("torvalds/linux", Some("C"), 0, 0),
                record("sindresorhus/awesome", None, 500, 500),
            ],
            1,
            DatasetStatus::Complete,
        )
    }
}
