//! `repositories.csv`: one row per record, plus derived columns

use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use starlab_core::{CollectError, Dataset, DatasetStatus, PrimaryLanguage, RepositoryRecord};

use super::write_atomic;

const HEADER: [&str; 15] = [
    "id",
    "name",
    "owner",
    "url",
    "created_at",
    "updated_at",
    "stars",
    "merged_pull_requests",
    "releases",
    "primary_language",
    "issues",
    "closed_issues",
    "age_days",
    "days_since_update",
    "closed_issue_ratio",
];

/// Field order must match [`HEADER`].
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    id: String,
    name: String,
    owner: String,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    stars: u64,
    merged_pull_requests: u64,
    releases: u64,
    /// Empty for unknown
    primary_language: Option<String>,
    issues: u64,
    closed_issues: u64,
    // Derived; ignored on import
    age_days: i64,
    days_since_update: i64,
    closed_issue_ratio: Option<f64>,
}

impl Row {
    fn new(r: &RepositoryRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            owner: r.owner.clone(),
            url: r.url.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
            stars: r.stars,
            merged_pull_requests: r.merged_pull_requests,
            releases: r.releases,
            primary_language: r.primary_language.name().map(String::from),
            issues: r.issues,
            closed_issues: r.closed_issues,
            age_days: r.age_days(now),
            days_since_update: r.days_since_update(now),
            closed_issue_ratio: r.closed_issue_ratio(),
        }
    }

    fn into_record(self) -> Result<RepositoryRecord, CollectError> {
        if self.closed_issues > self.issues {
            return Err(CollectError::integrity(
                self.id,
                format!("closed issues ({}) exceed total issues ({})", self.closed_issues, self.issues),
            ));
        }
        Ok(RepositoryRecord {
            primary_language: PrimaryLanguage::from_name(self.primary_language.as_deref()),
            id: self.id,
            name: self.name,
            owner: self.owner,
            url: self.url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            stars: self.stars,
            merged_pull_requests: self.merged_pull_requests,
            releases: self.releases,
            issues: self.issues,
            closed_issues: self.closed_issues,
        })
    }
}

/// Export the dataset with derived values measured at `now`.
pub fn write_dataset(dataset: &Dataset, now: DateTime<Utc>, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        // Header written up front so an empty export still names its columns
        writer.write_record(HEADER)?;
        for record in dataset.records() {
            writer.serialize(Row::new(record, now))?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Load a previous export back into a dataset.
///
/// Rows that fail to parse or validate are excluded and counted like
/// normalizer rejects. Only an unreadable file or header aborts.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .headers()
        .with_context(|| format!("{}: unreadable header", path.display()))?;

    let mut records = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut excluded = 0;
    for (idx, row) in reader.deserialize::<Row>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
            Err(e) => {
                log::warn!("Excluding row {}: {e}", idx + 1);
                excluded += 1;
                continue;
            }
        };
        match row.into_record() {
            Ok(record) if seen.insert(record.id.clone()) => records.push(record),
            Ok(record) => {
                log::warn!("Excluding row {}: duplicate repository {}", idx + 1, record.id);
                excluded += 1;
            }
            Err(e) => {
                log::warn!("Excluding row {}: {e}", idx + 1);
                excluded += 1;
            }
        }
    }
    log::info!("Loaded {} repositories from {}", records.len(), path.display());
    Ok(Dataset::new(records, excluded, DatasetStatus::Complete))
}
