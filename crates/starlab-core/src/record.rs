//! Normalized repository rows and the in-memory dataset they form.
//!
//! Everything past the normalizer works on these types only; raw JSON never
//! reaches the metrics code.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Seconds in a mean Gregorian year (365.2425 days)
const SECONDS_PER_YEAR: f64 = 31_556_952.0;

/// Primary language of a repository, with an explicit variant for "not reported".
///
/// `Unknown` is its own bucket in frequency tables and cross-tabulations; it is
/// never folded into an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimaryLanguage {
    Known(String),
    Unknown,
}

impl PrimaryLanguage {
    /// Blank names are treated as absent.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n) if !n.is_empty() => Self::Known(n.to_string()),
            _ => Self::Unknown,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for PrimaryLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name().unwrap_or("Unknown"))
    }
}

/// Serialized as the language name, or `null` when unknown.
impl Serialize for PrimaryLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

/// One row of the analysis table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// `owner/name`, unique within a dataset
    pub id: String,
    pub name: String,
    pub owner: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stars: u64,
    pub merged_pull_requests: u64,
    pub releases: u64,
    pub primary_language: PrimaryLanguage,
    pub issues: u64,
    /// Never exceeds `issues`
    pub closed_issues: u64,
}

impl RepositoryRecord {
    /// Whole days since creation.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    /// Fractional years since creation.
    pub fn age_years(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_seconds() as f64 / SECONDS_PER_YEAR
    }

    /// Whole days since the last update.
    pub fn days_since_update(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_days()
    }

    /// closed / total issues, or `None` for repositories without issues.
    pub fn closed_issue_ratio(&self) -> Option<f64> {
        if self.issues == 0 {
            return None;
        }
        Some(self.closed_issues as f64 / self.issues as f64)
    }
}

/// How a collection run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetStatus {
    /// Target record count reached
    Complete,
    /// Source ran out of matching repositories before the target
    Exhausted,
    /// Run aborted or interrupted; contents are of unknown completeness
    Partial { reason: String },
}

/// Ordered, immutable collection of normalized records for one run.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<RepositoryRecord>,
    /// Records dropped by normalization (integrity errors)
    excluded: usize,
    status: DatasetStatus,
}

impl Dataset {
    pub fn new(records: Vec<RepositoryRecord>, excluded: usize, status: DatasetStatus) -> Self {
        Self {
            records,
            excluded,
            status,
        }
    }

    pub fn records(&self) -> &[RepositoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn status(&self) -> &DatasetStatus {
        &self.status
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.status, DatasetStatus::Partial { .. })
    }
}
