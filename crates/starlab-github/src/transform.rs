//! Raw search node → [`RepositoryRecord`]
//!
//! Pure functions. Absent language maps to [`PrimaryLanguage::Unknown`];
//! missing or negative counts and `closedIssues > issues` are integrity
//! errors that drop the record instead of being coerced.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde_json::Value;
use starlab_core::{CollectError, PrimaryLanguage, RepositoryRecord};

use crate::schema::RawRecord;

/// Records that survived normalization, plus what was dropped.
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<RepositoryRecord>,
    pub rejected: Vec<CollectError>,
}

impl Normalized {
    pub fn excluded(&self) -> usize {
        self.rejected.len()
    }
}

/// Normalize one raw node.
pub fn normalize(raw: &RawRecord) -> Result<RepositoryRecord, CollectError> {
    let id = identifier(raw)?;
    let (owner_from_id, name_from_id) = id.split_once('/').unwrap_or(("", id.as_str()));

    let name = str_at(raw, &["name"]).unwrap_or(name_from_id).to_string();
    let owner = str_at(raw, &["owner", "login"]).unwrap_or(owner_from_id).to_string();
    let url = str_at(raw, &["url"])
        .map(String::from)
        .unwrap_or_else(|| format!("https://github.com/{id}"));

    let created_at = timestamp(raw, "createdAt", &id)?;
    let updated_at = timestamp(raw, "updatedAt", &id)?;
    let stars = count(raw, &["stargazerCount"], &id)?;
    let merged_pull_requests = count(raw, &["pullRequests", "totalCount"], &id)?;
    let releases = count(raw, &["releases", "totalCount"], &id)?;
    let issues = count(raw, &["issues", "totalCount"], &id)?;
    let closed_issues = count(raw, &["closedIssues", "totalCount"], &id)?;

    if closed_issues > issues {
        return Err(CollectError::integrity(
            id,
            format!("closed issues ({closed_issues}) exceed total issues ({issues})"),
        ));
    }

    let primary_language = PrimaryLanguage::from_name(str_at(raw, &["primaryLanguage", "name"]));

    Ok(RepositoryRecord {
        id,
        name,
        owner,
        url,
        created_at,
        updated_at,
        stars,
        merged_pull_requests,
        releases,
        primary_language,
        issues,
        closed_issues,
    })
}

/// Normalize a page sequence, keeping source order.
///
/// Rejected records are logged and counted; a repeated identifier keeps its
/// first occurrence.
pub fn normalize_all(raws: &[RawRecord]) -> Normalized {
    let mut out = Normalized {
        records: Vec::with_capacity(raws.len()),
        rejected: Vec::new(),
    };
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for (idx, raw) in raws.iter().enumerate() {
        let result = normalize(raw).and_then(|record| {
            if seen.insert(record.id.clone()) {
                Ok(record)
            } else {
                Err(CollectError::integrity(record.id, "duplicate repository"))
            }
        });
        match result {
            Ok(record) => out.records.push(record),
            Err(e) => {
                log::warn!("Excluding record #{}: {e}", idx + 1);
                out.rejected.push(e);
            }
        }
    }

    if !out.rejected.is_empty() {
        log::warn!(
            "{} of {} records excluded by validation",
            out.rejected.len(),
            raws.len()
        );
    }
    out
}

fn value_at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(raw, |v, key| v.get(key))
        .filter(|v| !v.is_null())
}

fn str_at<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(raw, path).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn identifier(raw: &Value) -> Result<String, CollectError> {
    if let Some(id) = str_at(raw, &["nameWithOwner"]) {
        return Ok(id.to_string());
    }
    match (str_at(raw, &["owner", "login"]), str_at(raw, &["name"])) {
        (Some(owner), Some(name)) => Ok(format!("{owner}/{name}")),
        _ => Err(CollectError::integrity(
            "<unnamed>",
            "record has neither nameWithOwner nor owner/name",
        )),
    }
}

fn count(raw: &Value, path: &[&str], id: &str) -> Result<u64, CollectError> {
    let field = path.join(".");
    let value = value_at(raw, path)
        .ok_or_else(|| CollectError::integrity(id, format!("missing {field}")))?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_i64() {
        Some(n) => Err(CollectError::integrity(id, format!("negative {field}: {n}"))),
        None => Err(CollectError::integrity(id, format!("{field} is not an integer: {value}"))),
    }
}

fn timestamp(raw: &Value, field: &str, id: &str) -> Result<DateTime<Utc>, CollectError> {
    let text = str_at(raw, &[field]).ok_or_else(|| CollectError::integrity(id, format!("missing {field}")))?;
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CollectError::integrity(id, format!("invalid {field} {text:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "nameWithOwner": "golang/go",
            "name": "go",
            "owner": {"login": "golang"},
            "url": "https://github.com/golang/go",
            "createdAt": "2014-08-19T04:33:40Z",
            "updatedAt": "2025-09-01T12:00:00Z",
            "stargazerCount": 128000,
            "primaryLanguage": {"name": "Go"},
            "pullRequests": {"totalCount": 4200},
            "releases": {"totalCount": 0},
            "issues": {"totalCount": 50000},
            "closedIssues": {"totalCount": 45000}
        })
    }

    #[test]
    fn normalize_full_record() {
        let r = normalize(&sample()).unwrap();
        assert_eq!(r.id, "golang/go");
        assert_eq!(r.owner, "golang");
        assert_eq!(r.stars, 128_000);
        assert_eq!(r.merged_pull_requests, 4200);
        assert_eq!(r.releases, 0);
        assert_eq!(r.issues, 50_000);
        assert_eq!(r.closed_issues, 45_000);
        assert_eq!(r.primary_language, PrimaryLanguage::Known("Go".to_string()));
        assert_eq!(r.created_at, Utc.with_ymd_and_hms(2014, 8, 19, 4, 33, 40).unwrap());
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = sample();
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }

    #[test]
    fn null_language_is_unknown() {
        let mut raw = sample();
        raw["primaryLanguage"] = Value::Null;
        assert_eq!(normalize(&raw).unwrap().primary_language, PrimaryLanguage::Unknown);
    }

    #[test]
    fn identifier_falls_back_to_owner_and_name() {
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("nameWithOwner");
        assert_eq!(normalize(&raw).unwrap().id, "golang/go");
    }

    #[test]
    fn negative_count_is_integrity_error() {
        let mut raw = sample();
        raw["releases"]["totalCount"] = json!(-1);
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err.kind(), "DataIntegrityError");
        assert!(format!("{err}").contains("negative releases.totalCount"));
    }

    #[test]
    fn closed_above_total_is_integrity_error() {
        let mut raw = sample();
        raw["closedIssues"]["totalCount"] = json!(50001);
        assert!(matches!(normalize(&raw), Err(CollectError::DataIntegrity { .. })));
    }

    #[test]
    fn missing_count_is_integrity_error() {
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("pullRequests");
        assert!(format!("{}", normalize(&raw).unwrap_err()).contains("missing pullRequests.totalCount"));
    }

    #[test]
    fn bad_timestamp_is_integrity_error() {
        let mut raw = sample();
        raw["createdAt"] = json!("yesterday");
        assert!(normalize(&raw).is_err());
    }

    #[test]
    fn empty_node_is_rejected() {
        assert!(normalize(&json!({})).is_err());
        assert!(normalize(&Value::Null).is_err());
    }

    #[test]
    fn normalize_all_excludes_and_counts() {
        let mut bad = sample();
        bad["nameWithOwner"] = json!("torvalds/linux");
        bad["closedIssues"]["totalCount"] = json!(60000);
        let raws = vec![sample(), bad, sample()];

        let out = normalize_all(&raws);
        assert_eq!(out.records.len(), 1);
        // one integrity violation, one duplicate
        assert_eq!(out.excluded(), 2);
        assert!(out.records.iter().all(|r| r.closed_issues <= r.issues));
    }
}
