//! Language frequency table (RQ05) and per-language cross-tabulation (RQ07)

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::Serialize;
use starlab_core::{PrimaryLanguage, RepositoryRecord};

use crate::stats::{Distribution, Mode, modes};

/// One row of the frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    /// `null` is the unknown-language bucket
    pub language: PrimaryLanguage,
    pub repositories: usize,
    /// Share of the whole dataset, 0..=100
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageFrequencies {
    pub total: usize,
    pub distinct: usize,
    /// Absent only for an empty dataset
    pub mode: Option<Mode<PrimaryLanguage>>,
    /// Most common languages, largest first
    pub top: Vec<LanguageShare>,
}

/// Repository counts per language, largest first, ties by name.
fn frequency_table(records: &[RepositoryRecord]) -> Vec<(&PrimaryLanguage, usize)> {
    let mut counts: FxHashMap<&PrimaryLanguage, usize> = FxHashMap::default();
    for r in records {
        *counts.entry(&r.primary_language).or_default() += 1;
    }
    let mut table: Vec<_> = counts.into_iter().collect();
    table.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    table
}

pub fn language_frequencies(records: &[RepositoryRecord], top_n: usize) -> LanguageFrequencies {
    let total = records.len();
    let table = frequency_table(records);
    let top = table
        .iter()
        .take(top_n)
        .map(|&(language, n)| LanguageShare {
            language: language.clone(),
            repositories: n,
            percent: n as f64 * 100.0 / total as f64,
        })
        .collect();

    LanguageFrequencies {
        total,
        distinct: table.len(),
        mode: modes(records.iter().map(|r| &r.primary_language)),
        top,
    }
}

/// RQ02–RQ04 recomputed within one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageGroup {
    pub language: PrimaryLanguage,
    pub repositories: usize,
    pub merged_pull_requests: Distribution,
    pub releases: Distribution,
    pub days_since_update: Distribution,
}

/// Group by language; groups ordered by size descending, then name.
pub fn cross_tabulate(records: &[RepositoryRecord], now: DateTime<Utc>) -> Vec<LanguageGroup> {
    let mut groups: FxHashMap<&PrimaryLanguage, Vec<&RepositoryRecord>> = FxHashMap::default();
    for r in records {
        groups.entry(&r.primary_language).or_default().push(r);
    }

    frequency_table(records)
        .into_iter()
        .filter_map(|(language, _)| {
            let members = groups.get(language)?;
            let merged: Vec<u64> = members.iter().map(|r| r.merged_pull_requests).collect();
            let releases: Vec<u64> = members.iter().map(|r| r.releases).collect();
            let updated: Vec<u64> = members.iter().map(|r| days_since_update(r, now)).collect();
            Some(LanguageGroup {
                language: language.clone(),
                repositories: members.len(),
                merged_pull_requests: Distribution::from_counts(&merged)?,
                releases: Distribution::from_counts(&releases)?,
                days_since_update: Distribution::from_counts(&updated)?,
            })
        })
        .collect()
}

/// Days since the last update, clamped at zero for timestamps after `now`.
pub(crate) fn days_since_update(record: &RepositoryRecord, now: DateTime<Utc>) -> u64 {
    record.days_since_update(now).max(0) as u64
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn repo(id: &str, language: Option<&str>, merged: u64, releases: u64, idle_days: i64) -> RepositoryRecord {
        RepositoryRecord {
            id: id.to_string(),
            name: id.to_string(),
            owner: "o".to_string(),
            url: format!("https://github.com/o/{id}"),
            created_at: now() - Duration::days(1000),
            updated_at: now() - Duration::days(idle_days),
            stars: 5000,
            merged_pull_requests: merged,
            releases,
            primary_language: PrimaryLanguage::from_name(language),
            issues: 0,
            closed_issues: 0,
        }
    }

    fn langs(names: &[Option<&str>]) -> Vec<RepositoryRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, l)| repo(&format!("r{i}"), *l, 0, 0, 0))
            .collect()
    }

    #[test]
    fn single_mode_language() {
        let f = language_frequencies(&langs(&[Some("Go"), Some("Go"), Some("Rust")]), 5);
        let mode = f.mode.unwrap();
        assert_eq!(mode.values, vec![PrimaryLanguage::Known("Go".to_string())]);
        assert_eq!(mode.frequency, 2);
        assert_eq!(f.distinct, 2);
    }

    #[test]
    fn tied_languages_both_reported() {
        let f = language_frequencies(&langs(&[Some("Go"), Some("Go"), Some("Rust"), Some("Rust")]), 5);
        let mode = f.mode.unwrap();
        assert_eq!(
            mode.values,
            vec![PrimaryLanguage::Known("Go".to_string()), PrimaryLanguage::Known("Rust".to_string())]
        );
        assert_eq!(mode.frequency, 2);
    }

    #[test]
    fn unknown_is_its_own_bucket() {
        let f = language_frequencies(&langs(&[None, None, Some("C")]), 5);
        assert_eq!(f.mode.unwrap().values, vec![PrimaryLanguage::Unknown]);
        assert_eq!(f.top[0].language, PrimaryLanguage::Unknown);
        assert_eq!(f.top[0].repositories, 2);
    }

    #[test]
    fn top_n_with_percentages() {
        let f = language_frequencies(
            &langs(&[Some("Go"), Some("Go"), Some("Rust"), Some("C"), Some("Go"), Some("Rust"), Some("Zig"), Some("C")]),
            2,
        );
        assert_eq!(f.total, 8);
        assert_eq!(f.top.len(), 2);
        assert_eq!(f.top[0].language.name(), Some("Go"));
        assert_eq!(f.top[0].percent, 37.5);
        // C and Rust tie on 2; name order breaks it
        assert_eq!(f.top[1].language.name(), Some("C"));
    }

    #[test]
    fn empty_dataset_has_no_mode() {
        let f = language_frequencies(&[], 5);
        assert!(f.mode.is_none());
        assert!(f.top.is_empty());
    }

    #[test]
    fn cross_tab_groups_ordered_by_size() {
        let records = vec![
            repo("a", Some("Rust"), 10, 1, 2),
            repo("b", Some("Go"), 20, 0, 4),
            repo("c", Some("Go"), 30, 2, 6),
            repo("d", None, 5, 0, 0),
        ];
        let groups = cross_tabulate(&records, now());
        let names: Vec<String> = groups.iter().map(|g| g.language.to_string()).collect();
        assert_eq!(names, vec!["Go", "Rust", "Unknown"]);

        let go = &groups[0];
        assert_eq!(go.repositories, 2);
        assert_eq!(go.merged_pull_requests.mean, 25.0);
        assert_eq!(go.releases.median, 1.0);
        assert_eq!(go.days_since_update.mean, 5.0);
    }

    #[test]
    fn future_update_clamps_to_zero() {
        let r = repo("x", None, 0, 0, -3);
        assert_eq!(days_since_update(&r, now()), 0);
    }
}
