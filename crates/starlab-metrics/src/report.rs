//! Metrics engine: one answer per research question

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use starlab_core::{Dataset, DatasetStatus};

use crate::languages::{LanguageFrequencies, LanguageGroup, cross_tabulate, days_since_update, language_frequencies};
use crate::questions::ResearchQuestion;
use crate::stats::{Distribution, Mode, recurring_mode};

/// Repositories updated at most this many days ago count as recently updated
pub const RECENT_UPDATE_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Years,
    Days,
    Count,
    Ratio,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Self::Years => "years",
            Self::Days => "days",
            Self::Count => "count",
            Self::Ratio => "ratio",
        }
    }
}

/// Statistic set for one question. Distributions are `None` when no record
/// contributes a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Maturity {
        /// Fractional years
        distribution: Option<Distribution>,
        /// Over whole days since creation
        age_days_mode: Option<Mode<u64>>,
    },
    Numeric {
        unit: Unit,
        distribution: Option<Distribution>,
    },
    Releases {
        distribution: Option<Distribution>,
        without_releases: usize,
    },
    Updates {
        distribution: Option<Distribution>,
        updated_within_30_days: usize,
    },
    Languages(LanguageFrequencies),
    ClosedIssues {
        /// Ratios over repositories with at least one issue
        distribution: Option<Distribution>,
        /// Over ratios rounded to 0.01, as whole percentages
        percent_mode: Option<Mode<u64>>,
        without_issues: usize,
        fully_closed: usize,
    },
    ByLanguage(Vec<LanguageGroup>),
}

impl Answer {
    /// Headline distribution for numeric answers.
    pub fn distribution(&self) -> Option<&Distribution> {
        match self {
            Self::Maturity { distribution, .. }
            | Self::Numeric { distribution, .. }
            | Self::Releases { distribution, .. }
            | Self::Updates { distribution, .. }
            | Self::ClosedIssues { distribution, .. } => distribution.as_ref(),
            Self::Languages(_) | Self::ByLanguage(_) => None,
        }
    }

    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Maturity { .. } => Some(Unit::Years),
            Self::Numeric { unit, .. } => Some(*unit),
            Self::Releases { .. } => Some(Unit::Count),
            Self::Updates { .. } => Some(Unit::Days),
            Self::ClosedIssues { .. } => Some(Unit::Ratio),
            Self::Languages(_) | Self::ByLanguage(_) => None,
        }
    }
}

/// Computed answers plus what they were computed over.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Reference instant for every age computation
    pub generated_at: DateTime<Utc>,
    pub dataset_size: usize,
    pub excluded: usize,
    pub status: DatasetStatus,
    pub answers: BTreeMap<ResearchQuestion, Answer>,
}

impl MetricsReport {
    pub fn get(&self, question: ResearchQuestion) -> Option<&Answer> {
        self.answers.get(&question)
    }

    /// Truncated by an error or interrupt
    pub fn is_partial(&self) -> bool {
        matches!(self.status, DatasetStatus::Partial { .. })
    }

    /// Source ran out before the target count
    pub fn is_short(&self) -> bool {
        matches!(self.status, DatasetStatus::Exhausted)
    }
}

/// Compute every research question over `dataset`, with ages measured at `now`.
pub fn compute(dataset: &Dataset, now: DateTime<Utc>, top_languages: usize) -> MetricsReport {
    let records = dataset.records();
    if dataset.is_partial() {
        log::warn!(
            "Computing metrics over a partial dataset ({} repositories)",
            records.len()
        );
    }

    let ages: Vec<f64> = records.iter().map(|r| r.age_years(now)).collect();
    let age_days: Vec<u64> = records.iter().map(|r| r.age_days(now).max(0) as u64).collect();
    let merged: Vec<u64> = records.iter().map(|r| r.merged_pull_requests).collect();
    let releases: Vec<u64> = records.iter().map(|r| r.releases).collect();
    let idle: Vec<u64> = records.iter().map(|r| days_since_update(r, now)).collect();
    let ratios: Vec<f64> = records.iter().filter_map(|r| r.closed_issue_ratio()).collect();
    let percents: Vec<u64> = ratios.iter().map(|r| (r * 100.0).round() as u64).collect();

    let mut answers = BTreeMap::new();
    answers.insert(
        ResearchQuestion::Maturity,
        Answer::Maturity {
            distribution: Distribution::from_reals(&ages),
            age_days_mode: recurring_mode(&age_days),
        },
    );
    answers.insert(
        ResearchQuestion::ExternalContribution,
        Answer::Numeric {
            unit: Unit::Count,
            distribution: Distribution::from_counts(&merged),
        },
    );
    answers.insert(
        ResearchQuestion::ReleaseFrequency,
        Answer::Releases {
            distribution: Distribution::from_counts(&releases),
            without_releases: releases.iter().filter(|&&n| n == 0).count(),
        },
    );
    answers.insert(
        ResearchQuestion::UpdateFrequency,
        Answer::Updates {
            distribution: Distribution::from_counts(&idle),
            updated_within_30_days: idle.iter().filter(|&&d| d <= RECENT_UPDATE_DAYS).count(),
        },
    );
    answers.insert(
        ResearchQuestion::LanguagePopularity,
        Answer::Languages(language_frequencies(records, top_languages)),
    );
    answers.insert(
        ResearchQuestion::ClosedIssueRatio,
        Answer::ClosedIssues {
            distribution: Distribution::from_reals(&ratios),
            percent_mode: recurring_mode(&percents),
            without_issues: records.len() - ratios.len(),
            fully_closed: records
                .iter()
                .filter(|r| r.issues > 0 && r.closed_issues == r.issues)
                .count(),
        },
    );
    answers.insert(ResearchQuestion::ByLanguage, Answer::ByLanguage(cross_tabulate(records, now)));

    log::debug!("Computed {} research questions over {} repositories", answers.len(), records.len());

    MetricsReport {
        generated_at: now,
        dataset_size: records.len(),
        excluded: dataset.excluded(),
        status: dataset.status().clone(),
        answers,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use starlab_core::{PrimaryLanguage, RepositoryRecord};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn repo(id: &str, issues: u64, closed: u64) -> RepositoryRecord {
        RepositoryRecord {
            id: id.to_string(),
            name: id.to_string(),
            owner: "o".to_string(),
            url: format!("https://github.com/o/{id}"),
            created_at: now() - Duration::days(365),
            updated_at: now() - Duration::days(10),
            stars: 2000,
            merged_pull_requests: 3,
            releases: 0,
            primary_language: PrimaryLanguage::Unknown,
            issues,
            closed_issues: closed,
        }
    }

    fn dataset(records: Vec<RepositoryRecord>) -> Dataset {
        Dataset::new(records, 0, DatasetStatus::Complete)
    }

    #[test]
    fn closed_ratio_of_single_record_is_exact() {
        let report = compute(&dataset(vec![repo("a", 10, 5)]), now(), 5);
        let dist = report.get(ResearchQuestion::ClosedIssueRatio).and_then(Answer::distribution).unwrap();
        assert_eq!(dist.mean, 0.5);
        assert_eq!(dist.count, 1);
    }

    #[test]
    fn repositories_without_issues_are_excluded_from_ratio() {
        let report = compute(&dataset(vec![repo("a", 10, 5), repo("b", 0, 0), repo("c", 4, 4)]), now(), 5);
        match report.get(ResearchQuestion::ClosedIssueRatio).unwrap() {
            Answer::ClosedIssues {
                distribution,
                without_issues,
                fully_closed,
                ..
            } => {
                let d = distribution.as_ref().unwrap();
                assert_eq!(d.count, 2);
                assert_eq!(d.mean, 0.75);
                assert_eq!(*without_issues, 1);
                assert_eq!(*fully_closed, 1);
            }
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn closed_percent_mode_rounds_ratios() {
        // 2/3 and 0.668 both round to 67%
        let report = compute(
            &dataset(vec![repo("a", 3, 2), repo("b", 1000, 668), repo("c", 4, 1), repo("d", 0, 0)]),
            now(),
            5,
        );
        match report.get(ResearchQuestion::ClosedIssueRatio).unwrap() {
            Answer::ClosedIssues { percent_mode, .. } => {
                let mode = percent_mode.as_ref().unwrap();
                assert_eq!(mode.values, vec![67]);
                assert_eq!(mode.frequency, 2);
            }
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn distinct_percentages_have_no_mode() {
        let report = compute(&dataset(vec![repo("a", 10, 5), repo("b", 4, 1)]), now(), 5);
        match report.get(ResearchQuestion::ClosedIssueRatio).unwrap() {
            Answer::ClosedIssues { percent_mode, .. } => assert!(percent_mode.is_none()),
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn maturity_mode_over_whole_days() {
        let mut younger = repo("c", 0, 0);
        younger.created_at = now() - Duration::days(100);
        // Same day count as the default 365, a few hours apart
        let mut same_day = repo("b", 0, 0);
        same_day.created_at = now() - Duration::days(365) - Duration::hours(5);
        let report = compute(&dataset(vec![repo("a", 0, 0), same_day, younger]), now(), 5);
        match report.get(ResearchQuestion::Maturity).unwrap() {
            Answer::Maturity {
                distribution,
                age_days_mode,
            } => {
                assert_eq!(distribution.as_ref().unwrap().count, 3);
                let mode = age_days_mode.as_ref().unwrap();
                assert_eq!(mode.values, vec![365]);
                assert_eq!(mode.frequency, 2);
            }
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn all_issueless_gives_no_ratio() {
        let report = compute(&dataset(vec![repo("a", 0, 0)]), now(), 5);
        assert!(report.get(ResearchQuestion::ClosedIssueRatio).unwrap().distribution().is_none());
    }

    #[test]
    fn every_question_answered() {
        let report = compute(&dataset(vec![repo("a", 1, 1)]), now(), 5);
        for q in ResearchQuestion::ALL {
            assert!(report.get(q).is_some(), "{q} missing");
        }
        assert_eq!(report.dataset_size, 1);
        assert!(!report.is_partial());
    }

    #[test]
    fn release_and_update_extras() {
        let mut stale = repo("b", 0, 0);
        stale.updated_at = now() - Duration::days(400);
        stale.releases = 12;
        let report = compute(&dataset(vec![repo("a", 0, 0), stale]), now(), 5);

        match report.get(ResearchQuestion::ReleaseFrequency).unwrap() {
            Answer::Releases { without_releases, .. } => assert_eq!(*without_releases, 1),
            other => panic!("unexpected answer {other:?}"),
        }
        match report.get(ResearchQuestion::UpdateFrequency).unwrap() {
            Answer::Updates {
                distribution,
                updated_within_30_days,
            } => {
                assert_eq!(*updated_within_30_days, 1);
                assert_eq!(distribution.as_ref().unwrap().median, 205.0);
            }
            other => panic!("unexpected answer {other:?}"),
        }
    }

    #[test]
    fn empty_dataset_yields_empty_answers() {
        let report = compute(&Dataset::new(vec![], 3, DatasetStatus::Exhausted), now(), 5);
        assert!(report.get(ResearchQuestion::Maturity).unwrap().distribution().is_none());
        assert!(report.is_short());
        assert_eq!(report.excluded, 3);
    }

    #[test]
    fn report_serializes_with_question_ids() {
        let report = compute(&dataset(vec![repo("a", 10, 5)]), now(), 5);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["answers"]["RQ01"]["maturity"]["distribution"]["mean"].is_number());
        assert_eq!(json["answers"]["RQ05"]["languages"]["top"][0]["language"], serde_json::Value::Null);
        assert_eq!(json["status"]["kind"], "complete");
    }
}
