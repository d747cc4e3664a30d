//! Collection pipeline: paginate → normalize → dataset

use std::time::{Duration, Instant};

use anyhow::Context;
use starlab_core::{Dataset, DatasetStatus, ProgressContext, fmt_num};

use crate::api::{GraphQlSource, PageSource};
use crate::config::Config;
use crate::paginator::{CollectionEnd, Paginator};
use crate::transform::normalize_all;

/// Collect from live GitHub.
pub fn run(config: &Config, progress: &ProgressContext) -> anyhow::Result<(Dataset, RunSummary)> {
    config.validate()?;
    let token = config
        .token
        .as_deref()
        .context("GITHUB_TOKEN is not set (export it or set github.token in starlab.toml)")?;

    log::info!(
        "Collecting top {} repositories with >{} stars ({} per page)",
        fmt_num(config.target),
        fmt_num(config.min_stars as usize),
        config.page_size
    );
    let source = GraphQlSource::new(&config.api_url, token, config.min_stars, &config.http)
        .context("Failed to set up GitHub client")?;
    collect_from(source, config, progress)
}

/// Collect from any page source.
///
/// A fatal error aborts with the number of records gathered so far, unless
/// `allow_partial` is set; then those records become a dataset flagged partial.
pub fn collect_from<S: PageSource>(
    source: S,
    config: &Config,
    progress: &ProgressContext,
) -> anyhow::Result<(Dataset, RunSummary)> {
    config.validate()?;
    let start = Instant::now();
    let pb = progress.stage_line("collect");

    let paginated = Paginator::new(source, config.paginator_config())
        .with_progress(pb.clone())
        .run();
    pb.finish_and_clear();

    let (raws, pages, status) = match paginated {
        Ok(collected) => {
            let status = match collected.end {
                CollectionEnd::TargetReached => DatasetStatus::Complete,
                CollectionEnd::Exhausted => DatasetStatus::Exhausted,
                CollectionEnd::Interrupted => DatasetStatus::Partial {
                    reason: "interrupted".to_string(),
                },
            };
            (collected.records, collected.pages, status)
        }
        Err(mut failure) => match failure.partial.take() {
            Some(records) => {
                log::warn!("Continuing with partial dataset: {failure}");
                let reason = format!("{}: {}", failure.error.kind(), failure.error);
                (records, failure.pages, DatasetStatus::Partial { reason })
            }
            None => return Err(anyhow::Error::new(failure).context("Collection failed")),
        },
    };

    let normalized = normalize_all(&raws);
    let excluded = normalized.excluded();
    let dataset = Dataset::new(normalized.records, excluded, status);

    let summary = RunSummary {
        target: config.target,
        pages,
        fetched: raws.len(),
        records: dataset.len(),
        excluded,
        status: dataset.status().clone(),
        elapsed: start.elapsed(),
    };
    summary.log();
    Ok((dataset, summary))
}

/// Summary of a collection run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub target: usize,
    pub pages: usize,
    /// Raw records received
    pub fetched: usize,
    /// Records that passed normalization
    pub records: usize,
    pub excluded: usize,
    pub status: DatasetStatus,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn status_label(&self) -> String {
        match &self.status {
            DatasetStatus::Complete => "complete".to_string(),
            DatasetStatus::Exhausted => "source exhausted before target".to_string(),
            DatasetStatus::Partial { reason } => format!("partial ({reason})"),
        }
    }

    pub fn log(&self) {
        log::info!("=== Collection Summary ===");
        log::info!(
            "Repositories: {}/{} from {} pages ({} excluded)",
            fmt_num(self.records),
            fmt_num(self.target),
            self.pages,
            self.excluded
        );
        log::info!("Status: {}", self.status_label());
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}
