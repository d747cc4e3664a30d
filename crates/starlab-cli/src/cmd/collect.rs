//! Collect subcommand - fetch, analyze, export

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use starlab_core::{SharedProgress, fmt_num};

use crate::config::Config;
use crate::emit::{self, Format, console};

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Number of repositories to collect
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Repositories per request (1-100)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Only repositories with more stars than this
    #[arg(long)]
    pub min_stars: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export formats (comma-separated)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub format: Vec<Format>,

    /// Keep and analyze what was collected if the run fails
    #[arg(long)]
    pub allow_partial: bool,

    /// Languages listed in the RQ05 table
    #[arg(long)]
    pub top: Option<usize>,
}

/// Merge CLI flags over configured values.
fn collect_config(args: &CollectArgs, config: &Config) -> starlab_github::Config {
    let mut collect = config.collect_config();
    if let Some(target) = args.target {
        collect.target = target;
    }
    if let Some(page_size) = args.page_size {
        collect.page_size = page_size;
    }
    if let Some(min_stars) = args.min_stars {
        collect.min_stars = min_stars;
    }
    collect.allow_partial |= args.allow_partial;
    collect
}

pub fn run(args: CollectArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let collect = collect_config(&args, config);
    collect.validate().context("Invalid collection settings")?;

    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    let formats = if args.format.is_empty() {
        config.output.formats.clone()
    } else {
        args.format
    };
    let top = args.top.unwrap_or(config.output.top_languages);

    starlab_core::install_signal_handlers().context("Failed to install signal handlers")?;

    let (dataset, summary) = starlab_github::run(&collect, progress)?;
    let report = starlab_metrics::compute(&dataset, Utc::now(), top);
    let written = emit::write_outputs(&dataset, &report, &output_dir, &formats)?;

    console::print_report(&report);

    let mut rows = vec![
        ("Repositories", format!("{} / {}", fmt_num(summary.records), fmt_num(summary.target))),
        ("Excluded", summary.excluded.to_string()),
        ("Pages", summary.pages.to_string()),
        ("Status", console::status_label(dataset.status())),
        ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];
    for path in &written {
        rows.push(("Wrote", path.display().to_string()));
    }
    console::print_summary("Collection", &rows);

    if starlab_core::is_shutdown_requested() {
        log::warn!("Interrupted: exports contain only the repositories collected before the signal");
    } else if report.is_partial() {
        log::warn!("Results cover a partial dataset and may not represent the top repositories");
    } else if report.is_short() {
        log::warn!(
            "Search returned only {} of {} repositories; try a lower --min-stars",
            fmt_num(report.dataset_size),
            fmt_num(collect.target)
        );
    }
    Ok(())
}
