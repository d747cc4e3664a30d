//! Report subcommand - recompute metrics from a previous CSV export

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use starlab_core::SharedProgress;

use crate::config::Config;
use crate::emit::{self, Format, console};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// repositories.csv written by `starlab collect`
    pub input: PathBuf,

    /// Export formats (comma-separated); the dataset CSV is never rewritten
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub format: Vec<Format>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Languages listed in the RQ05 table
    #[arg(long)]
    pub top: Option<usize>,
}

pub fn run(args: ReportArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let pb = progress.stage_line("report");
    pb.set_message(format!("loading {}", args.input.display()));
    let dataset = emit::csv::read_dataset(&args.input)?;
    pb.finish_and_clear();

    let top = args.top.unwrap_or(config.output.top_languages);
    let report = starlab_metrics::compute(&dataset, Utc::now(), top);
    console::print_report(&report);

    let formats: Vec<Format> = args.format.into_iter().filter(|f| *f != Format::Csv).collect();
    if !formats.is_empty() {
        let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
        for path in emit::write_outputs(&dataset, &report, &output_dir, &formats)? {
            progress.println(format!("Wrote {}", path.display()));
        }
    }
    Ok(())
}
