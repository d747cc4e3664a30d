//! starlab - characteristics of the most-starred GitHub repositories
//!
//! Collects the top repositories by stars through GitHub's GraphQL API,
//! answers a fixed set of research questions with descriptive statistics,
//! and exports the dataset and report.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod emit;

use config::Config;

#[derive(Parser)]
#[command(name = "starlab")]
#[command(about = "Collect and analyze the most-starred GitHub repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./starlab.toml or ~/.config/starlab/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect repositories, compute metrics, write exports
    Collect(cmd::collect::CollectArgs),
    /// Recompute metrics from an exported repositories.csv
    Report(cmd::report::ReportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(starlab_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug; the progress line shows activity
    //   non-TTY: info unless --debug; logs are the only progress indicator
    let multi = progress.is_tty().then(|| progress.multi());
    starlab_core::init_logging(cli.debug, multi)?;

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Collect(args) => cmd::collect::run(args, &config, &progress),
        Command::Report(args) => cmd::report::run(args, &config, &progress),
        Command::Config => {
            let formats: Vec<String> = config.output.formats.iter().map(ToString::to_string).collect();
            emit::console::print_summary(
                "Setting",
                &[
                    ("GitHub API URL", config.github.api_url.clone()),
                    (
                        "GitHub token",
                        if config.github.token.is_some() { "configured" } else { "not set" }.to_string(),
                    ),
                    ("Target", config.collect.target.to_string()),
                    ("Page size", config.collect.page_size.to_string()),
                    ("Minimum stars", format!(">{}", config.collect.min_stars)),
                    ("Request delay", format!("{}ms", config.collect.request_delay_ms)),
                    ("Allow partial", config.collect.allow_partial.to_string()),
                    ("Timeout", format!("{}s", config.http.timeout_secs)),
                    ("Max attempts", config.http.max_attempts.to_string()),
                    ("Backoff base", format!("{}ms", config.http.backoff_base_ms)),
                    ("Output directory", config.output.dir.display().to_string()),
                    ("Formats", formats.join(", ")),
                    ("Top languages", config.output.top_languages.to_string()),
                ],
            );
            Ok(())
        }
    }
}
