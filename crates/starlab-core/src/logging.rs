//! Logging setup: env_logger filtering, printed through indicatif when a
//! progress line is active so the two never interleave.

use std::io::Write;

use indicatif::MultiProgress;
use log::Log;

/// Fixed-width level tag, optionally wrapped in ANSI colour codes.
fn level_tag(level: log::Level, color: bool) -> String {
    let (label, ansi) = match level {
        log::Level::Error => ("ERROR", "31"),
        log::Level::Warn => ("WARN ", "33"),
        log::Level::Info => ("INFO ", "32"),
        log::Level::Debug => ("DEBUG", "36"),
        log::Level::Trace => ("TRACE", "35"),
    };
    if color {
        format!("\x1b[{ansi}m{label}\x1b[0m")
    } else {
        label.to_string()
    }
}

/// Logger that suspends the progress display while writing a line.
pub struct IndicatifLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(filter: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { filter, multi }
    }
}

impl Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.filter.matches(record) {
            return;
        }
        let line = format!("[{}] {}", level_tag(record.level(), true), record.args());
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {
        self.filter.flush();
    }
}

/// Default filter when `RUST_LOG` is unset.
///
/// With a TTY the progress line already shows activity, so only warnings
/// are printed unless `debug` is set.
pub fn default_level(debug: bool, tty: bool) -> &'static str {
    match (debug, tty) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    }
}

/// Install the global logger. `multi` is given only in TTY mode.
pub fn init_logging(debug: bool, multi: Option<&MultiProgress>) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().default_filter_or(default_level(debug, multi.is_some()));

    match multi {
        Some(multi) => {
            let filter = env_logger::Builder::from_env(env).build();
            let max_level = filter.filter();
            log::set_boxed_logger(Box::new(IndicatifLogger::new(filter, multi.clone())))?;
            log::set_max_level(max_level);
            Ok(())
        }
        None => env_logger::Builder::from_env(env)
            .format(|buf, record| writeln!(buf, "[{}] {}", level_tag(record.level(), false), record.args()))
            .try_init(),
    }
}
