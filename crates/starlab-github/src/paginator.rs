//! Cursor-driven page loop
//!
//! Pages are requested strictly one after another and appended in request
//! order, so the output keeps the source's stars-descending order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::ProgressBar;
use starlab_core::{CollectError, RetryPolicy, fmt_num, retry_with_backoff, shutdown_flag};

use crate::api::PageSource;
use crate::schema::RawRecord;

#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Records requested per page
    pub page_size: usize,
    /// Stop once this many records are collected
    pub target: usize,
    /// Pause between consecutive requests (not before the first)
    pub request_delay: Duration,
    pub retry: RetryPolicy,
    /// Hand back already-collected records when the run fails
    pub keep_partial: bool,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            target: 1000,
            request_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            keep_partial: false,
        }
    }
}

/// Why the loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEnd {
    TargetReached,
    /// Source reported no further pages before the target
    Exhausted,
    /// Shutdown requested between pages
    Interrupted,
}

/// Records gathered by a successful run.
#[derive(Debug)]
pub struct Collected {
    pub records: Vec<RawRecord>,
    pub pages: usize,
    pub end: CollectionEnd,
}

/// Fatal error plus what was gathered before it.
#[derive(Debug)]
pub struct PaginationFailure {
    pub error: CollectError,
    /// Records collected before the failure
    pub collected: usize,
    pub pages: usize,
    /// The records themselves, only when `keep_partial` was set
    pub partial: Option<Vec<RawRecord>>,
}

impl std::fmt::Display for PaginationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} repositories collected before failure)",
            self.error, self.collected
        )
    }
}

impl std::error::Error for PaginationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub struct Paginator<S> {
    source: S,
    config: PaginatorConfig,
    pb: ProgressBar,
    stop: &'static AtomicBool,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, config: PaginatorConfig) -> Self {
        Self {
            source,
            config,
            pb: ProgressBar::hidden(),
            stop: shutdown_flag(),
        }
    }

    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    /// Use a flag other than the process-wide shutdown flag.
    pub fn with_stop_flag(mut self, stop: &'static AtomicBool) -> Self {
        self.stop = stop;
        self
    }

    /// Drive the source until the target is reached or it runs out.
    pub fn run(self) -> Result<Collected, PaginationFailure> {
        let Self {
            mut source,
            config,
            pb,
            stop,
        } = self;

        let mut records: Vec<RawRecord> = Vec::with_capacity(config.target.min(10_000));
        let mut cursor: Option<String> = None;
        let mut page = 0usize;

        let fail = |error: CollectError, records: Vec<RawRecord>, page: usize| {
            log::error!(
                "Collection aborted at page {page} with {} repositories: {error}",
                records.len()
            );
            PaginationFailure {
                error,
                collected: records.len(),
                pages: page,
                partial: config.keep_partial.then_some(records),
            }
        };

        let end = loop {
            if records.len() >= config.target {
                break CollectionEnd::TargetReached;
            }
            if stop.load(Ordering::Relaxed) {
                log::warn!("Shutdown requested, stopping after {page} pages");
                break CollectionEnd::Interrupted;
            }
            if page > 0 && !config.request_delay.is_zero() {
                std::thread::sleep(config.request_delay);
            }
            page += 1;
            pb.set_message(format!("page {page} · {}/{}", fmt_num(records.len()), fmt_num(config.target)));

            let label = format!("page {page}");
            let result = retry_with_backoff(&label, config.retry, &pb, || {
                source.fetch_page(cursor.as_deref(), config.page_size)
            });
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => return Err(fail(e, records, page)),
            };

            if raw.has_more && raw.records.is_empty() {
                let e = CollectError::InconsistentPagination {
                    page,
                    message: "page has no records but more pages are reported".to_string(),
                };
                return Err(fail(e, records, page));
            }
            if raw.has_more && raw.next_cursor.is_none() {
                let e = CollectError::InconsistentPagination {
                    page,
                    message: "more pages reported without a continuation cursor".to_string(),
                };
                return Err(fail(e, records, page));
            }

            let received = raw.records.len();
            let remaining = config.target - records.len();
            records.extend(raw.records.into_iter().take(remaining));
            log::info!(
                "Page {page}: {received} repositories (total {})",
                fmt_num(records.len())
            );

            if records.len() >= config.target {
                break CollectionEnd::TargetReached;
            }
            if !raw.has_more {
                log::info!("Source exhausted after {page} pages");
                break CollectionEnd::Exhausted;
            }
            cursor = raw.next_cursor;
        };

        Ok(Collected {
            records,
            pages: page,
            end,
        })
    }
}
