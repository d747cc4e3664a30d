//! Starlab Core - shared infrastructure for the repository survey pipeline
//!
//! HTTP plumbing, the error taxonomy, retry, logging/progress helpers and the
//! normalized record types consumed by the metrics engine.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod record;
pub mod retry;
pub mod shutdown;

// Re-exports for convenience
pub use error::CollectError;
pub use http::{HttpConfig, SHARED_RUNTIME, USER_AGENT};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use record::{Dataset, DatasetStatus, PrimaryLanguage, RepositoryRecord};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
