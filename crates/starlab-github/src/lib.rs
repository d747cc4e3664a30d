//! Starlab GitHub - most-starred repository collection
//!
//! Pages through GitHub's GraphQL repository search and normalizes each node
//! into a typed [`starlab_core::RepositoryRecord`].
//!
//! # Example
//!
//! ```no_run
//! use starlab_core::ProgressContext;
//! use starlab_github::{Config, run};
//!
//! let config = Config {
//!     target: 100,
//!     ..Default::default()
//! };
//!
//! let (dataset, summary) = run(&config, &ProgressContext::hidden()).expect("collection failed");
//! println!("{} repositories in {} pages", dataset.len(), summary.pages);
//! ```

pub mod api;
pub mod config;
pub mod paginator;
pub mod query;
pub mod runner;
pub mod schema;
pub mod transform;

// Re-exports
pub use api::{GraphQlSource, PageSource};
pub use config::Config;
pub use paginator::{Collected, CollectionEnd, PaginationFailure, Paginator, PaginatorConfig};
pub use runner::{RunSummary, collect_from, run};
pub use schema::{RawPage, RawRecord};
pub use transform::{Normalized, normalize, normalize_all};
