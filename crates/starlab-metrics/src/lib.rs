//! Starlab Metrics - descriptive statistics for the research questions
//!
//! Pure functions over a normalized [`starlab_core::Dataset`]. Ages are
//! measured against an explicit reference instant, so a report is fully
//! determined by its inputs.

pub mod languages;
pub mod questions;
pub mod report;
pub mod stats;

pub use languages::{LanguageFrequencies, LanguageGroup, LanguageShare, cross_tabulate, language_frequencies};
pub use questions::ResearchQuestion;
pub use report::{Answer, MetricsReport, RECENT_UPDATE_DAYS, Unit, compute};
pub use stats::{Distribution, Mode, mean, median, modes, recurring_mode};
