//! Statistical summarization over loaded sensor datasets.
//!
//! Every function here is a pure computation over a `Dataset` or
//! `FramePair`: no I/O, no mutation of the input. Per-pair and per-test
//! failures are localized (NaN correlation, p = 1.0, or an unavailable
//! test result); they never abort the surrounding batch.

pub mod correlation;
pub mod outliers;
pub mod summary;
pub mod year_comparison;

pub use correlation::{best_fit_pairs, BestFitPair, CorrelationMatrix};
pub use outliers::{outlier_summaries, OutlierSummary};
pub use summary::{non_null_counts, variable_summaries, SeriesSummary};
pub use year_comparison::{compare_years, monthly_means, YearComparison};

/// Significance threshold used throughout: a p-value below this is
/// reported as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;
