//! Command implementations for the DSO CLI.
//!
//! Each subcommand loads the measurement CSV, applies the optional date
//! range to both frames, runs the relevant statistics, and prints either
//! aligned text tables or JSON.

use chrono::NaiveDate;
use clap::Subcommand;
use dso_data::dataset::FramePair;

pub mod compare;
pub mod correlate;
pub mod outliers;
pub mod overview;

#[derive(Subcommand)]
pub enum Command {
    /// Dataset overview: row counts, temporal coverage, per-variable summaries
    Overview {
        /// Path to the prepared measurements CSV
        #[arg(short = 'd', long)]
        data_csv: String,

        /// Inclusive range start, YYYY-MM-DD (both bounds required to filter)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive range end, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// Emit JSON instead of text tables
        #[arg(long)]
        json: bool,
    },

    /// IQR outlier report per variable, computed over the raw frame
    Outliers {
        /// Path to the prepared measurements CSV
        #[arg(short = 'd', long)]
        data_csv: String,

        /// Inclusive range start, YYYY-MM-DD (both bounds required to filter)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive range end, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// Emit JSON instead of text tables
        #[arg(long)]
        json: bool,
    },

    /// Pairwise Pearson correlation with significance and best-fit pairs
    Correlate {
        /// Path to the prepared measurements CSV
        #[arg(short = 'd', long)]
        data_csv: String,

        /// Inclusive range start, YYYY-MM-DD (both bounds required to filter)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive range end, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// Maximum number of best-fit pairs to report
        #[arg(long, default_value_t = dso_stats::correlation::DEFAULT_MAX_PAIRS)]
        max_pairs: usize,

        /// Emit JSON instead of text tables
        #[arg(long)]
        json: bool,
    },

    /// Year-over-year comparison with Mann-Whitney and Welch tests
    Compare {
        /// Path to the prepared measurements CSV
        #[arg(short = 'd', long)]
        data_csv: String,

        /// First (baseline) calendar year
        #[arg(long, default_value_t = 2024)]
        year_a: i32,

        /// Second calendar year
        #[arg(long, default_value_t = 2025)]
        year_b: i32,

        /// Emit JSON instead of text tables
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Overview {
            data_csv,
            start,
            end,
            json,
        } => overview::run_overview(&data_csv, &start, &end, json),
        Command::Outliers {
            data_csv,
            start,
            end,
            json,
        } => outliers::run_outliers(&data_csv, &start, &end, json),
        Command::Correlate {
            data_csv,
            start,
            end,
            max_pairs,
            json,
        } => correlate::run_correlate(&data_csv, &start, &end, max_pairs, json),
        Command::Compare {
            data_csv,
            year_a,
            year_b,
            json,
        } => compare::run_compare(&data_csv, year_a, year_b, json),
    }
}

/// Load both frames and apply the optional date range to each.
pub(crate) fn load_selected(
    data_csv: &str,
    start: &Option<String>,
    end: &Option<String>,
) -> anyhow::Result<FramePair> {
    let start = parse_bound(start)?;
    let end = parse_bound(end)?;
    let pair = FramePair::load(data_csv)?;
    Ok(pair.select_date_range(start, end))
}

fn parse_bound(bound: &Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    bound
        .as_deref()
        .map(dso_utils::dates::parse_date)
        .transpose()
}

/// Render a statistic for a text table; NaN prints as a dash.
pub(crate) fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+inf" } else { "-inf" }.to_string()
    } else {
        format!("{:.3}", value)
    }
}
