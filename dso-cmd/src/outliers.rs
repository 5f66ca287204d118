//! IQR outlier report, computed over the raw (unscrubbed) frame so the
//! full distribution including extreme values is visible.

use crate::{fmt_stat, load_selected};
use dso_data::measurement::Variable;
use dso_stats::outliers;
use log::info;

pub fn run_outliers(
    data_csv: &str,
    start: &Option<String>,
    end: &Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let pair = load_selected(data_csv, start, end)?;
    info!("outlier report over {} raw rows", pair.raw.len());

    let summaries = outliers::outlier_summaries(&pair.raw, &Variable::ALL);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>12} {:>12} {:>9} {:>8}",
        "Variable", "Q1", "Q3", "IQR", "Lower", "Upper", "Outliers", "Pct"
    );
    for s in &summaries {
        println!(
            "{:<18} {:>10} {:>10} {:>10} {:>12} {:>12} {:>9} {:>7.1}%",
            s.variable.label(),
            fmt_stat(s.q1),
            fmt_stat(s.q3),
            fmt_stat(s.iqr),
            fmt_stat(s.lower_fence),
            fmt_stat(s.upper_fence),
            s.count,
            s.percentage
        );
    }
    Ok(())
}
