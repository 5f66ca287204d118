//! Dataset overview: row counts, temporal coverage, per-variable
//! descriptive statistics and completeness.

use crate::{fmt_stat, load_selected};
use dso_data::measurement::Variable;
use dso_stats::summary;
use dso_utils::dates::format_date;
use log::info;

pub fn run_overview(
    data_csv: &str,
    start: &Option<String>,
    end: &Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let pair = load_selected(data_csv, start, end)?;
    info!("overview over {} rows", pair.clean.len());

    let span = pair.clean.date_span();
    let summaries = summary::variable_summaries(&pair.clean, &Variable::ALL);

    if json {
        let rows: Vec<serde_json::Value> = summaries
            .iter()
            .map(|(variable, stats)| {
                serde_json::json!({
                    "variable": variable.canonical_name(),
                    "summary": stats,
                })
            })
            .collect();
        let report = serde_json::json!({
            "rows": pair.clean.len(),
            "start_date": span.map(|(s, _)| format_date(&s)),
            "end_date": span.map(|(_, e)| format_date(&e)),
            "variables": rows,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Observations: {}", pair.clean.len());
    match span {
        Some((first, last)) => {
            println!("Coverage:     {} to {}", format_date(&first), format_date(&last))
        }
        None => println!("Coverage:     (empty dataset)"),
    }
    println!();
    println!(
        "{:<18} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Variable", "Count", "Min", "Max", "Mean", "Median", "Std Dev"
    );
    for (variable, stats) in &summaries {
        match stats {
            Some(s) => println!(
                "{:<18} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                variable.label(),
                s.count,
                fmt_stat(s.min),
                fmt_stat(s.max),
                fmt_stat(s.mean),
                fmt_stat(s.median),
                fmt_stat(s.std_dev)
            ),
            None => println!(
                "{:<18} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                variable.label(),
                0,
                "-",
                "-",
                "-",
                "-",
                "-"
            ),
        }
    }
    Ok(())
}
