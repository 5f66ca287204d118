//! Interannual comparison: per-variable distribution tests between two
//! calendar years, monthly mean series, and the significant-changes
//! summary.

use crate::fmt_stat;
use dso_data::dataset::FramePair;
use dso_data::measurement::Variable;
use dso_stats::year_comparison::{compare_all, monthly_means};
use log::info;

pub fn run_compare(data_csv: &str, year_a: i32, year_b: i32, json: bool) -> anyhow::Result<()> {
    let pair = FramePair::load(data_csv)?;
    info!(
        "comparing {} vs {} over {} rows",
        year_a,
        year_b,
        pair.clean.len()
    );

    let comparisons = compare_all(&pair.clean, &Variable::ALL, year_a, year_b);

    if json {
        let rows: Vec<serde_json::Value> = comparisons
            .iter()
            .map(|c| {
                serde_json::json!({
                    "comparison": c,
                    "significant": c.is_significant(),
                    "monthly_means_a": monthly_means(&pair.clean, c.variable, year_a),
                    "monthly_means_b": monthly_means(&pair.clean, c.variable, year_b),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Interannual comparison: {} vs {}", year_a, year_b);
    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>12} {:>12} {:>15}",
        "Variable",
        format!("Mean {}", year_a),
        format!("Mean {}", year_b),
        "Change %",
        "Mann-Whitney p",
        "Welch p",
        "Verdict"
    );
    for c in &comparisons {
        println!(
            "{:<18} {:>10} {:>10} {:>10} {:>12} {:>12} {:>15}",
            c.variable.label(),
            fmt_stat(c.mean_a),
            fmt_stat(c.mean_b),
            fmt_change(c.percent_change),
            fmt_test(c.mann_whitney_p),
            fmt_test(c.t_test_p),
            if c.is_significant() {
                "significant"
            } else {
                "not significant"
            }
        );
    }

    let significant: Vec<_> = comparisons.iter().filter(|c| c.is_significant()).collect();
    println!();
    if significant.is_empty() {
        println!("No significant interannual changes detected");
    } else {
        println!("Significant changes:");
        for c in significant {
            let direction = if c.percent_change > 0.0 {
                "increase"
            } else {
                "decrease"
            };
            println!(
                "  {}: {} of {}% (p={})",
                c.variable.label(),
                direction,
                fmt_change(c.percent_change.abs()),
                fmt_test(c.mann_whitney_p)
            );
        }
    }

    println!();
    println!("Monthly means");
    for c in &comparisons {
        let series_a = monthly_means(&pair.clean, c.variable, year_a);
        let series_b = monthly_means(&pair.clean, c.variable, year_b);
        if series_a.is_empty() && series_b.is_empty() {
            continue;
        }
        println!("  {}:", c.variable.label());
        print_monthly(year_a, &series_a);
        print_monthly(year_b, &series_b);
    }
    Ok(())
}

fn print_monthly(year: i32, series: &[(u32, f64)]) {
    if series.is_empty() {
        println!("    {}: (no data)", year);
        return;
    }
    let cells: Vec<String> = series
        .iter()
        .map(|(month, mean)| format!("{:02}: {}", month, fmt_stat(*mean)))
        .collect();
    println!("    {}: {}", year, cells.join("  "));
}

fn fmt_change(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "+inf" } else { "-inf" }.to_string()
    } else {
        format!("{:.1}", value)
    }
}

fn fmt_test(p: Option<f64>) -> String {
    match p {
        Some(p) => format!("{:.4}", p),
        None => "N/A".to_string(),
    }
}
