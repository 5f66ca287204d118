//! Correlation analysis: the Pearson matrix, its p-value twin, and the
//! ranked best-fit pair list with regression parameters.

use crate::{fmt_stat, load_selected};
use dso_data::measurement::Variable;
use dso_stats::correlation::{best_fit_pairs, CorrelationMatrix, DEFAULT_R2_THRESHOLD};
use dso_stats::SIGNIFICANCE_LEVEL;
use log::info;

pub fn run_correlate(
    data_csv: &str,
    start: &Option<String>,
    end: &Option<String>,
    max_pairs: usize,
    json: bool,
) -> anyhow::Result<()> {
    let pair = load_selected(data_csv, start, end)?;
    info!("correlating over {} rows", pair.clean.len());

    let matrix = CorrelationMatrix::compute(&pair.clean, &Variable::ALL);
    let best = best_fit_pairs(
        &pair.clean,
        &matrix,
        DEFAULT_R2_THRESHOLD,
        SIGNIFICANCE_LEVEL,
        max_pairs,
    );

    if json {
        let report = serde_json::json!({
            "matrix": matrix,
            "best_fit_pairs": best,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Pearson correlation (pairwise-complete)");
    print_matrix(&matrix.variables, &matrix.r);
    println!();
    println!("Two-tailed p-values (p < {} significant)", SIGNIFICANCE_LEVEL);
    print_matrix(&matrix.variables, &matrix.p);
    println!();

    if best.is_empty() {
        println!(
            "No variable pairs with r² > {} and p < {}",
            DEFAULT_R2_THRESHOLD, SIGNIFICANCE_LEVEL
        );
        return Ok(());
    }
    println!("Best correlated pairs (r² > {}, ranked)", DEFAULT_R2_THRESHOLD);
    println!(
        "{:<36} {:>8} {:>8} {:>10} {:>10} {:>10} {:>7}",
        "Pair", "r", "r2", "p", "Slope", "Intercept", "n"
    );
    for b in &best {
        println!(
            "{:<36} {:>8} {:>8} {:>10} {:>10} {:>10} {:>7}",
            format!("{} vs {}", b.x.label(), b.y.label()),
            fmt_stat(b.r),
            fmt_stat(b.r2),
            fmt_p(b.p),
            fmt_stat(b.slope),
            fmt_stat(b.intercept),
            b.n
        );
    }
    Ok(())
}

fn fmt_p(p: f64) -> String {
    if p.is_nan() {
        "-".to_string()
    } else if p < 0.001 {
        "<0.001".to_string()
    } else {
        format!("{:.3}", p)
    }
}

fn print_matrix(variables: &[Variable], cells: &[Vec<f64>]) {
    print!("{:<18}", "");
    for v in variables {
        print!(" {:>9}", shorten(v.label()));
    }
    println!();
    for (i, v) in variables.iter().enumerate() {
        print!("{:<18}", v.label());
        for value in &cells[i] {
            print!(" {:>9}", fmt_stat(*value));
        }
        println!();
    }
}

fn shorten(label: &str) -> String {
    if label.len() > 9 {
        label[..9].to_string()
    } else {
        label.to_string()
    }
}
