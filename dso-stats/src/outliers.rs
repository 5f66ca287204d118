use dso_data::dataset::Dataset;
use dso_data::measurement::Variable;
use dso_utils::numeric;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the IQR when computing outlier fences.
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

/// IQR outlier report for one variable, computed over the raw (unscrubbed)
/// frame with nulls excluded. A reporting view, not a filter: nothing is
/// removed from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub variable: Variable,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub count: usize,
    pub total: usize,
    pub percentage: f64,
}

impl OutlierSummary {
    /// Compute for one variable. An all-null variable yields the
    /// documented zero-count, zero-percentage fallback with NaN fences.
    pub fn compute(variable: Variable, values: &[f64]) -> OutlierSummary {
        if values.is_empty() {
            return OutlierSummary {
                variable,
                q1: f64::NAN,
                q3: f64::NAN,
                iqr: f64::NAN,
                lower_fence: f64::NAN,
                upper_fence: f64::NAN,
                count: 0,
                total: 0,
                percentage: 0.0,
            };
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q1 = numeric::quantile_sorted(&sorted, 0.25);
        let q3 = numeric::quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_fence = q1 - IQR_FENCE_MULTIPLIER * iqr;
        let upper_fence = q3 + IQR_FENCE_MULTIPLIER * iqr;
        let count = values
            .iter()
            .filter(|&&v| v < lower_fence || v > upper_fence)
            .count();
        OutlierSummary {
            variable,
            q1,
            q3,
            iqr,
            lower_fence,
            upper_fence,
            count,
            total: values.len(),
            percentage: count as f64 / values.len() as f64 * 100.0,
        }
    }
}

/// Per-variable IQR summaries over the raw frame, sorted by descending
/// outlier percentage (stable, so ties keep enumeration order).
pub fn outlier_summaries(raw: &Dataset, variables: &[Variable]) -> Vec<OutlierSummary> {
    let mut summaries: Vec<OutlierSummary> = variables
        .iter()
        .map(|&v| OutlierSummary::compute(v, &raw.non_null(v)))
        .collect();
    summaries.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}
