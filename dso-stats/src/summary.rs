use dso_data::dataset::Dataset;
use dso_data::measurement::Variable;
use dso_utils::numeric;
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one variable's non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl SeriesSummary {
    /// Compute from raw values. Returns None when there is nothing to
    /// summarize (all readings missing).
    pub fn compute(values: &[f64]) -> Option<SeriesSummary> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = numeric::mean(values)?;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = numeric::quantile_sorted(&sorted, 0.5);

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std_dev = variance.sqrt();

        Some(SeriesSummary {
            count,
            min,
            max,
            mean,
            median,
            std_dev,
        })
    }
}

/// Count of non-missing entries per variable, for completeness reporting.
pub fn non_null_counts(dataset: &Dataset, variables: &[Variable]) -> Vec<(Variable, usize)> {
    variables
        .iter()
        .map(|&v| (v, dataset.non_null(v).len()))
        .collect()
}

/// Per-variable descriptive summaries; None for all-null variables.
pub fn variable_summaries(
    dataset: &Dataset,
    variables: &[Variable],
) -> Vec<(Variable, Option<SeriesSummary>)> {
    variables
        .iter()
        .map(|&v| (v, SeriesSummary::compute(&dataset.non_null(v))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use dso_data::measurement::Measurement;

    fn temperature_dataset(values: &[Option<f64>]) -> Dataset {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Dataset(
            values
                .iter()
                .enumerate()
                .map(|(i, &temperature)| Measurement {
                    datetime: start + Duration::minutes(10 * i as i64),
                    temperature,
                    pressure: None,
                    salinity: None,
                    chlorophyll_a: None,
                    turbidity: None,
                    ph: None,
                    dissolved_oxygen: None,
                    pco2: None,
                    ta: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_series_summary_basic() {
        let s = SeriesSummary::compute(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert!((s.std_dev - 1.118033988749895).abs() < 1e-12);
    }

    #[test]
    fn test_series_summary_empty_is_none() {
        assert_eq!(SeriesSummary::compute(&[]), None);
    }

    #[test]
    fn test_non_null_counts() {
        let ds = temperature_dataset(&[Some(1.0), None, Some(3.0)]);
        let counts = non_null_counts(&ds, &[Variable::Temperature, Variable::Salinity]);
        assert_eq!(counts[0], (Variable::Temperature, 2));
        assert_eq!(counts[1], (Variable::Salinity, 0));
    }

    #[test]
    fn test_variable_summaries_all_null_is_none() {
        let ds = temperature_dataset(&[None, None]);
        let summaries = variable_summaries(&ds, &[Variable::Temperature]);
        assert_eq!(summaries[0].1, None);
    }
}
