use crate::SIGNIFICANCE_LEVEL;
use dso_data::dataset::Dataset;
use dso_data::measurement::Variable;
use dso_utils::numeric;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::collections::BTreeMap;

/// Distributional comparison of one variable between two calendar-year
/// partitions. Nulls are dropped independently per partition.
///
/// Either hypothesis test can be unavailable (None) on degenerate input —
/// an empty partition, all-identical pooled values, too few points — while
/// the means and percent change still report what they can: the mean of an
/// empty partition is NaN, and a zero baseline mean makes the percent
/// change a signed infinity (documented, not an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearComparison {
    pub variable: Variable,
    pub year_a: i32,
    pub year_b: i32,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    pub percent_change: f64,
    pub mann_whitney_p: Option<f64>,
    pub t_test_p: Option<f64>,
}

impl YearComparison {
    /// Verdict used by the comparison summary: driven by the
    /// Mann-Whitney p-value; an unavailable test is not significant.
    pub fn is_significant(&self) -> bool {
        matches!(self.mann_whitney_p, Some(p) if p < SIGNIFICANCE_LEVEL)
    }
}

/// Compare one variable between two calendar years.
pub fn compare_years(
    dataset: &Dataset,
    variable: Variable,
    year_a: i32,
    year_b: i32,
) -> YearComparison {
    let a = dataset.values_for_year(variable, year_a);
    let b = dataset.values_for_year(variable, year_b);
    let mean_a = numeric::mean(&a).unwrap_or(f64::NAN);
    let mean_b = numeric::mean(&b).unwrap_or(f64::NAN);
    YearComparison {
        variable,
        year_a,
        year_b,
        n_a: a.len(),
        n_b: b.len(),
        mean_a,
        mean_b,
        percent_change: (mean_b - mean_a) / mean_a * 100.0,
        mann_whitney_p: mann_whitney_u(&a, &b),
        t_test_p: welch_t_test(&a, &b),
    }
}

/// Compare every listed variable between two years. A degenerate result
/// for one variable never stops the others.
pub fn compare_all(
    dataset: &Dataset,
    variables: &[Variable],
    year_a: i32,
    year_b: i32,
) -> Vec<YearComparison> {
    variables
        .iter()
        .map(|&v| compare_years(dataset, v, year_a, year_b))
        .collect()
}

/// Mean of each month's non-null values for one variable in one calendar
/// year, keyed 1-12. Months with no data are omitted. Grouping keys off
/// each row's timestamp, never sequence position.
pub fn monthly_means(dataset: &Dataset, variable: Variable, year: i32) -> Vec<(u32, f64)> {
    let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for m in &dataset.0 {
        if m.year() != year {
            continue;
        }
        if let Some(value) = m.value(variable) {
            buckets.entry(m.month()).or_default().push(value);
        }
    }
    buckets
        .into_iter()
        .filter_map(|(month, values)| numeric::mean(&values).map(|mean| (month, mean)))
        .collect()
}

/// Two-sided Mann-Whitney U test via the tie-corrected normal
/// approximation with continuity correction. None when either sample is
/// empty or the pooled values are all identical (zero-variance
/// approximation is undefined).
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<f64> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 == 0 || n2 == 0 {
        return None;
    }

    // rank the pooled sample, averaging ranks across ties
    let mut pooled: Vec<(f64, usize)> = a
        .iter()
        .map(|&v| (v, 0usize))
        .chain(b.iter().map(|&v| (v, 1usize)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let total = pooled.len();
    let mut ranks = vec![0.0f64; total];
    let mut tie_term = 0.0f64;
    let mut start = 0;
    while start < total {
        let mut end = start + 1;
        while end < total && pooled[end].0 == pooled[start].0 {
            end += 1;
        }
        let tied = (end - start) as f64;
        // ranks are 1-based; tied values share the average rank
        let average = (start + 1 + end) as f64 / 2.0;
        for rank in ranks.iter_mut().take(end).skip(start) {
            *rank = average;
        }
        tie_term += tied * tied * tied - tied;
        start = end;
    }

    let rank_sum_a: f64 = pooled
        .iter()
        .zip(&ranks)
        .filter(|((_, sample), _)| *sample == 0)
        .map(|(_, &rank)| rank)
        .sum();

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let nf = total as f64;
    let u = rank_sum_a - n1f * (n1f + 1.0) / 2.0;

    let mean_u = n1f * n2f / 2.0;
    let variance = n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if variance <= 0.0 {
        return None;
    }

    // continuity correction shifts half a unit toward the mean
    let delta = u - mean_u;
    let corrected = delta - 0.5 * delta.signum();
    let z = corrected / variance.sqrt();
    let normal = Normal::new(0.0, 1.0).ok()?;
    Some((2.0 * normal.sf(z.abs())).clamp(0.0, 1.0))
}

/// Two-sided Welch (unequal-variance) t-test with Welch–Satterthwaite
/// degrees of freedom. None when either sample has fewer than 2 points or
/// both sample variances are zero.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<f64> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 < 2 || n2 < 2 {
        return None;
    }
    let mean_a = numeric::mean(a)?;
    let mean_b = numeric::mean(b)?;
    let var_a = sample_variance(a, mean_a);
    let var_b = sample_variance(b, mean_b);
    let se_a = var_a / n1 as f64;
    let se_b = var_b / n2 as f64;
    let pooled = se_a + se_b;
    if pooled == 0.0 {
        return None;
    }
    let t = (mean_a - mean_b) / pooled.sqrt();
    let df = pooled * pooled
        / (se_a * se_a / (n1 as f64 - 1.0) + se_b * se_b / (n2 as f64 - 1.0));
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dso_data::measurement::Measurement;

    fn temperature_at(y: i32, m: u32, d: u32, temperature: f64) -> Measurement {
        Measurement {
            datetime: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            temperature: Some(temperature),
            pressure: None,
            salinity: None,
            chlorophyll_a: None,
            turbidity: None,
            ph: None,
            dissolved_oxygen: None,
            pco2: None,
            ta: None,
        }
    }

    #[test]
    fn test_year_partition_means_and_percent_change() {
        let ds = Dataset(vec![
            temperature_at(2024, 1, 1, 1.0),
            temperature_at(2024, 1, 2, 3.0),
            temperature_at(2025, 1, 1, 5.0),
            temperature_at(2025, 1, 2, 7.0),
        ]);
        let cmp = compare_years(&ds, Variable::Temperature, 2024, 2025);
        assert_eq!(cmp.mean_a, 2.0);
        assert_eq!(cmp.mean_b, 6.0);
        assert_eq!(cmp.percent_change, 200.0);
        assert_eq!(cmp.n_a, 2);
        assert_eq!(cmp.n_b, 2);
    }

    #[test]
    fn test_zero_baseline_gives_signed_infinity() {
        let ds = Dataset(vec![
            temperature_at(2024, 1, 1, -1.0),
            temperature_at(2024, 1, 2, 1.0),
            temperature_at(2025, 1, 1, 4.0),
        ]);
        let cmp = compare_years(&ds, Variable::Temperature, 2024, 2025);
        assert_eq!(cmp.mean_a, 0.0);
        assert!(cmp.percent_change.is_infinite());
        assert!(cmp.percent_change > 0.0);
    }

    #[test]
    fn test_empty_partition_reports_unavailable_tests() {
        let ds = Dataset(vec![
            temperature_at(2024, 1, 1, 1.0),
            temperature_at(2024, 1, 2, 3.0),
        ]);
        let cmp = compare_years(&ds, Variable::Temperature, 2024, 2025);
        assert_eq!(cmp.mean_a, 2.0);
        assert!(cmp.mean_b.is_nan());
        assert!(cmp.percent_change.is_nan());
        assert_eq!(cmp.mann_whitney_p, None);
        assert_eq!(cmp.t_test_p, None);
        assert!(!cmp.is_significant());
    }

    #[test]
    fn test_compare_all_survives_degenerate_variable() {
        let ds = Dataset(vec![
            temperature_at(2024, 1, 1, 1.0),
            temperature_at(2024, 1, 2, 2.0),
            temperature_at(2025, 1, 1, 10.0),
            temperature_at(2025, 1, 2, 11.0),
        ]);
        // salinity is all-null: its comparison is degenerate but present
        let results = compare_all(
            &ds,
            &[Variable::Temperature, Variable::Salinity],
            2024,
            2025,
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].mann_whitney_p.is_some());
        assert_eq!(results[1].mann_whitney_p, None);
    }

    #[test]
    fn test_mann_whitney_separated_samples() {
        let a: Vec<f64> = (0..15).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let p = mann_whitney_u(&a, &b).unwrap();
        assert!(p < 0.001);
    }

    #[test]
    fn test_mann_whitney_identical_samples() {
        let a: Vec<f64> = (0..20).map(|i| (i % 7) as f64).collect();
        let p = mann_whitney_u(&a, &a).unwrap();
        assert!(p > 0.8);
    }

    #[test]
    fn test_mann_whitney_all_ties_unavailable() {
        let a = vec![5.0; 10];
        let b = vec![5.0; 8];
        assert_eq!(mann_whitney_u(&a, &b), None);
    }

    #[test]
    fn test_mann_whitney_empty_unavailable() {
        assert_eq!(mann_whitney_u(&[], &[1.0, 2.0]), None);
        assert_eq!(mann_whitney_u(&[1.0], &[]), None);
    }

    #[test]
    fn test_welch_identical_samples() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let p = welch_t_test(&a, &a).unwrap();
        assert!((p - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_welch_separated_samples() {
        let a = [1.0, 1.1, 0.9, 1.05, 0.95, 1.02];
        let b = [9.0, 9.1, 8.9, 9.05, 8.95, 9.02];
        let p = welch_t_test(&a, &b).unwrap();
        assert!(p < 1e-6);
    }

    #[test]
    fn test_welch_degenerate_unavailable() {
        assert_eq!(welch_t_test(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(welch_t_test(&[3.0, 3.0], &[3.0, 3.0]), None);
    }

    #[test]
    fn test_monthly_means_group_by_timestamp() {
        // rows deliberately out of chronological order
        let ds = Dataset(vec![
            temperature_at(2024, 2, 10, 4.0),
            temperature_at(2024, 1, 5, 1.0),
            temperature_at(2024, 1, 20, 3.0),
            temperature_at(2025, 1, 5, 100.0),
        ]);
        let means = monthly_means(&ds, Variable::Temperature, 2024);
        assert_eq!(means, vec![(1, 2.0), (2, 4.0)]);
    }

    #[test]
    fn test_monthly_means_empty_year() {
        let ds = Dataset(vec![temperature_at(2024, 1, 1, 1.0)]);
        assert!(monthly_means(&ds, Variable::Temperature, 2023).is_empty());
    }
}
