use crate::SIGNIFICANCE_LEVEL;
use dso_data::dataset::Dataset;
use dso_data::measurement::Variable;
use dso_utils::numeric;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pairs qualify as best-fit when r² exceeds this threshold.
pub const DEFAULT_R2_THRESHOLD: f64 = 0.8;

/// Display budget for the ranked best-fit list. A presentation constraint,
/// not a domain rule; callers may pass their own cap.
pub const DEFAULT_MAX_PAIRS: usize = 6;

/// Pairwise-complete Pearson correlation over a variable list, with a
/// parallel two-tailed p-value matrix and the paired sample size each
/// cell used.
///
/// Each pair uses only the rows where both variables are non-null, so
/// different cells may rest on differently sized subsets. The matrix is
/// symmetric; diagonal entries are r = 1, p = 0 by convention. A pair
/// with fewer than 2 paired rows (or zero variance) carries r = NaN, and
/// any pair with 2 or fewer paired rows carries p = 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<Variable>,
    pub r: Vec<Vec<f64>>,
    pub p: Vec<Vec<f64>>,
    pub n: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn compute(dataset: &Dataset, variables: &[Variable]) -> CorrelationMatrix {
        let k = variables.len();
        let mut r = vec![vec![f64::NAN; k]; k];
        let mut p = vec![vec![1.0; k]; k];
        let mut n = vec![vec![0usize; k]; k];

        for i in 0..k {
            r[i][i] = 1.0;
            p[i][i] = 0.0;
            n[i][i] = dataset.non_null(variables[i]).len();
            for j in (i + 1)..k {
                let (xs, ys) = dataset.paired_values(variables[i], variables[j]);
                let r_ij = pearson(&xs, &ys);
                let p_ij = two_tailed_p(r_ij, xs.len());
                r[i][j] = r_ij;
                r[j][i] = r_ij;
                p[i][j] = p_ij;
                p[j][i] = p_ij;
                n[i][j] = xs.len();
                n[j][i] = xs.len();
            }
        }

        CorrelationMatrix {
            variables: variables.to_vec(),
            r,
            p,
            n,
        }
    }
}

/// Pearson r over parallel slices. NaN when fewer than 2 points or either
/// side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let count = xs.len();
    if count < 2 {
        return f64::NAN;
    }
    let mean_x = xs.iter().sum::<f64>() / count as f64;
    let mean_y = ys.iter().sum::<f64>() / count as f64;
    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    covariance / denom
}

/// Two-tailed p-value for a Pearson r over n paired observations, from
/// the t statistic with n - 2 degrees of freedom. Pairs with 2 or fewer
/// observations get p = 1.0 (non-significant) rather than failing.
fn two_tailed_p(r: f64, n: usize) -> f64 {
    if n <= 2 || !r.is_finite() {
        return 1.0;
    }
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r2)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// A variable pair whose linear association clears the r² and
/// significance thresholds, with its least-squares fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestFitPair {
    pub x: Variable,
    pub y: Variable,
    pub r: f64,
    pub r2: f64,
    pub p: f64,
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
}

/// Select pairs from the matrix's upper triangle with r² above
/// `r2_threshold` and p below `alpha`, fit a degree-1 least-squares line
/// over each pair's complete rows, rank by descending r² (stable), and
/// truncate to `max_pairs`.
pub fn best_fit_pairs(
    dataset: &Dataset,
    matrix: &CorrelationMatrix,
    r2_threshold: f64,
    alpha: f64,
    max_pairs: usize,
) -> Vec<BestFitPair> {
    let threshold_r = r2_threshold.sqrt();
    let mut pairs = Vec::new();
    for i in 0..matrix.variables.len() {
        for j in (i + 1)..matrix.variables.len() {
            let r = matrix.r[i][j];
            let p = matrix.p[i][j];
            if !r.is_finite() || r.abs() <= threshold_r || p >= alpha {
                continue;
            }
            let (xs, ys) = dataset.paired_values(matrix.variables[i], matrix.variables[j]);
            if let Some((slope, intercept)) = linear_fit(&xs, &ys) {
                pairs.push(BestFitPair {
                    x: matrix.variables[i],
                    y: matrix.variables[j],
                    r,
                    r2: r * r,
                    p,
                    slope,
                    intercept,
                    n: xs.len(),
                });
            }
        }
    }
    // stable sort keeps enumeration order between equal r² values
    pairs.sort_by(|a, b| b.r2.partial_cmp(&a.r2).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(max_pairs);
    pairs
}

/// Convenience wrapper using the default thresholds.
pub fn default_best_fit_pairs(dataset: &Dataset, matrix: &CorrelationMatrix) -> Vec<BestFitPair> {
    best_fit_pairs(
        dataset,
        matrix,
        DEFAULT_R2_THRESHOLD,
        SIGNIFICANCE_LEVEL,
        DEFAULT_MAX_PAIRS,
    )
}

/// Least-squares slope and intercept of y on x. None when fewer than 2
/// points or x is constant.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() < 2 {
        return None;
    }
    let mean_x = numeric::mean(xs)?;
    let mean_y = numeric::mean(ys)?;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        numerator += (x - mean_x) * (y - mean_y);
        denominator += (x - mean_x) * (x - mean_x);
    }
    if denominator == 0.0 {
        return None;
    }
    let slope = numerator / denominator;
    Some((slope, mean_y - slope * mean_x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use dso_data::measurement::Measurement;

    fn dataset_from_columns(
        temperature: &[Option<f64>],
        salinity: &[Option<f64>],
        ph: &[Option<f64>],
    ) -> Dataset {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let rows = temperature.len();
        assert_eq!(rows, salinity.len());
        assert_eq!(rows, ph.len());
        Dataset(
            (0..rows)
                .map(|i| Measurement {
                    datetime: start + Duration::hours(i as i64),
                    temperature: temperature[i],
                    salinity: salinity[i],
                    ph: ph[i],
                    pressure: None,
                    chlorophyll_a: None,
                    turbidity: None,
                    dissolved_oxygen: None,
                    pco2: None,
                    ta: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_pearson_perfect_positive() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]);
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_is_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let ds = dataset_from_columns(
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            &[Some(2.1), Some(3.9), Some(6.2), Some(7.8)],
            &[Some(8.0), Some(8.1), Some(7.9), Some(8.2)],
        );
        let variables = [Variable::Temperature, Variable::Salinity, Variable::Ph];
        let m = CorrelationMatrix::compute(&ds, &variables);
        for i in 0..3 {
            assert_eq!(m.r[i][i], 1.0);
            assert_eq!(m.p[i][i], 0.0);
            for j in 0..3 {
                assert_eq!(m.r[i][j].to_bits(), m.r[j][i].to_bits());
                assert_eq!(m.p[i][j], m.p[j][i]);
                assert_eq!(m.n[i][j], m.n[j][i]);
            }
        }
    }

    #[test]
    fn test_pairwise_complete_sample_sizes_differ() {
        let ds = dataset_from_columns(
            &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
            &[Some(1.0), None, Some(3.0), Some(4.0)],
            &[None, Some(2.0), Some(3.0), None],
        );
        let variables = [Variable::Temperature, Variable::Salinity, Variable::Ph];
        let m = CorrelationMatrix::compute(&ds, &variables);
        assert_eq!(m.n[0][1], 3); // temperature x salinity
        assert_eq!(m.n[0][2], 2); // temperature x ph
        assert_eq!(m.n[1][2], 1); // salinity x ph
    }

    #[test]
    fn test_insufficient_pairs_get_p_one() {
        let ds = dataset_from_columns(
            &[Some(1.0), Some(2.0), None, None],
            &[Some(1.5), Some(2.5), None, None],
            &[None, None, None, None],
        );
        let variables = [Variable::Temperature, Variable::Salinity, Variable::Ph];
        let m = CorrelationMatrix::compute(&ds, &variables);
        // only 2 paired rows: r may exist but p defaults to 1.0
        assert_eq!(m.p[0][1], 1.0);
        // zero paired rows: r is NaN, p stays 1.0
        assert!(m.r[0][2].is_nan());
        assert_eq!(m.p[0][2], 1.0);
    }

    #[test]
    fn test_p_value_small_for_strong_correlation() {
        let xs: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0 + (x * 0.7).sin() * 0.1).collect();
        let r = pearson(&xs, &ys);
        let p = two_tailed_p(r, xs.len());
        assert!(r > 0.99);
        assert!(p < 1e-6);
    }

    #[test]
    fn test_p_value_large_for_noise_like_pattern() {
        // alternating series has near-zero correlation with a ramp
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let ys: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = pearson(&xs, &ys);
        let p = two_tailed_p(r, xs.len());
        assert!(r.abs() < 0.3);
        assert!(p > 0.2);
    }

    #[test]
    fn test_linear_fit_recovers_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_fit(&xs, &ys).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_fit_constant_x_is_none() {
        assert_eq!(linear_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_best_fit_pairs_filtered_and_ranked() {
        // temperature-salinity nearly perfect; temperature-ph noise
        let ds = dataset_from_columns(
            &(0..20).map(|i| Some(i as f64)).collect::<Vec<_>>(),
            &(0..20).map(|i| Some(2.0 * i as f64 + 0.5)).collect::<Vec<_>>(),
            &(0..20)
                .map(|i| Some(if i % 2 == 0 { 8.0 } else { 7.0 }))
                .collect::<Vec<_>>(),
        );
        let variables = [Variable::Temperature, Variable::Salinity, Variable::Ph];
        let m = CorrelationMatrix::compute(&ds, &variables);
        let pairs = default_best_fit_pairs(&ds, &m);
        assert_eq!(pairs.len(), 1);
        let best = &pairs[0];
        assert_eq!(best.x, Variable::Temperature);
        assert_eq!(best.y, Variable::Salinity);
        assert!(best.r2 > DEFAULT_R2_THRESHOLD);
        assert!(best.p < SIGNIFICANCE_LEVEL);
        assert!((best.slope - 2.0).abs() < 1e-9);
        assert!((best.intercept - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_best_fit_pairs_respects_cap_and_order() {
        let ds = dataset_from_columns(
            &(0..20).map(|i| Some(i as f64)).collect::<Vec<_>>(),
            &(0..20).map(|i| Some(3.0 * i as f64)).collect::<Vec<_>>(),
            &(0..20).map(|i| Some(-(i as f64) + 40.0)).collect::<Vec<_>>(),
        );
        let variables = [Variable::Temperature, Variable::Salinity, Variable::Ph];
        let m = CorrelationMatrix::compute(&ds, &variables);
        let all = best_fit_pairs(&ds, &m, DEFAULT_R2_THRESHOLD, SIGNIFICANCE_LEVEL, 6);
        // all three pairings are perfectly linear
        assert_eq!(all.len(), 3);
        for window in all.windows(2) {
            assert!(window[0].r2 >= window[1].r2);
        }
        let capped = best_fit_pairs(&ds, &m, DEFAULT_R2_THRESHOLD, SIGNIFICANCE_LEVEL, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0], all[0]);
        assert_eq!(capped[1], all[1]);
    }
}
