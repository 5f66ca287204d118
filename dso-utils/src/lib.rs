//! Shared utility functions for DSO crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2024-02-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(parse_date("15/02/2024").is_err());
            assert!(parse_date("").is_err());
        }
    }
}

/// Numeric helpers shared by the outlier scrub and the statistics engine.
pub mod numeric {
    /// Arithmetic mean. Returns None for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Compute the `p`-th quantile (0.0..=1.0) with linear interpolation
    /// between order statistics (the R-7 convention).
    ///
    /// Returns None for an empty slice or `p` outside `[0, 1]`.
    pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
        if values.is_empty() || !(0.0..=1.0).contains(&p) {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(quantile_sorted(&sorted, p))
    }

    /// Quantile over data already sorted in non-decreasing order.
    /// The caller guarantees `sorted` is non-empty and `p` is in `[0, 1]`.
    pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
        let n = sorted.len();
        if n == 1 {
            return sorted[0];
        }
        let h = (n - 1) as f64 * p;
        let j = h.floor() as usize;
        let g = h - h.floor();
        if j + 1 >= n {
            sorted[n - 1]
        } else {
            (1.0 - g) * sorted[j] + g * sorted[j + 1]
        }
    }

}
