use crate::measurement::{Measurement, Variable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An ordered sequence of measurements, insertion order = load order.
/// Rows are never mutated after load; filtering produces new datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset(pub Vec<Measurement>);

impl Dataset {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All values of one variable, in row order, nulls included.
    pub fn column(&self, variable: Variable) -> Vec<Option<f64>> {
        self.0.iter().map(|m| m.value(variable)).collect()
    }

    /// Non-null values of one variable, in row order.
    pub fn non_null(&self, variable: Variable) -> Vec<f64> {
        self.0.iter().filter_map(|m| m.value(variable)).collect()
    }

    /// Rows where both variables are non-null, as parallel vectors.
    /// Each pair of variables may use a different subset of rows.
    pub fn paired_values(&self, x: Variable, y: Variable) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for m in &self.0 {
            if let (Some(a), Some(b)) = (m.value(x), m.value(y)) {
                xs.push(a);
                ys.push(b);
            }
        }
        (xs, ys)
    }

    /// Earliest and latest calendar date present, or None for an empty dataset.
    /// Rows are not assumed sorted by time.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.0.first()?.date();
        let mut min = first;
        let mut max = first;
        for m in self.0.iter().skip(1) {
            let d = m.date();
            if d < min {
                min = d;
            }
            if d > max {
                max = d;
            }
        }
        Some((min, max))
    }

    pub fn year_span(&self) -> Option<(i32, i32)> {
        use chrono::Datelike;
        self.date_span().map(|(a, b)| (a.year(), b.year()))
    }

    /// Restrict to rows whose calendar date falls in the inclusive
    /// `[start, end]` bound, preserving original order.
    ///
    /// A degenerate bound (either side absent) passes the full dataset
    /// through unfiltered; that is a defined fallback, not an error.
    pub fn select_date_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Dataset {
        match (start, end) {
            (Some(start), Some(end)) => Dataset(
                self.0
                    .iter()
                    .filter(|m| {
                        let d = m.date();
                        start <= d && d <= end
                    })
                    .cloned()
                    .collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Non-null values of one variable restricted to a calendar year.
    pub fn values_for_year(&self, variable: Variable, year: i32) -> Vec<f64> {
        self.0
            .iter()
            .filter(|m| m.year() == year)
            .filter_map(|m| m.value(variable))
            .collect()
    }
}

/// The clean (outlier-scrubbed) and raw datasets carried together.
///
/// Both come from the same source rows positionally: the scrub nulls cells,
/// it never removes rows, and range selection is applied to both with the
/// same bound. Row alignment is therefore a structural guarantee consumers
/// may rely on (the outlier reporting view does).
#[derive(Debug, Clone, PartialEq)]
pub struct FramePair {
    pub clean: Dataset,
    pub raw: Dataset,
}

impl FramePair {
    /// Apply one date-range bound identically to both frames.
    pub fn select_date_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> FramePair {
        FramePair {
            clean: self.clean.select_date_range(start, end),
            raw: self.raw.select_date_range(start, end),
        }
    }
}
