use crate::dataset::Dataset;
use crate::measurement::Variable;
use dso_utils::numeric;
use log::debug;

/// Chlorophyll-a readings above this ceiling (μg/L) are physically
/// implausible for the deployment region and are nulled.
pub const CHLOROPHYLL_CEILING: f64 = 200.0;

/// Total alkalinity readings below this floor (μeq/kg) are measurement
/// errors for seawater and are nulled.
pub const TA_FLOOR: f64 = 2000.0;

/// Turbidity readings above this percentile of the full raw column are
/// nulled. Statistical rather than physical: trims the extreme tail while
/// preserving natural variability.
pub const TURBIDITY_PERCENTILE: f64 = 0.99;

/// Apply the three fixed outlier rules in place, nulling cells only —
/// never removing rows. No other variable receives outlier treatment.
///
/// The turbidity threshold must come from the entire dataset as loaded,
/// not a date-filtered subset, so that range selection downstream does not
/// change what counts as an outlier.
pub fn scrub(dataset: &mut Dataset) {
    let turbidity_threshold = {
        let values = dataset.non_null(Variable::Turbidity);
        numeric::quantile(&values, TURBIDITY_PERCENTILE)
    };
    if let Some(threshold) = turbidity_threshold {
        debug!("turbidity p99 threshold: {}", threshold);
    }

    for measurement in &mut dataset.0 {
        if let Some(v) = measurement.chlorophyll_a {
            if v > CHLOROPHYLL_CEILING {
                measurement.chlorophyll_a = None;
            }
        }
        if let (Some(threshold), Some(v)) = (turbidity_threshold, measurement.turbidity) {
            if v > threshold {
                measurement.turbidity = None;
            }
        }
        if let Some(v) = measurement.ta {
            if v < TA_FLOOR {
                measurement.ta = None;
            }
        }
    }
}
