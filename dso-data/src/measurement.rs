use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The nine sensor variables recorded by the mooring.
///
/// Order matches the analysis views: it is the enumeration order used for
/// correlation matrices and comparison tables, and ties in ranked output
/// break on it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Temperature,
    Pressure,
    Salinity,
    ChlorophyllA,
    Turbidity,
    Ph,
    DissolvedOxygen,
    Pco2,
    Ta,
}

impl Variable {
    pub const ALL: [Variable; 9] = [
        Variable::Temperature,
        Variable::Pressure,
        Variable::Salinity,
        Variable::ChlorophyllA,
        Variable::Turbidity,
        Variable::Ph,
        Variable::DissolvedOxygen,
        Variable::Pco2,
        Variable::Ta,
    ];

    /// Canonical column name used throughout the toolkit.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Pressure => "pressure",
            Variable::Salinity => "salinity",
            Variable::ChlorophyllA => "chlorophyll_a",
            Variable::Turbidity => "turbidity",
            Variable::Ph => "ph",
            Variable::DissolvedOxygen => "dissolved_oxygen",
            Variable::Pco2 => "pco2",
            Variable::Ta => "ta",
        }
    }

    /// Exact header carried by the source CSV for this variable.
    pub fn source_header(self) -> &'static str {
        match self {
            Variable::Temperature => "Temperature (ºC)",
            Variable::Pressure => "Pressure (dbar)",
            Variable::Salinity => "Salinity (PSU)",
            Variable::ChlorophyllA => "Chlorophyll (ug/L)",
            Variable::Turbidity => "Turbidity (NTU)",
            Variable::Ph => "pH",
            Variable::DissolvedOxygen => "OD umolKg-1",
            Variable::Pco2 => "pCO2",
            Variable::Ta => "TA (ueq/kg)",
        }
    }

    /// Human-readable label for tables and reports.
    pub fn label(self) -> &'static str {
        match self {
            Variable::Temperature => "Temperature",
            Variable::Pressure => "Pressure",
            Variable::Salinity => "Salinity",
            Variable::ChlorophyllA => "Chlorophyll-a",
            Variable::Turbidity => "Turbidity",
            Variable::Ph => "pH",
            Variable::DissolvedOxygen => "Dissolved Oxygen",
            Variable::Pco2 => "pCO2",
            Variable::Ta => "TA",
        }
    }

    /// Measurement unit, for display alongside the label.
    pub fn unit(self) -> &'static str {
        match self {
            Variable::Temperature => "°C",
            Variable::Pressure => "dbar",
            Variable::Salinity => "PSU",
            Variable::ChlorophyllA => "μg/L",
            Variable::Turbidity => "NTU",
            Variable::Ph => "",
            Variable::DissolvedOxygen => "μmol/kg",
            Variable::Pco2 => "μatm",
            Variable::Ta => "μeq/kg",
        }
    }
}

/// One timestamped multi-sensor reading. Any sensor field may be missing
/// for a given timestamp; the timestamp itself is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub datetime: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub salinity: Option<f64>,
    pub chlorophyll_a: Option<f64>,
    pub turbidity: Option<f64>,
    pub ph: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
    pub pco2: Option<f64>,
    pub ta: Option<f64>,
}

impl Measurement {
    pub fn value(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Pressure => self.pressure,
            Variable::Salinity => self.salinity,
            Variable::ChlorophyllA => self.chlorophyll_a,
            Variable::Turbidity => self.turbidity,
            Variable::Ph => self.ph,
            Variable::DissolvedOxygen => self.dissolved_oxygen,
            Variable::Pco2 => self.pco2,
            Variable::Ta => self.ta,
        }
    }

    pub fn set_value(&mut self, variable: Variable, value: Option<f64>) {
        match variable {
            Variable::Temperature => self.temperature = value,
            Variable::Pressure => self.pressure = value,
            Variable::Salinity => self.salinity = value,
            Variable::ChlorophyllA => self.chlorophyll_a = value,
            Variable::Turbidity => self.turbidity = value,
            Variable::Ph => self.ph = value,
            Variable::DissolvedOxygen => self.dissolved_oxygen = value,
            Variable::Pco2 => self.pco2 = value,
            Variable::Ta => self.ta = value,
        }
    }

    /// Calendar date of the reading in the dataset's stored UTC offset.
    pub fn date(&self) -> NaiveDate {
        self.datetime.date_naive()
    }

    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    pub fn month(&self) -> u32 {
        self.datetime.month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank_at(y: i32, m: u32, d: u32) -> Measurement {
        Measurement {
            datetime: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            temperature: None,
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
    fn test_value_roundtrip_all_variables() {
        let mut m = blank_at(2024, 1, 15);
        for (i, var) in Variable::ALL.iter().enumerate() {
            m.set_value(*var, Some(i as f64));
        }
        for (i, var) in Variable::ALL.iter().enumerate() {
            assert_eq!(m.value(*var), Some(i as f64));
        }
    }

    #[test]
    fn test_date_parts() {
        let m = blank_at(2025, 2, 28);
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 2);
        assert_eq!(m.date(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_headers_are_distinct() {
        let mut headers: Vec<&str> = Variable::ALL.iter().map(|v| v.source_header()).collect();
        headers.sort();
        headers.dedup();
        assert_eq!(headers.len(), Variable::ALL.len());
    }
}
