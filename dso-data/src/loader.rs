use crate::dataset::{Dataset, FramePair};
use crate::measurement::{Measurement, Variable};
use crate::outlier;
use csv::{ReaderBuilder, StringRecord};
use log::info;
use std::fmt;
use std::path::Path;

/// Exact header of the timestamp column in the source CSV.
pub const DATETIME_HEADER: &str = "DateTime (UTC+00:00)";

/// Timestamp formats accepted in the source file, tried in order.
pub const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors that can occur when loading the measurement file. A failed load
/// never yields a partial dataset.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not well-formed CSV.
    Csv(csv::Error),
    /// A required column header is absent.
    MissingColumn(&'static str),
    /// A row holds an unparseable timestamp or numeric cell.
    /// `line` is 1-based and counts the header.
    Row { line: usize, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read measurement file: {}", e),
            LoadError::Csv(e) => write!(f, "malformed CSV: {}", e),
            LoadError::MissingColumn(header) => {
                write!(f, "required column missing: {}", header)
            }
            LoadError::Row { line, message } => {
                write!(f, "bad row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(value: csv::Error) -> Self {
        LoadError::Csv(value)
    }
}

/// Column positions of the timestamp and each sensor variable in the
/// source header row.
struct HeaderIndex {
    datetime: usize,
    variables: [(Variable, usize); 9],
}

impl HeaderIndex {
    fn from_headers(headers: &StringRecord) -> Result<HeaderIndex, LoadError> {
        let find = |wanted: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|h| h.trim() == wanted)
                .ok_or(LoadError::MissingColumn(wanted))
        };
        let datetime = find(DATETIME_HEADER)?;
        let mut variables = [(Variable::Temperature, 0usize); 9];
        for (slot, variable) in variables.iter_mut().zip(Variable::ALL) {
            *slot = (variable, find(variable.source_header())?);
        }
        Ok(HeaderIndex { datetime, variables })
    }
}

fn parse_timestamp(raw: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let trimmed = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc());
        }
    }
    None
}

/// Empty and NaN-like cells are missing readings; anything else must be a
/// number.
fn parse_cell(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "na" | "null" => Ok(None),
        _ => trimmed
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("not a number: {:?}", trimmed)),
    }
}

fn record_to_measurement(
    record: &StringRecord,
    index: &HeaderIndex,
    line: usize,
) -> Result<Measurement, LoadError> {
    let raw_datetime = record.get(index.datetime).unwrap_or("");
    let datetime = parse_timestamp(raw_datetime).ok_or_else(|| LoadError::Row {
        line,
        message: format!("unparseable timestamp: {:?}", raw_datetime),
    })?;
    let mut measurement = Measurement {
        datetime,
        temperature: None,
        pressure: None,
        salinity: None,
        chlorophyll_a: None,
        turbidity: None,
        ph: None,
        dissolved_oxygen: None,
        pco2: None,
        ta: None,
    };
    for (variable, position) in index.variables {
        let cell = record.get(position).unwrap_or("");
        let value = parse_cell(cell).map_err(|message| LoadError::Row { line, message })?;
        measurement.set_value(variable, value);
    }
    Ok(measurement)
}

impl Dataset {
    /// Parse a source CSV body into a dataset, unmodified (no outlier
    /// treatment). Pure function of the string content.
    pub fn from_csv_str(body: &str) -> Result<Dataset, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());
        let index = HeaderIndex::from_headers(reader.headers()?)?;
        let mut measurements = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            // line 1 is the header row
            measurements.push(record_to_measurement(&record, &index, row + 2)?);
        }
        Ok(Dataset(measurements))
    }
}

impl FramePair {
    /// Parse a source CSV body into the raw frame and its outlier-scrubbed
    /// clean twin.
    ///
    /// The turbidity percentile threshold is computed here, over the full
    /// raw column, before any range selection can happen; filtering by
    /// date afterwards cannot change which cells were nulled.
    pub fn from_csv_str(body: &str) -> Result<FramePair, LoadError> {
        let raw = Dataset::from_csv_str(body)?;
        let mut clean = raw.clone();
        outlier::scrub(&mut clean);
        Ok(FramePair { clean, raw })
    }

    /// Load both frames from a file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FramePair, LoadError> {
        let body = std::fs::read_to_string(path.as_ref()).map_err(LoadError::Io)?;
        let pair = FramePair::from_csv_str(&body)?;
        info!(
            "loaded {} measurements from {}",
            pair.raw.len(),
            path.as_ref().display()
        );
        Ok(pair)
    }
}
