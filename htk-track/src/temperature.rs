use crate::error::{Result, TrackError};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Accepted header names for the auxiliary temperature source.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureColumns {
    pub date: Vec<String>,
    pub value: Vec<String>,
}

impl Default for TemperatureColumns {
    fn default() -> Self {
        Self {
            date: vec!["dt".into(), "date".into(), "year".into()],
            value: vec![
                "LandAverageTemperature".into(),
                "temperature".into(),
                "value".into(),
            ],
        }
    }
}

/// One reading from the temperature series. `value` is `None` where the
/// source leaves the measurement blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub date: NaiveDate,
    pub year: i32,
    pub value: Option<f64>,
}

fn parse_reading_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() <= 4 {
        return s
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }
    htk_utils::dates::parse_timestamp(s).map(|ts| ts.date())
}

/// Parse the temperature CSV (header row first).
///
/// The date column may hold full dates or bare years. Rows with an
/// unparseable date are dropped; blank values are kept as `None`.
pub fn load_temperature(csv_data: &str, columns: &TemperatureColumns) -> Result<Vec<TemperatureReading>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Vec::new());
    }
    let find = |candidates: &[String], field: &'static str| {
        candidates
            .iter()
            .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
            .ok_or_else(|| TrackError::MissingColumn {
                source_label: "temperature".to_string(),
                field,
            })
    };
    let date_col = find(&columns.date, "date")?;
    let value_col = find(&columns.value, "value")?;

    let mut readings = Vec::new();
    let mut skipped = 0u32;
    for result in rdr.records() {
        let Ok(r) = result else {
            skipped += 1;
            continue;
        };
        let Some(date) = r.get(date_col).and_then(parse_reading_date) else {
            skipped += 1;
            continue;
        };
        let value = r
            .get(value_col)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite());
        readings.push(TemperatureReading {
            date,
            year: date.year(),
            value,
        });
    }
    log::info!(
        "[HTK Debug] loader: Loaded {} temperature readings, skipped {} invalid",
        readings.len(),
        skipped
    );
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TEMPERATURE_FIXTURE;

    #[test]
    fn load_temperature_fixture() {
        let readings = load_temperature(TEMPERATURE_FIXTURE, &TemperatureColumns::default()).unwrap();
        assert_eq!(readings.len(), 8);
        assert_eq!(readings[0].year, 1949);
        assert_eq!(readings[1].value, Some(2.0));
        let blank = readings.iter().find(|r| r.year == 1962).unwrap();
        assert_eq!(blank.value, None);
    }

    #[test]
    fn load_temperature_accepts_bare_years() {
        let csv = "year,temperature\n1960,14.2\nnope,1.0\n1961,\n";
        let readings = load_temperature(csv, &TemperatureColumns::default()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].year, 1960);
        assert_eq!(readings[1].value, None);
    }

    #[test]
    fn load_temperature_requires_value_column() {
        let err = load_temperature("dt,other\n1960-01-01,1\n", &TemperatureColumns::default());
        assert!(matches!(err, Err(TrackError::MissingColumn { field: "value", .. })));
    }
}
