use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque storm identifier, e.g. "AL011950".
pub type EntityKey = String;

/// Storm status code as recorded in best-track data.
///
/// Unrecognized codes are kept verbatim in [`StormStatus::Other`] so that no
/// information is lost when a source uses a code this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StormStatus {
    /// HU: hurricane intensity
    Hurricane,
    /// TS: tropical storm
    TropicalStorm,
    /// TD: tropical depression
    TropicalDepression,
    /// EX: extratropical cyclone
    Extratropical,
    /// SS: subtropical storm
    SubtropicalStorm,
    /// SD: subtropical depression
    SubtropicalDepression,
    /// LO: low
    Low,
    /// WV: tropical wave
    Wave,
    /// DB: disturbance
    Disturbance,
    Other(String),
}

impl StormStatus {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "HU" => StormStatus::Hurricane,
            "TS" => StormStatus::TropicalStorm,
            "TD" => StormStatus::TropicalDepression,
            "EX" => StormStatus::Extratropical,
            "SS" => StormStatus::SubtropicalStorm,
            "SD" => StormStatus::SubtropicalDepression,
            "LO" => StormStatus::Low,
            "WV" => StormStatus::Wave,
            "DB" => StormStatus::Disturbance,
            _ => StormStatus::Other(code.trim().to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            StormStatus::Hurricane => "HU",
            StormStatus::TropicalStorm => "TS",
            StormStatus::TropicalDepression => "TD",
            StormStatus::Extratropical => "EX",
            StormStatus::SubtropicalStorm => "SS",
            StormStatus::SubtropicalDepression => "SD",
            StormStatus::Low => "LO",
            StormStatus::Wave => "WV",
            StormStatus::Disturbance => "DB",
            StormStatus::Other(code) => code.as_str(),
        }
    }

    /// True for hurricane-intensity observations.
    pub fn is_hurricane(&self) -> bool {
        matches!(self, StormStatus::Hurricane)
    }
}

impl From<String> for StormStatus {
    fn from(value: String) -> Self {
        StormStatus::from_code(&value)
    }
}

impl From<StormStatus> for String {
    fn from(value: StormStatus) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for StormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One observation of a storm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub entity_key: EntityKey,
    /// Storm name; empty when the source has no name column.
    pub name: String,
    /// Label of the source the event was loaded from (e.g. "AL", "EP").
    pub basin: String,
    pub timestamp: NaiveDateTime,
    /// Calendar year of `timestamp`, derived at load time.
    pub year: i32,
    pub lat: f64,
    pub lon: f64,
    /// Maximum sustained wind in knots
    pub wind: f64,
    /// Minimum central pressure in millibars
    pub pressure: Option<f64>,
    pub status: StormStatus,
}

/// Numeric event fields that can be aggregated per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    Wind,
    Pressure,
}

impl Event {
    pub fn value_of(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Wind => Some(self.wind),
            NumericField::Pressure => self.pressure,
        }
    }

    pub fn is_hurricane(&self) -> bool {
        self.status.is_hurricane()
    }
}
