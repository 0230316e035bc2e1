use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kilometers per hour in one knot.
pub const KMH_PER_KNOT: f64 = 1.852;

/// Statute miles per hour in one knot.
pub const MPH_PER_KNOT: f64 = 1.150_779_448;

/// Meters per second in one knot.
pub const MS_PER_KNOT: f64 = 0.514_444_444;

/// Unit a wind speed is expressed in.
///
/// Events are stored in knots. Sources recorded in another unit are converted
/// once, when the dataset is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindUnit {
    #[default]
    Knots,
    KilometersPerHour,
    MilesPerHour,
    MetersPerSecond,
}

impl WindUnit {
    /// How many of this unit make up one knot.
    pub fn per_knot(self) -> f64 {
        match self {
            WindUnit::Knots => 1.0,
            WindUnit::KilometersPerHour => KMH_PER_KNOT,
            WindUnit::MilesPerHour => MPH_PER_KNOT,
            WindUnit::MetersPerSecond => MS_PER_KNOT,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            WindUnit::Knots => "kt",
            WindUnit::KilometersPerHour => "km/h",
            WindUnit::MilesPerHour => "mph",
            WindUnit::MetersPerSecond => "m/s",
        }
    }
}

impl fmt::Display for WindUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WindUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kt" | "kts" | "knot" | "knots" => Ok(WindUnit::Knots),
            "kmh" | "km/h" | "kph" => Ok(WindUnit::KilometersPerHour),
            "mph" => Ok(WindUnit::MilesPerHour),
            "ms" | "m/s" | "mps" => Ok(WindUnit::MetersPerSecond),
            other => Err(format!("unknown wind unit: {other}")),
        }
    }
}

/// Convert a wind speed between units.
pub fn convert_wind(value: f64, from: WindUnit, to: WindUnit) -> f64 {
    if from == to {
        return value;
    }
    value / from.per_knot() * to.per_knot()
}

/// Parse a coordinate in decimal degrees, accepting an optional hemisphere
/// suffix ("28.0N", "94.8W"). Southern and western values become negative.
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let s = s.trim();
    let (number, sign) = match s.chars().last()? {
        'N' | 'n' | 'E' | 'e' => (&s[..s.len() - 1], 1.0),
        'S' | 's' | 'W' | 'w' => (&s[..s.len() - 1], -1.0),
        _ => (s, 1.0),
    };
    let value: f64 = number.trim().parse().ok()?;
    value.is_finite().then_some(value * sign)
}
