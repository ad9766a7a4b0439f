//! Air-quality readings as returned by the reading endpoint.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::NOT_AVAILABLE;

/// A single air-quality reading for one location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireReading")]
pub struct AirQualityReading {
    /// Air Quality Index, if the station reported one.
    pub aqi: Option<f64>,

    /// Status text from the backend, e.g. "Regular".
    pub status: String,

    /// Pollutant concentrations in µg/m³, in the order the backend sent them.
    pub pollutants: Vec<Pollutant>,

    /// When the station last updated the reading.
    pub last_updated: Option<LastUpdated>,
}

impl Default for AirQualityReading {
    fn default() -> Self {
        Self {
            aqi: None,
            status: NOT_AVAILABLE.to_owned(),
            pollutants: Vec::new(),
            last_updated: None,
        }
    }
}

/// Concentration of one pollutant.
#[derive(Debug, Clone, PartialEq)]
pub struct Pollutant {
    /// Pollutant code, e.g. "CO" or "PM25".
    pub code: String,
    /// Mass concentration in µg/m³.
    pub value: Option<f64>,
}

impl Pollutant {
    pub fn new(code: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            code: code.into(),
            value,
        }
    }
}

/// Last-updated time of a reading.
///
/// Stations report times in a few shapes; anything that doesn't parse is
/// kept as text so it can still be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastUpdated {
    /// An instant, from a timestamp that carried its offset.
    At(DateTime<Utc>),
    /// A station-local clock time with no zone; shown as-is.
    Naive(NaiveDateTime),
    Raw(String),
}

impl LastUpdated {
    /// Parse an RFC 3339 timestamp or a zoneless `YYYY-MM-DD HH:MM:SS`
    /// station clock time. Empty input means "no timestamp".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Some(LastUpdated::At(t.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
                return Some(LastUpdated::Naive(t));
            }
        }
        Some(LastUpdated::Raw(s.to_owned()))
    }
}

/// Reading as it appears on the wire.
#[derive(Deserialize)]
struct WireReading {
    #[serde(default, deserialize_with = "lenient_number")]
    aqi: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    estado: Option<String>,
    #[serde(default)]
    contaminantes: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_text")]
    ultima_actualizacion: Option<String>,
}

impl From<WireReading> for AirQualityReading {
    fn from(w: WireReading) -> Self {
        let pollutants = w
            .contaminantes
            .unwrap_or_default()
            .into_iter()
            .map(|(code, value)| Pollutant {
                code,
                value: number_from_value(&value),
            })
            .collect();
        Self {
            aqi: w.aqi,
            status: w
                .estado
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            pollutants,
            last_updated: w
                .ultima_actualizacion
                .as_deref()
                .and_then(LastUpdated::parse),
        }
    }
}

/// Interpret a JSON value as a number: numbers and numeric strings are
/// accepted, anything else (including `"N/A"`) is missing.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Interpret a JSON value as text: strings as-is, numbers and booleans
/// in their JSON form, anything else missing.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}
