//! Query history: records sent to the history endpoint and the table of
//! past queries read back from it.

use core::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::html::{escape, number};
use crate::reading::{lenient_number, lenient_text, AirQualityReading};
use crate::NOT_AVAILABLE;

/// Number of columns in the history table.
pub const COLUMNS: usize = 6;

/// Record appended to the history after a successful reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "ciudad")]
    pub city: Option<String>,
    #[serde(serialize_with = "whole_as_integer")]
    pub aqi: Option<f64>,
    #[serde(rename = "estado")]
    pub status: String,
}

/// Whole numbers go out as JSON integers (`42`, not `42.0`), the way the
/// backend's own clients send an AQI.
fn whole_as_integer<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Beyond 2^53 an f64 no longer maps onto an exact integer.
    const EXACT: f64 = 9_007_199_254_740_992.0;
    match *value {
        Some(v) if v.fract() == 0.0 && v.abs() <= EXACT => serializer.serialize_some(&(v as i64)),
        Some(v) => serializer.serialize_some(&v),
        None => serializer.serialize_none(),
    }
}

impl HistoryRecord {
    /// Record for a reading taken at (`lat`, `lon`). An empty place name is
    /// recorded as no place name.
    pub fn new(lat: f64, lon: f64, city: Option<&str>, reading: &AirQualityReading) -> Self {
        Self {
            lat,
            lon,
            city: city.filter(|c| !c.is_empty()).map(str::to_owned),
            aqi: reading.aqi,
            status: reading.status.clone(),
        }
    }
}

/// A past query, as listed by the history endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "fecha_consulta", default, deserialize_with = "lenient_text")]
    pub queried_at: Option<String>,
    #[serde(rename = "ciudad", default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub aqi: Option<f64>,
    #[serde(rename = "estado", default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

/// One row of the history table, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub queried_at: String,
    pub city: String,
    pub aqi: String,
    pub status: String,
    pub lat: String,
    pub lon: String,
}

impl HistoryRow {
    pub fn cells(&self) -> [&str; COLUMNS] {
        [
            self.queried_at.as_str(),
            self.city.as_str(),
            self.aqi.as_str(),
            self.status.as_str(),
            self.lat.as_str(),
            self.lon.as_str(),
        ]
    }
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(e: &HistoryEntry) -> Self {
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_owned());
        let coord = |v: Option<f64>| match v {
            Some(v) if v.is_finite() => format!("{v:.2}"),
            _ => NOT_AVAILABLE.to_owned(),
        };
        Self {
            queried_at: or_na(&e.queried_at),
            city: e
                .city
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "Unknown".to_owned()),
            aqi: e.aqi.map(number).unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            status: or_na(&e.status),
            lat: coord(e.lat),
            lon: coord(e.lon),
        }
    }
}

/// Why the history table has no rows to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    NoRecords,
    LoadFailed,
}

impl Placeholder {
    pub fn text(&self) -> &'static str {
        match self {
            Placeholder::NoRecords => "No records",
            Placeholder::LoadFailed => "Error loading history",
        }
    }
}

/// The history table, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryTable {
    Rows(Vec<HistoryRow>),
    /// A single row spanning all columns.
    Placeholder(Placeholder),
}

/// Format history entries for display, preserving their order.
pub fn format_history(entries: &[HistoryEntry]) -> HistoryTable {
    if entries.is_empty() {
        return HistoryTable::Placeholder(Placeholder::NoRecords);
    }
    HistoryTable::Rows(entries.iter().map(HistoryRow::from).collect())
}

impl HistoryTable {
    /// The table shown when the history couldn't be read.
    pub fn load_failed() -> Self {
        HistoryTable::Placeholder(Placeholder::LoadFailed)
    }

    /// Number of rows displayed, counting a placeholder as one.
    pub fn row_count(&self) -> usize {
        match self {
            HistoryTable::Rows(rows) => rows.len(),
            HistoryTable::Placeholder(_) => 1,
        }
    }

    /// Markup for the table body.
    pub fn to_html(&self) -> String {
        match self {
            HistoryTable::Placeholder(p) => format!(
                r#"<tr><td colspan="{COLUMNS}" style="text-align:center;">{}</td></tr>"#,
                p.text()
            ),
            HistoryTable::Rows(rows) => rows
                .iter()
                .map(|row| {
                    let cells: String = row
                        .cells()
                        .iter()
                        .map(|c| format!("<td>{}</td>", escape(c)))
                        .collect();
                    format!("<tr>{cells}</tr>")
                })
                .collect(),
        }
    }
}

impl fmt::Display for HistoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryTable::Placeholder(p) => write!(f, "{}", p.text()),
            HistoryTable::Rows(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", row.cells().join(" | "))?;
                }
                Ok(())
            }
        }
    }
}
