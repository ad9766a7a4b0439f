//! Presentation logic for air-quality readings.
//!
//! Turns a reading from the air-quality backend into what a map shows:
//! a marker color, a popup with the AQI category, per-age-group risk,
//! pollutant concentrations in µg/m³ and ppm, and a history table.
//!
//! Nothing in this crate performs I/O; every function is a pure mapping
//! from data to display content, so it can be driven from a browser,
//! a terminal, or a test.

pub mod classify;
pub mod history;
mod html;
pub mod popup;
pub mod reading;
pub mod risk;
pub mod units;

pub use classify::{classify, Category, Classification, Color, Illustrations};
pub use history::{format_history, HistoryEntry, HistoryRecord, HistoryRow, HistoryTable};
pub use popup::{location_caption, render_popup, DisplayZone, MarkerStyle, Popup, PopupRenderer, RenderSettings};
pub use reading::{AirQualityReading, LastUpdated, Pollutant};
pub use risk::{evaluate_risk, evaluate_risk_for_label, AgeGroup, Risk};
pub use units::{to_ppm, MolarMasses};

/// Placeholder shown wherever a value is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// An error in evaluating presentation logic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An argument was outside the domain of the operation,
    /// e.g. an age-group label that names none of the known groups.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
