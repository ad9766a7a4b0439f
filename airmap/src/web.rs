//! Browser bindings.
//!
//! The page's script owns the map and the network calls; it hands the JSON
//! it gets from the backend to these functions and inserts the markup they
//! return. Logging goes to the browser console.

use aqi::{format_history, location_caption, HistoryEntry, HistoryTable, MarkerStyle};
use log::MakeConsoleWriter;
use wasm_bindgen::prelude::*;

use crate::MarkerFlow;

#[wasm_bindgen(start)]
fn start() {
    tracing_subscriber::fmt::fmt()
        .with_writer(MakeConsoleWriter)
        .without_time()
        .with_ansi(false)
        .init();

    tracing::info!("air-quality map bindings loaded");
}

/// Popup markup for a reading endpoint response (JSON text).
#[wasm_bindgen(js_name = renderPopup)]
pub fn render_popup(reading_json: &str) -> Result<String, JsError> {
    let reading: aqi::AirQualityReading = serde_json::from_str(reading_json).map_err(|e| {
        tracing::error!("undecodable reading: {e}");
        JsError::new(&format!("undecodable reading: {e}"))
    })?;
    Ok(MarkerFlow::default().renderer().render(&reading).to_html())
}

/// Fill color of the marker for an AQI value.
#[wasm_bindgen(js_name = markerColor)]
pub fn marker_color(aqi: Option<f64>) -> String {
    MarkerStyle::for_aqi(aqi).fill_color.as_css().to_owned()
}

/// Caption for the queried location.
#[wasm_bindgen(js_name = locationCaption)]
pub fn caption(lat: f64, lon: f64, place: Option<String>) -> String {
    location_caption(lat, lon, place.as_deref())
}

/// History table body markup for a history endpoint response (JSON text).
///
/// A response that isn't an array of records renders the error row.
#[wasm_bindgen(js_name = historyRows)]
pub fn history_rows(history_json: &str) -> String {
    let table = match serde_json::from_str::<serde_json::Value>(history_json) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(serde_json::from_value::<HistoryEntry>)
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| format_history(&entries))
            .unwrap_or_else(|e| {
                tracing::warn!("undecodable history entry: {e}");
                HistoryTable::load_failed()
            }),
        Ok(_) => format_history(&[]),
        Err(e) => {
            tracing::warn!("undecodable history: {e}");
            HistoryTable::load_failed()
        }
    };
    table.to_html()
}

mod log {
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Makes a writer to the web_sys console.
    pub struct MakeConsoleWriter;

    impl MakeWriter<'_> for MakeConsoleWriter {
        type Writer = MakeConsoleWriter;

        fn make_writer(&'_ self) -> Self::Writer {
            MakeConsoleWriter
        }
    }

    impl std::io::Write for MakeConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let line = core::str::from_utf8(buf)
                .map(|s| JsValue::from_str(s.trim_end()))
                .unwrap_or_else(|_| JsValue::from_str(&format!("non-string log message: {buf:?}")));
            web_sys::console::log_1(&line);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
