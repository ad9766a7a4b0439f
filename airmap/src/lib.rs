//! An air-quality map.
//!
//! Click a location (or search for one) and get a marker colored by its Air
//! Quality Index, with a popup listing the AQI category, risk per age group,
//! and pollutant concentrations. Every query is appended to a history that
//! is shown alongside the map.
//!
//! The map itself is a [`MapSurface`]; readings and history come from a
//! [`backend::Backend`]. [`MarkerFlow`] ties the two together with the
//! presentation logic from the [`aqi`] crate.

pub mod backend;
pub mod context;
pub mod surface;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

use aqi::{
    format_history, location_caption, HistoryRecord, HistoryTable, MarkerStyle, Popup,
    PopupRenderer, RenderSettings,
};
use backend::{Backend, BackendError};

/// A marker placed on the map, with its popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub style: MarkerStyle,
    pub popup: Popup,
}

/// A MapSurface is where the map's output goes.
/// In a browser, this is the map library and the page around it.
pub trait MapSurface {
    /// Place a marker and open its popup.
    fn place_marker(&mut self, marker: &Marker);

    /// Set the caption naming the current location.
    fn set_caption(&mut self, caption: &str);

    /// Replace the history table.
    fn show_history(&mut self, table: &HistoryTable);

    /// Tell the user something went wrong.
    fn notify(&mut self, message: &str);
}

/// A location to query: where the user clicked, or a search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub lat: f64,
    pub lon: f64,
    /// Place name from the geocoder, if any.
    pub place: Option<String>,
}

impl Query {
    pub fn new(lat: f64, lon: f64, place: Option<String>) -> Self {
        Self { lat, lon, place }
    }
}

/// An error in the marker flow.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    /// The reading couldn't be fetched; no marker was placed.
    #[error("could not get air quality for ({lat}, {lon}): {source}")]
    Network {
        lat: f64,
        lon: f64,
        #[source]
        source: BackendError,
    },
    /// The history couldn't be written or read; the marker is unaffected.
    #[error("history unavailable: {0}")]
    HistoryWrite(#[source] BackendError),
}

/// Outcome of a successful marker flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub marker: Marker,
    pub caption: String,
    /// Non-fatal history failures, in the order they happened.
    pub history_errors: Vec<FlowError>,
}

/// Notice shown to the user when a reading can't be fetched.
pub const READING_FAILED_NOTICE: &str =
    "Could not get air-quality data for the selected location. See the log for details.";

/// The marker-creation flow: fetch a reading, show it, record it.
#[derive(Debug, Clone, Default)]
pub struct MarkerFlow {
    renderer: PopupRenderer,
}

impl From<RenderSettings> for MarkerFlow {
    fn from(settings: RenderSettings) -> Self {
        Self {
            renderer: settings.into(),
        }
    }
}

impl MarkerFlow {
    pub fn renderer(&self) -> &PopupRenderer {
        &self.renderer
    }

    /// Query `backend` for the reading at `query` and put it on `surface`.
    ///
    /// A failed reading aborts the flow: the user is notified and nothing
    /// else is shown. History failures after the marker is placed are
    /// logged and returned in the [`Placement`], not raised.
    pub fn create_marker<B, S>(
        &self,
        backend: &B,
        surface: &mut S,
        query: &Query,
    ) -> Result<Placement, FlowError>
    where
        B: Backend + ?Sized,
        S: MapSurface + ?Sized,
    {
        let Query { lat, lon, .. } = *query;
        let place = query.place.as_deref();
        tracing::info!("querying air quality at ({lat}, {lon})");

        let reading = match backend.fetch_reading(lat, lon) {
            Ok(r) => r,
            Err(source) => {
                let err = FlowError::Network {
                    lat,
                    lon,
                    source,
                };
                tracing::error!("{err}");
                surface.notify(READING_FAILED_NOTICE);
                return Err(err);
            }
        };

        let marker = Marker {
            lat,
            lon,
            style: MarkerStyle::for_aqi(reading.aqi),
            popup: self.renderer.render(&reading),
        };
        surface.place_marker(&marker);

        let caption = location_caption(lat, lon, place);
        surface.set_caption(&caption);

        let mut history_errors = Vec::new();
        let record = HistoryRecord::new(lat, lon, place, &reading);
        if let Err(e) = backend.append_history(&record) {
            let err = FlowError::HistoryWrite(e);
            tracing::warn!("could not save history: {err}");
            history_errors.push(err);
        }
        if let Err(err) = self.refresh_history(backend, surface) {
            history_errors.push(err);
        }

        Ok(Placement {
            marker,
            caption,
            history_errors,
        })
    }

    /// Read the history from `backend` and show it on `surface`.
    ///
    /// If the history can't be read, an error row is shown instead.
    pub fn refresh_history<B, S>(&self, backend: &B, surface: &mut S) -> Result<(), FlowError>
    where
        B: Backend + ?Sized,
        S: MapSurface + ?Sized,
    {
        match backend.list_history() {
            Ok(entries) => {
                tracing::debug!("showing {} history entries", entries.len());
                surface.show_history(&format_history(&entries));
                Ok(())
            }
            Err(e) => {
                let err = FlowError::HistoryWrite(e);
                tracing::warn!("could not show history: {err}");
                surface.show_history(&HistoryTable::load_failed());
                Err(err)
            }
        }
    }
}
