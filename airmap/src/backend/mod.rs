//! Access to the air-quality backend.
//!
//! The backend exposes three endpoints:
//!
//! - `GET /api/waqi?lat=<lat>&lon=<lon>` returns the reading for a location;
//! - `POST /api/historial` appends a record to the query history;
//! - `GET /api/historial` lists the query history.
//!
//! [`Backend`] abstracts over them, so the marker flow can run against the
//! real service ([`HttpBackend`]) or canned data ([`FakeBackend`]).

use std::sync::Mutex;

use aqi::{AirQualityReading, HistoryEntry, HistoryRecord};
use chrono::Utc;

#[cfg(not(target_arch = "wasm32"))]
mod http;
#[cfg(not(target_arch = "wasm32"))]
pub use http::{HttpBackend, HttpSettings};

/// Path of the reading endpoint.
pub const READING_PATH: &str = "/api/waqi";
/// Path of the history endpoints.
pub const HISTORY_PATH: &str = "/api/historial";

/// A failed call to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("could not decode response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

/// A type that can serve readings and keep the query history.
pub trait Backend {
    /// Get the current reading for a location.
    fn fetch_reading(&self, lat: f64, lon: f64) -> Result<AirQualityReading, BackendError>;

    /// Append a record to the query history.
    fn append_history(&self, record: &HistoryRecord) -> Result<(), BackendError>;

    /// List the query history.
    fn list_history(&self) -> Result<Vec<HistoryEntry>, BackendError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn fetch_reading(&self, lat: f64, lon: f64) -> Result<AirQualityReading, BackendError> {
        (**self).fetch_reading(lat, lon)
    }

    fn append_history(&self, record: &HistoryRecord) -> Result<(), BackendError> {
        (**self).append_history(record)
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>, BackendError> {
        (**self).list_history()
    }
}

/// Fake backend: serves the same reading for every location and keeps the
/// history in memory.
#[derive(Debug, Default)]
pub struct FakeBackend {
    reading: Option<AirQualityReading>,
    history: Mutex<Vec<HistoryEntry>>,
    fail_history_writes: bool,
    fail_history_reads: bool,
}

impl FakeBackend {
    /// A backend that answers every location with `reading`.
    pub fn new(reading: AirQualityReading) -> Self {
        Self {
            reading: Some(reading),
            ..Default::default()
        }
    }

    /// A backend with no station data: every reading request gets a 404.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Start with `entries` already in the history.
    pub fn with_history(self, entries: Vec<HistoryEntry>) -> Self {
        Self {
            history: Mutex::new(entries),
            ..self
        }
    }

    /// Reject every history append with a server error.
    pub fn failing_history_writes(self) -> Self {
        Self {
            fail_history_writes: true,
            ..self
        }
    }

    /// Reject every history listing with a server error.
    pub fn failing_history_reads(self) -> Self {
        Self {
            fail_history_reads: true,
            ..self
        }
    }

    /// Snapshot of the history as stored.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Backend for FakeBackend {
    fn fetch_reading(&self, lat: f64, lon: f64) -> Result<AirQualityReading, BackendError> {
        tracing::debug!("fake reading for ({lat}, {lon})");
        self.reading.clone().ok_or(BackendError::Status {
            endpoint: READING_PATH,
            status: 404,
        })
    }

    fn append_history(&self, record: &HistoryRecord) -> Result<(), BackendError> {
        if self.fail_history_writes {
            return Err(BackendError::Status {
                endpoint: HISTORY_PATH,
                status: 500,
            });
        }
        let entry = HistoryEntry {
            queried_at: Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            city: record.city.clone(),
            lat: Some(record.lat),
            lon: Some(record.lon),
            aqi: record.aqi,
            status: Some(record.status.clone()),
        };
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
        Ok(())
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>, BackendError> {
        if self.fail_history_reads {
            return Err(BackendError::Status {
                endpoint: HISTORY_PATH,
                status: 500,
            });
        }
        Ok(self.history())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_backend_reports_not_found() {
        let err = FakeBackend::unavailable().fetch_reading(1.0, 2.0).unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                endpoint: READING_PATH,
                status: 404
            }
        );
        assert_eq!(err.to_string(), "/api/waqi returned HTTP 404");
    }

    #[test]
    fn appended_records_are_listed() {
        let backend = FakeBackend::new(AirQualityReading::default());
        let reading = backend.fetch_reading(19.4, -99.1).unwrap();
        backend
            .append_history(&HistoryRecord::new(19.4, -99.1, Some("CDMX"), &reading))
            .unwrap();
        let history = backend.list_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].city.as_deref(), Some("CDMX"));
        assert_eq!(history[0].lat, Some(19.4));
        assert_eq!(history[0].status.as_deref(), Some("N/A"));
        assert!(history[0].queried_at.is_some());
    }

    #[test]
    fn history_failures_are_configurable() {
        let backend = FakeBackend::unavailable()
            .failing_history_writes()
            .failing_history_reads();
        let record = HistoryRecord::new(0.0, 0.0, None, &AirQualityReading::default());
        assert!(backend.append_history(&record).is_err());
        assert!(backend.list_history().is_err());
    }
}
