//! Display surfaces for markers, popups and the history table.

use std::io::Write;

use aqi::HistoryTable;

use crate::{MapSurface, Marker};

/// Surface that writes to a terminal (or any writer).
///
/// Popups are written as text, or as the popup markup when `html` is set.
pub struct TerminalSurface<W> {
    out: W,
    html: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, html: bool) -> Self {
        Self { out, html }
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(text).and_then(|_| self.out.flush()) {
            tracing::warn!("could not write to terminal: {e}");
        }
    }
}

impl<W: Write> MapSurface for TerminalSurface<W> {
    fn place_marker(&mut self, marker: &Marker) {
        tracing::info!(
            "marker at ({:.4}, {:.4}), {}",
            marker.lat,
            marker.lon,
            marker.style.fill_color
        );
        if self.html {
            let html = marker.popup.to_html();
            self.emit(format_args!("{html}\n"));
        } else {
            let popup = &marker.popup;
            self.emit(format_args!("{popup}\n"));
        }
    }

    fn set_caption(&mut self, caption: &str) {
        self.emit(format_args!("== {caption} ==\n"));
    }

    fn show_history(&mut self, table: &HistoryTable) {
        if self.html {
            let html = table.to_html();
            self.emit(format_args!("{html}\n"));
        } else {
            self.emit(format_args!("History:\n{table}\n"));
        }
    }

    fn notify(&mut self, message: &str) {
        self.emit(format_args!("! {message}\n"));
    }
}

/// Something shown on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Marker(Marker),
    Caption(String),
    History(HistoryTable),
    Notice(String),
}

/// Surface that remembers everything shown on it, in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub events: Vec<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers placed so far.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.events.iter().filter_map(|e| match e {
            SurfaceEvent::Marker(m) => Some(m),
            _ => None,
        })
    }

    /// The most recently shown history table.
    pub fn last_history(&self) -> Option<&HistoryTable> {
        self.events.iter().rev().find_map(|e| match e {
            SurfaceEvent::History(t) => Some(t),
            _ => None,
        })
    }

    /// Notices shown so far.
    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            SurfaceEvent::Notice(n) => Some(n.as_str()),
            _ => None,
        })
    }
}

impl MapSurface for RecordingSurface {
    fn place_marker(&mut self, marker: &Marker) {
        self.events.push(SurfaceEvent::Marker(marker.clone()));
    }

    fn set_caption(&mut self, caption: &str) {
        self.events.push(SurfaceEvent::Caption(caption.to_owned()));
    }

    fn show_history(&mut self, table: &HistoryTable) {
        self.events.push(SurfaceEvent::History(table.clone()));
    }

    fn notify(&mut self, message: &str) {
        self.events.push(SurfaceEvent::Notice(message.to_owned()));
    }
}
