//! Markup helpers shared by the popup and the history table.

/// Escape text for use in HTML element content and quoted attributes.
pub(crate) fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a number the way the map's script prints it: integers without a
/// fractional part, everything else in shortest form.
pub(crate) fn number(v: f64) -> String {
    format!("{v}")
}
