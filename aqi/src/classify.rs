//! AQI categories and the colors and illustrations that go with them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative category of an AQI value.
///
/// Ordered from best to worst; `Unknown` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Unknown,
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    Hazardous,
}

impl Category {
    /// Human-readable name of the category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Unknown => "Unknown",
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::Hazardous => "Very Unhealthy/Hazardous",
        }
    }

    /// Display color of the category.
    pub fn color(&self) -> Color {
        match self {
            Category::Unknown => Color::Gray,
            Category::Good => Color::Green,
            Category::Moderate => Color::Yellow,
            Category::UnhealthyForSensitiveGroups => Color::Orange,
            Category::Unhealthy => Color::Red,
            Category::Hazardous => Color::Purple,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A display color, as understood by CSS and the map library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Gray,
    Green,
    Yellow,
    Orange,
    Red,
    Purple,
}

impl Color {
    /// CSS color name.
    pub fn as_css(&self) -> &'static str {
        match self {
            Color::Gray => "gray",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Red => "red",
            Color::Purple => "purple",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css())
    }
}

/// Upper edge of the shared "unhealthy for sensitive groups" band.
pub(crate) const SENSITIVE_CEILING: f64 = 150.0;
/// Upper edge of the shared "unhealthy" band.
pub(crate) const UNHEALTHY_CEILING: f64 = 200.0;

/// Place `aqi` in a band, given the ceilings of the green and yellow bands.
///
/// Every ceiling is inclusive. NaN has no band and maps to `Unknown`.
pub(crate) fn band(aqi: f64, green: f64, yellow: f64) -> Category {
    if aqi.is_nan() {
        Category::Unknown
    } else if aqi <= green {
        Category::Good
    } else if aqi <= yellow {
        Category::Moderate
    } else if aqi <= SENSITIVE_CEILING {
        Category::UnhealthyForSensitiveGroups
    } else if aqi <= UNHEALTHY_CEILING {
        Category::Unhealthy
    } else {
        Category::Hazardous
    }
}

/// Illustrations shown at the top of the popup, one per category.
///
/// Each is a URL to a static image; defaults point at public animated GIFs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Illustrations {
    pub unknown: String,
    pub good: String,
    pub moderate: String,
    pub unhealthy_for_sensitive_groups: String,
    pub unhealthy: String,
    pub hazardous: String,
}

impl Default for Illustrations {
    fn default() -> Self {
        Self {
            unknown: "https://media3.giphy.com/media/v1.Y2lkPTc5MGI3NjExamk1c2xqejgzbWM2c24wenY2NGdvbXV0ZXlwNHhiOHBoem95MGgzNyZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/KKOMG9EB7VqBq/giphy.gif".to_owned(),
            good: "https://media.giphy.com/media/l0MYt5jPR6QX5pnqM/giphy.gif".to_owned(),
            moderate: "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExbzI2NjczNTJpZDNvNzAwaDF5d3dhdDg2YzZrZ3ZpNGx2eXJnOXZsZCZlcD12MV9naWZzX3NlYXJjaCZjdD1n/2tQXyCg8c94YsXbCxz/giphy.gif".to_owned(),
            unhealthy_for_sensitive_groups: "https://media0.giphy.com/media/v1.Y2lkPTc5MGI3NjExM2thZHNwMGNkMWxieXd0ejQ3Z2lpcWVham15ZHltb3YzMWF2YjIzcyZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/UxDUE92tNDyWQ/giphy.gif".to_owned(),
            unhealthy: "https://media0.giphy.com/media/v1.Y2lkPTc5MGI3NjExMXI4Y2xsYTlsMjRpbnBqZjV2dnJjNGJhY3p3YW1jdGl4b3BwZm9qdiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/rXqENnCtc1UgE/giphy.gif".to_owned(),
            hazardous: "https://media4.giphy.com/media/v1.Y2lkPTc5MGI3NjExc3M3YXVjY2p2cHRwZ3A1ZXdic2pyM253bzR6ajZ5YTIzcHRxNmY2biZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/uBFEvFM8kk69lZBntm/giphy.gif".to_owned(),
        }
    }
}

impl Illustrations {
    /// The illustration for a category.
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Unknown => &self.unknown,
            Category::Good => &self.good,
            Category::Moderate => &self.moderate,
            Category::UnhealthyForSensitiveGroups => &self.unhealthy_for_sensitive_groups,
            Category::Unhealthy => &self.unhealthy,
            Category::Hazardous => &self.hazardous,
        }
    }
}

/// Result of classifying an AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub category: Category,
    pub color: Color,
    pub illustration: &'a str,
}

/// Category of an optional AQI value on the general scale.
pub fn category(aqi: Option<f64>) -> Category {
    match aqi {
        Some(v) => band(v, 50.0, 100.0),
        None => Category::Unknown,
    }
}

/// Classify an AQI value on the general five-band scale.
///
/// A missing value is `Unknown`.
pub fn classify(aqi: Option<f64>, illustrations: &Illustrations) -> Classification<'_> {
    let category = category(aqi);
    Classification {
        category,
        color: category.color(),
        illustration: illustrations.for_category(category),
    }
}
