//! Composition of a reading into the content of a map popup.
//!
//! [`PopupRenderer::render`] produces a [`Popup`]: plain data that tests can
//! inspect field by field. [`Popup::to_html`] turns it into the markup the
//! map library binds to a marker; its `Display` impl gives a text form.

use core::fmt;

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, Category, Color, Illustrations};
use crate::html::{escape, number};
use crate::reading::{AirQualityReading, LastUpdated};
use crate::risk::{evaluate_risk, AgeGroup, Risk};
use crate::units::MolarMasses;
use crate::NOT_AVAILABLE;

/// Title at the top of every popup.
pub const TITLE: &str = "Air Quality";

/// Time zone in which last-updated times are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The zone of the machine doing the rendering.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

// Day and month unpadded, the way es-MX locales print dates.
const TIME_FORMAT: &str = "%-d/%-m/%Y, %-H:%M:%S";

impl DisplayZone {
    fn format(&self, t: &DateTime<Utc>) -> String {
        match self {
            DisplayZone::Local => t.with_timezone(&Local).format(TIME_FORMAT).to_string(),
            DisplayZone::Fixed(offset) => t.with_timezone(offset).format(TIME_FORMAT).to_string(),
        }
    }
}

/// Settings for rendering popups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub illustrations: Illustrations,
    pub molar_masses: MolarMasses,
    #[serde(skip)]
    pub zone: DisplayZone,
}

/// Renders readings into popups.
#[derive(Debug, Clone, Default)]
pub struct PopupRenderer {
    settings: RenderSettings,
}

impl From<RenderSettings> for PopupRenderer {
    fn from(settings: RenderSettings) -> Self {
        Self { settings }
    }
}

/// Headline of the popup: the AQI and what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    /// The AQI value, or "N/A".
    pub aqi: String,
    /// Status text reported by the backend.
    pub status: String,
    pub category: Category,
    pub color: Color,
}

/// Risk of the reading for one age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskLine {
    pub group: AgeGroup,
    pub risk: Risk,
}

/// One row of the pollutant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollutantRow {
    pub code: String,
    /// Raw concentration in µg/m³, or "N/A".
    pub concentration: String,
    /// Concentration in ppm, "N/A", or "—" when not convertible.
    pub ppm: String,
}

/// Content of a marker's popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub illustration: String,
    pub headline: Headline,
    /// One line per age group, always in [`AgeGroup::ALL`] order.
    pub risks: Vec<RiskLine>,
    pub pollutants: Vec<PollutantRow>,
    /// Formatted last-updated time, or "N/A".
    pub last_updated: String,
}

impl PopupRenderer {
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Compose the popup for a reading.
    pub fn render(&self, reading: &AirQualityReading) -> Popup {
        let class = classify(reading.aqi, &self.settings.illustrations);

        let risks = AgeGroup::ALL
            .iter()
            .map(|&group| RiskLine {
                group,
                risk: match reading.aqi {
                    Some(aqi) => evaluate_risk(aqi, group),
                    None => Risk::UNKNOWN,
                },
            })
            .collect();

        let pollutants = reading
            .pollutants
            .iter()
            .map(|p| PollutantRow {
                code: p.code.clone(),
                concentration: p.value.map(number).unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
                ppm: self.settings.molar_masses.ppm_cell(&p.code, p.value),
            })
            .collect();

        Popup {
            title: TITLE.to_owned(),
            illustration: class.illustration.to_owned(),
            headline: Headline {
                aqi: reading.aqi.map(number).unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
                status: reading.status.clone(),
                category: class.category,
                color: class.color,
            },
            risks,
            pollutants,
            last_updated: self.format_last_updated(reading.last_updated.as_ref()),
        }
    }

    /// Format a last-updated time in the configured zone.
    pub fn format_last_updated(&self, t: Option<&LastUpdated>) -> String {
        match t {
            Some(LastUpdated::At(t)) => self.settings.zone.format(t),
            // Already a clock time at the station; no zone to convert from.
            Some(LastUpdated::Naive(t)) => t.format(TIME_FORMAT).to_string(),
            Some(LastUpdated::Raw(s)) => s.clone(),
            None => NOT_AVAILABLE.to_owned(),
        }
    }
}

/// Render a popup with default settings.
pub fn render_popup(reading: &AirQualityReading) -> Popup {
    PopupRenderer::default().render(reading)
}

impl Popup {
    /// Markup for the map library's popup.
    pub fn to_html(&self) -> String {
        let risks: String = self
            .risks
            .iter()
            .map(|line| {
                format!(
                    r#"<div style="margin:2px 0;"><b>{group}:</b> <span style="color:{color}; font-weight:bold;">{category}</span></div>"#,
                    group = line.group,
                    color = line.risk.color,
                    category = line.risk.category,
                )
            })
            .collect();

        let cell = r#"style="border:1px solid #ccc; padding:4px;""#;
        let num_cell = r#"style="border:1px solid #ccc; padding:4px; text-align:right;""#;
        let rows: String = self
            .pollutants
            .iter()
            .map(|row| {
                format!(
                    "<tr><td {cell}>{code}</td><td {num_cell}>{conc}</td><td {num_cell}>{ppm}</td></tr>",
                    code = escape(&row.code),
                    conc = escape(&row.concentration),
                    ppm = escape(&row.ppm),
                )
            })
            .collect();

        format!(
            r#"<div style="text-align:center; max-width:260px;"><h3 style="margin:5px 0;">{title}</h3><img src="{img}" alt="{category}" style="width:100%; border-radius:10px; margin-bottom:5px;"><div><b>AQI:</b> <span style="color:{color};">{aqi}</span> ({status})</div><div style="color:{color}; font-weight:bold;">{category}</div><div style="margin:6px 0; font-size:0.9em; text-align:left;">{risks}</div><table style="width:100%; border-collapse:collapse; margin-top:8px;"><tr><th>Pollutant</th><th>µg/m³</th><th>ppm</th></tr>{rows}</table><div style="margin-top:5px; font-size:0.7em; color:#555;">Last updated:<br>{updated}</div></div>"#,
            title = escape(&self.title),
            img = escape(&self.illustration),
            category = self.headline.category,
            color = self.headline.color,
            aqi = escape(&self.headline.aqi),
            status = escape(&self.headline.status),
            updated = escape(&self.last_updated),
        )
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "AQI: {} ({}) - {}",
            self.headline.aqi, self.headline.status, self.headline.category
        )?;
        for line in &self.risks {
            writeln!(f, "  {}: {}", line.group, line.risk.category)?;
        }
        if !self.pollutants.is_empty() {
            writeln!(f, "  {:<10} {:>10} {:>10}", "Pollutant", "µg/m³", "ppm")?;
        }
        for row in &self.pollutants {
            writeln!(f, "  {:<10} {:>10} {:>10}", row.code, row.concentration, row.ppm)?;
        }
        write!(f, "Last updated: {}", self.last_updated)
    }
}

/// How a reading's marker is drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: u32,
    pub fill_color: Color,
    pub outline: &'static str,
    pub weight: u32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

impl MarkerStyle {
    /// Circle marker filled with the color of the AQI's category.
    pub fn for_aqi(aqi: Option<f64>) -> Self {
        Self {
            radius: 10,
            fill_color: crate::classify::category(aqi).color(),
            outline: "#000",
            weight: 2,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// Caption naming the queried location: the place name if there is one,
/// else the coordinates.
pub fn location_caption(lat: f64, lon: f64, place: Option<&str>) -> String {
    match place.filter(|p| !p.is_empty()) {
        Some(p) => p.to_owned(),
        None => format!("Lat: {lat:.2}, Lon: {lon:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::reading::Pollutant;

    fn utc_renderer() -> PopupRenderer {
        RenderSettings {
            zone: DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()),
            ..Default::default()
        }
        .into()
    }

    fn reading() -> AirQualityReading {
        AirQualityReading {
            aqi: Some(75.0),
            status: "Regular".to_owned(),
            pollutants: vec![
                Pollutant::new("CO", Some(400.0)),
                Pollutant::new("NO2", Some(50.0)),
            ],
            last_updated: Some(LastUpdated::At(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            )),
        }
    }

    #[test]
    fn renders_moderate_reading() {
        let popup = utc_renderer().render(&reading());
        assert_eq!(popup.title, "Air Quality");
        assert_eq!(popup.illustration, Illustrations::default().moderate);
        assert_eq!(
            popup.headline,
            Headline {
                aqi: "75".to_owned(),
                status: "Regular".to_owned(),
                category: Category::Moderate,
                color: Color::Yellow,
            }
        );
        assert_eq!(
            popup.pollutants,
            vec![
                PollutantRow {
                    code: "CO".to_owned(),
                    concentration: "400".to_owned(),
                    ppm: "349.161".to_owned(),
                },
                PollutantRow {
                    code: "NO2".to_owned(),
                    concentration: "50".to_owned(),
                    ppm: "26.570".to_owned(),
                },
            ]
        );
        assert_eq!(popup.last_updated, "1/1/2024, 12:00:00");
    }

    #[test]
    fn risk_lines_are_in_fixed_order() {
        let popup = utc_renderer().render(&reading());
        let groups: Vec<_> = popup.risks.iter().map(|l| l.group).collect();
        assert_eq!(groups, AgeGroup::ALL);
        let categories: Vec<_> = popup.risks.iter().map(|l| l.risk.category).collect();
        assert_eq!(
            categories,
            [
                Category::UnhealthyForSensitiveGroups,
                Category::Moderate,
                Category::Moderate,
                Category::UnhealthyForSensitiveGroups,
            ]
        );
    }

    #[test]
    fn empty_pollutants_still_render_everything_else() {
        let r = AirQualityReading {
            pollutants: vec![],
            ..reading()
        };
        let popup = utc_renderer().render(&r);
        assert!(popup.pollutants.is_empty());
        assert_eq!(popup.headline.category, Category::Moderate);
        assert_eq!(popup.risks.len(), 4);
        assert_eq!(popup.last_updated, "1/1/2024, 12:00:00");

        let html = popup.to_html();
        assert!(html.contains("<tr><th>Pollutant</th><th>µg/m³</th><th>ppm</th></tr></table>"));
        assert!(html.contains("1/1/2024, 12:00:00"));
    }

    #[test]
    fn missing_aqi_renders_unknown() {
        let popup = utc_renderer().render(&AirQualityReading::default());
        assert_eq!(popup.headline.aqi, "N/A");
        assert_eq!(popup.headline.color, Color::Gray);
        assert_eq!(popup.illustration, Illustrations::default().unknown);
        assert!(popup.risks.iter().all(|l| l.risk == Risk::UNKNOWN));
        assert_eq!(popup.last_updated, "N/A");
    }

    #[test]
    fn missing_and_unconvertible_pollutants() {
        let r = AirQualityReading {
            pollutants: vec![
                Pollutant::new("PM25", Some(12.0)),
                Pollutant::new("O3", None),
            ],
            ..reading()
        };
        let popup = utc_renderer().render(&r);
        assert_eq!(popup.pollutants[0].concentration, "12");
        assert_eq!(popup.pollutants[0].ppm, "—");
        assert_eq!(popup.pollutants[1].concentration, "N/A");
        assert_eq!(popup.pollutants[1].ppm, "N/A");
    }

    #[test]
    fn timestamps_follow_display_zone() {
        let renderer: PopupRenderer = RenderSettings {
            zone: DisplayZone::Fixed(FixedOffset::west_opt(6 * 3600).unwrap()),
            ..Default::default()
        }
        .into();
        let popup = renderer.render(&reading());
        assert_eq!(popup.last_updated, "1/1/2024, 6:00:00");

        let raw = AirQualityReading {
            last_updated: Some(LastUpdated::Raw("soon".to_owned())),
            ..reading()
        };
        assert_eq!(renderer.render(&raw).last_updated, "soon");
    }

    #[test]
    fn station_clock_times_are_not_shifted() {
        let renderer: PopupRenderer = RenderSettings {
            zone: DisplayZone::Fixed(FixedOffset::west_opt(6 * 3600).unwrap()),
            ..Default::default()
        }
        .into();
        let r: AirQualityReading = serde_json::from_str(
            r#"{"aqi": 75, "ultima_actualizacion": "2024-01-01 12:00:00"}"#,
        )
        .unwrap();
        assert_eq!(renderer.render(&r).last_updated, "1/1/2024, 12:00:00");
        assert_eq!(utc_renderer().render(&r).last_updated, "1/1/2024, 12:00:00");
    }

    #[test]
    fn html_headline_names_the_category() {
        let html = utc_renderer().render(&reading()).to_html();
        assert!(html.contains(
            r#"<div style="color:yellow; font-weight:bold;">Moderate</div>"#
        ), "{html}");

        let unknown = utc_renderer().render(&AirQualityReading::default()).to_html();
        assert!(unknown.contains(">Unknown</div>"), "{unknown}");
    }

    #[test]
    fn html_escapes_backend_text() {
        let r = AirQualityReading {
            status: "<script>".to_owned(),
            pollutants: vec![Pollutant::new("A&B", Some(1.0))],
            ..reading()
        };
        let html = utc_renderer().render(&r).to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("(&lt;script&gt;)"));
        assert!(html.contains(">A&amp;B</td>"));
    }

    #[test]
    fn html_lists_every_group() {
        let html = utc_renderer().render(&reading()).to_html();
        for group in AgeGroup::ALL {
            assert!(html.contains(&format!("<b>{group}:</b>")), "{group}");
        }
        assert!(html.contains("<td style=\"border:1px solid #ccc; padding:4px; text-align:right;\">349.161</td>"));
    }

    #[test]
    fn text_form_has_one_line_per_section() {
        let text = utc_renderer().render(&reading()).to_string();
        assert!(text.starts_with("Air Quality\nAQI: 75 (Regular) - Moderate\n"));
        assert!(text.contains("  Older Adults: Unhealthy for Sensitive Groups\n"));
        assert!(text.ends_with("Last updated: 1/1/2024, 12:00:00"));
    }

    #[test]
    fn marker_style_and_caption() {
        let style = MarkerStyle::for_aqi(Some(180.0));
        assert_eq!(style.fill_color, Color::Red);
        assert_eq!(style.radius, 10);
        assert_eq!(MarkerStyle::for_aqi(None).fill_color, Color::Gray);

        assert_eq!(location_caption(19.4326, -99.1332, None), "Lat: 19.43, Lon: -99.13");
        assert_eq!(location_caption(19.4326, -99.1332, Some("")), "Lat: 19.43, Lon: -99.13");
        assert_eq!(
            location_caption(19.4326, -99.1332, Some("Mexico City")),
            "Mexico City"
        );
    }
}
