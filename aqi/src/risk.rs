//! Risk of a given AQI for each age group.
//!
//! Younger and older people cross into "moderate" and "unhealthy for
//! sensitive groups" sooner than adults do; above 150 all groups share the
//! general scale.

use core::fmt;
use core::str::FromStr;

use crate::classify::{band, Category, Color};
use crate::Error;

/// An age group with its own risk thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeGroup {
    Children,
    Teens,
    Adults,
    OlderAdults,
}

/// Inclusive ceilings of the green and yellow bands for one age group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub green: f64,
    pub yellow: f64,
}

impl AgeGroup {
    /// All groups, in the order the popup lists them.
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Children,
        AgeGroup::Teens,
        AgeGroup::Adults,
        AgeGroup::OlderAdults,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Children => "Children",
            AgeGroup::Teens => "Teens",
            AgeGroup::Adults => "Adults",
            AgeGroup::OlderAdults => "Older Adults",
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        match self {
            AgeGroup::Children | AgeGroup::OlderAdults => Thresholds {
                green: 40.0,
                yellow: 70.0,
            },
            AgeGroup::Teens => Thresholds {
                green: 50.0,
                yellow: 100.0,
            },
            AgeGroup::Adults => Thresholds {
                green: 60.0,
                yellow: 120.0,
            },
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = Error;

    /// Accepts the English labels and the Spanish ones used by the map's
    /// first deployment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Children" | "Niños" => Ok(AgeGroup::Children),
            "Teens" | "Adolescentes" => Ok(AgeGroup::Teens),
            "Adults" | "Adultos" => Ok(AgeGroup::Adults),
            "Older Adults" | "Adultos mayores" => Ok(AgeGroup::OlderAdults),
            other => Err(Error::InvalidArgument(format!(
                "unknown age group {other:?}"
            ))),
        }
    }
}

/// Risk category of an AQI value for one age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Risk {
    pub category: Category,
    pub color: Color,
}

impl Risk {
    /// The risk line shown when there is no AQI to evaluate.
    pub const UNKNOWN: Risk = Risk {
        category: Category::Unknown,
        color: Color::Gray,
    };
}

/// Evaluate the risk of `aqi` for `group`.
pub fn evaluate_risk(aqi: f64, group: AgeGroup) -> Risk {
    let Thresholds { green, yellow } = group.thresholds();
    let category = band(aqi, green, yellow);
    Risk {
        category,
        color: category.color(),
    }
}

/// Evaluate the risk of `aqi` for the group named by `label`.
///
/// Fails with [`Error::InvalidArgument`] if the label names no known group.
pub fn evaluate_risk_for_label(aqi: f64, label: &str) -> Result<Risk, Error> {
    let group: AgeGroup = label.parse()?;
    Ok(evaluate_risk(aqi, group))
}
