//! Conversion of pollutant concentrations from µg/m³ to ppm.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, NOT_AVAILABLE};

/// Molar volume of an ideal gas at 25 °C and 1 atm, in liters.
pub const MOLAR_VOLUME: f64 = 24.45;

/// Shown in the ppm column for pollutants with no known molar mass.
pub const NOT_CONVERTED: &str = "—";

/// Convert a mass concentration in µg/m³ to ppm, with three decimals.
///
/// Missing, NaN and zero concentrations all produce `"N/A"`: a zero reading
/// cannot be told apart from no data. Callers that need a true zero must
/// not go through this function. A molar mass that is not a positive,
/// finite number also gives `"N/A"`.
pub fn to_ppm(concentration: Option<f64>, molar_mass: f64) -> String {
    if !valid_mass(molar_mass) {
        return NOT_AVAILABLE.to_owned();
    }
    match concentration {
        Some(c) if c != 0.0 && !c.is_nan() => format!("{:.3}", c * MOLAR_VOLUME / molar_mass),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn valid_mass(molar_mass: f64) -> bool {
    molar_mass.is_finite() && molar_mass > 0.0
}

/// Molar masses in g/mol, keyed by pollutant code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MolarMasses(BTreeMap<String, f64>);

impl Default for MolarMasses {
    fn default() -> Self {
        let table = [("CO", 28.01), ("NO2", 46.01), ("O3", 48.0), ("SO2", 64.07)];
        Self(
            table
                .into_iter()
                .map(|(code, mass)| (code.to_owned(), mass))
                .collect(),
        )
    }
}

impl MolarMasses {
    /// Molar mass for a pollutant code; codes are case-sensitive.
    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    /// Add or replace a pollutant's molar mass, which must be positive and
    /// finite.
    pub fn insert(&mut self, code: impl Into<String>, molar_mass: f64) -> Result<(), Error> {
        let code = code.into();
        if !valid_mass(molar_mass) {
            return Err(Error::InvalidArgument(format!(
                "molar mass for {code} must be positive, got {molar_mass}"
            )));
        }
        self.0.insert(code, molar_mass);
        Ok(())
    }

    /// The ppm cell for a pollutant: converted when the code has a molar
    /// mass, [`NOT_CONVERTED`] otherwise.
    pub fn ppm_cell(&self, code: &str, concentration: Option<f64>) -> String {
        match self.get(code) {
            Some(mass) => to_ppm(concentration, mass),
            None => NOT_CONVERTED.to_owned(),
        }
    }
}
