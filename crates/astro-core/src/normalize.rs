//! Attribute normalization: raw optional attributes into bounded 0–100 scores.
//!
//! Every default-value decision lives here. A missing, non-finite or
//! non-positive attribute resolves to [`DEFAULT_SCORE`]; it never becomes 0.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SCORE, DISTANCE_EDGE_LY, DISTANCE_FAR_LY, DISTANCE_NEAR_LY, DISTANCE_NEAREST_LY,
    FAR_BAND_FLOOR, LUMINOSITY_RANGE, MASS_RANGE, MAX_METRIC_SCORE, PROXIMITY_SPAN,
    TEMPERATURE_RANGE,
};
use crate::record::{Attributes, TypeCategory};

/// Log-scale `value` into `[0, 100]` over `[min, max]`, or 50 when missing.
pub fn normalize(value: Option<f64>, min: f64, max: f64) -> f64 {
    normalize_or(value, min, max, DEFAULT_SCORE)
}

/// [`normalize`] with an explicit default.
pub fn normalize_or(value: Option<f64>, min: f64, max: f64, default: f64) -> f64 {
    let Some(v) = positive(value) else {
        return default;
    };
    let (lo, hi) = (min.log10(), max.log10());
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return default;
    }
    let clamped = v.clamp(min, max);
    (((clamped.log10() - lo) / span) * 100.0).clamp(0.0, 100.0)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Distance score in light-years.
///
/// Three regimes: nearby objects score higher the closer they are, the
/// generic band rewards distance on a log scale up to 90, and beyond 1e9 ly
/// the score climbs from 90 towards 100 at the edge of the observable
/// universe.
pub fn distance_score(light_years: Option<f64>) -> f64 {
    let Some(d) = positive(light_years) else {
        return DEFAULT_SCORE;
    };
    if d < DISTANCE_NEAR_LY {
        let closeness = normalize(Some(d), DISTANCE_NEAREST_LY, DISTANCE_NEAR_LY) / 100.0;
        MAX_METRIC_SCORE - PROXIMITY_SPAN * closeness
    } else if d > DISTANCE_FAR_LY {
        let reach = normalize(Some(d), DISTANCE_FAR_LY, DISTANCE_EDGE_LY) / 100.0;
        FAR_BAND_FLOOR + (MAX_METRIC_SCORE - FAR_BAND_FLOOR) * reach
    } else {
        normalize(Some(d), DISTANCE_NEAR_LY, DISTANCE_FAR_LY) * FAR_BAND_FLOOR / 100.0
    }
}

pub fn mass_score(solar_masses: Option<f64>) -> f64 {
    normalize(solar_masses, MASS_RANGE.0, MASS_RANGE.1)
}

pub fn luminosity_score(solar_luminosities: Option<f64>) -> f64 {
    normalize(solar_luminosities, LUMINOSITY_RANGE.0, LUMINOSITY_RANGE.1)
}

pub fn temperature_score(kelvin: Option<f64>) -> f64 {
    normalize(kelvin, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1)
}

/// Historical era of a discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryEra {
    PreTelescope,
    EarlyTelescope,
    NineteenthCentury,
    EarlyTwentiethCentury,
    SpaceAge,
    Modern,
    VeryRecent,
}

impl DiscoveryEra {
    pub fn from_year(year: i32) -> Self {
        match year {
            i32::MIN..1610 => DiscoveryEra::PreTelescope,
            1610..1800 => DiscoveryEra::EarlyTelescope,
            1800..1900 => DiscoveryEra::NineteenthCentury,
            1900..1957 => DiscoveryEra::EarlyTwentiethCentury,
            1957..2000 => DiscoveryEra::SpaceAge,
            2000..2020 => DiscoveryEra::Modern,
            _ => DiscoveryEra::VeryRecent,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            DiscoveryEra::PreTelescope => 20.0,
            DiscoveryEra::EarlyTelescope => 40.0,
            DiscoveryEra::NineteenthCentury => 55.0,
            DiscoveryEra::EarlyTwentiethCentury => 65.0,
            DiscoveryEra::SpaceAge => 80.0,
            DiscoveryEra::Modern => 70.0,
            DiscoveryEra::VeryRecent => 90.0,
        }
    }
}

/// Era-bucketed discovery score; unknown or non-positive years score 50.
pub fn discovery_score(year: Option<i32>) -> f64 {
    year.filter(|y| *y > 0)
        .map(|y| DiscoveryEra::from_year(y).score())
        .unwrap_or(DEFAULT_SCORE)
}

/// Per-metric scores of one record, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub distance: f64,
    pub mass: f64,
    pub luminosity: f64,
    pub temperature: f64,
    pub discovery: f64,
}

impl MetricScores {
    /// Score every metric, scale by the category's type multiplier and
    /// clamp each product to 100.
    pub fn compute(attributes: &Attributes, category: TypeCategory) -> Self {
        let multiplier = category.type_multiplier();
        let scaled = |score: f64| (score * multiplier).clamp(0.0, MAX_METRIC_SCORE);
        Self {
            distance: scaled(distance_score(attributes.distance)),
            mass: scaled(mass_score(attributes.mass)),
            luminosity: scaled(luminosity_score(attributes.luminosity)),
            temperature: scaled(temperature_score(attributes.temperature)),
            discovery: scaled(discovery_score(attributes.discovery_year)),
        }
    }

    pub fn sum(&self) -> f64 {
        self.distance + self.mass + self.luminosity + self.temperature + self.discovery
    }
}
