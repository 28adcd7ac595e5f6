//! Photosynthesis rate model.
//!
//! Light and CO2 each map to an availability factor in [0,1]; the smaller one
//! bounds the rate (Liebig's law of the minimum). Temperature scales the result
//! through a Gaussian efficiency curve centred on the optimum.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::SimulationParameters;

/// Optimum leaf temperature in degrees Celsius.
pub const OPTIMAL_TEMPERATURE: f64 = 30.0;

/// Width of the temperature response curve.
pub const TEMPERATURE_SIGMA: f64 = 12.0;

const LIGHT_GAIN: f64 = 1.5;
const CO2_GAIN: f64 = 2.0;

/// Which resource currently bounds the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LimitingFactor {
    Light,
    Co2,
    /// Light and CO2 are equally available.
    Balanced,
}

impl LimitingFactor {
    pub fn label(self) -> &'static str {
        match self {
            LimitingFactor::Light => "light",
            LimitingFactor::Co2 => "co2",
            LimitingFactor::Balanced => "balanced",
        }
    }
}

/// The intermediate factors behind a rate value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateBreakdown {
    pub light_factor: f64,
    pub co2_factor: f64,
    pub temperature_factor: f64,
    pub rate: f64,
}

impl RateBreakdown {
    pub fn of(params: &SimulationParameters) -> Self {
        let light_factor = light_factor(params.light_intensity);
        let co2_factor = co2_factor(params.co2_level);
        let temperature_factor = temperature_factor(params.temperature);
        let raw = light_factor.min(co2_factor) * temperature_factor * 100.0;

        Self {
            light_factor,
            co2_factor,
            temperature_factor,
            rate: raw.clamp(0.0, 100.0),
        }
    }

    pub fn limiting(&self) -> LimitingFactor {
        if self.light_factor < self.co2_factor {
            LimitingFactor::Light
        } else if self.co2_factor < self.light_factor {
            LimitingFactor::Co2
        } else {
            LimitingFactor::Balanced
        }
    }
}

#[inline]
fn light_factor(light_intensity: f64) -> f64 {
    (light_intensity * LIGHT_GAIN).min(100.0) / 100.0
}

#[inline]
fn co2_factor(co2_level: f64) -> f64 {
    (co2_level * CO2_GAIN).min(100.0) / 100.0
}

#[inline]
fn temperature_factor(temperature: f64) -> f64 {
    let d = temperature - OPTIMAL_TEMPERATURE;
    (-(d * d) / (2.0 * TEMPERATURE_SIGMA * TEMPERATURE_SIGMA))
        .exp()
        .max(0.0)
}

/// Photosynthesis rate in [0,100] for the given conditions.
///
/// Inputs are not clamped here; anything outside the control domains still
/// yields a defined value and only the final result is clamped.
pub fn compute_rate(params: &SimulationParameters) -> f64 {
    RateBreakdown::of(params).rate
}

pub fn limiting_factor(params: &SimulationParameters) -> LimitingFactor {
    RateBreakdown::of(params).limiting()
}
