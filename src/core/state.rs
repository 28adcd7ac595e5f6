//! Simulation parameters and the run/pause flag.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const LIGHT_RANGE: (f64, f64) = (0.0, 100.0);
pub const CO2_RANGE: (f64, f64) = (0.0, 100.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 50.0);

/// Environmental controls.
///
/// - `light_intensity`: relative intensity, percent
/// - `co2_level`: relative concentration, percent
/// - `temperature`: degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationParameters {
    pub light_intensity: f64,
    pub co2_level: f64,
    pub temperature: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            light_intensity: 50.0,
            co2_level: 40.0,
            temperature: 25.0,
        }
    }
}

/// A snapshot of the session: controls plus whether the clock is running.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationState {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub params: SimulationParameters,
    pub is_simulating: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            is_simulating: true,
        }
    }
}

/// A partial set of parameter changes. `None` leaves the field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterUpdate {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub light_intensity: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub co2_level: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub temperature: Option<f64>,
}

impl ParameterUpdate {
    pub fn is_empty(&self) -> bool {
        self.light_intensity.is_none() && self.co2_level.is_none() && self.temperature.is_none()
    }
}

/// Merge one field: NaN/inf are dropped, finite values clamped to the control range.
#[inline]
fn merge_field(current: f64, update: Option<f64>, (lo, hi): (f64, f64)) -> f64 {
    match update {
        Some(v) if v.is_finite() => v.clamp(lo, hi),
        _ => current,
    }
}

/// Holds the current [`SimulationState`]; every mutation replaces the snapshot.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    current: SimulationState,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn snapshot(&self) -> SimulationState {
        self.current
    }

    #[inline]
    pub fn params(&self) -> SimulationParameters {
        self.current.params
    }

    #[inline]
    pub fn is_simulating(&self) -> bool {
        self.current.is_simulating
    }

    /// Merge `update` into the current parameters. The run flag is untouched.
    pub fn update_parameters(&mut self, update: ParameterUpdate) -> SimulationState {
        let p = self.current.params;
        self.current = SimulationState {
            params: SimulationParameters {
                light_intensity: merge_field(p.light_intensity, update.light_intensity, LIGHT_RANGE),
                co2_level: merge_field(p.co2_level, update.co2_level, CO2_RANGE),
                temperature: merge_field(p.temperature, update.temperature, TEMPERATURE_RANGE),
            },
            ..self.current
        };
        self.current
    }

    /// Flip run/pause; returns the new flag.
    pub fn toggle_simulating(&mut self) -> bool {
        self.set_simulating(!self.current.is_simulating)
    }

    pub fn set_simulating(&mut self, on: bool) -> bool {
        self.current = SimulationState {
            is_simulating: on,
            ..self.current
        };
        on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_defaults_and_running() {
        let s = StateStore::new().snapshot();
        assert_eq!(s.params.light_intensity, 50.0);
        assert_eq!(s.params.co2_level, 40.0);
        assert_eq!(s.params.temperature, 25.0);
        assert!(s.is_simulating);
    }

    #[test]
    fn partial_update_only_touches_named_fields() {
        let mut store = StateStore::new();
        store.set_simulating(false);

        let s = store.update_parameters(ParameterUpdate {
            co2_level: Some(75.0),
            ..ParameterUpdate::default()
        });

        assert_eq!(s.params.co2_level, 75.0);
        assert_eq!(s.params.light_intensity, 50.0);
        assert_eq!(s.params.temperature, 25.0);
        assert!(!s.is_simulating, "update must not touch the run flag");
    }

    #[test]
    fn updates_are_clamped_to_control_ranges() {
        let mut store = StateStore::new();
        let s = store.update_parameters(ParameterUpdate {
            light_intensity: Some(140.0),
            co2_level: Some(-3.0),
            temperature: Some(61.0),
        });
        assert_eq!(s.params.light_intensity, 100.0);
        assert_eq!(s.params.co2_level, 0.0);
        assert_eq!(s.params.temperature, 50.0);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let mut store = StateStore::new();
        let s = store.update_parameters(ParameterUpdate {
            light_intensity: Some(f64::NAN),
            co2_level: Some(f64::INFINITY),
            temperature: Some(33.0),
        });
        assert_eq!(s.params.light_intensity, 50.0);
        assert_eq!(s.params.co2_level, 40.0);
        assert_eq!(s.params.temperature, 33.0);
    }

    #[test]
    fn toggle_flips_and_returns_flag() {
        let mut store = StateStore::new();
        assert!(!store.toggle_simulating());
        assert!(!store.is_simulating());
        assert!(store.toggle_simulating());
        assert!(store.is_simulating());
    }
}
