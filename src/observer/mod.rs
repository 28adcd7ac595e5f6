#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::history::DataPoint;
use crate::lab::Lab;
use crate::rate::{LimitingFactor, RateBreakdown};
use crate::state::SimulationState;

/// A read-only snapshot of a lab session, shaped for presentation.
///
/// Design intent:
/// - Observers cannot mutate the session.
/// - Snapshotting is on-demand and allocates (the history copy); ticking stays allocation-free.
/// - The rate is derived from the parameters at snapshot time, never cached.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabSnapshot {
    pub state: SimulationState,
    pub rate: f64,
    pub breakdown: RateBreakdown,
    pub limiting: LimitingFactor,
    pub ticks: u64,
    pub tutor_busy: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: Vec<DataPoint>,
}

pub struct LabAdapter<'a> {
    lab: &'a Lab,
}

impl<'a> LabAdapter<'a> {
    pub fn new(lab: &'a Lab) -> Self {
        Self { lab }
    }

    pub fn snapshot(&self) -> LabSnapshot {
        let breakdown = self.lab.breakdown();

        LabSnapshot {
            state: self.lab.state(),
            rate: breakdown.rate,
            breakdown,
            limiting: breakdown.limiting(),
            ticks: self.lab.ticks(),
            tutor_busy: self.lab.chat().awaiting_reply(),
            history: self.lab.history().points().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ParameterUpdate;

    #[test]
    fn snapshot_tracks_live_parameters() {
        let mut lab = Lab::new();
        lab.tick();

        let before = LabAdapter::new(&lab).snapshot();
        assert_eq!(before.ticks, 1);
        assert_eq!(before.history.len(), 1);
        assert_eq!(before.limiting, LimitingFactor::Light);

        lab.update_parameters(ParameterUpdate {
            co2_level: Some(10.0),
            ..ParameterUpdate::default()
        });
        let after = LabAdapter::new(&lab).snapshot();
        assert_eq!(after.limiting, LimitingFactor::Co2);
        assert!(after.rate < before.rate);
        // History only changes on ticks.
        assert_eq!(after.history, before.history);
    }
}
