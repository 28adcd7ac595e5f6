//! One simulation session.
//!
//! A [`Lab`] owns everything a session needs: the state store, the rolling
//! history, the tick counter and the tutor conversation. It has no timer of its
//! own; whoever drives it (the daemon clock, the headless demo) calls
//! [`Lab::tick`] once per interval.

use crate::chat::{AskRejected, ChatLog};
use crate::history::{DataPoint, History};
use crate::rate::{compute_rate, RateBreakdown};
use crate::state::{ParameterUpdate, SimulationParameters, SimulationState, StateStore};

#[derive(Debug, Clone, Default)]
pub struct Lab {
    store: StateStore,
    history: History,
    ticks: u64,
    chat: ChatLog,
}

impl Lab {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> SimulationState {
        self.store.snapshot()
    }

    #[inline]
    pub fn params(&self) -> SimulationParameters {
        self.store.params()
    }

    #[inline]
    pub fn is_simulating(&self) -> bool {
        self.store.is_simulating()
    }

    /// Rate for the current parameters. Always recomputed, never cached.
    pub fn rate(&self) -> f64 {
        compute_rate(&self.store.params())
    }

    pub fn breakdown(&self) -> RateBreakdown {
        RateBreakdown::of(&self.store.params())
    }

    pub fn update_parameters(&mut self, update: ParameterUpdate) -> SimulationState {
        self.store.update_parameters(update)
    }

    pub fn toggle_simulating(&mut self) -> bool {
        self.store.toggle_simulating()
    }

    pub fn set_simulating(&mut self, on: bool) -> bool {
        self.store.set_simulating(on)
    }

    /// One clock step: sample the current rate at the current tick, then advance.
    ///
    /// The first recorded point has `time == 0`. Returns `None` while paused;
    /// pausing never resets the counter or clears history.
    pub fn tick(&mut self) -> Option<DataPoint> {
        if !self.store.is_simulating() {
            return None;
        }
        let point = DataPoint {
            time: self.ticks,
            rate: self.rate(),
        };
        self.history.append(point);
        self.ticks += 1;
        Some(point)
    }

    /// Number of ticks taken so far (also the time stamp of the next sample).
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Record a question; returns what to send to the tutor along with the
    /// parameters it should explain.
    pub fn ask(&mut self, question: &str) -> Result<(String, SimulationParameters), AskRejected> {
        let q = self.chat.ask(question)?;
        Ok((q, self.store.params()))
    }

    pub fn reply(&mut self, content: impl Into<String>) {
        self.chat.reply(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_CAPACITY;

    #[test]
    fn first_tick_is_time_zero_with_current_rate() {
        let mut lab = Lab::new();
        let p = lab.tick().unwrap();
        assert_eq!(p.time, 0);
        assert_eq!(p.rate, lab.rate());
        assert_eq!(lab.ticks(), 1);
        assert_eq!(lab.history().len(), 1);
    }

    #[test]
    fn tick_reads_parameters_at_fire_time() {
        let mut lab = Lab::new();
        lab.tick();
        lab.update_parameters(ParameterUpdate {
            light_intensity: Some(0.0),
            ..ParameterUpdate::default()
        });
        let p = lab.tick().unwrap();
        assert_eq!(p.time, 1);
        assert_eq!(p.rate, 0.0);
    }

    #[test]
    fn paused_lab_does_not_record() {
        let mut lab = Lab::new();
        lab.tick();
        lab.tick();
        assert!(!lab.toggle_simulating());

        assert_eq!(lab.tick(), None);
        assert_eq!(lab.ticks(), 2);
        assert_eq!(lab.history().len(), 2);

        lab.toggle_simulating();
        assert_eq!(lab.tick().map(|p| p.time), Some(2));
    }

    #[test]
    fn long_run_keeps_a_bounded_window() {
        let mut lab = Lab::new();
        for _ in 0..50 {
            lab.tick();
        }
        assert_eq!(lab.history().len(), HISTORY_CAPACITY);
        assert_eq!(lab.history().points()[0].time, 30);
        assert_eq!(lab.history().latest().map(|p| p.time), Some(49));
    }

    #[test]
    fn ask_hands_out_current_params() {
        let mut lab = Lab::new();
        lab.update_parameters(ParameterUpdate {
            temperature: Some(41.0),
            ..ParameterUpdate::default()
        });
        let (q, params) = lab.ask("too hot?").unwrap();
        assert_eq!(q, "too hot?");
        assert_eq!(params.temperature, 41.0);
        assert!(lab.chat().awaiting_reply());

        lab.reply("a bit");
        assert!(!lab.chat().awaiting_reply());
        assert_eq!(lab.chat().messages().len(), 3);
    }
}
