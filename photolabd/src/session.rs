//! The daemon's single lab session: state, clock and tutor wired together.
//!
//! Lock order is always lab, then clock. The clock task only ever takes the lab
//! lock, so pausing under the lab lock cannot race a tick.

use std::sync::Arc;

use photolab::chat::{AskRejected, Message};
use photolab::history::DataPoint;
use photolab::lab::Lab;
use photolab::observer::{LabAdapter, LabSnapshot};
use photolab::state::{ParameterUpdate, SimulationState};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::clock::SimulationClock;
use crate::tutor::Tutor;

pub struct Session {
    lab: Arc<RwLock<Lab>>,
    clock: Mutex<SimulationClock>,
    tutor: Tutor,
}

impl Session {
    /// Build a session and start its clock (a new lab starts out running).
    pub async fn launch(tutor: Tutor) -> Self {
        let lab = Arc::new(RwLock::new(Lab::new()));
        let clock = SimulationClock::new(Arc::clone(&lab));
        let session = Self {
            lab,
            clock: Mutex::new(clock),
            tutor,
        };
        {
            let lab = session.lab.read().await;
            let mut clock = session.clock.lock().await;
            if lab.is_simulating() {
                clock.start();
            }
        }
        session
    }

    pub async fn snapshot(&self) -> LabSnapshot {
        let lab = self.lab.read().await;
        LabAdapter::new(&lab).snapshot()
    }

    pub async fn history(&self) -> Vec<DataPoint> {
        self.lab.read().await.history().points().to_vec()
    }

    pub async fn chat(&self) -> Vec<Message> {
        self.lab.read().await.chat().messages().to_vec()
    }

    pub async fn update_parameters(&self, update: ParameterUpdate) -> SimulationState {
        let mut lab = self.lab.write().await;
        let s = lab.update_parameters(update);
        info!(
            "Parameters: light={:.1} co2={:.1} temp={:.1}",
            s.params.light_intensity, s.params.co2_level, s.params.temperature
        );
        s
    }

    pub async fn toggle_simulating(&self) -> bool {
        let mut lab = self.lab.write().await;
        let on = lab.toggle_simulating();
        self.sync_clock(on).await;
        on
    }

    pub async fn set_simulating(&self, on: bool) -> bool {
        let mut lab = self.lab.write().await;
        lab.set_simulating(on);
        self.sync_clock(on).await;
        on
    }

    /// Caller must hold the lab write lock.
    async fn sync_clock(&self, on: bool) {
        let mut clock = self.clock.lock().await;
        if on {
            clock.start();
        } else {
            clock.stop();
        }
    }

    /// Ask the tutor about the current conditions.
    ///
    /// The question and the reply are both recorded in the chat log. The lab
    /// lock is not held while the tutor works, so the clock keeps ticking.
    pub async fn ask(&self, question: &str) -> Result<String, AskRejected> {
        let (question, params) = self.lab.write().await.ask(question)?;
        let reply = self.tutor.explain(&params, &question).await;
        self.lab.write().await.reply(reply.clone());
        Ok(reply)
    }

    /// Cancel the clock for teardown. The run flag is left as it was.
    pub async fn shutdown(&self) {
        let _lab = self.lab.write().await;
        self.clock.lock().await.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutor::{TutorConfig, TutorMode};
    use photolab::chat::{Role, FALLBACK_REPLY};
    use std::time::Duration;
    use tokio::time;

    fn tutor(mode: TutorMode) -> Tutor {
        Tutor::new(TutorConfig {
            mode,
            ..TutorConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn launch_runs_and_pause_resume_keeps_counter() {
        let session = Session::launch(tutor(TutorMode::Stub)).await;
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(session.snapshot().await.ticks, 2);

        assert!(!session.toggle_simulating().await);
        time::sleep(Duration::from_secs(4)).await;
        let paused = session.snapshot().await;
        assert_eq!(paused.ticks, 2);
        assert_eq!(paused.history.len(), 2);
        assert!(!paused.state.is_simulating);

        assert!(session.toggle_simulating().await);
        time::sleep(Duration::from_millis(1_100)).await;
        let history = session.history().await;
        assert_eq!(history.iter().map(|p| p.time).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_does_not_double_tick() {
        let session = Session::launch(tutor(TutorMode::Stub)).await;
        session.set_simulating(true).await;
        session.set_simulating(true).await;
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(session.snapshot().await.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticks() {
        let session = Session::launch(tutor(TutorMode::Stub)).await;
        time::sleep(Duration::from_millis(1_500)).await;
        session.shutdown().await;
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.snapshot().await.ticks, 1);
    }

    #[tokio::test]
    async fn failed_tutor_still_records_both_sides() {
        let session = Session::launch(tutor(TutorMode::Off)).await;
        let reply = session.ask("Why does heat hurt?").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);

        let chat = session.chat().await;
        assert_eq!(chat.len(), 3);
        assert_eq!(chat[1], Message::user("Why does heat hurt?"));
        assert_eq!(chat[2].role, Role::Assistant);
        assert_eq!(chat[2].content, FALLBACK_REPLY);
        assert!(!session.snapshot().await.tutor_busy);
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let session = Session::launch(tutor(TutorMode::Stub)).await;
        assert_eq!(session.ask("  ").await, Err(AskRejected::Empty));
        assert_eq!(session.chat().await.len(), 1);
    }

    #[tokio::test]
    async fn parameter_updates_are_visible_in_snapshot() {
        let session = Session::launch(tutor(TutorMode::Stub)).await;
        session
            .update_parameters(ParameterUpdate {
                light_intensity: Some(100.0),
                co2_level: Some(100.0),
                temperature: Some(30.0),
            })
            .await;
        let snap = session.snapshot().await;
        assert!((snap.rate - 100.0).abs() < 1e-9);
        assert!(snap.state.is_simulating);
    }
}
