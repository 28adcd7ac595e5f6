//! Wall-clock driver for a lab session.
//!
//! The clock owns at most one tokio task. `start` is a no-op while that task is
//! alive; `stop` aborts it. Callers that hold the session write lock while
//! calling `stop` are guaranteed no further tick lands, since the task can only
//! tick under that same lock and an aborted task is never polled again.

use std::sync::Arc;
use std::time::Duration;

use photolab::lab::Lab;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct SimulationClock {
    lab: Arc<RwLock<Lab>>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SimulationClock {
    pub fn new(lab: Arc<RwLock<Lab>>) -> Self {
        Self::with_period(lab, TICK_PERIOD)
    }

    pub fn with_period(lab: Arc<RwLock<Lab>>, period: Duration) -> Self {
        Self {
            lab,
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start ticking. Returns false if a timer was already live.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let lab = Arc::clone(&self.lab);
        let period = self.period;
        self.handle = Some(tokio::spawn(run(lab, period)));
        info!("Clock started ({:?} period)", period);
        true
    }

    /// Cancel the timer. Returns false if nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(h) => {
                let was_live = !h.is_finished();
                h.abort();
                if was_live {
                    info!("Clock stopped");
                }
                was_live
            }
            None => false,
        }
    }
}

impl Drop for SimulationClock {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(lab: Arc<RwLock<Lab>>, period: Duration) {
    // First sample lands one full period after start.
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut lab = lab.write().await;
        match lab.tick() {
            Some(p) => debug!("tick {} rate={:.2}", p.time, p.rate),
            None => {
                debug!("Lab paused; clock task exiting");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab() -> Arc<RwLock<Lab>> {
        Arc::new(RwLock::new(Lab::new()))
    }

    async fn ticks(lab: &Arc<RwLock<Lab>>) -> u64 {
        lab.read().await.ticks()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        assert!(clock.start());

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks(&lab).await, 0, "no immediate tick on start");

        time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(ticks(&lab).await, 3);

        let l = lab.read().await;
        let times: Vec<u64> = l.history().points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_one_timer() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        assert!(clock.start());
        assert!(!clock.start());
        assert!(clock.is_running());

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(ticks(&lab).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_tick() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        clock.start();

        time::sleep(Duration::from_millis(999)).await;
        assert!(clock.stop());
        assert!(!clock.stop());
        assert!(!clock.is_running());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks(&lab).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_the_counter() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        clock.start();
        time::sleep(Duration::from_millis(2_500)).await;

        {
            let mut l = lab.write().await;
            l.set_simulating(false);
            clock.stop();
        }
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks(&lab).await, 2);

        {
            let mut l = lab.write().await;
            l.set_simulating(true);
            clock.start();
        }
        time::sleep(Duration::from_millis(1_500)).await;

        let l = lab.read().await;
        assert_eq!(l.ticks(), 3);
        assert_eq!(l.history().len(), 3);
        assert_eq!(l.history().latest().map(|p| p.time), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_clock_cancels_it() {
        let lab = lab();
        {
            let mut clock = SimulationClock::new(Arc::clone(&lab));
            clock.start();
        }
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ticks(&lab).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn task_exits_if_lab_is_paused_underneath() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        clock.start();
        lab.write().await.set_simulating(false);

        time::sleep(Duration::from_millis(1_500)).await;
        assert!(!clock.is_running());
        assert_eq!(ticks(&lab).await, 0);

        // A fresh start is allowed once the old task has finished.
        lab.write().await.set_simulating(true);
        assert!(clock.start());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_uses_parameters_at_fire_time() {
        let lab = lab();
        let mut clock = SimulationClock::new(Arc::clone(&lab));
        clock.start();

        time::sleep(Duration::from_millis(1_200)).await;
        lab.write().await.update_parameters(photolab::state::ParameterUpdate {
            light_intensity: Some(0.0),
            ..Default::default()
        });
        time::sleep(Duration::from_millis(1_000)).await;

        let l = lab.read().await;
        let rates: Vec<f64> = l.history().points().iter().map(|p| p.rate).collect();
        assert_eq!(rates.len(), 2);
        assert!(rates[0] > 60.0);
        assert_eq!(rates[1], 0.0);
    }
}
