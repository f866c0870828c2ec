//! Timed auto-advance.
//!
//! The player is a tokio task that, once per period, fires a uniformly
//! random enabled mode through [`Controller::advance`], the same path a
//! manual click takes. Stopping aborts the task; playing again always
//! replaces the previous task.

mod speed;

pub use speed::{Speed, MAX_EXPONENT};

use crate::session::{Confirm, Controller, SessionError};
use crate::transport::Transport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How a play run ended.
#[derive(Debug)]
pub enum PlayEnd {
    /// Every requested tick fired a mode
    Finished { ticks: usize },
    /// The current state has no enabled mode
    Deadlock { ticks: usize },
    /// A firing failed; the history holds what was committed before it
    Failed { ticks: usize, error: SessionError },
    /// Stopped before completion
    Stopped,
}

impl PlayEnd {
    /// Number of modes fired before the run ended.
    pub fn ticks(&self) -> usize {
        match self {
            Self::Finished { ticks } | Self::Deadlock { ticks } | Self::Failed { ticks, .. } => {
                *ticks
            }
            Self::Stopped => 0,
        }
    }
}

/// Drives a shared controller on a timer.
pub struct Player {
    base: Duration,
    speed: Speed,
    period: watch::Sender<Duration>,
    seed: Option<u64>,
    handle: Option<JoinHandle<PlayEnd>>,
}

impl Player {
    /// A stopped player ticking every `base` at normal speed.
    pub fn new(base: Duration) -> Self {
        let (period, _) = watch::channel(base);
        Self {
            base,
            speed: Speed::new(),
            period,
            seed: None,
            handle: None,
        }
    }

    /// Pick modes from a seeded generator instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Current tick period, base scaled by speed.
    pub fn period(&self) -> Duration {
        *self.period.borrow()
    }

    pub fn up_speed(&mut self) {
        self.speed.up_speed();
        self.publish_period();
    }

    pub fn down_speed(&mut self) {
        self.speed.down_speed();
        self.publish_period();
    }

    fn publish_period(&self) {
        // a running task picks the new period up on its next tick
        self.period.send_replace(self.speed.period(self.base));
    }

    /// Start firing up to `ticks` random modes.
    ///
    /// A rewound session is made live first, which discards the recorded
    /// future unless `confirm` declines and `force` is unset. Returns
    /// whether a run was started. Any previous run is stopped.
    pub async fn play<T, C>(
        &mut self,
        controller: Arc<Mutex<Controller<T>>>,
        ticks: usize,
        force: bool,
        confirm: &C,
    ) -> bool
    where
        T: Transport,
        C: Confirm + ?Sized,
    {
        self.stop();
        if !controller.lock().await.prepare_play(force, confirm) {
            debug!("play declined");
            return false;
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let period = self.period.subscribe();
        info!(ticks, period_ms = self.period().as_millis() as u64, "player started");
        self.handle = Some(tokio::spawn(run(controller, ticks, period, rng)));
        true
    }

    /// Cancel the running task, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the current run to end. `None` when nothing was started.
    pub async fn join(&mut self) -> Option<PlayEnd> {
        let handle = self.handle.take()?;
        Some(handle.await.unwrap_or(PlayEnd::Stopped))
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<T: Transport>(
    controller: Arc<Mutex<Controller<T>>>,
    ticks: usize,
    period: watch::Receiver<Duration>,
    mut rng: StdRng,
) -> PlayEnd {
    let mut fired = 0;
    while fired < ticks {
        let wait = *period.borrow();
        tokio::time::sleep(wait).await;

        let mut controller = controller.lock().await;
        let mode = {
            let current = controller.session().current();
            if current.is_deadlock() {
                info!(ticks = fired, "player stopped on deadlock");
                return PlayEnd::Deadlock { ticks: fired };
            }
            current.modes[rng.random_range(0..current.modes.len())].key()
        };
        match controller.advance(mode).await {
            Ok(outcome) => {
                fired += 1;
                debug!(tick = fired, ?outcome, "player fired");
            }
            Err(error) => {
                warn!(ticks = fired, error = %error, "player stopped on error");
                return PlayEnd::Failed {
                    ticks: fired,
                    error,
                };
            }
        }
    }
    info!(ticks = fired, "player finished");
    PlayEnd::Finished { ticks: fired }
}
