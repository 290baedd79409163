//! Tokio driver for the per-round [`Countdown`].
//!
//! Each tick is applied and broadcast while the countdown lock is held, and
//! `stop`/`reset` take the same lock, so once either returns no event from the
//! previous run can be delivered.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info};

use crate::state::countdown::{Countdown, CountdownEnd, CountdownPhase, TickOutcome};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const EVENT_CAPACITY: usize = 16;

/// Notification emitted by a running countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One period elapsed; `remaining` seconds are left.
    Tick {
        /// Whole seconds left.
        remaining: u32,
    },
    /// The countdown reached zero. Sent once per run.
    TimeUp,
}

/// Cancelable periodic timer bounding the duration of a round.
pub struct CountdownTimer {
    countdown: Arc<Mutex<Countdown>>,
    task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<CountdownEvent>,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    /// Idle timer ticking once per second when started.
    pub fn new() -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            countdown: Arc::new(Mutex::new(Countdown::new())),
            task: Mutex::new(None),
            events,
        }
    }

    /// Subscribe to tick and time-up notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CountdownEvent> {
        self.events.subscribe()
    }

    /// Start a fresh run of `seconds`, abandoning any run in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reset(&self, seconds: u32) {
        let generation = self.lock_countdown().reset(seconds);

        let countdown = Arc::clone(&self.countdown);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let mut guard = countdown.lock().unwrap_or_else(PoisonError::into_inner);
                match guard.tick(generation) {
                    TickOutcome::Running { remaining } => {
                        let _ = events.send(CountdownEvent::Tick { remaining });
                    }
                    TickOutcome::Expired => {
                        info!(generation, "countdown expired");
                        let _ = events.send(CountdownEvent::TimeUp);
                        break;
                    }
                    TickOutcome::Stale => {
                        debug!(generation, "countdown run superseded");
                        break;
                    }
                }
            }
        });

        if let Some(previous) = self.lock_task().replace(handle) {
            previous.abort();
        }
        info!(seconds, generation, "countdown started");
    }

    /// Cancel the current run without a time-up notification. No-op when idle.
    pub fn stop(&self) {
        let stopped = self.lock_countdown().stop();
        if let Some(handle) = self.lock_task().take() {
            handle.abort();
        }
        if stopped {
            info!("countdown stopped");
        }
    }

    /// Seconds left while running.
    pub fn remaining(&self) -> Option<u32> {
        self.lock_countdown().remaining()
    }

    /// Current phase.
    pub fn phase(&self) -> CountdownPhase {
        self.lock_countdown().phase()
    }

    /// How the previous run ended, if any run ended.
    pub fn last_end(&self) -> Option<CountdownEnd> {
        self.lock_countdown().last_end()
    }

    fn lock_countdown(&self) -> std::sync::MutexGuard<'_, Countdown> {
        self.countdown.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_task().take() {
            handle.abort();
        }
    }
}
