//! Per-round countdown, independent of scoring.
//!
//! `Idle -> Running -> {Expired, Canceled} -> Idle`. Every `reset` opens a
//! new generation; ticks carrying an older generation are ignored, which is
//! what makes `stop` final even if a tick was already scheduled.

/// Observable phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// Not counting.
    Idle,
    /// Counting down.
    Running {
        /// Whole seconds left.
        remaining: u32,
    },
}

/// How the last run ended before returning to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEnd {
    /// Reached zero and notified.
    Expired,
    /// Stopped early without notification.
    Canceled,
}

/// Effect of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with `remaining` seconds left.
    Running {
        /// Whole seconds left.
        remaining: u32,
    },
    /// Reached zero on this tick; the only tick that reports it.
    Expired,
    /// Tick from a stopped or replaced run.
    Stale,
}

/// Countdown state machine driven by one-second ticks.
#[derive(Debug, Clone)]
pub struct Countdown {
    phase: CountdownPhase,
    generation: u64,
    last_end: Option<CountdownEnd>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            phase: CountdownPhase::Idle,
            generation: 0,
            last_end: None,
        }
    }
}

impl Countdown {
    /// Idle countdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.generation
    }

    /// How the previous run ended, if any run ended.
    pub fn last_end(&self) -> Option<CountdownEnd> {
        self.last_end
    }

    /// Seconds left while running.
    pub fn remaining(&self) -> Option<u32> {
        match self.phase {
            CountdownPhase::Running { remaining } => Some(remaining),
            CountdownPhase::Idle => None,
        }
    }

    /// Start a fresh run from any phase and return its generation.
    pub fn reset(&mut self, seconds: u32) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.phase = CountdownPhase::Running { remaining: seconds };
        self.generation
    }

    /// Advance the run identified by `generation` by one second.
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            return TickOutcome::Stale;
        }

        let CountdownPhase::Running { remaining } = self.phase else {
            return TickOutcome::Stale;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.phase = CountdownPhase::Idle;
            self.last_end = Some(CountdownEnd::Expired);
            return TickOutcome::Expired;
        }

        self.phase = CountdownPhase::Running { remaining };
        TickOutcome::Running { remaining }
    }

    /// Cancel the current run. Returns `false` when already idle.
    pub fn stop(&mut self) -> bool {
        if matches!(self.phase, CountdownPhase::Idle) {
            return false;
        }

        self.generation = self.generation.wrapping_add(1);
        self.phase = CountdownPhase::Idle;
        self.last_end = Some(CountdownEnd::Canceled);
        true
    }
}
