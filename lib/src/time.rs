use std::time::{Duration, Instant};

/// Monotonic time source for the session stopwatch. Readings are offsets from
/// the moment the clock was created, so wall-clock steps never reach them.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System(Instant),
    /// Manually advanced offset; makes tests deterministic.
    Fixed(Duration),
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System(Instant::now())
    }

    #[must_use]
    pub fn fixed() -> Self {
        Self::Fixed(Duration::ZERO)
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        match self {
            Clock::System(anchor) => anchor.elapsed(),
            Clock::Fixed(offset) => *offset,
        }
    }

    /// Moves a fixed clock forward. Has no effect on the system clock.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(offset) = self {
            *offset += delta;
        }
    }
}

/// Accumulates running time from deltas between [`Clock`] readings, so
/// suspended processes do not undercount.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Duration>,
}

impl Stopwatch {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn resume(&mut self, now: Duration) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn pause(&mut self, now: Duration) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_sub(since);
        }
    }

    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => self.accumulated + now.saturating_sub(since),
            None => self.accumulated,
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self, now: Duration) -> u64 {
        self.elapsed(now).as_secs()
    }
}

/// Formats whole seconds as `MM:SS`; minutes are not wrapped into hours.
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
