//! Reordering timer and the time abstraction backing it.
//!
//! The timer is deadline-based against an injected [`Clock`], which keeps
//! expiry fully deterministic under test via [`mock_clock::MockClock`]. The
//! surrounding system is expected to observe expiry on the entity's own
//! execution context; the timer itself never spawns anything.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A trait abstracting the concept of "now" to allow for time mocking in tests.
pub trait Clock: Send + Sync + Debug {
    /// Current `Instant`.
    fn now(&self) -> Instant;
}

/// The default system clock implementation using `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Countdown guarding the reordering window's low edge.
///
/// At most one instance exists per entity; it is started when a reception
/// gap is first observed and stopped or restarted as the low edge advances.
/// A duration of `None` models the "infinity" configuration: [`start`]
/// becomes a no-op and the timer never runs.
///
/// [`start`]: Self::start
#[derive(Debug)]
pub struct ReorderingTimer {
    clock: Arc<dyn Clock>,
    duration: Option<Duration>,
    deadline: Option<Instant>,
}

impl ReorderingTimer {
    /// Creates a stopped timer with the configured countdown duration.
    pub fn new(clock: Arc<dyn Clock>, duration: Option<Duration>) -> Self {
        Self {
            clock,
            duration,
            deadline: None,
        }
    }

    /// Arms the countdown from now.
    ///
    /// # Returns
    /// `true` if the timer is now running, `false` when no duration is
    /// configured.
    pub fn start(&mut self) -> bool {
        match self.duration {
            Some(duration) => {
                self.deadline = Some(self.clock.now() + duration);
                true
            }
            None => false,
        }
    }

    /// Stops the countdown without side effects.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Whether the countdown is currently armed.
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether an armed countdown has reached its deadline.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| self.clock.now() >= deadline)
    }
}

/// Test utilities for mocking time.
pub mod mock_clock {
    use super::*;
    use std::sync::Mutex;

    /// A mock clock that allows for manual control over the current time in tests.
    #[derive(Debug)]
    pub struct MockClock {
        current_time: Mutex<Instant>,
    }

    impl MockClock {
        /// Creates a new `MockClock` starting at the given `start_time`.
        pub fn new(start_time: Instant) -> Self {
            Self {
                current_time: Mutex::new(start_time),
            }
        }

        /// Advances the mock clock's current time by the specified duration.
        pub fn advance(&self, duration: Duration) {
            let mut current = self.current_time.lock().unwrap();
            *current += duration;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new(Instant::now())
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.current_time.lock().unwrap()
        }
    }
}
