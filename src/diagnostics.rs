//! Optional wall-clock instrumentation for searches.

use std::time::Duration;

use hrsw::Stopwatch;
use human_duration::human_duration;

/// A stopwatch that can be switched off.
///
/// A disabled timer never reads the clock and reports `Duration::ZERO`, so
/// searches can carry one unconditionally.
#[derive(Debug)]
pub struct SearchTimer {
    stopwatch: Option<Stopwatch>,
}

impl SearchTimer {
    /// A timer that is already running when `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self {
            stopwatch: enabled.then(Stopwatch::new_started),
        }
    }
    pub fn disabled() -> Self {
        Self::new(false)
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.stopwatch.is_some()
    }

    /// (Re)starts timing from zero.
    pub fn start(&mut self) {
        if let Some(sw) = self.stopwatch.as_mut() {
            *sw = Stopwatch::new_started();
        }
    }

    /// Stops timing and returns the elapsed time.
    pub fn stop(&mut self) -> Duration {
        match self.stopwatch.as_mut() {
            Some(sw) => {
                sw.stop();
                sw.elapsed()
            }
            None => Duration::ZERO,
        }
    }

    /// Returns the elapsed time and starts timing again from zero.
    pub fn restart(&mut self) -> Duration {
        let elapsed = self.elapsed();
        self.start();
        elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.stopwatch
            .as_ref()
            .map(Stopwatch::elapsed)
            .unwrap_or(Duration::ZERO)
    }
}

/// Formats a duration for logs.
pub fn pretty(d: &Duration) -> String {
    human_duration(d)
}
