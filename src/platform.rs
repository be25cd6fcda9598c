// Abstract over the system monotonic clock

use std::fmt;
use thousands::Separable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nanoseconds(pub u64);

impl Nanoseconds {
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    pub fn per_iter(self, iters: u64) -> f64 {
        self.0 as f64 / iters as f64
    }
}

impl fmt::Display for Nanoseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.separate_with_commas();
        if let Some(width) = f.width() {
            write!(f, "{s:>width$}")
        } else {
            write!(f, "{s}")
        }
    }
}

impl std::ops::Sub for Nanoseconds {
    type Output = Nanoseconds;
    fn sub(self, rhs: Nanoseconds) -> Nanoseconds {
        // Saturates rather than wrapping when a stop was read before its start.
        Nanoseconds(self.0.saturating_sub(rhs.0))
    }
}

#[cfg(target_os = "linux")]
pub mod p {
    use crate::Nanoseconds;
    use rustix::time::{ClockId, clock_gettime};

    pub fn clock_monotonic() -> Nanoseconds {
        let ts = clock_gettime(ClockId::Monotonic);
        debug_assert!(ts.tv_sec >= 0);
        debug_assert!(ts.tv_nsec >= 0);
        Nanoseconds(ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64)
    }
}

#[cfg(not(target_os = "linux"))]
pub mod p {
    use crate::Nanoseconds;
    use std::sync::OnceLock;
    use std::time::Instant;

    static ANCHOR: OnceLock<Instant> = OnceLock::new();

    pub fn clock_monotonic() -> Nanoseconds {
        let anchor = ANCHOR.get_or_init(Instant::now);
        Nanoseconds(anchor.elapsed().as_nanos() as u64)
    }
}

/// Brackets one interval of the monotonic clock.
///
/// `elapsed()` only answers once `start()` and then `stop()` have each been called exactly once.
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Nanoseconds>,
    stop: Option<Nanoseconds>,
    starts: u32,
    stops: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(never)]
    pub fn start(&mut self) {
        self.starts += 1;
        self.start = Some(p::clock_monotonic());
    }

    #[inline(never)]
    pub fn stop(&mut self) {
        self.stops += 1;
        self.stop = Some(p::clock_monotonic());
    }

    pub fn elapsed(&self) -> Option<Nanoseconds> {
        if self.starts != 1 || self.stops != 1 {
            return None;
        }
        match (self.start, self.stop) {
            (Some(start), Some(stop)) if stop >= start => Some(stop - start),
            _ => None,
        }
    }

    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed().map(Nanoseconds::as_secs_f64)
    }
}
