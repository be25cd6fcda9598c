// CPU topology and the process-wide parallelism hint.

use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::thread;

static CONCURRENCY_HINT: OnceLock<NonZeroUsize> = OnceLock::new();

/// Number of processors this process may run on. Falls back to 1 when the platform can't say.
pub fn num_processors() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Records the preferred level of parallelism for the whole process.
///
/// Only the first call takes effect; every call returns the level that is in force.
pub fn hint_concurrency(level: NonZeroUsize) -> NonZeroUsize {
    let current = *CONCURRENCY_HINT.get_or_init(|| {
        log::debug!("concurrency hint set to {level}");
        level
    });
    if current != level {
        log::debug!("concurrency hint already {current}, ignoring {level}");
    }
    current
}

/// The hint in force, if one has been issued.
pub fn concurrency_hint() -> Option<NonZeroUsize> {
    CONCURRENCY_HINT.get().copied()
}
