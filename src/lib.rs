//! cachescratch: a benchmark of how well a concurrent allocator keeps threads off each other's
//! cache lines.
//!
//! The main thread allocates one small object per worker, back to back, so that they all come from
//! the same region of the heap (often the same cache line). Each worker frees the object it was
//! handed and then, over and over, allocates an object of the same size, scribbles on every byte
//! of it, and frees it again. An allocator that hands the freed seed memory straight back to
//! whichever thread asks next makes those threads fight over one cache line, and the run scales
//! badly. One that gives each thread its own memory scales close to linearly.
//!
//! Try, on a P-processor machine:
//!
//! ```text
//! cachescratch 1 1000 1 1000000
//! cachescratch P 1000 1 1000000
//! ```
//!
//! The ideal is a P-fold speedup.

pub mod allocators;
pub mod concurrency;
pub mod error;
pub mod orchestrator;
pub mod platform;
pub mod work;
pub mod worker;

#[cfg(test)]
mod testalloc;

pub use allocators::{AllocatorChoice, GlobalAllocWrap};
pub use error::{Result, ScratchError};
pub use orchestrator::{RunReport, Workload, run_workload};
pub use platform::{Nanoseconds, Timer};
pub use worker::WorkerTally;

/// The one line a run prints on stdout.
pub fn elapsed_line(seconds: f64) -> String {
    format!("Time elapsed = {seconds:.6} seconds.")
}
