// Seeds the objects, spawns the workers, and times the parallel section.

use std::alloc::{GlobalAlloc, Layout};
use std::num::NonZeroUsize;
use std::thread;

use crate::concurrency::{hint_concurrency, num_processors};
use crate::error::{Result, ScratchError};
use crate::platform::{Nanoseconds, Timer};
use crate::work::{SeedObject, WorkDescriptor, repetitions_per_thread};
use crate::worker::{WorkerTally, run_worker};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Workload {
    pub nthreads: u32,
    pub iterations: u64,
    pub obj_size: NonZeroUsize,
    /// Total over all threads; each thread gets `repetitions / nthreads`.
    pub repetitions: u64,
}

impl Workload {
    pub fn repetitions_per_thread(&self) -> u64 {
        repetitions_per_thread(self.repetitions, self.nthreads)
    }

    /// Repetitions requested but never performed because of the truncating split.
    pub fn dropped_repetitions(&self) -> u64 {
        self.repetitions - self.repetitions_per_thread() * u64::from(self.nthreads)
    }

    fn obj_layout(&self) -> Result<Layout> {
        Ok(Layout::from_size_align(self.obj_size.get(), 1)?)
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub elapsed: Nanoseconds,
    /// One per worker, in spawn order.
    pub tallies: Vec<WorkerTally>,
}

impl RunReport {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn bytes_written(&self) -> u64 {
        self.tallies.iter().map(|t| t.bytes_written).sum()
    }
}

/// Runs the whole benchmark once against `al`.
///
/// The seed objects are allocated before the timer starts; the timer stops only after every worker
/// has been joined.
pub fn run_workload<A>(al: &A, w: &Workload) -> Result<RunReport>
where
    A: GlobalAlloc + Sync,
{
    let hint = hint_concurrency(num_processors());
    if w.nthreads as usize > hint.get() {
        log::warn!("{} threads on {} processors; workers will share cores", w.nthreads, hint);
    }

    let layout = w.obj_layout()?;
    let reps = w.repetitions_per_thread();

    // Allocate all the seeds together so they come out of the same region.
    let seeds = SeedObject::batch(al, layout, w.nthreads);

    let mut timer = Timer::new();
    timer.start();

    let joined = thread::scope(|s| -> Result<Vec<WorkerTally>> {
        let mut handles = Vec::with_capacity(w.nthreads as usize);
        for (index, seed) in (0..).zip(seeds) {
            let desc = WorkDescriptor::new(index, seed, al, w.iterations, reps);
            let h = thread::Builder::new()
                .name(format!("scratch-{index}"))
                .spawn_scoped(s, move || run_worker(desc))
                .map_err(|source| ScratchError::Spawn { index, source })?;
            handles.push((index, h));
        }

        handles
            .into_iter()
            .map(|(index, h)| h.join().map_err(|_| ScratchError::WorkerPanicked { index }))
            .collect()
    });

    timer.stop();
    let tallies = joined?;

    let elapsed = timer.elapsed().unwrap_or(Nanoseconds(0));
    Ok(RunReport { elapsed, tallies })
}
