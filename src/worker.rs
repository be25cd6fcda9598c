// The per-thread hot loop.

use std::alloc::{GlobalAlloc, handle_alloc_error};
use std::hint::black_box;

use crate::work::WorkDescriptor;

/// What one worker did, counted outside the per-byte loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub index: u32,
    pub iterations: u64,
    /// Full passes over an object, summed over all iterations.
    pub rounds: u64,
    pub bytes_written: u64,
}

/// Reads the byte at `p` in a way the optimizer has to keep, so the store before it is kept too.
#[inline(always)]
pub fn observe(p: *const u8) -> u8 {
    black_box(unsafe { p.read_volatile() })
}

/// Runs one worker to completion.
///
/// First the seed object is freed, exactly once, whatever the iteration count. Then, `iterations`
/// times: allocate an object, write byte `k` with the value `k` (and read it back) across the whole
/// object `repetitions` times, and free it. The descriptor is consumed.
pub fn run_worker<A: GlobalAlloc>(desc: WorkDescriptor<'_, A>) -> WorkerTally {
    let WorkDescriptor { index, seed, al, obj_layout, iterations, repetitions } = desc;

    log::trace!("worker {index}: freeing seed");
    seed.free();

    log::trace!("worker {index}: looping {iterations} times");
    let size = obj_layout.size();
    let mut rounds = 0u64;
    for _i in 0..iterations {
        let obj = unsafe { al.alloc(obj_layout) };
        if obj.is_null() {
            handle_alloc_error(obj_layout);
        }

        for _j in 0..repetitions {
            for k in 0..size {
                unsafe {
                    let b = obj.add(k);
                    b.write(k as u8);
                    observe(b);
                }
            }
            rounds += 1;
        }

        unsafe { al.dealloc(obj, obj_layout) };
    }

    log::trace!("worker {index}: done");
    WorkerTally { index, iterations, rounds, bytes_written: rounds * size as u64 }
}
