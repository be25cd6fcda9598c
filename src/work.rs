// Per-worker data: the seed object handed to each worker and the descriptor that carries it.

use std::alloc::{GlobalAlloc, Layout, handle_alloc_error};
use std::ptr::NonNull;

/// One object from the batch allocated before timing starts.
///
/// Owns its bytes: dropping it (or calling `free`) gives them back to the allocator that produced
/// them, so each seed is freed exactly once by whoever holds it last.
pub struct SeedObject<'a, A: GlobalAlloc> {
    ptr: NonNull<u8>,
    layout: Layout,
    al: &'a A,
}

// A seed is only ever touched by its one owner, and the allocator it returns to is shared by
// reference, which `A: Sync` makes sound.
unsafe impl<A: GlobalAlloc + Sync> Send for SeedObject<'_, A> {}

impl<'a, A: GlobalAlloc> SeedObject<'a, A> {
    /// Allocates one object. A null return from `al` aborts via `handle_alloc_error`.
    pub fn alloc(al: &'a A, layout: Layout) -> Self {
        debug_assert!(layout.size() > 0);
        let p = unsafe { al.alloc(layout) };
        let Some(ptr) = NonNull::new(p) else {
            handle_alloc_error(layout)
        };
        Self { ptr, layout, al }
    }

    /// Allocates `n` objects back to back, so that they come from the same region of the heap.
    pub fn batch(al: &'a A, layout: Layout, n: u32) -> Vec<Self> {
        (0..n).map(|_| Self::alloc(al, layout)).collect()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn free(self) {
        drop(self);
    }
}

impl<A: GlobalAlloc> Drop for SeedObject<'_, A> {
    fn drop(&mut self) {
        unsafe { self.al.dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

/// Everything one worker needs. Built by the orchestrator and moved into the worker's thread.
pub struct WorkDescriptor<'a, A: GlobalAlloc> {
    pub index: u32,
    pub seed: SeedObject<'a, A>,
    pub al: &'a A,
    pub obj_layout: Layout,
    pub iterations: u64,
    pub repetitions: u64,
}

impl<'a, A: GlobalAlloc> WorkDescriptor<'a, A> {
    pub fn new(index: u32, seed: SeedObject<'a, A>, al: &'a A, iterations: u64, repetitions: u64) -> Self {
        let obj_layout = seed.layout();
        Self { index, seed, al, obj_layout, iterations, repetitions }
    }
}

/// Repetitions each of `nthreads` workers performs. Truncates; the remainder is never handed out.
pub fn repetitions_per_thread(repetitions: u64, nthreads: u32) -> u64 {
    repetitions.checked_div(u64::from(nthreads)).unwrap_or(0)
}
