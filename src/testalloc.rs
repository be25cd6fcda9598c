// An allocator for tests: forwards to the system allocator and keeps per-thread books.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use ahash::HashMap;

const UNTOUCHED: u8 = 0xFF;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub allocs: u64,
    pub frees: u64,
}

#[derive(Default)]
struct Books {
    per_thread: HashMap<ThreadId, Counts>,
    live: i64,
    pattern_checked: u64,
    pattern_mismatches: u64,
}

/// Fills fresh objects with `UNTOUCHED` and, on free, checks that an object is either still
/// untouched or carries the `k -> k as u8` pattern.
pub struct CountingAlloc {
    books: Mutex<Books>,
}

impl CountingAlloc {
    pub fn new() -> Self {
        Self { books: Mutex::new(Books::default()) }
    }

    fn with_books<R>(&self, f: impl FnOnce(&mut Books) -> R) -> R {
        let mut b = self.books.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut b)
    }

    pub fn counts_of(&self, id: ThreadId) -> Counts {
        self.with_books(|b| b.per_thread.get(&id).copied().unwrap_or_default())
    }

    pub fn counts_excluding(&self, id: ThreadId) -> Vec<Counts> {
        self.with_books(|b| b.per_thread.iter().filter(|(t, _)| **t != id).map(|(_, c)| *c).collect())
    }

    pub fn total(&self) -> Counts {
        self.with_books(|b| {
            b.per_thread.values().fold(Counts::default(), |acc, c| Counts { allocs: acc.allocs + c.allocs, frees: acc.frees + c.frees })
        })
    }

    pub fn live(&self) -> i64 {
        self.with_books(|b| b.live)
    }

    pub fn pattern_checked(&self) -> u64 {
        self.with_books(|b| b.pattern_checked)
    }

    pub fn pattern_mismatches(&self) -> u64 {
        self.with_books(|b| b.pattern_mismatches)
    }
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let p = unsafe { System.alloc(layout) };
        if !p.is_null() {
            unsafe { std::ptr::write_bytes(p, UNTOUCHED, layout.size()) };
        }
        let id = thread::current().id();
        self.with_books(|b| {
            b.per_thread.entry(id).or_default().allocs += 1;
            b.live += 1;
        });
        p
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let bytes = unsafe { std::slice::from_raw_parts(ptr, layout.size()) };
        let untouched = bytes.iter().all(|&x| x == UNTOUCHED);
        let patterned = bytes.iter().enumerate().all(|(k, &x)| x == k as u8);
        let id = thread::current().id();
        self.with_books(|b| {
            b.per_thread.entry(id).or_default().frees += 1;
            b.live -= 1;
            if patterned && !untouched {
                b.pattern_checked += 1;
            } else if !untouched {
                b.pattern_mismatches += 1;
            }
        });
        unsafe { System.dealloc(ptr, layout) };
    }
}
