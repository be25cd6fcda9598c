// The allocators a run can be pointed at.
//
// Any `GlobalAlloc + Sync` works with `run_workload`; this registry is what the command line can
// name. Third-party allocators are behind cargo features of the same name.

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScratchError};
use crate::orchestrator::{RunReport, Workload, run_workload};

/// Forwards to the platform allocator.
pub struct GlobalAllocWrap;

unsafe impl GlobalAlloc for GlobalAllocWrap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, reqsize: usize) -> *mut u8 {
        unsafe { System.realloc(ptr, layout, reqsize) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllocatorChoice {
    #[default]
    System,
    #[cfg(feature = "mimalloc")]
    Mimalloc,
    #[cfg(feature = "jemalloc")]
    Jemalloc,
}

impl AllocatorChoice {
    pub const ALL: &'static [AllocatorChoice] = &[
        AllocatorChoice::System,
        #[cfg(feature = "mimalloc")]
        AllocatorChoice::Mimalloc,
        #[cfg(feature = "jemalloc")]
        AllocatorChoice::Jemalloc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AllocatorChoice::System => "system",
            #[cfg(feature = "mimalloc")]
            AllocatorChoice::Mimalloc => "mimalloc",
            #[cfg(feature = "jemalloc")]
            AllocatorChoice::Jemalloc => "jemalloc",
        }
    }

    fn available() -> String {
        Self::ALL.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
    }

    /// Runs `workload` against this allocator.
    pub fn run(self, workload: &Workload) -> Result<RunReport> {
        match self {
            AllocatorChoice::System => run_workload(&GlobalAllocWrap, workload),
            #[cfg(feature = "mimalloc")]
            AllocatorChoice::Mimalloc => run_workload(&mimalloc::MiMalloc, workload),
            #[cfg(feature = "jemalloc")]
            AllocatorChoice::Jemalloc => run_workload(&tikv_jemallocator::Jemalloc, workload),
        }
    }
}

impl fmt::Display for AllocatorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocatorChoice {
    type Err = ScratchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScratchError::UnknownAllocator(s.to_string(), Self::available()))
    }
}
