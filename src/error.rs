use std::alloc::LayoutError;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScratchError {
    #[error("failed to spawn worker {index}")]
    Spawn {
        index: u32,
        #[source]
        source: io::Error,
    },

    #[error("worker {index} panicked")]
    WorkerPanicked { index: u32 },

    #[error("object size is not a valid layout")]
    Layout(#[from] LayoutError),

    #[error("unknown allocator `{0}` (available: {1})")]
    UnknownAllocator(String, String),
}

pub type Result<T, E = ScratchError> = std::result::Result<T, E>;
