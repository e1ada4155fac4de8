//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic millisecond clock)
//! - Storage (LocalStorage on web, JSON files on native, memory for tests)

pub mod clock;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{MemoryStorage, Storage};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
