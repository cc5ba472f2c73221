//! # filmgen Compute
//!
//! Worker-pool abstraction for batch generation. The
//! [`ComputeBackend`](backend::ComputeBackend) trait isolates the generation
//! pipeline from how independent tasks are scheduled; results always come
//! back in task order.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Scheduling |
//! |---------|-------------|------------|
//! | Serial | always | caller's thread, task order |
//! | CPU (Rayon) | `cpu` (default) | fixed-size thread pool |

pub mod backend;
pub mod serial;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo, RowFn, TaskError};
pub use serial::SerialBackend;

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;
