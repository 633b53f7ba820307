//! # osapi-core
//!
//! Core types and traits for the osapi OS abstraction table.
//!
//! This crate is platform-agnostic and contains no OS-specific code.
//! The native backends (POSIX, portable std) live in `osapi-runtime`.
//!
//! ## Modules
//!
//! - `table` - The API table (`OsApiTable`) and its slot types
//! - `traits` - Backend capability traits used to fill a table
//! - `binding` - Process-wide active table (install / current)
//! - `api` - Thin call-site wrappers, one per slot
//! - `helpers` - Timing, sleep and duplication helpers built on the table
//! - `handle` - Opaque thread / mutex / cond / library handles
//! - `time` - Monotonic timestamps and arithmetic
//! - `buf` - Table-allocated owned buffers
//! - `heap` - Size-tracking heap over `std::alloc`
//! - `paths` - Module id to library / resource path transforms
//! - `counters` - Advisory allocation counters
//! - `logging` - Leveled log entry points and the default stderr writer
//! - `bridge` - Sinks forwarding to the `log` crate
//! - `mock` - Deterministic single-threaded backend for tests
//! - `error` - Error types

pub mod error;
pub mod time;
pub mod handle;
pub mod table;
pub mod traits;
pub mod binding;
pub mod api;
pub mod helpers;
pub mod buf;
pub mod heap;
pub mod paths;
pub mod counters;
pub mod logging;
pub mod bridge;
pub mod mock;

// Re-exports for convenience
pub use error::{ConfigError, OsError, OsResult};
pub use time::{time_sub, time_to_f64, Timestamp, NANOS_PER_SEC};
pub use handle::{CondHandle, DlHandle, MutexHandle, OsProc, ThreadCallback, ThreadHandle};
pub use table::OsApiTable;
pub use traits::{Backend, OsAtomics, OsClock, OsDylib, OsLogSinks, OsMemory, OsModulePaths, OsProcess, OsSync, OsThreads, Platform};
pub use binding::{current, install_custom, install_static, is_installed, try_current};
pub use helpers::{elapsed_since, lap, memdup, sleepf, time_measure};
pub use buf::OsBuf;
pub use counters::{alloc_counters, reset_alloc_counters, AllocCounters};
pub use logging::LogLevel;
pub use mock::MockBackend;
