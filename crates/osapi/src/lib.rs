//! # osapi - Runtime-Pluggable OS Abstraction Layer
//!
//! One table of function pointers for every call that differs between
//! operating systems. Engine code never touches platform primitives
//! directly; it goes through the table, so the whole platform layer can be
//! swapped at runtime (a mock for tests, a tracking allocator, a custom
//! log sink).
//!
//! ## Features
//!
//! - **Memory**: malloc / realloc / calloc / free / strdup with advisory counters
//! - **Threads**: spawn and join, fn pointer or closure
//! - **Sync**: mutexes, condition variables, atomic increment / decrement
//! - **Time**: monotonic timestamps, fractional-second sleep, lap timing
//! - **Logging**: four independent sinks, `os_log!` style macros, `log` bridge
//! - **Modules**: dlopen / dlproc / dlclose and module id to path mapping
//!
//! ## Quick Start
//!
//! ```ignore
//! use osapi::{api, os_log};
//!
//! fn main() {
//!     osapi::install_defaults();
//!
//!     let mut t = api::get_time();
//!     let h = api::thread_spawn(|| 6 * 7).unwrap();
//!     os_log!("answer {} after {:.6}s", api::thread_join(h), osapi::lap(&mut t));
//! }
//! ```
//!
//! Overriding one slot:
//!
//! ```ignore
//! fn quiet(_: &str) {}
//!
//! osapi::install_custom(osapi::OsApiTable {
//!     log_debug: quiet,
//!     ..*osapi::default_table()
//! });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Engine Code                            │
//! │          api::*, os_log!/os_err!, memdup, lap, sleepf       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Active OsApiTable                          │
//! │     AtomicPtr to a leaked table, install / current          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!    ┌───────────┐      ┌───────────┐      ┌───────────┐
//!    │   Posix   │      │ Portable  │      │   Mock    │
//!    │  Backend  │      │  Backend  │      │  Backend  │
//!    └───────────┘      └───────────┘      └───────────┘
//!          │                   │
//!          ▼                   ▼
//!    libc / pthread      std::thread / std::sync
//!    nix clock           Instant, libloading
//! ```

// Re-export core types
pub use osapi_core::{
    api,
    mock,
    AllocCounters,
    CondHandle,
    ConfigError,
    DlHandle,
    LogLevel,
    MutexHandle,
    OsApiTable,
    OsBuf,
    OsError,
    OsProc,
    OsResult,
    ThreadCallback,
    ThreadHandle,
    Timestamp,
    NANOS_PER_SEC,
};

// Backend traits for custom platforms
pub use osapi_core::traits;

// Binding protocol
pub use osapi_core::{current, install_custom, install_static, is_installed, try_current};

// Derived helpers
pub use osapi_core::{
    alloc_counters, elapsed_since, lap, memdup, reset_alloc_counters, sleepf, time_measure,
    time_sub, time_to_f64,
};

// Logging macros and writer settings
pub use osapi_core::{os_dbg, os_err, os_log, os_warn};
pub use osapi_core::logging::{
    set_flush_enabled, set_level_enabled, set_log_level, set_time_enabled,
};

// Re-export runtime types
pub use osapi_runtime::{
    default_table,
    install_defaults,
    install_defaults_with,
    portable_table,
    DefaultBackend,
    OsConfig,
    PortableBackend,
    BACKEND_NAME,
};
#[cfg(unix)]
pub use osapi_runtime::PosixBackend;

/// Install the default backend configured from `OSAPI_*` environment
/// variables
///
/// The only entry point that reads the environment.
pub fn install_defaults_from_env() -> OsResult<()> {
    install_defaults_with(&OsConfig::from_env())
}
