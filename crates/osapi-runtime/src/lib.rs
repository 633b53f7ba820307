//! # osapi-runtime
//!
//! Default OS backends for the osapi table.
//!
//! This crate provides:
//! - `PosixBackend`: libc heap, pthreads, monotonic clock, dlopen (unix)
//! - `PortableBackend`: the same capabilities over the Rust standard library
//! - `install_defaults` / `install_defaults_with`: bind the host's default
//!   backend as the process-wide table
//! - `OsConfig`: log and module path settings for the default backends

use std::sync::OnceLock;

use osapi_core::binding;
use osapi_core::logging;
use osapi_core::traits::Backend;
use osapi_core::{OsApiTable, OsResult};

pub mod config;
pub mod paths;
pub mod portable;
#[cfg(unix)]
pub mod posix;

// Re-exports
pub use config::OsConfig;
pub use portable::PortableBackend;
#[cfg(unix)]
pub use posix::PosixBackend;

// Platform selection
cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Backend installed by `install_defaults` on this target
        pub type DefaultBackend = posix::PosixBackend;
    } else {
        /// Backend installed by `install_defaults` on this target
        pub type DefaultBackend = portable::PortableBackend;
    }
}

/// Name of `DefaultBackend`
pub const BACKEND_NAME: &str = <DefaultBackend as Backend>::NAME;

/// The host's default table, built once
pub fn default_table() -> &'static OsApiTable {
    static TABLE: OnceLock<OsApiTable> = OnceLock::new();
    TABLE.get_or_init(OsApiTable::from_platform::<DefaultBackend>)
}

/// Table over `PortableBackend`, built once
pub fn portable_table() -> &'static OsApiTable {
    static TABLE: OnceLock<OsApiTable> = OnceLock::new();
    TABLE.get_or_init(OsApiTable::from_platform::<PortableBackend>)
}

/// Push a configuration into the logging and path globals
fn apply(config: &OsConfig) {
    logging::set_log_level(config.log_level);
    logging::set_flush_enabled(config.flush_log);
    logging::set_time_enabled(config.log_time);
    paths::set_etc_root(&config.etc_root);
    paths::set_lib_dir(&config.lib_dir);
}

/// Install the default backend with the compile-time configuration
///
/// Also the reset path: restores the default table and settings after a
/// custom table has been installed.
pub fn install_defaults() {
    apply(&OsConfig::new());
    binding::install_static(default_table());
}

/// Install the default backend with a runtime configuration
///
/// Nothing changes if the configuration is invalid.
pub fn install_defaults_with(config: &OsConfig) -> OsResult<()> {
    config.validate()?;
    apply(config);
    binding::install_static(default_table());
    Ok(())
}
