//! Portable backend built on the Rust standard library
//!
//! Compiles on every target and is the default where no native backend
//! exists. Also used to cross-check the POSIX backend in tests.

mod dylib;
mod memory;
mod sync;
mod thread;
mod time;

pub(crate) use time::sleep_nanos;

use osapi_core::traits::{Backend, OsAtomics, OsLogSinks, OsModulePaths, OsProcess};

use crate::paths;

/// std-based backend
pub struct PortableBackend;

impl Backend for PortableBackend {
    const NAME: &'static str = "portable";
}

impl OsAtomics for PortableBackend {}

impl OsLogSinks for PortableBackend {}

impl OsProcess for PortableBackend {}

impl OsModulePaths for PortableBackend {
    fn module_to_dl(module_id: &str) -> Option<String> {
        paths::module_to_dl(module_id)
    }

    fn module_to_etc(module_id: &str) -> Option<String> {
        paths::module_to_etc(module_id)
    }
}
