//! Native POSIX backend
//!
//! libc heap, pthreads, `CLOCK_MONOTONIC` via nix, `nanosleep` and the
//! dlopen family. Default on unix targets.

mod dylib;
mod memory;
mod sync;
mod thread;
mod time;

use nix::errno::Errno;
use osapi_core::logging;
use osapi_core::traits::{Backend, OsAtomics, OsLogSinks, OsModulePaths, OsProcess};

use crate::paths;

/// libc / pthread backend
pub struct PosixBackend;

impl Backend for PosixBackend {
    const NAME: &'static str = "posix";
}

impl OsAtomics for PosixBackend {}

impl OsLogSinks for PosixBackend {}

impl OsProcess for PosixBackend {}

impl OsModulePaths for PosixBackend {
    fn module_to_dl(module_id: &str) -> Option<String> {
        paths::module_to_dl(module_id)
    }

    fn module_to_etc(module_id: &str) -> Option<String> {
        paths::module_to_etc(module_id)
    }
}

/// Abort on a non-zero pthread return code
///
/// The primitives have no error channel; a failing lock or join means the
/// process state can no longer be trusted.
#[inline]
fn check(rc: libc::c_int, what: &str) {
    if rc != 0 {
        fatal(what, Errno::from_raw(rc));
    }
}

#[cold]
#[inline(never)]
fn fatal(what: &str, errno: Errno) -> ! {
    logging::write_fatal(format_args!("{} failed: {}", what, errno));
    PosixBackend::abort()
}
