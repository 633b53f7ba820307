//! Backend capability traits
//!
//! A backend is a zero-sized type implementing one trait per capability
//! group. The methods are associated functions (no `self`) so they coerce
//! directly into the `fn` pointer slots of `OsApiTable`.
//!
//! Where every host behaves alike (atomics, stderr log sinks, abort) the
//! trait carries a default body.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicI32, Ordering};
use std::ffi::c_char;

use crate::binding;
use crate::handle::{CondHandle, DlHandle, MutexHandle, OsProc, ThreadCallback, ThreadHandle};
use crate::logging::{self, LogLevel};
use crate::table::MallocFn;
use crate::time::Timestamp;

/// Identity of a backend; stamped into every handle it creates
pub trait Backend {
    /// Backend name (e.g., "posix", "portable", "mock")
    const NAME: &'static str;
}

/// Heap allocation
pub trait OsMemory: Backend {
    /// Allocate `size` bytes, `None` on failure
    fn malloc(size: usize) -> Option<NonNull<u8>>;

    /// Resize an allocation made by this backend
    ///
    /// # Safety
    ///
    /// `ptr` must come from this backend's `malloc`/`calloc`/`realloc` and
    /// not have been freed. On success `ptr` is invalidated.
    unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>>;

    /// Allocate `size` zeroed bytes
    fn calloc(size: usize) -> Option<NonNull<u8>>;

    /// Release an allocation
    ///
    /// # Safety
    ///
    /// `ptr` must come from this backend and be released exactly once.
    unsafe fn free(ptr: NonNull<u8>);

    /// NUL-terminated heap copy of `s`
    ///
    /// Allocated through the installed table's `malloc` slot, so the block
    /// goes back through the same table's `free` even when the allocator
    /// slots are overridden. Falls back to `Self::malloc` before any table
    /// is installed.
    fn strdup(s: &str) -> Option<NonNull<c_char>> {
        let malloc: MallocFn = match binding::try_current() {
            Ok(table) => table.malloc,
            Err(_) => Self::malloc,
        };
        let len = s.len();
        let dst = malloc(len + 1)?;
        // Safety: dst holds len + 1 bytes, source and destination are distinct
        unsafe {
            core::ptr::copy_nonoverlapping(s.as_ptr(), dst.as_ptr(), len);
            *dst.as_ptr().add(len) = 0;
        }
        Some(dst.cast())
    }
}

/// Thread creation and join
pub trait OsThreads: Backend {
    /// Start `callback(arg)` on a new thread; returns immediately
    fn thread_new(callback: ThreadCallback, arg: usize) -> Option<ThreadHandle>;

    /// Block until the thread finishes, returning its callback's value
    fn thread_join(thread: ThreadHandle) -> usize;
}

/// Atomic increment / decrement of a shared 32-bit counter
pub trait OsAtomics: Backend {
    /// Add one, returning the new value
    #[inline]
    fn ainc(value: &AtomicI32) -> i32 {
        value.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Subtract one, returning the new value
    #[inline]
    fn adec(value: &AtomicI32) -> i32 {
        value.fetch_sub(1, Ordering::SeqCst).wrapping_sub(1)
    }
}

/// Mutexes and condition variables
pub trait OsSync: Backend {
    fn mutex_new() -> MutexHandle;

    /// Must not be locked or contended
    fn mutex_free(mutex: MutexHandle);

    /// Block until exclusive ownership is acquired
    fn mutex_lock(mutex: &MutexHandle);

    /// Caller must hold the lock
    fn mutex_unlock(mutex: &MutexHandle);

    fn cond_new() -> CondHandle;

    /// Must have no waiters
    fn cond_free(cond: CondHandle);

    /// Wake at least one waiter
    fn cond_signal(cond: &CondHandle);

    /// Wake all waiters
    fn cond_broadcast(cond: &CondHandle);

    /// Atomically release `mutex` and block; `mutex` is re-acquired before
    /// returning. Spurious wakeups are allowed.
    fn cond_wait(cond: &CondHandle, mutex: &MutexHandle);
}

/// Monotonic clock and sleep
pub trait OsClock: Backend {
    /// Block for roughly `sec` seconds plus `nanosec` nanoseconds
    fn sleep(sec: i32, nanosec: i32);

    /// Monotonic clock reading
    fn get_time() -> Timestamp;
}

/// Log sinks; each receives one pre-formatted message
pub trait OsLogSinks: Backend {
    fn log(msg: &str) {
        logging::write_line(LogLevel::Info, msg);
    }

    fn log_warning(msg: &str) {
        logging::write_line(LogLevel::Warn, msg);
    }

    fn log_error(msg: &str) {
        logging::write_line(LogLevel::Error, msg);
    }

    fn log_debug(msg: &str) {
        logging::write_line(LogLevel::Debug, msg);
    }
}

/// Process termination
pub trait OsProcess: Backend {
    fn abort() -> ! {
        std::process::abort()
    }
}

/// Dynamic library loading
pub trait OsDylib: Backend {
    /// `None` if the library cannot be located or loaded
    fn dlopen(libname: &str) -> Option<DlHandle>;

    /// `None` if the symbol is absent
    fn dlproc(lib: &DlHandle, procname: &str) -> Option<OsProc>;

    fn dlclose(lib: DlHandle);
}

/// Module id to path translation
pub trait OsModulePaths: Backend {
    /// Shared library filename for a logical module id
    fn module_to_dl(module_id: &str) -> Option<String>;

    /// Directory with module resources / assets
    fn module_to_etc(module_id: &str) -> Option<String>;
}

/// Combined platform interface: everything needed to fill an `OsApiTable`
pub trait Platform:
    OsMemory + OsThreads + OsAtomics + OsSync + OsClock + OsLogSinks + OsProcess + OsDylib + OsModulePaths
{
    /// Platform name (e.g., "posix", "portable")
    fn name() -> &'static str {
        Self::NAME
    }
}

impl<T> Platform for T where
    T: OsMemory + OsThreads + OsAtomics + OsSync + OsClock + OsLogSinks + OsProcess + OsDylib + OsModulePaths
{
}
