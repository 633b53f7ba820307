//! The OS API table
//!
//! `OsApiTable` holds one function pointer per capability slot and is the
//! unit of substitution: a whole table is installed at once with
//! `binding::install_custom`. Rust function pointers are never null, so every
//! slot of any table value is callable.
//!
//! Single slots are overridden with struct-update syntax:
//!
//! ```ignore
//! let table = OsApiTable {
//!     malloc: my_tracking_malloc,
//!     ..OsApiTable::from_platform::<PosixBackend>()
//! };
//! osapi_core::install_custom(table);
//! ```

use core::ptr::NonNull;
use core::sync::atomic::AtomicI32;
use std::ffi::c_char;

use crate::handle::{CondHandle, DlHandle, MutexHandle, OsProc, ThreadCallback, ThreadHandle};
use crate::time::Timestamp;
use crate::traits::Platform;

// Memory management
pub type MallocFn = fn(usize) -> Option<NonNull<u8>>;
pub type ReallocFn = unsafe fn(NonNull<u8>, usize) -> Option<NonNull<u8>>;
pub type CallocFn = fn(usize) -> Option<NonNull<u8>>;
pub type FreeFn = unsafe fn(NonNull<u8>);

// Strings
pub type StrdupFn = fn(&str) -> Option<NonNull<c_char>>;

// Threads
pub type ThreadNewFn = fn(ThreadCallback, usize) -> Option<ThreadHandle>;
pub type ThreadJoinFn = fn(ThreadHandle) -> usize;

// Atomic increment / decrement
pub type AtomicFn = fn(&AtomicI32) -> i32;

// Mutex
pub type MutexNewFn = fn() -> MutexHandle;
pub type MutexFreeFn = fn(MutexHandle);
pub type MutexLockFn = fn(&MutexHandle);

// Condition variable
pub type CondNewFn = fn() -> CondHandle;
pub type CondFreeFn = fn(CondHandle);
pub type CondSignalFn = fn(&CondHandle);
pub type CondWaitFn = fn(&CondHandle, &MutexHandle);

// Time
pub type SleepFn = fn(i32, i32);
pub type GetTimeFn = fn() -> Timestamp;

// Logging
pub type LogFn = fn(&str);

// Application termination
pub type AbortFn = fn() -> !;

// Dynamic libraries
pub type DlOpenFn = fn(&str) -> Option<DlHandle>;
pub type DlProcFn = fn(&DlHandle, &str) -> Option<OsProc>;
pub type DlCloseFn = fn(DlHandle);

// Module id translation
pub type ModuleToPathFn = fn(&str) -> Option<String>;

/// One function pointer per OS capability
#[derive(Clone, Copy)]
pub struct OsApiTable {
    /* Memory management */
    pub malloc: MallocFn,
    pub realloc: ReallocFn,
    pub calloc: CallocFn,
    pub free: FreeFn,

    /* Strings */
    pub strdup: StrdupFn,

    /* Threads */
    pub thread_new: ThreadNewFn,
    pub thread_join: ThreadJoinFn,

    /* Atomic increment / decrement */
    pub ainc: AtomicFn,
    pub adec: AtomicFn,

    /* Mutex */
    pub mutex_new: MutexNewFn,
    pub mutex_free: MutexFreeFn,
    pub mutex_lock: MutexLockFn,
    pub mutex_unlock: MutexLockFn,

    /* Condition variable */
    pub cond_new: CondNewFn,
    pub cond_free: CondFreeFn,
    pub cond_signal: CondSignalFn,
    pub cond_broadcast: CondSignalFn,
    pub cond_wait: CondWaitFn,

    /* Time */
    pub sleep: SleepFn,
    pub get_time: GetTimeFn,

    /* Logging */
    pub log: LogFn,
    pub log_error: LogFn,
    pub log_debug: LogFn,
    pub log_warning: LogFn,

    /* Application termination */
    pub abort: AbortFn,

    /* Dynamic library loading */
    pub dlopen: DlOpenFn,
    pub dlproc: DlProcFn,
    pub dlclose: DlCloseFn,

    /// Logical module id to shared library filename
    pub module_to_dl: ModuleToPathFn,

    /// Logical module id to a directory of module resources / assets
    pub module_to_etc: ModuleToPathFn,
}

impl OsApiTable {
    /// Fill every slot from a backend's capability traits
    pub fn from_platform<P: Platform>() -> Self {
        Self {
            malloc: P::malloc,
            realloc: P::realloc,
            calloc: P::calloc,
            free: P::free,
            strdup: P::strdup,
            thread_new: P::thread_new,
            thread_join: P::thread_join,
            ainc: P::ainc,
            adec: P::adec,
            mutex_new: P::mutex_new,
            mutex_free: P::mutex_free,
            mutex_lock: P::mutex_lock,
            mutex_unlock: P::mutex_unlock,
            cond_new: P::cond_new,
            cond_free: P::cond_free,
            cond_signal: P::cond_signal,
            cond_broadcast: P::cond_broadcast,
            cond_wait: P::cond_wait,
            sleep: P::sleep,
            get_time: P::get_time,
            log: P::log,
            log_error: P::log_error,
            log_debug: P::log_debug,
            log_warning: P::log_warning,
            abort: P::abort,
            dlopen: P::dlopen,
            dlproc: P::dlproc,
            dlclose: P::dlclose,
            module_to_dl: P::module_to_dl,
            module_to_etc: P::module_to_etc,
        }
    }
}

impl core::fmt::Debug for OsApiTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OsApiTable")
            .field("malloc", &(self.malloc as usize as *const ()))
            .field("thread_new", &(self.thread_new as usize as *const ()))
            .field("mutex_new", &(self.mutex_new as usize as *const ()))
            .field("get_time", &(self.get_time as usize as *const ()))
            .field("log", &(self.log as usize as *const ()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockBackend};

    #[test]
    fn test_from_platform_fills_slots() {
        let table = OsApiTable::from_platform::<MockBackend>();

        let p = (table.malloc)(16).unwrap();
        unsafe { (table.free)(p) };

        let t = (table.get_time)();
        assert!(t.nanosec < crate::NANOS_PER_SEC);

        assert!((table.module_to_dl)("a.b").is_some());
    }

    #[test]
    fn test_slot_override() {
        let base = OsApiTable::from_platform::<MockBackend>();
        let table = OsApiTable {
            malloc: mock::null_malloc,
            ..base
        };

        assert!((table.malloc)(8).is_none());
        // other slots untouched
        let p = (table.calloc)(8).unwrap();
        unsafe { (table.free)(p) };
    }
}
