//! Deterministic backend and slot doubles for tests
//!
//! `MockBackend` never creates an OS thread and never blocks:
//!
//! - memory comes from the size-tracking heap and is not counted
//! - `thread_new` runs the callback inline and parks the result in the handle
//! - mutexes only track a locked flag; condition waits return at once
//!   (a spurious wakeup, which callers must tolerate anyway)
//! - the clock is a process-wide fake that `sleep` advances
//! - `dlopen` always fails
//!
//! The free functions and the `OsApiTable::with_*` builders patch single
//! groups of slots, so they also work on top of a real backend's table.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::ffi::c_char;
use std::sync::{Mutex, MutexGuard};

use crate::handle::{CondHandle, DlHandle, MutexHandle, OsProc, ThreadCallback, ThreadHandle};
use crate::heap;
use crate::logging::LogLevel;
use crate::paths;
use crate::table::OsApiTable;
use crate::time::Timestamp;
use crate::traits::{
    Backend, OsAtomics, OsClock, OsDylib, OsLogSinks, OsMemory, OsModulePaths, OsProcess, OsSync,
    OsThreads,
};

/// Resource root used by the mock `module_to_etc`
pub const MOCK_ETC_ROOT: &str = "etc";

/// Single-threaded, deterministic backend
pub struct MockBackend;

impl Backend for MockBackend {
    const NAME: &'static str = "mock";
}

impl OsMemory for MockBackend {
    fn malloc(size: usize) -> Option<NonNull<u8>> {
        heap::alloc(size)
    }

    unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>> {
        heap::realloc(ptr, size)
    }

    fn calloc(size: usize) -> Option<NonNull<u8>> {
        heap::alloc_zeroed(size)
    }

    unsafe fn free(ptr: NonNull<u8>) {
        heap::dealloc(ptr)
    }
}

impl OsThreads for MockBackend {
    fn thread_new(callback: ThreadCallback, arg: usize) -> Option<ThreadHandle> {
        let result = Box::new(callback(arg));
        // Safety: fresh box, reclaimed once in thread_join
        Some(unsafe { ThreadHandle::from_ptr(NonNull::from(Box::leak(result)), Self::NAME) })
    }

    fn thread_join(thread: ThreadHandle) -> usize {
        let ptr = thread.into_ptr_for::<usize>(Self::NAME);
        // Safety: leaked by thread_new above
        *unsafe { Box::from_raw(ptr.as_ptr()) }
    }
}

impl OsAtomics for MockBackend {}

struct MockMutex {
    locked: AtomicBool,
}

impl OsSync for MockBackend {
    fn mutex_new() -> MutexHandle {
        let m = Box::new(MockMutex { locked: AtomicBool::new(false) });
        // Safety: fresh box, reclaimed once in mutex_free
        unsafe { MutexHandle::from_ptr(NonNull::from(Box::leak(m)), Self::NAME) }
    }

    fn mutex_free(mutex: MutexHandle) {
        let ptr = mutex.into_ptr_for::<MockMutex>(Self::NAME);
        // Safety: leaked by mutex_new above
        let m = unsafe { Box::from_raw(ptr.as_ptr()) };
        assert!(!m.locked.load(Ordering::Relaxed), "mock mutex freed while locked");
    }

    fn mutex_lock(mutex: &MutexHandle) {
        // Safety: handle is live while borrowed
        let m = unsafe { mutex.ptr_for::<MockMutex>(Self::NAME).as_ref() };
        // With no other threads a second lock can never succeed
        assert!(!m.locked.swap(true, Ordering::Acquire), "mock mutex locked twice");
    }

    fn mutex_unlock(mutex: &MutexHandle) {
        // Safety: handle is live while borrowed
        let m = unsafe { mutex.ptr_for::<MockMutex>(Self::NAME).as_ref() };
        assert!(m.locked.swap(false, Ordering::Release), "mock mutex unlocked while not held");
    }

    fn cond_new() -> CondHandle {
        let wakeups = Box::new(AtomicUsize::new(0));
        // Safety: fresh box, reclaimed once in cond_free
        unsafe { CondHandle::from_ptr(NonNull::from(Box::leak(wakeups)), Self::NAME) }
    }

    fn cond_free(cond: CondHandle) {
        let ptr = cond.into_ptr_for::<AtomicUsize>(Self::NAME);
        // Safety: leaked by cond_new above
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }

    fn cond_signal(cond: &CondHandle) {
        // Safety: handle is live while borrowed
        let w = unsafe { cond.ptr_for::<AtomicUsize>(Self::NAME).as_ref() };
        w.fetch_add(1, Ordering::Relaxed);
    }

    fn cond_broadcast(cond: &CondHandle) {
        Self::cond_signal(cond);
    }

    fn cond_wait(cond: &CondHandle, mutex: &MutexHandle) {
        let _ = cond.ptr_for::<AtomicUsize>(Self::NAME);
        // Safety: handle is live while borrowed
        let m = unsafe { mutex.ptr_for::<MockMutex>(Self::NAME).as_ref() };
        assert!(m.locked.load(Ordering::Relaxed), "cond_wait without holding the mutex");
    }
}

impl OsClock for MockBackend {
    fn sleep(sec: i32, nanosec: i32) {
        fake_sleep(sec, nanosec);
    }

    fn get_time() -> Timestamp {
        fake_get_time()
    }
}

impl OsLogSinks for MockBackend {}

impl OsProcess for MockBackend {
    fn abort() -> ! {
        panicking_abort()
    }
}

impl OsDylib for MockBackend {
    fn dlopen(_libname: &str) -> Option<DlHandle> {
        None
    }

    fn dlproc(lib: &DlHandle, _procname: &str) -> Option<OsProc> {
        let _ = lib.ptr_for::<u8>(Self::NAME);
        None
    }

    fn dlclose(lib: DlHandle) {
        let _ = lib.into_ptr_for::<u8>(Self::NAME);
    }
}

impl OsModulePaths for MockBackend {
    fn module_to_dl(module_id: &str) -> Option<String> {
        paths::module_dl_name(module_id)
    }

    fn module_to_etc(module_id: &str) -> Option<String> {
        paths::module_etc_path(MOCK_ETC_ROOT, module_id)
    }
}

// ============================================================================
// Failing allocators
// ============================================================================

pub fn null_malloc(_size: usize) -> Option<NonNull<u8>> {
    None
}

pub fn null_calloc(_size: usize) -> Option<NonNull<u8>> {
    None
}

/// # Safety
///
/// Never touches `ptr`; unsafe only to fit the `realloc` slot.
pub unsafe fn null_realloc(_ptr: NonNull<u8>, _size: usize) -> Option<NonNull<u8>> {
    None
}

pub fn null_strdup(_s: &str) -> Option<NonNull<c_char>> {
    None
}

// ============================================================================
// Fake clock
// ============================================================================

static FAKE_NANOS: AtomicU64 = AtomicU64::new(0);

/// Process-wide fake monotonic clock
pub struct FakeClock;

impl FakeClock {
    /// Current fake reading
    pub fn now() -> Timestamp {
        Timestamp::from_nanos(FAKE_NANOS.load(Ordering::SeqCst))
    }

    pub fn set(t: Timestamp) {
        FAKE_NANOS.store(t.as_nanos(), Ordering::SeqCst);
    }

    pub fn advance(by: Timestamp) {
        FAKE_NANOS.fetch_add(by.as_nanos(), Ordering::SeqCst);
    }
}

/// `get_time` slot reading the fake clock
pub fn fake_get_time() -> Timestamp {
    FakeClock::now()
}

/// `sleep` slot advancing the fake clock instead of blocking
pub fn fake_sleep(sec: i32, nanosec: i32) {
    let nanos = sec.max(0) as u64 * 1_000_000_000 + nanosec.max(0) as u64;
    FAKE_NANOS.fetch_add(nanos, Ordering::SeqCst);
}

// ============================================================================
// Log capture
// ============================================================================

static CAPTURED: Mutex<Vec<(LogLevel, String)>> = Mutex::new(Vec::new());

fn capture(level: LogLevel, msg: &str) {
    let mut logs = CAPTURED.lock().unwrap_or_else(|e| e.into_inner());
    logs.push((level, msg.to_owned()));
}

pub fn capture_info(msg: &str) {
    capture(LogLevel::Info, msg);
}

pub fn capture_warning(msg: &str) {
    capture(LogLevel::Warn, msg);
}

pub fn capture_error(msg: &str) {
    capture(LogLevel::Error, msg);
}

pub fn capture_debug(msg: &str) {
    capture(LogLevel::Debug, msg);
}

/// Messages captured so far, oldest first
pub fn captured_logs() -> Vec<(LogLevel, String)> {
    CAPTURED.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

pub fn clear_captured_logs() {
    CAPTURED.lock().unwrap_or_else(|e| e.into_inner()).clear();
}

/// Log sink that drops everything
pub fn discard_log(_msg: &str) {}

// ============================================================================
// Abort / serialization
// ============================================================================

/// `abort` slot that unwinds instead of killing the test process
pub fn panicking_abort() -> ! {
    panic!("osapi: abort called")
}

static EXCLUSIVE: Mutex<()> = Mutex::new(());

/// Serialize tests that install tables or touch other process-wide state
///
/// A panicking holder does not poison later tests.
pub fn exclusive() -> MutexGuard<'static, ()> {
    EXCLUSIVE.lock().unwrap_or_else(|e| e.into_inner())
}

// ============================================================================
// Table builders
// ============================================================================

impl OsApiTable {
    /// Table filled entirely from `MockBackend`
    pub fn mock() -> Self {
        Self::from_platform::<MockBackend>()
    }

    /// Route all four log sinks into the capture buffer
    pub fn with_capturing_logs(self) -> Self {
        Self {
            log: capture_info,
            log_warning: capture_warning,
            log_error: capture_error,
            log_debug: capture_debug,
            ..self
        }
    }

    /// Use the fake clock for `get_time` and `sleep`
    pub fn with_fake_clock(self) -> Self {
        Self {
            get_time: fake_get_time,
            sleep: fake_sleep,
            ..self
        }
    }

    /// Make every allocating slot fail
    pub fn with_failing_alloc(self) -> Self {
        Self {
            malloc: null_malloc,
            calloc: null_calloc,
            realloc: null_realloc,
            strdup: null_strdup,
            ..self
        }
    }

    /// Inline threads and flag-only sync primitives
    pub fn single_threaded(self) -> Self {
        Self {
            thread_new: MockBackend::thread_new,
            thread_join: MockBackend::thread_join,
            mutex_new: MockBackend::mutex_new,
            mutex_free: MockBackend::mutex_free,
            mutex_lock: MockBackend::mutex_lock,
            mutex_unlock: MockBackend::mutex_unlock,
            cond_new: MockBackend::cond_new,
            cond_free: MockBackend::cond_free,
            cond_signal: MockBackend::cond_signal,
            cond_broadcast: MockBackend::cond_broadcast,
            cond_wait: MockBackend::cond_wait,
            ..self
        }
    }
}
