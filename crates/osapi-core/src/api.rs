//! Call-site wrappers, one per slot
//!
//! Each function reads the active table and forwards to its slot. Panics if
//! no table has been installed (see `binding::current`).

use core::ptr::NonNull;
use core::sync::atomic::AtomicI32;

use crate::binding::current;
use crate::buf::OsBuf;
use crate::error::{OsError, OsResult};
use crate::handle::{CondHandle, DlHandle, MutexHandle, OsProc, ThreadCallback, ThreadHandle};
use crate::time::Timestamp;

// ============================================================================
// Memory
// ============================================================================

#[inline]
pub fn malloc(size: usize) -> Option<NonNull<u8>> {
    (current().malloc)(size)
}

/// # Safety
///
/// `ptr` must come from the active table's allocator and still be live.
#[inline]
pub unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>> {
    (current().realloc)(ptr, size)
}

#[inline]
pub fn calloc(size: usize) -> Option<NonNull<u8>> {
    (current().calloc)(size)
}

/// # Safety
///
/// `ptr` must come from the active table's allocator and be freed once.
#[inline]
pub unsafe fn free(ptr: NonNull<u8>) {
    (current().free)(ptr)
}

/// NUL-terminated copy of `s`; the buffer length includes the terminator
///
/// A custom `strdup` slot must allocate through the same heap as the
/// table's `free` slot, as the default body does.
pub fn strdup(s: &str) -> Option<OsBuf> {
    let table = current();
    let ptr = (table.strdup)(s)?;
    // Safety: the strdup slot allocates s.len() + 1 initialized bytes
    // through table.malloc, which pairs with table.free
    Some(unsafe { OsBuf::from_raw_parts(ptr.cast(), s.len() + 1, table) })
}

// ============================================================================
// Threads
// ============================================================================

#[inline]
pub fn thread_new(callback: ThreadCallback, arg: usize) -> Option<ThreadHandle> {
    (current().thread_new)(callback, arg)
}

#[inline]
pub fn thread_join(thread: ThreadHandle) -> usize {
    (current().thread_join)(thread)
}

type Job = Box<dyn FnOnce() -> usize + Send + 'static>;

fn run_boxed(arg: usize) -> usize {
    // Safety: arg is the Box<Job> leaked by thread_spawn, run exactly once
    let job = unsafe { Box::from_raw(arg as *mut Job) };
    job()
}

/// Run a closure on a new thread through the `thread_new` slot
///
/// ```ignore
/// let data = vec![1, 2, 3];
/// let h = api::thread_spawn(move || data.iter().sum())?;
/// assert_eq!(api::thread_join(h), 6);
/// ```
pub fn thread_spawn<F>(f: F) -> OsResult<ThreadHandle>
where
    F: FnOnce() -> usize + Send + 'static,
{
    let job: Box<Job> = Box::new(Box::new(f));
    let arg = Box::into_raw(job) as usize;
    match (current().thread_new)(run_boxed, arg) {
        Some(handle) => Ok(handle),
        None => {
            // Spawn refused: the callback never ran, reclaim the closure
            // Safety: arg was not handed to any thread
            drop(unsafe { Box::from_raw(arg as *mut Job) });
            Err(OsError::SpawnFailed)
        }
    }
}

// ============================================================================
// Atomics
// ============================================================================

#[inline]
pub fn ainc(value: &AtomicI32) -> i32 {
    (current().ainc)(value)
}

#[inline]
pub fn adec(value: &AtomicI32) -> i32 {
    (current().adec)(value)
}

// ============================================================================
// Mutex / condition variable
// ============================================================================

#[inline]
pub fn mutex_new() -> MutexHandle {
    (current().mutex_new)()
}

#[inline]
pub fn mutex_free(mutex: MutexHandle) {
    (current().mutex_free)(mutex)
}

#[inline]
pub fn mutex_lock(mutex: &MutexHandle) {
    (current().mutex_lock)(mutex)
}

#[inline]
pub fn mutex_unlock(mutex: &MutexHandle) {
    (current().mutex_unlock)(mutex)
}

#[inline]
pub fn cond_new() -> CondHandle {
    (current().cond_new)()
}

#[inline]
pub fn cond_free(cond: CondHandle) {
    (current().cond_free)(cond)
}

#[inline]
pub fn cond_signal(cond: &CondHandle) {
    (current().cond_signal)(cond)
}

#[inline]
pub fn cond_broadcast(cond: &CondHandle) {
    (current().cond_broadcast)(cond)
}

#[inline]
pub fn cond_wait(cond: &CondHandle, mutex: &MutexHandle) {
    (current().cond_wait)(cond, mutex)
}

// ============================================================================
// Time / process
// ============================================================================

#[inline]
pub fn sleep(sec: i32, nanosec: i32) {
    (current().sleep)(sec, nanosec)
}

#[inline]
pub fn get_time() -> Timestamp {
    (current().get_time)()
}

pub fn abort() -> ! {
    (current().abort)()
}

// ============================================================================
// Dynamic libraries / modules
// ============================================================================

#[inline]
pub fn dlopen(libname: &str) -> Option<DlHandle> {
    (current().dlopen)(libname)
}

#[inline]
pub fn dlproc(lib: &DlHandle, procname: &str) -> Option<OsProc> {
    (current().dlproc)(lib, procname)
}

#[inline]
pub fn dlclose(lib: DlHandle) {
    (current().dlclose)(lib)
}

#[inline]
pub fn module_to_dl(module_id: &str) -> Option<String> {
    (current().module_to_dl)(module_id)
}

#[inline]
pub fn module_to_etc(module_id: &str) -> Option<String> {
    (current().module_to_etc)(module_id)
}

/// Resolve a module id to its library and open it
pub fn open_module(module_id: &str) -> OsResult<DlHandle> {
    let table = current();
    let libname = (table.module_to_dl)(module_id)
        .ok_or_else(|| OsError::LibraryNotFound(module_id.to_owned()))?;
    (table.dlopen)(&libname).ok_or(OsError::LibraryNotFound(libname))
}

/// Like `dlproc`, with the missing symbol named in the error
pub fn require_proc(lib: &DlHandle, procname: &str) -> OsResult<OsProc> {
    (current().dlproc)(lib, procname).ok_or_else(|| OsError::SymbolNotFound(procname.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::install_custom;
    use crate::mock;
    use crate::table::OsApiTable;
    use std::sync::Arc;

    fn square(x: usize) -> usize {
        x * x
    }

    #[test]
    fn test_thread_new_join() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        let h = thread_new(square, 12).unwrap();
        assert_eq!(thread_join(h), 144);
    }

    #[test]
    fn test_thread_spawn_closure() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        let data = vec![1usize, 2, 3, 4];
        let h = thread_spawn(move || data.iter().sum()).unwrap();
        assert_eq!(thread_join(h), 10);
    }

    fn refuse_spawn(_cb: ThreadCallback, _arg: usize) -> Option<ThreadHandle> {
        None
    }

    #[test]
    fn test_thread_spawn_refused_drops_closure() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable {
            thread_new: refuse_spawn,
            ..OsApiTable::mock()
        });

        let token = Arc::new(());
        let held = Arc::clone(&token);
        let result = thread_spawn(move || Arc::strong_count(&held));
        assert_eq!(result.err(), Some(OsError::SpawnFailed));
        assert_eq!(Arc::strong_count(&token), 1);
    }

    #[test]
    fn test_strdup_terminated() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        let s = strdup("engine").unwrap();
        assert_eq!(&s[..], b"engine\0");
    }

    #[test]
    fn test_strdup_uses_table_malloc() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable {
            malloc: mock::null_malloc,
            ..OsApiTable::mock()
        });

        assert!(strdup("abc").is_none());
        install_custom(OsApiTable::mock());
    }

    #[test]
    fn test_atomics() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        let v = AtomicI32::new(0);
        assert_eq!(ainc(&v), 1);
        assert_eq!(ainc(&v), 2);
        assert_eq!(adec(&v), 1);
        assert_eq!(adec(&v), 0);
        assert_eq!(adec(&v), -1);
    }

    #[test]
    fn test_mutex_cond_roundtrip() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        let m = mutex_new();
        let c = cond_new();
        mutex_lock(&m);
        cond_broadcast(&c);
        cond_wait(&c, &m);
        mutex_unlock(&m);
        cond_free(c);
        mutex_free(m);
    }

    #[test]
    fn test_open_module_errors() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        assert!(matches!(open_module("bad..id"), Err(OsError::LibraryNotFound(id)) if id == "bad..id"));
        match open_module("game.physics") {
            Err(OsError::LibraryNotFound(name)) => assert!(name.contains("game_physics")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_module_paths() {
        let _guard = mock::exclusive();
        install_custom(OsApiTable::mock());

        assert!(module_to_dl("a.b.c").unwrap().contains("a_b_c"));
        assert!(module_to_etc("a.b.c").unwrap().ends_with('c'));
        assert!(module_to_dl("").is_none());
    }
}
