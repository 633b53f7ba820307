//! pthread mutexes and condition variables
//!
//! Each primitive lives in its own heap cell so its address stays fixed
//! for the lifetime of the handle.

use core::cell::UnsafeCell;
use core::ptr::{self, NonNull};

use osapi_core::handle::{CondHandle, MutexHandle};
use osapi_core::traits::{Backend, OsSync};

use super::{check, PosixBackend};

type RawMutex = UnsafeCell<libc::pthread_mutex_t>;
type RawCond = UnsafeCell<libc::pthread_cond_t>;

#[inline]
fn raw_mutex(mutex: &MutexHandle) -> *mut libc::pthread_mutex_t {
    // Safety: handle is live while borrowed
    unsafe { mutex.ptr_for::<RawMutex>(PosixBackend::NAME).as_ref() }.get()
}

#[inline]
fn raw_cond(cond: &CondHandle) -> *mut libc::pthread_cond_t {
    // Safety: handle is live while borrowed
    unsafe { cond.ptr_for::<RawCond>(PosixBackend::NAME).as_ref() }.get()
}

impl OsSync for PosixBackend {
    fn mutex_new() -> MutexHandle {
        let cell: Box<RawMutex> = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));
        // Safety: cell is at its final address
        check(unsafe { libc::pthread_mutex_init(cell.get(), ptr::null()) }, "pthread_mutex_init");
        // Safety: fresh box, reclaimed once in mutex_free
        unsafe { MutexHandle::from_ptr(NonNull::from(Box::leak(cell)), Self::NAME) }
    }

    fn mutex_free(mutex: MutexHandle) {
        let ptr = mutex.into_ptr_for::<RawMutex>(Self::NAME);
        // Safety: leaked by mutex_new above
        let cell = unsafe { Box::from_raw(ptr.as_ptr()) };
        check(unsafe { libc::pthread_mutex_destroy(cell.get()) }, "pthread_mutex_destroy");
    }

    fn mutex_lock(mutex: &MutexHandle) {
        check(unsafe { libc::pthread_mutex_lock(raw_mutex(mutex)) }, "pthread_mutex_lock");
    }

    fn mutex_unlock(mutex: &MutexHandle) {
        check(unsafe { libc::pthread_mutex_unlock(raw_mutex(mutex)) }, "pthread_mutex_unlock");
    }

    fn cond_new() -> CondHandle {
        let cell: Box<RawCond> = Box::new(UnsafeCell::new(libc::PTHREAD_COND_INITIALIZER));
        // Safety: cell is at its final address
        check(unsafe { libc::pthread_cond_init(cell.get(), ptr::null()) }, "pthread_cond_init");
        // Safety: fresh box, reclaimed once in cond_free
        unsafe { CondHandle::from_ptr(NonNull::from(Box::leak(cell)), Self::NAME) }
    }

    fn cond_free(cond: CondHandle) {
        let ptr = cond.into_ptr_for::<RawCond>(Self::NAME);
        // Safety: leaked by cond_new above
        let cell = unsafe { Box::from_raw(ptr.as_ptr()) };
        check(unsafe { libc::pthread_cond_destroy(cell.get()) }, "pthread_cond_destroy");
    }

    fn cond_signal(cond: &CondHandle) {
        check(unsafe { libc::pthread_cond_signal(raw_cond(cond)) }, "pthread_cond_signal");
    }

    fn cond_broadcast(cond: &CondHandle) {
        check(unsafe { libc::pthread_cond_broadcast(raw_cond(cond)) }, "pthread_cond_broadcast");
    }

    fn cond_wait(cond: &CondHandle, mutex: &MutexHandle) {
        check(
            unsafe { libc::pthread_cond_wait(raw_cond(cond), raw_mutex(mutex)) },
            "pthread_cond_wait",
        );
    }
}
