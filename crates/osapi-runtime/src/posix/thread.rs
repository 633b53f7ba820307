//! pthread create / join

use core::ptr::{self, NonNull};
use std::panic::{self, AssertUnwindSafe};

use nix::errno::Errno;
use osapi_core::handle::{ThreadCallback, ThreadHandle};
use osapi_core::traits::{Backend, OsThreads};
use osapi_core::{logging, os_err};

use super::{check, PosixBackend};

/// Entry data handed to the new thread
struct ThreadStart {
    callback: ThreadCallback,
    arg: usize,
}

extern "C" fn thread_main(data: *mut libc::c_void) -> *mut libc::c_void {
    // Safety: data is the Box<ThreadStart> leaked by thread_new
    let start = unsafe { Box::from_raw(data as *mut ThreadStart) };
    match panic::catch_unwind(AssertUnwindSafe(|| (start.callback)(start.arg))) {
        Ok(value) => value as *mut libc::c_void,
        Err(_) => {
            // Unwinding out of a C entry point is not allowed
            logging::write_fatal(format_args!("thread callback panicked"));
            std::process::abort()
        }
    }
}

impl OsThreads for PosixBackend {
    fn thread_new(callback: ThreadCallback, arg: usize) -> Option<ThreadHandle> {
        let start = Box::into_raw(Box::new(ThreadStart { callback, arg }));
        // Safety: pthread_t is plain data, filled by pthread_create
        let mut tid: Box<libc::pthread_t> = Box::new(unsafe { core::mem::zeroed() });

        // Safety: start stays valid until thread_main reclaims it
        let rc = unsafe {
            libc::pthread_create(&mut *tid, ptr::null(), thread_main, start as *mut libc::c_void)
        };
        if rc != 0 {
            // Safety: the thread was not created, start is still ours
            drop(unsafe { Box::from_raw(start) });
            os_err!("pthread_create failed: {}", Errno::from_raw(rc));
            return None;
        }

        // Safety: fresh box, reclaimed once in thread_join
        Some(unsafe { ThreadHandle::from_ptr(NonNull::from(Box::leak(tid)), Self::NAME) })
    }

    fn thread_join(thread: ThreadHandle) -> usize {
        let ptr = thread.into_ptr_for::<libc::pthread_t>(Self::NAME);
        // Safety: leaked by thread_new above
        let tid = unsafe { Box::from_raw(ptr.as_ptr()) };

        let mut ret: *mut libc::c_void = ptr::null_mut();
        // Safety: tid names a joinable thread, joined exactly once
        check(unsafe { libc::pthread_join(*tid, &mut ret) }, "pthread_join");
        ret as usize
    }
}
