//! Threads via `std::thread::Builder`

use core::ptr::NonNull;
use std::thread::{self, JoinHandle};

use osapi_core::handle::{ThreadCallback, ThreadHandle};
use osapi_core::os_err;
use osapi_core::traits::{Backend, OsThreads};

use super::PortableBackend;

impl OsThreads for PortableBackend {
    fn thread_new(callback: ThreadCallback, arg: usize) -> Option<ThreadHandle> {
        match thread::Builder::new().spawn(move || callback(arg)) {
            Ok(join) => {
                let boxed = Box::new(join);
                // Safety: fresh box, reclaimed once in thread_join
                Some(unsafe { ThreadHandle::from_ptr(NonNull::from(Box::leak(boxed)), Self::NAME) })
            }
            Err(e) => {
                os_err!("thread_new: {}", e);
                None
            }
        }
    }

    fn thread_join(thread: ThreadHandle) -> usize {
        let ptr = thread.into_ptr_for::<JoinHandle<usize>>(Self::NAME);
        // Safety: leaked by thread_new above
        let join = unsafe { Box::from_raw(ptr.as_ptr()) };
        match join.join() {
            Ok(value) => value,
            // A panicking callback has no return value; carry the panic over
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(x: usize) -> usize {
        x * 3
    }

    #[test]
    fn test_new_join_returns_value() {
        let handles: Vec<_> = (0..8)
            .map(|i| PortableBackend::thread_new(triple, i).unwrap())
            .collect();
        let results: Vec<usize> = handles.into_iter().map(PortableBackend::thread_join).collect();
        assert_eq!(results, (0..8).map(triple).collect::<Vec<_>>());
    }

    fn boom(_: usize) -> usize {
        panic!("callback failed")
    }

    #[test]
    #[should_panic(expected = "callback failed")]
    fn test_join_propagates_panic() {
        let h = PortableBackend::thread_new(boom, 0).unwrap();
        PortableBackend::thread_join(h);
    }
}
