//! Opaque resource handles
//!
//! Each handle is a pointer-width token produced by one backend's "new/open"
//! slot and consumed by the matching "join/free/close" slot. Handles are not
//! `Clone`; consuming slots take them by value, so a handle can be released
//! exactly once.
//!
//! Every handle remembers the name of the backend that created it. Backends
//! read the raw value through `ptr_for` / `into_ptr_for`, which abort the
//! process if the handle came from a different backend.

use core::num::NonZeroUsize;
use core::ptr::NonNull;

/// Thread entry point: receives the spawn argument, returns the join value
pub type ThreadCallback = fn(usize) -> usize;

/// Generic procedure address resolved from a dynamic library
pub type OsProc = unsafe extern "C" fn();

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            raw: NonZeroUsize,
            backend: &'static str,
        }

        impl $name {
            /// Wrap a backend resource pointer.
            ///
            /// # Safety
            ///
            /// `ptr` must name a live resource of this kind created by the
            /// backend called `backend`, and must not be wrapped twice.
            #[inline]
            pub unsafe fn from_ptr<T>(ptr: NonNull<T>, backend: &'static str) -> Self {
                Self {
                    raw: NonZeroUsize::new_unchecked(ptr.as_ptr() as usize),
                    backend,
                }
            }

            /// Raw token value
            #[inline]
            pub fn as_raw(&self) -> usize {
                self.raw.get()
            }

            /// Name of the backend that produced this handle
            #[inline]
            pub fn backend(&self) -> &'static str {
                self.backend
            }

            /// Resource pointer, checked against the calling backend
            #[inline]
            pub fn ptr_for<T>(&self, backend: &'static str) -> NonNull<T> {
                if self.backend != backend {
                    foreign_handle(stringify!($name), self.backend, backend);
                }
                // Safety: raw is non-zero by construction
                unsafe { NonNull::new_unchecked(self.raw.get() as *mut T) }
            }

            /// Consume the handle, returning the checked resource pointer
            #[inline]
            pub fn into_ptr_for<T>(self, backend: &'static str) -> NonNull<T> {
                self.ptr_for(backend)
            }
        }
    };
}

opaque_handle!(
    /// Joinable thread created by `thread_new`
    ThreadHandle
);

opaque_handle!(
    /// Mutex created by `mutex_new`
    MutexHandle
);

opaque_handle!(
    /// Condition variable created by `cond_new`
    CondHandle
);

opaque_handle!(
    /// Dynamic library opened by `dlopen`
    DlHandle
);

#[cold]
#[inline(never)]
fn foreign_handle(kind: &str, owner: &str, user: &str) -> ! {
    crate::logging::write_fatal(format_args!(
        "{} created by backend '{}' passed to backend '{}'",
        kind, owner, user
    ));
    std::process::abort()
}
