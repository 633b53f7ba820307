//! Heap slots over the libc allocator, counted

use core::ptr::NonNull;

use osapi_core::counters;
use osapi_core::traits::OsMemory;

use super::PosixBackend;

// Zero-size requests are rounded up to one byte so success is never NULL.

impl OsMemory for PosixBackend {
    fn malloc(size: usize) -> Option<NonNull<u8>> {
        counters::count_malloc();
        // Safety: plain libc allocation
        NonNull::new(unsafe { libc::malloc(size.max(1)) } as *mut u8)
    }

    unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>> {
        counters::count_realloc();
        NonNull::new(libc::realloc(ptr.as_ptr() as *mut libc::c_void, size.max(1)) as *mut u8)
    }

    fn calloc(size: usize) -> Option<NonNull<u8>> {
        counters::count_calloc();
        // Safety: plain libc allocation
        NonNull::new(unsafe { libc::calloc(1, size.max(1)) } as *mut u8)
    }

    unsafe fn free(ptr: NonNull<u8>) {
        counters::count_free();
        libc::free(ptr.as_ptr() as *mut libc::c_void)
    }
}
