//! Heap slots over `std::alloc`, counted

use core::ptr::NonNull;

use osapi_core::counters;
use osapi_core::heap;
use osapi_core::traits::OsMemory;

use super::PortableBackend;

impl OsMemory for PortableBackend {
    fn malloc(size: usize) -> Option<NonNull<u8>> {
        counters::count_malloc();
        heap::alloc(size)
    }

    unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>> {
        counters::count_realloc();
        heap::realloc(ptr, size)
    }

    fn calloc(size: usize) -> Option<NonNull<u8>> {
        counters::count_calloc();
        heap::alloc_zeroed(size)
    }

    unsafe fn free(ptr: NonNull<u8>) {
        counters::count_free();
        heap::dealloc(ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_roundtrip() {
        let before = counters::alloc_counters();

        let p = PortableBackend::calloc(32).unwrap();
        let p = unsafe { PortableBackend::realloc(p, 64) }.unwrap();
        unsafe { PortableBackend::free(p) };

        let after = counters::alloc_counters();
        assert!(after.calloc > before.calloc);
        assert!(after.realloc > before.realloc);
        assert!(after.free > before.free);
    }

    #[test]
    fn test_strdup_terminates() {
        let _guard = osapi_core::mock::exclusive();
        osapi_core::install_static(crate::portable_table());

        let p = PortableBackend::strdup("abc").unwrap();
        let bytes = unsafe { core::slice::from_raw_parts(p.as_ptr() as *const u8, 4) };
        assert_eq!(bytes, b"abc\0");
        unsafe { PortableBackend::free(p.cast()) };

        crate::install_defaults();
    }
}
