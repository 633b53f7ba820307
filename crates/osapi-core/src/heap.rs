//! Size-tracking heap over `std::alloc`
//!
//! `std::alloc` needs the original layout to free or resize a block, while
//! the table's `free`/`realloc` slots only receive the pointer. Each block
//! therefore carries a small header in front of the user pointer holding the
//! requested size.

use core::ptr::NonNull;
use std::alloc::{self, Layout};

/// Header size; also the alignment of every returned pointer
const HEADER: usize = 16;

#[inline]
fn layout_for(size: usize) -> Option<Layout> {
    let total = size.checked_add(HEADER)?;
    Layout::from_size_align(total, HEADER).ok()
}

/// Safety: `base` points at a block of at least HEADER bytes
#[inline]
unsafe fn finish(base: *mut u8, size: usize) -> Option<NonNull<u8>> {
    let base = NonNull::new(base)?;
    (base.as_ptr() as *mut usize).write(size);
    Some(NonNull::new_unchecked(base.as_ptr().add(HEADER)))
}

/// Safety: `ptr` was returned by this module and is still live
#[inline]
unsafe fn header(ptr: NonNull<u8>) -> (*mut u8, usize) {
    let base = ptr.as_ptr().sub(HEADER);
    (base, (base as *const usize).read())
}

/// Allocate `size` uninitialized bytes
pub fn alloc(size: usize) -> Option<NonNull<u8>> {
    let layout = layout_for(size)?;
    // Safety: layout has non-zero size (at least HEADER)
    unsafe { finish(alloc::alloc(layout), size) }
}

/// Allocate `size` zeroed bytes
pub fn alloc_zeroed(size: usize) -> Option<NonNull<u8>> {
    let layout = layout_for(size)?;
    // Safety: layout has non-zero size (at least HEADER)
    unsafe { finish(alloc::alloc_zeroed(layout), size) }
}

/// Resize a block; on failure the original block is untouched
///
/// # Safety
///
/// `ptr` must come from this module and not have been freed.
pub unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Option<NonNull<u8>> {
    let (base, old_size) = header(ptr);
    let old_layout = layout_for(old_size)?;
    let new_layout = layout_for(size)?;
    finish(alloc::realloc(base, old_layout, new_layout.size()), size)
}

/// Release a block
///
/// # Safety
///
/// `ptr` must come from this module and be freed exactly once.
pub unsafe fn dealloc(ptr: NonNull<u8>) {
    let (base, size) = header(ptr);
    if let Some(layout) = layout_for(size) {
        alloc::dealloc(base, layout);
    }
}

/// Usable size of a live block
///
/// # Safety
///
/// `ptr` must come from this module and not have been freed.
pub unsafe fn usable_size(ptr: NonNull<u8>) -> usize {
    header(ptr).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_free() {
        let p = alloc(100).unwrap();
        assert_eq!(p.as_ptr() as usize % HEADER, 0);
        unsafe {
            assert_eq!(usable_size(p), 100);
            core::ptr::write_bytes(p.as_ptr(), 0xAB, 100);
            dealloc(p);
        }
    }

    #[test]
    fn test_zeroed() {
        let p = alloc_zeroed(64).unwrap();
        let bytes = unsafe { core::slice::from_raw_parts(p.as_ptr(), 64) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { dealloc(p) };
    }

    #[test]
    fn test_realloc_preserves_prefix() {
        let p = alloc(8).unwrap();
        unsafe {
            for i in 0..8 {
                *p.as_ptr().add(i) = i as u8;
            }
            let q = realloc(p, 4096).unwrap();
            assert_eq!(usable_size(q), 4096);
            let bytes = core::slice::from_raw_parts(q.as_ptr(), 8);
            assert_eq!(bytes, &[0, 1, 2, 3, 4, 5, 6, 7]);
            dealloc(q);
        }
    }

    #[test]
    fn test_zero_size() {
        let p = alloc(0).unwrap();
        unsafe { dealloc(p) };
    }

    #[test]
    fn test_overflow_is_none() {
        assert!(alloc(usize::MAX).is_none());
    }
}
