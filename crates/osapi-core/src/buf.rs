//! Table-allocated owned buffers
//!
//! `OsBuf` owns a block obtained from a table's allocator slots. It keeps
//! the `free` and `realloc` slots of the table that allocated it, so the
//! block always goes back to the backend it came from, even if another
//! table has been installed since.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::binding;
use crate::error::{OsError, OsResult};
use crate::table::{FreeFn, OsApiTable, ReallocFn};

/// Owned, initialized bytes allocated through an `OsApiTable`
pub struct OsBuf {
    ptr: NonNull<u8>,
    len: usize,
    free: FreeFn,
    realloc: ReallocFn,
}

// Safety: OsBuf uniquely owns its block, like Box<[u8]>
unsafe impl Send for OsBuf {}
unsafe impl Sync for OsBuf {}

impl OsBuf {
    /// Copy `src` into a fresh block from the active table's `malloc`
    ///
    /// Requests at least one byte so an empty copy is still a distinct
    /// allocation. `None` if the allocator fails.
    pub fn copy_from(src: &[u8]) -> Option<Self> {
        Self::copy_from_in(binding::current(), src)
    }

    /// Like `copy_from`, using an explicit table
    pub fn copy_from_in(table: &OsApiTable, src: &[u8]) -> Option<Self> {
        let ptr = (table.malloc)(src.len().max(1))?;
        // Safety: fresh block of at least src.len() bytes, cannot overlap src
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), ptr.as_ptr(), src.len()) };
        // Safety: block from table.malloc, first len bytes initialized
        Some(unsafe { Self::from_raw_parts(ptr, src.len(), table) })
    }

    /// `len` zero bytes from the active table's `calloc`
    pub fn zeroed(len: usize) -> Option<Self> {
        let table = binding::current();
        let ptr = (table.calloc)(len.max(1))?;
        // Safety: calloc returns initialized (zero) bytes
        Some(unsafe { Self::from_raw_parts(ptr, len, table) })
    }

    /// Take ownership of a block
    ///
    /// # Safety
    ///
    /// `ptr` must come from `table`'s allocator slots, hold at least `len`
    /// initialized bytes, and not be owned by anything else.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, table: &OsApiTable) -> Self {
        Self {
            ptr,
            len,
            free: table.free,
            realloc: table.realloc,
        }
    }

    /// Give up ownership; the caller must release the block through the
    /// allocating table's `free` slot.
    pub fn into_raw(self) -> (NonNull<u8>, usize) {
        let parts = (self.ptr, self.len);
        core::mem::forget(self);
        parts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Resize through the allocating table's `realloc`; new bytes are zeroed
    ///
    /// On failure the buffer is left unchanged.
    pub fn resize(&mut self, new_len: usize) -> OsResult<()> {
        // Safety: ptr is a live block from the same backend as self.realloc
        let ptr = unsafe { (self.realloc)(self.ptr, new_len.max(1)) }
            .ok_or(OsError::AllocationFailed)?;
        if new_len > self.len {
            // Safety: block now holds new_len bytes
            unsafe { ptr::write_bytes(ptr.as_ptr().add(self.len), 0, new_len - self.len) };
        }
        self.ptr = ptr;
        self.len = new_len;
        Ok(())
    }
}

impl Deref for OsBuf {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        // Safety: len bytes are initialized and owned
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for OsBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        // Safety: len bytes are initialized and uniquely owned
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for OsBuf {
    fn drop(&mut self) {
        // Safety: block came from the backend that supplied self.free
        unsafe { (self.free)(self.ptr) };
    }
}

impl fmt::Debug for OsBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsBuf")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockBackend};

    fn mock_table() -> OsApiTable {
        OsApiTable::from_platform::<MockBackend>()
    }

    #[test]
    fn test_copy_is_equal_and_distinct() {
        let table = mock_table();
        let src = *b"hello, table";
        let mut copy = OsBuf::copy_from_in(&table, &src).unwrap();

        assert_eq!(&copy[..], &src[..]);
        assert_ne!(copy.as_ptr(), src.as_ptr());

        copy[0] = b'J';
        assert_eq!(src[0], b'h');
    }

    #[test]
    fn test_empty_copy() {
        let buf = OsBuf::copy_from_in(&mock_table(), &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_failing_allocator() {
        let table = OsApiTable {
            malloc: mock::null_malloc,
            ..mock_table()
        };
        assert!(OsBuf::copy_from_in(&table, b"abc").is_none());
    }

    #[test]
    fn test_resize_grow_zero_fills() {
        let mut buf = OsBuf::copy_from_in(&mock_table(), &[1, 2, 3]).unwrap();
        buf.resize(6).unwrap();
        assert_eq!(&buf[..], &[1, 2, 3, 0, 0, 0]);
        buf.resize(2).unwrap();
        assert_eq!(&buf[..], &[1, 2]);
    }

    #[test]
    fn test_resize_failure_keeps_buffer() {
        let table = OsApiTable {
            realloc: mock::null_realloc,
            ..mock_table()
        };
        let mut buf = OsBuf::copy_from_in(&table, &[9, 9]).unwrap();
        assert_eq!(buf.resize(100), Err(OsError::AllocationFailed));
        assert_eq!(&buf[..], &[9, 9]);
    }

    #[test]
    fn test_into_raw() {
        let table = mock_table();
        let buf = OsBuf::copy_from_in(&table, &[7; 4]).unwrap();
        let (ptr, len) = buf.into_raw();
        assert_eq!(len, 4);
        unsafe { (table.free)(ptr) };
    }
}
