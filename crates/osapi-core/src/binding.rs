//! Process-wide active table
//!
//! Starts unset. `install_custom` (or `osapi_runtime::install_defaults`)
//! makes it valid; later installs replace it wholesale. Installed tables are
//! leaked and live for the rest of the process, so references handed out by
//! `current()` never dangle.
//!
//! The pointer swap is atomic, but handles created through the previous
//! table stay bound to the previous backend. Install before spawning any
//! concurrent activity that uses the table.

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::error::{OsError, OsResult};
use crate::table::OsApiTable;

static ACTIVE: AtomicPtr<OsApiTable> = AtomicPtr::new(ptr::null_mut());

/// Replace the active table with a caller-supplied one
///
/// Each call leaks one boxed table. Code that installs repeatedly (test
/// fixtures, reset loops) should build its tables once and use
/// `install_static`.
pub fn install_custom(table: OsApiTable) {
    install_static(Box::leak(Box::new(table)));
}

/// Replace the active table with one that already lives forever
///
/// Lets a backend reuse a single table across repeated resets.
pub fn install_static(table: &'static OsApiTable) {
    ACTIVE.store(table as *const OsApiTable as *mut OsApiTable, Ordering::Release);
}

/// Whether any table has been installed
#[inline]
pub fn is_installed() -> bool {
    !ACTIVE.load(Ordering::Acquire).is_null()
}

/// The active table, or `OsError::NotInstalled`
#[inline]
pub fn try_current() -> OsResult<&'static OsApiTable> {
    let table = ACTIVE.load(Ordering::Acquire);
    // Safety: only ever set from a &'static OsApiTable
    unsafe { table.as_ref() }.ok_or(OsError::NotInstalled)
}

/// The active table
///
/// # Panics
///
/// If called before any table has been installed.
#[inline]
pub fn current() -> &'static OsApiTable {
    match try_current() {
        Ok(table) => table,
        Err(_) => not_installed(),
    }
}

#[cold]
#[inline(never)]
fn not_installed() -> ! {
    panic!("osapi: OS API used before a table was installed (call install_defaults first)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockBackend};

    #[test]
    fn test_install_custom_replaces_table() {
        let _guard = mock::exclusive();

        install_custom(OsApiTable::from_platform::<MockBackend>());
        assert!(is_installed());
        assert!((current().malloc)(4).map(|p| unsafe { (current().free)(p) }).is_some());

        install_custom(OsApiTable {
            malloc: mock::null_malloc,
            ..OsApiTable::from_platform::<MockBackend>()
        });
        assert!((current().malloc)(4).is_none());
    }

    #[test]
    fn test_install_static_reuses_reference() {
        let _guard = mock::exclusive();

        static TABLE: std::sync::OnceLock<OsApiTable> = std::sync::OnceLock::new();
        let table = TABLE.get_or_init(OsApiTable::from_platform::<MockBackend>);

        install_static(table);
        assert!(core::ptr::eq(current(), table));
        assert!(core::ptr::eq(try_current().unwrap(), table));
    }
}
