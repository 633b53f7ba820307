//! dlopen / dlsym / dlclose through libloading's unix layer
//!
//! Libraries open with `RTLD_NOW | RTLD_LOCAL`: every symbol resolves at
//! load time and none leak into later loads.

use core::ptr::NonNull;

use libloading::os::unix::{Library, RTLD_LOCAL, RTLD_NOW};
use osapi_core::handle::{DlHandle, OsProc};
use osapi_core::os_err;
use osapi_core::traits::{Backend, OsDylib};

use super::PosixBackend;

impl OsDylib for PosixBackend {
    fn dlopen(libname: &str) -> Option<DlHandle> {
        // Safety: running a library's initializers is inherent to dlopen;
        // callers choose which libraries to load.
        match unsafe { Library::open(Some(libname), RTLD_NOW | RTLD_LOCAL) } {
            Ok(lib) => {
                let boxed = Box::new(lib);
                // Safety: fresh box, reclaimed once in dlclose
                Some(unsafe { DlHandle::from_ptr(NonNull::from(Box::leak(boxed)), Self::NAME) })
            }
            Err(e) => {
                os_err!("dlopen '{}' failed: {}", libname.escape_debug(), e);
                None
            }
        }
    }

    fn dlproc(lib: &DlHandle, procname: &str) -> Option<OsProc> {
        // Safety: handle is live while borrowed
        let library = unsafe { lib.ptr_for::<Library>(Self::NAME).as_ref() };
        // Safety: the caller casts the address to its real signature
        match unsafe { library.get::<OsProc>(procname.as_bytes()) } {
            Ok(symbol) => Some(*symbol),
            Err(e) => {
                os_err!("dlproc '{}' failed: {}", procname.escape_debug(), e);
                None
            }
        }
    }

    fn dlclose(lib: DlHandle) {
        let ptr = lib.into_ptr_for::<Library>(Self::NAME);
        // Safety: leaked by dlopen above
        let library = unsafe { Box::from_raw(ptr.as_ptr()) };
        if let Err(e) = library.close() {
            os_err!("dlclose failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_returns_none() {
        assert!(PosixBackend::dlopen("libosapi_definitely_missing.so").is_none());
        assert!(PosixBackend::dlopen("bad\0name").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_libc_symbol() {
        let lib = PosixBackend::dlopen("libc.so.6").unwrap();
        assert_eq!(lib.backend(), "posix");

        let sym = PosixBackend::dlproc(&lib, "strlen").unwrap();
        let strlen: unsafe extern "C" fn(*const libc::c_char) -> libc::size_t =
            unsafe { core::mem::transmute(sym) };
        assert_eq!(unsafe { strlen(c"table".as_ptr()) }, 5);

        assert!(PosixBackend::dlproc(&lib, "osapi_no_such_symbol").is_none());
        assert!(PosixBackend::dlproc(&lib, "bad\0name").is_none());
        PosixBackend::dlclose(lib);
    }
}
