//! Dynamic libraries via `libloading`

use core::ptr::NonNull;

use libloading::Library;
use osapi_core::handle::{DlHandle, OsProc};
use osapi_core::os_err;
use osapi_core::traits::{Backend, OsDylib};

use super::PortableBackend;

impl OsDylib for PortableBackend {
    fn dlopen(libname: &str) -> Option<DlHandle> {
        // Safety: running a library's initializers is inherent to dlopen;
        // callers choose which libraries to load.
        match unsafe { Library::new(libname) } {
            Ok(lib) => {
                let boxed = Box::new(lib);
                // Safety: fresh box, reclaimed once in dlclose
                Some(unsafe { DlHandle::from_ptr(NonNull::from(Box::leak(boxed)), Self::NAME) })
            }
            Err(e) => {
                os_err!("dlopen '{}' failed: {}", libname, e);
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
                os_err!("dlproc '{}' failed: {}", procname, e);
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
    fn test_missing_library() {
        assert!(PortableBackend::dlopen("libosapi_definitely_missing.so").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_libc_strlen() {
        let lib = PortableBackend::dlopen("libc.so.6").unwrap();
        let sym = PortableBackend::dlproc(&lib, "strlen").unwrap();
        let strlen: unsafe extern "C" fn(*const std::ffi::c_char) -> usize =
            unsafe { core::mem::transmute(sym) };
        assert_eq!(unsafe { strlen(c"osapi".as_ptr()) }, 5);

        assert!(PortableBackend::dlproc(&lib, "osapi_no_such_symbol").is_none());
        PortableBackend::dlclose(lib);
    }
}
