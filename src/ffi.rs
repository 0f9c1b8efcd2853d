//! C entry points, declared in `include/yahtzeevalue.h`.
//!
//! Every fallible function takes a trailing `struct yahtzeevalue_error *`
//! (may be null) and returns a sentinel on failure. Panics never cross the
//! boundary: they are caught and reported as code 10.

use std::ffi::{c_char, c_double, c_int, c_void, CStr, CString};
use std::panic::{self, UnwindSafe};
use std::path::Path;
use std::ptr;

use crate::config::LoadOptions;
use crate::constants::ABI_VERSION;
use crate::error::{Error, Result};
use crate::registry;
use crate::runtime::{self, BoundaryGuard};
use crate::table::ValueTable;

/// Opaque table handle. The pointer value carries a registry id and is never
/// dereferenced.
#[allow(non_camel_case_types)]
pub type yahtzeevalue_t = c_void;

/// `struct yahtzeevalue_error`.
///
/// Cleared to `{NULL, 0, 0}` on success. On failure `message` is a
/// NUL-terminated string the caller releases once with [`yahtzeevalue_free`];
/// the library never frees a message it handed out, so reusing a record
/// without freeing its previous message leaks it.
#[repr(C)]
#[derive(Debug)]
pub struct ErrorRecord {
    pub message: *mut c_char,
    pub failed: c_int,
    pub code: c_int,
}

impl Default for ErrorRecord {
    fn default() -> Self {
        ErrorRecord {
            message: ptr::null_mut(),
            failed: 0,
            code: 0,
        }
    }
}

unsafe fn clear_err(err_out: *mut ErrorRecord) {
    if err_out.is_null() {
        return;
    }
    *err_out = ErrorRecord::default();
}

unsafe fn set_err(err: &Error, err_out: *mut ErrorRecord) {
    if err_out.is_null() {
        return;
    }
    let text = err.to_string().replace('\0', "\\0");
    let message = CString::new(text).unwrap_or_default();
    *err_out = ErrorRecord {
        message: message.into_raw(),
        failed: 1,
        code: err.code() as c_int,
    };
}

/// Run `f` with auto-initialization, translating its outcome (or a panic)
/// into the return value and the error record.
unsafe fn landingpad<F, T>(f: F, sentinel: T, err_out: *mut ErrorRecord) -> T
where
    F: FnOnce() -> Result<T> + UnwindSafe,
{
    let outcome = {
        let _guard = BoundaryGuard::enter();
        panic::catch_unwind(move || {
            runtime::init();
            f()
        })
    };
    match outcome {
        Ok(Ok(rv)) => {
            clear_err(err_out);
            rv
        }
        Ok(Err(err)) => {
            set_err(&err, err_out);
            sentinel
        }
        Err(_) => {
            let message =
                runtime::take_panic_message().unwrap_or_else(|| "no panic info".to_owned());
            set_err(&Error::Internal(message), err_out);
            sentinel
        }
    }
}

macro_rules! export {
    (
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),*) -> $rv:ty, on_error = $sentinel:expr;
        $body:block
    ) => {
        $(#[$meta])*
        ///
        /// # Safety
        ///
        /// Pointer arguments must be null or valid for their documented use;
        /// `err` must be null or point to a writable `yahtzeevalue_error`.
        #[no_mangle]
        pub unsafe extern "C" fn $name($($arg: $ty,)* err: *mut ErrorRecord) -> $rv {
            landingpad(move || -> Result<$rv> { $body }, $sentinel, err)
        }
    };
}

fn table_for(handle: *mut yahtzeevalue_t) -> Result<std::sync::Arc<ValueTable>> {
    if handle.is_null() {
        return Err(Error::InvalidArgument("handle is null"));
    }
    registry::get(handle as registry::Handle)
}

/// One-time process setup: game tables, logging, panic capture.
/// Optional; every other entry point performs it on demand.
#[no_mangle]
pub extern "C" fn yahtzeevalue_init() {
    let _ = panic::catch_unwind(runtime::init);
}

/// Interface revision implemented by this library.
#[no_mangle]
pub extern "C" fn yahtzeevalue_abi_version() -> c_int {
    ABI_VERSION
}

/// Release a message string from a `yahtzeevalue_error`. Null is ignored.
///
/// # Safety
///
/// `buf` must be null or a message pointer produced by this library that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn yahtzeevalue_free(buf: *mut c_char) {
    if !buf.is_null() {
        drop(CString::from_raw(buf));
    }
}

export! {
    /// Load the table at `root` (a directory holding `all_states.bin`, or the
    /// artifact file itself). Returns null on failure.
    fn yahtzeevalue_load(root: *const c_char) -> *mut yahtzeevalue_t, on_error = ptr::null_mut();
    {
        if root.is_null() {
            return Err(Error::InvalidArgument("root path is null"));
        }
        let root = CStr::from_ptr(root)
            .to_str()
            .map_err(|_| Error::InvalidArgument("root path is not valid UTF-8"))?;
        let table = ValueTable::load(Path::new(root), LoadOptions::from_env())?;
        Ok(registry::insert(table) as *mut yahtzeevalue_t)
    }
}

export! {
    /// Release a table. Unloading an already-unloaded handle succeeds.
    /// Queries already running on other threads finish against the table.
    fn yahtzeevalue_unload(handle: *mut yahtzeevalue_t) -> (), on_error = ();
    {
        if handle.is_null() {
            return Err(Error::InvalidArgument("handle is null"));
        }
        registry::remove(handle as registry::Handle)
    }
}

export! {
    /// Expected final score from the start of a turn in state `key`. NaN on failure.
    fn yahtzeevalue_lookup(handle: *mut yahtzeevalue_t, key: c_int) -> c_double, on_error = f64::NAN;
    {
        table_for(handle)?.lookup(key as i64)
    }
}

export! {
    /// Category to score for roll `histogram` in state `state`. -1 on failure.
    fn yahtzeevalue_best_action(handle: *mut yahtzeevalue_t, state: c_int, histogram: c_int) -> c_int, on_error = -1;
    {
        table_for(handle)?.best_action(state as i64, histogram as i64)
    }
}

export! {
    /// Keep mask with two rerolls left. -1 on failure.
    fn yahtzeevalue_keep_first(handle: *mut yahtzeevalue_t, state: c_int, histogram: c_int) -> c_int, on_error = -1;
    {
        table_for(handle)?.keep_first(state as i64, histogram as i64)
    }
}

export! {
    /// Keep mask with one reroll left. -1 on failure.
    fn yahtzeevalue_keep_second(handle: *mut yahtzeevalue_t, state: c_int, histogram: c_int) -> c_int, on_error = -1;
    {
        table_for(handle)?.keep_second(state as i64, histogram as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_err() {
        let mut rec = ErrorRecord::default();
        unsafe {
            set_err(&Error::InvalidStateKey(64), &mut rec);
            assert_eq!(rec.failed, 1);
            assert_eq!(rec.code, 4);
            let text = CStr::from_ptr(rec.message).to_str().unwrap().to_owned();
            assert!(text.contains("64"));
            yahtzeevalue_free(rec.message);
            clear_err(&mut rec);
        }
        assert!(rec.message.is_null());
        assert_eq!((rec.failed, rec.code), (0, 0));
    }

    #[test]
    fn test_landingpad_catches_panic() {
        let mut rec = ErrorRecord::default();
        let rv = unsafe {
            landingpad(
                || -> Result<c_int> { panic!("table exploded") },
                -1,
                &mut rec,
            )
        };
        assert_eq!(rv, -1);
        assert_eq!(rec.failed, 1);
        assert_eq!(rec.code, 10);
        let text = unsafe { CStr::from_ptr(rec.message) }.to_str().unwrap().to_owned();
        assert!(text.contains("table exploded"), "{}", text);
        unsafe { yahtzeevalue_free(rec.message) };
    }

    #[test]
    fn test_null_err_pointer_is_tolerated() {
        let rv = unsafe { yahtzeevalue_lookup(ptr::null_mut(), 0, ptr::null_mut()) };
        assert!(rv.is_nan());
    }
}
