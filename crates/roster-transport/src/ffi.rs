//! C ABI over [`Session::dispatch_json`].
//!
//! A host loads the `cdylib`, creates one session, and exchanges
//! NUL-terminated UTF-8 JSON strings with it. Strings returned by
//! [`roster_dispatch_json`] are owned by this library and must be released
//! with [`roster_string_free`].

use std::ffi::{CStr, CString, c_char};
use std::ptr;

use crate::{Session, invalid_request_json};

/// Opaque session as seen from C.
pub struct RosterSession(Session);

/// Create a session. Release it with [`roster_session_free`].
#[unsafe(no_mangle)]
pub extern "C" fn roster_session_new() -> *mut RosterSession {
    Box::into_raw(Box::new(RosterSession(Session::new())))
}

/// # Safety
/// `session` must be null or a pointer returned by [`roster_session_new`]
/// that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn roster_session_free(session: *mut RosterSession) {
    if session.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(session) });
}

/// # Safety
/// `session` must be null or a live pointer from [`roster_session_new`],
/// used from one thread at a time. `request` must be null or point to a
/// NUL-terminated string that stays valid for the duration of this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn roster_dispatch_json(
    session: *mut RosterSession,
    request: *const c_char,
) -> *mut c_char {
    let response = if session.is_null() {
        invalid_request_json("null session pointer")
    } else if request.is_null() {
        invalid_request_json("null request pointer")
    } else {
        let session = unsafe { &mut *session };
        match unsafe { CStr::from_ptr(request) }.to_str() {
            Ok(text) => session.0.dispatch_json(text),
            Err(source) => invalid_request_json(format!("request is not UTF-8: {source}")),
        }
    };
    // serde_json escapes NUL inside strings, so the envelope has none.
    CString::new(response)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// # Safety
/// `text` must be null or a pointer returned by [`roster_dispatch_json`]
/// that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn roster_string_free(text: *mut c_char) {
    if text.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(text) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn call(session: *mut RosterSession, request: &str) -> Value {
        let request = CString::new(request).expect("request has no NUL");
        let raw = unsafe { roster_dispatch_json(session, request.as_ptr()) };
        assert!(!raw.is_null());
        let text = unsafe { CStr::from_ptr(raw) }
            .to_str()
            .expect("response is UTF-8")
            .to_string();
        unsafe { roster_string_free(raw) };
        serde_json::from_str(&text).expect("response is JSON")
    }

    #[test]
    fn dispatch_through_c_abi() {
        let session = roster_session_new();
        let created = call(session, r#"{"action":"counter.create","payload":{"initial":10}}"#);
        let handle = created["handle"].as_u64().expect("handle");

        let incremented = call(
            session,
            &format!(r#"{{"action":"counter.increment","payload":{{"handle":{handle}}}}}"#),
        );
        assert_eq!(incremented["value"], 11);
        unsafe { roster_session_free(session) };
    }

    #[test]
    fn null_pointers_are_rejected_not_dereferenced() {
        let raw = unsafe { roster_dispatch_json(ptr::null_mut(), ptr::null()) };
        let text = unsafe { CStr::from_ptr(raw) }.to_str().expect("UTF-8").to_string();
        unsafe { roster_string_free(raw) };
        let response: Value = serde_json::from_str(&text).expect("JSON");
        assert_eq!(response["result"], "rejected");
        assert_eq!(response["failureClasses"][0], "transport_invalid_request");

        unsafe {
            roster_session_free(ptr::null_mut());
            roster_string_free(ptr::null_mut());
        }
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let session = roster_session_new();
        let bytes = CString::new(vec![0xff, 0xfe]).expect("no NUL");
        let raw = unsafe { roster_dispatch_json(session, bytes.as_ptr()) };
        let text = unsafe { CStr::from_ptr(raw) }.to_str().expect("UTF-8").to_string();
        unsafe {
            roster_string_free(raw);
            roster_session_free(session);
        }
        assert!(text.contains("request is not UTF-8"));
    }
}
