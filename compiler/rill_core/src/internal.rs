//! Fatal internal-error reporting.
//!
//! Broken invariants inside the engine (a full slot table after
//! enlargement, a frame exited with its return slot still set, a malformed
//! syntax tree) are coding errors, not user errors. They are logged and then
//! abort evaluation by panicking.

/// Logs `what` at error level and panics.
#[cold]
#[inline(never)]
#[track_caller]
pub fn internal_coding_error(what: &str) -> ! {
    let location = std::panic::Location::caller();
    tracing::error!(%location, "internal coding error: {what}");
    panic!("internal coding error at {location}: {what}");
}

/// Panics through [`internal_coding_error`] unless `condition` holds.
#[inline]
#[track_caller]
pub fn internal_coding_error_unless(condition: bool, what: &str) {
    if !condition {
        internal_coding_error(what);
    }
}
