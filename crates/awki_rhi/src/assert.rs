//! Soft and hard assertions
//!
//! `soft_assert!` reports a recoverable caller bug and keeps going. In debug
//! builds the first failure of each call site also dumps a backtrace so the
//! offending caller can be inspected. `raise!` is for corrupted internal
//! tables and never returns.

use std::backtrace::Backtrace;

/// Report a recoverable precondition violation without aborting
macro_rules! soft_assert {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            static FIRST_FAILURE: ::std::sync::Once = ::std::sync::Once::new();
            FIRST_FAILURE.call_once(|| $crate::assert::inspect(file!(), line!()));
            log::warn!($($arg)+);
        }
    };
}

/// Log a fatal programming error and abort the current thread
macro_rules! raise {
    ($($arg:tt)+) => {{
        log::error!($($arg)+);
        panic!($($arg)+);
    }};
}

#[doc(hidden)]
pub fn inspect(file: &str, line: u32) {
    if cfg!(debug_assertions) {
        log::error!("Soft assertion failed at {}:{}\n{}", file, line, Backtrace::force_capture());
    }
}
