//! Contract assertions.
//!
//! With the `foundation-assertions` feature enabled, `foundation_assert!`
//! checks its condition and aborts the render with a diagnostic naming the
//! failing expression, the offending values and the calling module. Without
//! the feature the macro expands to nothing.
//!
//! `fatal_error!` and `work_in_progress!` are unconditional.

/// Returns true if contract assertions were compiled in.
pub const fn assertions_enabled() -> bool {
    cfg!(feature = "foundation-assertions")
}

/// Logs a diagnostic and aborts.
///
/// * `location` - Module path and line of the caller.
/// * `message`  - The diagnostic.
#[cold]
#[inline(never)]
pub fn fatal(location: &str, message: &str) -> ! {
    error!("{}: {}", location, message);
    panic!("{}: {}", location, message);
}

/// Unconditional fatal error with a formatted message.
#[macro_export]
macro_rules! fatal_error {
    ($($arg:tt)+) => {
        $crate::assertions::fatal(
            concat!(module_path!(), ":", line!()),
            &format!($($arg)+),
        )
    };
}

/// Hard stop for operations that have no implementation yet.
#[macro_export]
macro_rules! work_in_progress {
    () => {
        $crate::fatal_error!("code is work in progress")
    };
}

/// Checks a contract condition.
#[cfg(feature = "foundation-assertions")]
#[macro_export]
macro_rules! foundation_assert {
    ($cond: expr, $($arg:tt)+) => {
        if !$cond {
            $crate::fatal_error!(
                "assertion `{}` failed: {}",
                stringify!($cond),
                format!($($arg)+)
            );
        }
    };
}

/// Checks a contract condition (compiled out). The condition is still type
/// checked but never evaluated.
#[cfg(not(feature = "foundation-assertions"))]
#[macro_export]
macro_rules! foundation_assert {
    ($cond: expr, $($arg:tt)+) => {
        if false {
            let _ = $cond;
            let _ = format_args!($($arg)+);
        }
    };
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
