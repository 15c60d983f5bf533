//! Hard and soft validation.
//!
//! Kestrel distinguishes two kinds of broken preconditions:
//!
//! - **Hard** violations ([`validate!`], [`fatal!`]) are programmer or
//!   environment errors with no recovery path. They are logged with their
//!   source location and then unwind via `panic!`.
//! - **Soft** violations ([`soft_validate!`]) are noteworthy but recoverable.
//!   They are logged and the condition is handed back so the caller can carry
//!   on best-effort and report a `bool` to its own caller.
//!
//! [`validate!`]: crate::validate!
//! [`fatal!`]: crate::fatal!
//! [`soft_validate!`]: crate::soft_validate!

/// Logs the message with its source location and panics.
///
/// The expression has type `!`, so it can be used in `let ... else` arms.
///
/// ```should_panic
/// kestrel_core::fatal!("device lost after {} frames", 3);
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        $crate::__tracing::error!("{} in '{}:{}'", message, ::std::file!(), ::std::line!());
        ::std::panic!("{}", message)
    }};
}

/// Panics through [`fatal!`](crate::fatal!) when the condition does not hold.
///
/// ```
/// let free_slots = 4;
/// kestrel_core::validate!(free_slots > 0, "no free slots left");
/// ```
///
/// ```should_panic
/// kestrel_core::validate!(1 + 1 == 3, "arithmetic is broken");
/// ```
#[macro_export]
macro_rules! validate {
    ($cond:expr, $($arg:tt)+) => {{
        if !($cond) {
            $crate::fatal!($($arg)+);
        }
    }};
}

/// Logs a warning with its source location when the condition does not hold
/// and evaluates to the condition.
///
/// ```
/// let accepted = kestrel_core::soft_validate!(2 > 3, "two is not greater than three");
/// assert!(!accepted);
/// ```
#[macro_export]
macro_rules! soft_validate {
    ($cond:expr, $($arg:tt)+) => {{
        let condition: bool = $cond;
        if !condition {
            let message = ::std::format!($($arg)+);
            $crate::__tracing::warn!("{} in '{}:{}'", message, ::std::file!(), ::std::line!());
        }
        condition
    }};
}
