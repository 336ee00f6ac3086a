//! Cancellation.
//!
//! The fixed-point loop can in principle run for a long time on a large
//! crate; the host may want to abandon a build in flight (the user kept
//! typing). Rather than thread a `Result` through every recursive call in
//! the collector (import propagation in particular recurses through glob
//! chains), cancellation is modeled the way rust-analyzer's own query
//! cancellation is: a panic with a distinguished payload, caught at the one
//! entry point that runs a build.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// The panic payload thrown by [`Cancelled::throw`]. Never constructed any
/// other way, so catching one and finding it of this type always means "the
/// host asked us to stop", never "a bug corrupted the stack".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled {
    _private: (),
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build cancelled")
    }
}

impl std::error::Error for Cancelled {}

impl Cancelled {
    /// Unwind the current build. Must only be called from inside
    /// [`run_cancellable`]'s closure.
    pub fn throw() -> ! {
        panic::panic_any(Cancelled { _private: () })
    }
}

/// Token the host passes in so the collector can check for cancellation
/// (once per import-resolution pass, once per macro-call attempt) and
/// optionally report progress.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;

    /// Called occasionally so a host UI can show it's still working. The
    /// default does nothing.
    fn progress(&self, _message: &str) {}

    fn check_cancelled(&self) {
        if self.is_cancelled() {
            Cancelled::throw();
        }
    }
}

/// A token that never cancels, for hosts (and tests) that don't need it.
pub struct NeverCancelled;

impl CancelToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Run `f`, catching a [`Cancelled`] unwind and turning it back into a plain
/// value. Any other panic payload is allowed to keep propagating — that's a
/// real bug, not a cancellation, and per the error-handling design it should
/// abort the build rather than be swallowed here.
pub fn run_cancellable<T>(f: impl FnOnce() -> T) -> Result<T, Cancelled> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match downcast_cancelled(payload) {
            Ok(cancelled) => Err(cancelled),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

fn downcast_cancelled(payload: Box<dyn Any + Send>) -> Result<Cancelled, Box<dyn Any + Send>> {
    payload.downcast::<Cancelled>().map(|boxed| *boxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysCancelled;
    impl CancelToken for AlwaysCancelled {
        fn is_cancelled(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_unwinds_and_is_caught() {
        let result = run_cancellable(|| {
            AlwaysCancelled.check_cancelled();
            unreachable!("should have been cancelled before this point")
        });
        assert!(result.is_err());
    }

    #[test]
    fn non_cancelled_runs_to_completion() {
        let result = run_cancellable(|| 1 + 1);
        assert_eq!(result, Ok(2));
    }

    #[test]
    #[should_panic(expected = "real bug")]
    fn non_cancellation_panics_propagate() {
        let _ = run_cancellable(|| panic!("real bug"));
    }
}
