// Panic isolation so a checker bug maps to a status instead of a crash
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// If the closure panics, the panic is caught and returned as
/// `PanicGuardResult::Panicked` with the panic message.
///
/// # Example
/// ```text
/// let result = execute_guarded(|| panic!("test panic"));
///
/// if let PanicGuardResult::Panicked(msg) = result {
///     println!("Caught panic: {}", msg);
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "Guarded task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded(|| 42) {
            PanicGuardResult::Success(v) => assert_eq!(v, 42),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_panic_message_is_captured() {
        let result: PanicGuardResult<()> = execute_guarded(|| panic!("boom"));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "boom"),
            PanicGuardResult::Success(_) => panic!("panic was not caught"),
        }
    }

    #[test]
    fn test_formatted_panic_message_is_captured() {
        let line = 7;
        let result: PanicGuardResult<()> = execute_guarded(move || panic!("bad line {}", line));
        assert!(matches!(result, PanicGuardResult::Panicked(msg) if msg == "bad line 7"));
    }
}
