//! Deadline guard for external-model invocations
//!
//! Pitch models can stall on malformed input, so every invocation runs on a
//! worker thread and is awaited with a timeout. A stalled worker is left to
//! finish detached; its result is discarded.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Why a guarded call produced no value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineError {
    /// The call did not finish within the deadline
    Expired,
    /// The worker thread died (panicked) before sending a result
    WorkerDied,
}

/// Run `f` on a worker thread, waiting at most `timeout` for its result
pub fn run<T, F>(timeout: Duration, f: F) -> Result<T, DeadlineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver may be gone if the deadline already expired
        let _ = tx.send(f());
    });

    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DeadlineError::Expired),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(DeadlineError::WorkerDied),
    }
}
