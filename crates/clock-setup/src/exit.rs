//! Turning a flow result into a process outcome.
//!
//! A generator that never confirmed stopped may still be half-programmed,
//! so that case ends the process with `abort()` instead of unwinding or
//! returning. Every other failure exits with status 1.

use std::process::ExitCode;

use platform::clock_sequencer::ClockError;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit status 0.
    Success,
    /// Exit status 1.
    Failure,
    /// `std::process::abort()`.
    Abort,
}

/// `true` if any error in the chain is a fatal clock error.
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ClockError>())
        .any(ClockError::is_fatal)
}

/// Classify a flow result.
pub fn classify(result: &anyhow::Result<()>) -> Outcome {
    match result {
        Ok(()) => Outcome::Success,
        Err(err) if is_fatal(err) => Outcome::Abort,
        Err(_) => Outcome::Failure,
    }
}

/// Log the error (if any) and end the flow accordingly.
///
/// Does not return on [`Outcome::Abort`].
pub fn finish(result: anyhow::Result<()>) -> ExitCode {
    let outcome = classify(&result);
    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    match outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Failure => ExitCode::FAILURE,
        Outcome::Abort => {
            tracing::error!("clock generator state unknown, aborting");
            std::process::abort()
        }
    }
}
