/*!
Typed errors for the simulator: configuration problems (bad CLI arguments,
a missing or wrong-size flash image) and simulation faults (the settle loop
failing to reach quiescence). `main` maps every variant to a process exit
code; nothing here is ever recovered from internally except the settle
loop's own bounded retry.
*/

use std::path::PathBuf;

use thiserror::Error;

/// Which half-cycle a quiescence failure was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPolarity {
    Rising,
    Falling,
}

impl std::fmt::Display for ClockPolarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockPolarity::Rising => write!(f, "rising (clock=1, nclock=0)"),
            ClockPolarity::Falling => write!(f, "falling (clock=0, nclock=1)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown argument \"{0}\"")]
    UnknownArgument(String),

    #[error("missing flash image argument")]
    MissingFlashArgument,

    #[error("failed to read flash image {path:?}: {source}")]
    FlashIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("flash image must be exactly {expected} bytes, got {actual}")]
    FlashSizeMismatch { expected: usize, actual: usize },

    #[error("settle loop did not reach quiescence within {iterations} iterations during the {polarity} half-cycle")]
    QuiescenceExceeded {
        polarity: ClockPolarity,
        iterations: u32,
    },
}

impl SimError {
    /// Process exit code per §6/§10.2: 1 for configuration errors, a
    /// distinct non-zero code for simulation faults.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimError::UnknownArgument(_) | SimError::MissingFlashArgument => 1,
            SimError::FlashIoError { .. } | SimError::FlashSizeMismatch { .. } => 2,
            SimError::QuiescenceExceeded { .. } => 3,
        }
    }
}
