//! Errors raised by the translation driver.

use crate::traits::ReadError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A source file could not be parsed. Aborts the whole run.
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ReadError,
    },

    #[error("{operation} is not allowed after {phase}")]
    Phase {
        operation: &'static str,
        phase: &'static str,
    },

    #[error("program output has already been flattened")]
    AlreadyFlattened,
}
