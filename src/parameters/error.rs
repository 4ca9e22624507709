//! Argument validation errors.

use thiserror::Error;

/// Fire-time arguments do not match the trigger's declared signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("Trigger '{trigger}' expects {expected} argument(s) but {actual} were supplied")]
    ArgumentCount {
        trigger: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Trigger '{trigger}' expects an argument of type {expected} in position {position} but got {actual}"
    )]
    ArgumentType {
        trigger: String,
        position: usize,
        expected: String,
        actual: String,
    },
}
