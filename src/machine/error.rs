//! Errors raised while firing triggers.

use crate::behaviour::{ActionError, AmbiguousTransition};
use crate::parameters::ArgumentError;
use thiserror::Error;

/// Errors that abort a fire, activation or deactivation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error(transparent)]
    Arguments(#[from] ArgumentError),

    #[error(transparent)]
    AmbiguousTransition(#[from] AmbiguousTransition),

    #[error(
        "No valid leaving transitions are permitted from state '{state}' for trigger '{trigger}'. Consider ignoring the trigger."
    )]
    UnhandledTrigger { state: String, trigger: String },

    #[error(
        "Trigger '{trigger}' is valid for transition from state '{state}' but guard conditions are not met. Guard descriptions: '{descriptions}'.",
        descriptions = .guards.join(", ")
    )]
    GuardsNotMet {
        state: String,
        trigger: String,
        guards: Vec<String>,
    },

    #[error("{what} is asynchronous and cannot run on the synchronous path. Use the async API instead")]
    AsyncInSyncContext { what: String },

    #[error("The target '{target}' for the initial transition of '{state}' is not a substate")]
    InitialTransitionNotSubstate { state: String, target: String },

    #[error(transparent)]
    Action(#[from] ActionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unhandled_message_suggests_ignoring() {
        let err = FireError::UnhandledTrigger {
            state: "A".to_string(),
            trigger: "X".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No valid leaving transitions are permitted from state 'A' for trigger 'X'. Consider ignoring the trigger."
        );
    }

    #[test]
    fn guard_failures_are_listed() {
        let err = FireError::GuardsNotMet {
            state: "A".to_string(),
            trigger: "X".to_string(),
            guards: vec!["first".to_string(), "second".to_string()],
        };
        assert!(err.to_string().contains("Guard descriptions: 'first, second'"));
    }

    #[test]
    fn argument_errors_convert() {
        let err: FireError = ArgumentError::ArgumentCount {
            trigger: "X".to_string(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, FireError::Arguments(_)));
    }
}
