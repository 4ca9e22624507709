//! Configuration errors for state machines.

use thiserror::Error;

/// Errors raised while configuring a state machine.
///
/// All of these are detected when the offending call is made; a machine
/// that configured without error never reports them later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("State '{state}' cannot be its own superstate")]
    SelfSuperstate { state: String },

    #[error("Making '{superstate}' the superstate of '{substate}' would create a cycle")]
    CyclicHierarchy {
        substate: String,
        superstate: String,
    },

    #[error("State '{state}' already has superstate '{existing}', cannot also be a substate of '{requested}'")]
    SuperstateAlreadySet {
        state: String,
        existing: String,
        requested: String,
    },

    #[error(
        "Trigger '{trigger}' cannot permit a transition from '{state}' to itself. Use ignore() or permit_reentry() instead"
    )]
    ImplicitReentry { state: String, trigger: String },

    #[error("Setting the current state '{state}' as the target destination state of its initial transition is not allowed")]
    InitialTransitionToSelf { state: String },

    #[error("State '{state}' already has an initial transition to '{existing}'")]
    InitialTransitionAlreadySet { state: String, existing: String },

    #[error("The target '{target}' of the initial transition of '{state}' is not a substate")]
    InitialTransitionNotDescendant { state: String, target: String },

    #[error("Trigger '{trigger}' already has parameters ({existing}), cannot change them to ({requested})")]
    TriggerParametersAlreadySet {
        trigger: String,
        existing: String,
        requested: String,
    },
}
