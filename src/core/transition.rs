//! Transition values.

use super::args::Args;
use super::state::{State, Trigger};

/// An immutable description of one move between states.
///
/// Created fresh for every fire call and handed to actions and event
/// subscribers. A transition whose source equals its destination is a
/// reentry. Initial transitions are the automatic continuations into a
/// declared substate; they never re-enter the superstate they start from.
///
/// # Example
///
/// ```rust
/// use substate::{Args, Transition};
///
/// let transition = Transition::new("Idle", "Running", "start", Args::new());
/// assert!(!transition.is_reentry());
/// assert!(!transition.is_initial());
///
/// let reentry = Transition::new("Idle", "Idle", "refresh", Args::new());
/// assert!(reentry.is_reentry());
/// ```
#[derive(Clone, Debug)]
pub struct Transition<S: State, T: Trigger> {
    source: S,
    destination: S,
    trigger: T,
    parameters: Args,
    initial: bool,
}

impl<S: State, T: Trigger> Transition<S, T> {
    pub fn new(source: S, destination: S, trigger: T, parameters: Args) -> Self {
        Self {
            source,
            destination,
            trigger,
            parameters,
            initial: false,
        }
    }

    /// An initial-transition continuation from a superstate into its substate.
    pub fn initial(source: S, destination: S, trigger: T, parameters: Args) -> Self {
        Self {
            initial: true,
            ..Self::new(source, destination, trigger, parameters)
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &S {
        &self.destination
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn parameters(&self) -> &Args {
        &self.parameters
    }

    /// True when the source and the destination are the same state.
    pub fn is_reentry(&self) -> bool {
        self.source == self.destination
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }
}
