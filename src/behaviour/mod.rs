//! Trigger behaviours and their resolution at a single state.
//!
//! A behaviour is the rule a state applies when a trigger fires: move to
//! another state, re-enter itself, run an internal action, ignore the
//! trigger, or pick a destination from the fire-time arguments. Which one
//! applies is decided by the guards, evaluated once per resolution attempt.

mod action;

pub use action::{
    ActionEffect, ActionError, AsyncTransitionAction, EntryAction, LifecycleAction,
    SyncTransitionAction, TransitionAction, UnhandledTriggerAction,
};

use crate::core::{name_of, Args, Guard, State, Trigger};
use std::fmt;
use thiserror::Error;

/// More than one guard-satisfied behaviour was found at one state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Multiple permitted exit transitions are configured from state '{state}' for trigger '{trigger}'. Guard clauses must be mutually exclusive."
)]
pub struct AmbiguousTransition {
    pub state: String,
    pub trigger: String,
}

/// Documented candidate destination of a dynamic transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationHint<S: State> {
    pub destination: S,
    pub description: String,
}

/// Destination selector for a dynamic transition.
///
/// # Example
///
/// ```rust
/// use substate::{args, behaviour::DynamicDestination};
///
/// let route = DynamicDestination::new(|args| {
///     if args.get::<u32>(0).is_some_and(|n| *n > 10) { "Large" } else { "Small" }
/// })
/// .possible("Large", "more than ten items")
/// .possible("Small", "ten items or fewer");
///
/// assert_eq!(route.select(&args![42u32]), "Large");
/// assert_eq!(route.hints().len(), 2);
/// ```
pub struct DynamicDestination<S: State> {
    selector: Box<dyn Fn(&Args) -> S>,
    hints: Vec<DestinationHint<S>>,
}

impl<S: State> DynamicDestination<S> {
    pub fn new<F>(selector: F) -> Self
    where
        F: Fn(&Args) -> S + 'static,
    {
        Self {
            selector: Box::new(selector),
            hints: Vec::new(),
        }
    }

    /// Document one destination the selector may return.
    pub fn possible(mut self, destination: S, description: impl Into<String>) -> Self {
        self.hints.push(DestinationHint {
            destination,
            description: description.into(),
        });
        self
    }

    pub fn select(&self, args: &Args) -> S {
        (self.selector)(args)
    }

    pub fn hints(&self) -> &[DestinationHint<S>] {
        &self.hints
    }
}

impl<S: State> fmt::Debug for DynamicDestination<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicDestination")
            .field("hints", &self.hints)
            .finish()
    }
}

/// What a behaviour does once chosen.
pub enum BehaviourKind<S: State, T: Trigger> {
    /// Move to another state.
    Transitioning { destination: S },
    /// Exit and re-enter the owning state.
    Reentry { destination: S },
    /// Run an action without changing state.
    Internal { action: TransitionAction<S, T> },
    /// Accept the trigger and do nothing.
    Ignored,
    /// Compute the destination from the fire-time arguments.
    Dynamic(DynamicDestination<S>),
}

impl<S: State, T: Trigger> BehaviourKind<S, T> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transitioning { .. } => "transitioning",
            Self::Reentry { .. } => "reentry",
            Self::Internal { .. } => "internal",
            Self::Ignored => "ignored",
            Self::Dynamic(_) => "dynamic",
        }
    }

    /// Destination known at configuration time, if any.
    pub fn static_destination(&self) -> Option<&S> {
        match self {
            Self::Transitioning { destination } | Self::Reentry { destination } => {
                Some(destination)
            }
            _ => None,
        }
    }
}

/// A guarded rule for one trigger at one state.
pub struct TriggerBehaviour<S: State, T: Trigger> {
    trigger: T,
    guard: Guard,
    kind: BehaviourKind<S, T>,
}

impl<S: State, T: Trigger> TriggerBehaviour<S, T> {
    pub fn new(trigger: T, guard: Guard, kind: BehaviourKind<S, T>) -> Self {
        Self {
            trigger,
            guard,
            kind,
        }
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn kind(&self) -> &BehaviourKind<S, T> {
        &self.kind
    }

    pub fn unmet_guards(&self, args: &Args) -> Vec<String> {
        self.guard.unmet(args)
    }
}

impl<S: State, T: Trigger> fmt::Debug for TriggerBehaviour<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerBehaviour")
            .field("trigger", &self.trigger)
            .field("kind", &self.kind.name())
            .field("guard", &self.guard)
            .finish()
    }
}

/// A behaviour chosen by resolution, with the guards it failed.
///
/// An empty unmet list means the behaviour is usable.
pub struct Resolution<'a, S: State, T: Trigger> {
    behaviour: &'a TriggerBehaviour<S, T>,
    unmet_guards: Vec<String>,
}

impl<'a, S: State, T: Trigger> Resolution<'a, S, T> {
    pub fn behaviour(&self) -> &'a TriggerBehaviour<S, T> {
        self.behaviour
    }

    pub fn unmet_guards(&self) -> &[String] {
        &self.unmet_guards
    }

    pub fn into_unmet_guards(self) -> Vec<String> {
        self.unmet_guards
    }

    pub fn is_satisfied(&self) -> bool {
        self.unmet_guards.is_empty()
    }
}

impl<S: State, T: Trigger> fmt::Debug for Resolution<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("behaviour", self.behaviour)
            .field("unmet_guards", &self.unmet_guards)
            .finish()
    }
}

/// Resolve `trigger` among the behaviours of a single state.
///
/// Returns the only guard-satisfied behaviour if there is one. Otherwise
/// returns the first behaviour with unmet guards, carrying the unmet
/// descriptions of every candidate (deduplicated, in declaration order).
/// Returns `None` when the state has no behaviour for the trigger.
pub fn resolve_local<'a, S, T>(
    state: &S,
    trigger: &T,
    behaviours: &'a [TriggerBehaviour<S, T>],
    args: &Args,
) -> Result<Option<Resolution<'a, S, T>>, AmbiguousTransition>
where
    S: State,
    T: Trigger,
{
    let evaluated: Vec<_> = behaviours
        .iter()
        .filter(|b| b.trigger() == trigger)
        .map(|b| (b, b.unmet_guards(args)))
        .collect();

    let mut satisfied = evaluated.iter().filter(|(_, unmet)| unmet.is_empty());
    if let Some((behaviour, _)) = satisfied.next() {
        if satisfied.next().is_some() {
            return Err(AmbiguousTransition {
                state: name_of(state),
                trigger: name_of(trigger),
            });
        }
        return Ok(Some(Resolution {
            behaviour: *behaviour,
            unmet_guards: Vec::new(),
        }));
    }

    let Some((first, _)) = evaluated.first() else {
        return Ok(None);
    };

    let mut unmet_guards: Vec<String> = Vec::new();
    for description in evaluated.iter().flat_map(|(_, unmet)| unmet) {
        if !unmet_guards.contains(description) {
            unmet_guards.push(description.clone());
        }
    }

    Ok(Some(Resolution {
        behaviour: *first,
        unmet_guards,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    type Behaviour = TriggerBehaviour<&'static str, &'static str>;

    fn permit(trigger: &'static str, to: &'static str, guard: Guard) -> Behaviour {
        TriggerBehaviour::new(trigger, guard, BehaviourKind::Transitioning { destination: to })
    }

    #[test]
    fn no_behaviour_for_trigger_resolves_to_none() {
        let behaviours = vec![permit("Y", "B", Guard::none())];
        let result = resolve_local(&"A", &"X", &behaviours, &Args::new()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn single_satisfied_behaviour_is_chosen() {
        let behaviours = vec![
            permit("X", "B", Guard::described("closed", |_| false)),
            permit("X", "C", Guard::described("open", |_| true)),
        ];

        let result = resolve_local(&"A", &"X", &behaviours, &Args::new())
            .unwrap()
            .unwrap();

        assert!(result.is_satisfied());
        assert_eq!(result.behaviour().kind().static_destination(), Some(&"C"));
    }

    #[test]
    fn two_satisfied_behaviours_are_ambiguous() {
        let behaviours = vec![permit("X", "B", Guard::none()), permit("X", "C", Guard::none())];

        let err = resolve_local(&"A", &"X", &behaviours, &Args::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Multiple permitted exit transitions are configured from state '\"A\"' for trigger '\"X\"'. Guard clauses must be mutually exclusive."
        );
    }

    #[test]
    fn unmet_descriptions_of_all_candidates_are_merged() {
        let behaviours = vec![
            TriggerBehaviour::new(
                "X",
                Guard::described("reentry guard failed", |_| false),
                BehaviourKind::Reentry { destination: "A" },
            ),
            permit("X", "C", Guard::described("permit guard failed", |_| false)),
            permit("X", "D", Guard::described("reentry guard failed", |_| false)),
        ];

        let result = resolve_local(&"A", &"X", &behaviours, &Args::new())
            .unwrap()
            .unwrap();

        assert!(!result.is_satisfied());
        assert_eq!(result.behaviour().kind().name(), "reentry");
        assert_eq!(
            result.unmet_guards(),
            &["reentry guard failed".to_string(), "permit guard failed".to_string()]
        );
    }

    #[test]
    fn guards_see_fire_time_arguments() {
        let behaviours = vec![
            permit(
                "X",
                "Small",
                Guard::described("small", |a| a.get::<i32>(0).is_some_and(|n| *n < 10)),
            ),
            permit(
                "X",
                "Large",
                Guard::described("large", |a| a.get::<i32>(0).is_some_and(|n| *n >= 10)),
            ),
        ];

        let small = resolve_local(&"A", &"X", &behaviours, &args![3]).unwrap().unwrap();
        let large = resolve_local(&"A", &"X", &behaviours, &args![30]).unwrap().unwrap();

        assert_eq!(small.behaviour().kind().static_destination(), Some(&"Small"));
        assert_eq!(large.behaviour().kind().static_destination(), Some(&"Large"));
    }

    #[test]
    fn dynamic_destination_uses_selector() {
        let dynamic =
            DynamicDestination::new(|args: &Args| *args.get::<&str>(0).unwrap_or(&"Fallback"));
        assert_eq!(dynamic.select(&args!["Target"]), "Target");
        assert_eq!(dynamic.select(&Args::new()), "Fallback");
    }
}
