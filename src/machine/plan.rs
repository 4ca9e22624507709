//! Fire planning.
//!
//! Everything a fire call will do is decided before the first action runs:
//! argument validation, resolution, the destination, the exit and entry
//! paths and the whole initial-transition chain. The synchronous and
//! asynchronous paths execute the same plan.

use super::error::FireError;
use super::StateMachine;
use crate::behaviour::{BehaviourKind, TransitionAction};
use crate::core::{name_of, Args, State, Transition, Trigger};
use tracing::debug;

/// What one fire call does.
pub(crate) enum FirePlan<'a, S: State, T: Trigger> {
    Unhandled {
        state: S,
        trigger: T,
        unmet_guards: Vec<String>,
    },
    Ignored,
    Internal {
        action: &'a TransitionAction<S, T>,
        transition: Transition<S, T>,
    },
    Transition(TransitionPlan<S, T>),
}

/// The steps of a state-changing fire call.
pub(crate) struct TransitionPlan<S: State, T: Trigger> {
    /// States to exit, innermost first, each with the transition its exit
    /// actions receive.
    pub(crate) exits: Vec<(S, Transition<S, T>)>,
    /// The transition announced to subscribers before entry.
    pub(crate) transition: Transition<S, T>,
    /// States to enter for `transition`, outermost first.
    pub(crate) entries: Vec<S>,
    pub(crate) initial_steps: Vec<InitialStep<S, T>>,
    /// Where the machine rests once every initial transition is taken.
    pub(crate) destination: S,
}

pub(crate) struct InitialStep<S: State, T: Trigger> {
    /// Superstate to target, as announced to subscribers.
    pub(crate) announced: Transition<S, T>,
    /// Original source to target, as seen by entry actions.
    pub(crate) transition: Transition<S, T>,
    pub(crate) entries: Vec<S>,
}

impl<S: State, T: Trigger> TransitionPlan<S, T> {
    /// The transition reported once entry is complete.
    pub(crate) fn completed(&self, resting: S) -> Transition<S, T> {
        Transition::new(
            self.transition.source().clone(),
            resting,
            self.transition.trigger().clone(),
            self.transition.parameters().clone(),
        )
    }

    /// Every state whose entry actions run, with the transition they see.
    pub(crate) fn entry_steps(&self) -> impl Iterator<Item = (&S, &Transition<S, T>)> {
        let first = self.entries.iter().map(move |s| (s, &self.transition));
        let chained = self
            .initial_steps
            .iter()
            .flat_map(|step| step.entries.iter().map(move |s| (s, &step.transition)));
        first.chain(chained)
    }
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    pub(crate) fn plan(&self, trigger: T, args: Args) -> Result<FirePlan<'_, S, T>, FireError> {
        self.parameters.validate(&trigger, &args)?;

        let source = self.state();
        let resolution = self.graph.find_handler(&source, &trigger, &args)?;

        let behaviour = match resolution {
            Some(found) if found.is_satisfied() => found.behaviour(),
            other => {
                let unmet_guards = other.map(|r| r.into_unmet_guards()).unwrap_or_default();
                return Ok(FirePlan::Unhandled {
                    state: source,
                    trigger,
                    unmet_guards,
                });
            }
        };

        debug!(
            "Trigger {:?} in state {:?} resolved to {} behaviour",
            trigger,
            source,
            behaviour.kind().name()
        );

        let plan = match behaviour.kind() {
            BehaviourKind::Ignored => FirePlan::Ignored,
            BehaviourKind::Internal { action } => FirePlan::Internal {
                action,
                transition: Transition::new(source.clone(), source, trigger, args),
            },
            BehaviourKind::Transitioning { destination } => {
                let transition = Transition::new(source, destination.clone(), trigger, args);
                FirePlan::Transition(self.transition_plan(Vec::new(), transition)?)
            }
            BehaviourKind::Dynamic(dynamic) => {
                let destination = dynamic.select(&args);
                let transition = Transition::new(source, destination, trigger, args);
                FirePlan::Transition(self.transition_plan(Vec::new(), transition)?)
            }
            BehaviourKind::Reentry { destination } => {
                let transition = Transition::new(source, destination.clone(), trigger, args);
                FirePlan::Transition(self.reentry_plan(transition)?)
            }
        };

        Ok(plan)
    }

    /// Reentry of the state owning the behaviour.
    ///
    /// When inherited from a superstate, the substates below it are exited
    /// first and the superstate is then re-entered as a reentry of its own.
    fn reentry_plan(&self, transition: Transition<S, T>) -> Result<TransitionPlan<S, T>, FireError> {
        if transition.is_reentry() {
            return self.transition_plan(Vec::new(), transition);
        }

        let exits = self
            .graph
            .exit_path(&transition)
            .into_iter()
            .map(|s| (s, transition.clone()))
            .collect();

        let owner = transition.destination().clone();
        let reentry = Transition::new(
            owner.clone(),
            owner,
            transition.trigger().clone(),
            transition.parameters().clone(),
        );
        self.transition_plan(exits, reentry)
    }

    fn transition_plan(
        &self,
        mut exits: Vec<(S, Transition<S, T>)>,
        transition: Transition<S, T>,
    ) -> Result<TransitionPlan<S, T>, FireError> {
        exits.extend(
            self.graph
                .exit_path(&transition)
                .into_iter()
                .map(|s| (s, transition.clone())),
        );
        let entries = self.graph.entry_path(&transition);
        let initial_steps = self.initial_chain(&transition)?;
        let destination = initial_steps
            .last()
            .map(|step| step.transition.destination().clone())
            .unwrap_or_else(|| transition.destination().clone());

        Ok(TransitionPlan {
            exits,
            transition,
            entries,
            initial_steps,
            destination,
        })
    }

    /// Follow initial transitions down from the destination of `transition`.
    fn initial_chain(&self, transition: &Transition<S, T>) -> Result<Vec<InitialStep<S, T>>, FireError> {
        let mut steps = Vec::new();
        let mut current = transition.destination().clone();

        while let Some(target) = self.graph.initial_target(&current) {
            if *target == current || !self.graph.includes(&current, target) {
                return Err(FireError::InitialTransitionNotSubstate {
                    state: name_of(&current),
                    target: name_of(target),
                });
            }

            let announced = Transition::initial(
                current,
                target.clone(),
                transition.trigger().clone(),
                transition.parameters().clone(),
            );
            let entries = self.graph.entry_path(&announced);
            let initial = Transition::initial(
                transition.source().clone(),
                target.clone(),
                transition.trigger().clone(),
                transition.parameters().clone(),
            );
            current = target.clone();
            steps.push(InitialStep {
                announced,
                transition: initial,
                entries,
            });
        }

        Ok(steps)
    }

    /// Reject a plan that would need an asynchronous action on the
    /// synchronous path.
    pub(crate) fn check_sync(&self, plan: &FirePlan<'_, S, T>) -> Result<(), FireError> {
        match plan {
            FirePlan::Unhandled { .. } => {
                if self.unhandled.as_ref().is_some_and(|h| h.is_async()) {
                    return Err(async_in_sync("Unhandled trigger handler"));
                }
            }
            FirePlan::Ignored => {}
            FirePlan::Internal { action, transition } => {
                if action.is_async() {
                    return Err(async_in_sync(&format!(
                        "Internal transition action for trigger {:?}",
                        transition.trigger()
                    )));
                }
            }
            FirePlan::Transition(plan) => {
                for (state, _) in &plan.exits {
                    let node = self.graph.node(state);
                    if node.is_some_and(|n| n.exit_actions().iter().any(TransitionAction::is_async)) {
                        return Err(async_in_sync(&format!("Exit action of state {:?}", state)));
                    }
                }
                for (state, transition) in plan.entry_steps() {
                    let node = self.graph.node(state);
                    if node.is_some_and(|n| n.entry_actions_for(transition).any(|a| a.is_async())) {
                        return Err(async_in_sync(&format!("Entry action of state {:?}", state)));
                    }
                }
                if self.transitioned.iter().any(TransitionAction::is_async) {
                    return Err(async_in_sync("Transitioned event handler"));
                }
                if self.completed.iter().any(TransitionAction::is_async) {
                    return Err(async_in_sync("Transition completed event handler"));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn async_in_sync(what: &str) -> FireError {
    FireError::AsyncInSyncContext {
        what: what.to_string(),
    }
}
