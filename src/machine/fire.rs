//! Synchronous firing and activation.

use super::error::FireError;
use super::plan::{async_in_sync, FirePlan, TransitionPlan};
use super::{EnteredState, StateMachine};
use crate::behaviour::{LifecycleAction, TransitionAction};
use crate::core::{name_of, Args, State, Transition, Trigger};
use crate::graph::StateNode;
use tracing::{debug, trace};

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Fire `trigger` without arguments.
    pub fn fire(&self, trigger: T) -> Result<(), FireError> {
        self.fire_with(trigger, Args::new())
    }

    /// Fire `trigger` with `args`, running every action to completion.
    ///
    /// Fails before running anything when the arguments do not match the
    /// trigger's signature, when resolution is ambiguous, or when any action
    /// on the way is asynchronous. An unaccepted trigger goes to the
    /// unhandled-trigger handler, or fails when none is set.
    ///
    /// Actions may fire further triggers on the same machine; those run to
    /// completion before this call continues.
    pub fn fire_with(&self, trigger: T, args: Args) -> Result<(), FireError> {
        debug!("Firing trigger {:?} in state {:?}", trigger, self.state());

        let plan = self.plan(trigger, args)?;
        self.check_sync(&plan)?;

        match plan {
            FirePlan::Unhandled {
                state,
                trigger,
                unmet_guards,
            } => self.handle_unhandled(&state, &trigger, unmet_guards),
            FirePlan::Ignored => Ok(()),
            FirePlan::Internal { action, transition } => {
                action.execute(&transition);
                Ok(())
            }
            FirePlan::Transition(plan) => {
                self.run_transition(&plan);
                Ok(())
            }
        }
    }

    fn handle_unhandled(&self, state: &S, trigger: &T, unmet_guards: Vec<String>) -> Result<(), FireError> {
        debug!(
            "Trigger {:?} unhandled in state {:?} (unmet guards: {:?})",
            trigger, state, unmet_guards
        );
        match &self.unhandled {
            Some(handler) => {
                handler.execute(state, trigger, &unmet_guards);
                Ok(())
            }
            None => Err(unhandled_error(state, trigger, unmet_guards)),
        }
    }

    fn run_transition(&self, plan: &TransitionPlan<S, T>) {
        for (state, transition) in &plan.exits {
            trace!("Exiting {:?}", state);
            if let Some(node) = self.graph.node(state) {
                for action in node.exit_actions() {
                    action.execute(transition);
                }
            }
        }

        let entered = self.commit(plan);

        self.notify(&self.transitioned, &plan.transition);
        self.enter(&plan.entries, &plan.transition);

        for step in &plan.initial_steps {
            let superstate = step.announced.source();
            if self.state() != *superstate {
                debug!("State changed during entry, skipping remaining initial transitions");
                break;
            }
            self.notify(&self.transitioned, &step.announced);
            self.enter(&step.entries, &step.transition);
            if self.state() == *superstate {
                entered.advance(step.announced.destination().clone());
            }
        }
        drop(entered);

        let completed = plan.completed(self.state());
        self.notify(&self.completed, &completed);
    }

    fn enter(&self, states: &[S], transition: &Transition<S, T>) {
        for state in states {
            trace!("Entering {:?}", state);
            if let Some(node) = self.graph.node(state) {
                for action in node.entry_actions_for(transition) {
                    action.execute(transition);
                }
            }
        }
    }

    fn notify(&self, handlers: &[TransitionAction<S, T>], transition: &Transition<S, T>) {
        for handler in handlers {
            handler.execute(transition);
        }
    }

    /// Write the resting state to the store once, then report the
    /// destination as entered until initial transitions advance it.
    pub(super) fn commit(&self, plan: &TransitionPlan<S, T>) -> EnteredState<'_, S> {
        debug!(
            "Committing transition {:?} -> {:?}",
            plan.transition.source(),
            plan.destination
        );
        self.store.set(plan.destination.clone());
        EnteredState::hold(&self.entered, plan.transition.destination().clone())
    }

    /// Run the activate actions of the current state and its superstates,
    /// outermost first.
    ///
    /// Does nothing when the machine is already active.
    pub fn activate(&self) -> Result<(), FireError> {
        if self.active.get() {
            return Ok(());
        }

        let path = self.graph.activation_path(&self.state());
        check_lifecycle_sync(self, &path, "Activate", StateNode::activate_actions)?;

        for state in &path {
            trace!("Activating {:?}", state);
            if let Some(node) = self.graph.node(state) {
                node.activate_actions().iter().for_each(|a| a.execute());
            }
        }

        self.active.set(true);
        Ok(())
    }

    /// Run the deactivate actions of the current state and its superstates,
    /// innermost first.
    ///
    /// Does nothing when the machine is not active.
    pub fn deactivate(&self) -> Result<(), FireError> {
        if !self.active.get() {
            return Ok(());
        }

        let path = self.graph.deactivation_path(&self.state());
        check_lifecycle_sync(self, &path, "Deactivate", StateNode::deactivate_actions)?;

        for state in &path {
            trace!("Deactivating {:?}", state);
            if let Some(node) = self.graph.node(state) {
                node.deactivate_actions().iter().for_each(|a| a.execute());
            }
        }

        self.active.set(false);
        Ok(())
    }
}

fn check_lifecycle_sync<S: State, T: Trigger>(
    machine: &StateMachine<S, T>,
    path: &[S],
    kind: &str,
    actions: fn(&StateNode<S, T>) -> &[LifecycleAction],
) -> Result<(), FireError> {
    for state in path {
        let node = machine.graph.node(state);
        if node.is_some_and(|n| actions(n).iter().any(LifecycleAction::is_async)) {
            return Err(async_in_sync(&format!("{} action of state {:?}", kind, state)));
        }
    }
    Ok(())
}

pub(super) fn unhandled_error<S: State, T: Trigger>(
    state: &S,
    trigger: &T,
    unmet_guards: Vec<String>,
) -> FireError {
    if unmet_guards.is_empty() {
        FireError::UnhandledTrigger {
            state: name_of(state),
            trigger: name_of(trigger),
        }
    } else {
        FireError::GuardsNotMet {
            state: name_of(state),
            trigger: name_of(trigger),
            guards: unmet_guards,
        }
    }
}
