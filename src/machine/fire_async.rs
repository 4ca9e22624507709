//! Asynchronous firing and activation.
//!
//! The async path executes the same plans as the synchronous one, awaiting
//! each action's effect before moving to the next step. Overlapping
//! `fire_async` calls on one machine are serialised: while a call is in
//! progress, further triggers are queued and drained, in order, by that
//! call before it returns.

use super::error::FireError;
use super::fire::unhandled_error;
use super::plan::{FirePlan, TransitionPlan};
use super::StateMachine;
use crate::behaviour::{LifecycleAction, TransitionAction};
use crate::core::{Args, State, Transition, Trigger};
use crate::graph::StateNode;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Marks a machine as firing for as long as it lives.
///
/// Dropping it (on success, error or cancellation) clears the flag and
/// discards triggers that were queued behind the failed call.
struct FiringGuard<'a, T: Trigger> {
    firing: &'a Cell<bool>,
    queue: &'a RefCell<VecDeque<(T, Args)>>,
}

impl<'a, T: Trigger> FiringGuard<'a, T> {
    fn engage(firing: &'a Cell<bool>, queue: &'a RefCell<VecDeque<(T, Args)>>) -> Self {
        firing.set(true);
        Self { firing, queue }
    }
}

impl<T: Trigger> Drop for FiringGuard<'_, T> {
    fn drop(&mut self) {
        self.firing.set(false);
        let discarded: Vec<T> = self.queue.borrow_mut().drain(..).map(|(t, _)| t).collect();
        if !discarded.is_empty() {
            debug!("Discarding queued triggers {:?}", discarded);
        }
    }
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Fire `trigger` without arguments on the async path.
    pub async fn fire_async(&self, trigger: T) -> Result<(), FireError> {
        self.fire_async_with(trigger, Args::new()).await
    }

    /// Fire `trigger` with `args`, awaiting asynchronous actions.
    ///
    /// If another `fire_async` call on this machine is in progress, the
    /// trigger is queued and this call returns immediately; the call in
    /// progress fires it once its own transition is complete. When the call
    /// in progress fails, triggers still queued behind it are discarded even
    /// though their callers already got `Ok(())`.
    pub async fn fire_async_with(&self, trigger: T, args: Args) -> Result<(), FireError> {
        if self.firing.get() {
            debug!("Fire in progress, queueing trigger {:?}", trigger);
            self.queue.borrow_mut().push_back((trigger, args));
            return Ok(());
        }

        let _guard = FiringGuard::engage(&self.firing, &self.queue);
        let mut next = Some((trigger, args));
        while let Some((trigger, args)) = next {
            self.fire_one_async(trigger, args).await?;
            next = self.queue.borrow_mut().pop_front();
        }
        Ok(())
    }

    async fn fire_one_async(&self, trigger: T, args: Args) -> Result<(), FireError> {
        debug!("Firing trigger {:?} in state {:?} (async)", trigger, self.state());

        match self.plan(trigger, args)? {
            FirePlan::Unhandled {
                state,
                trigger,
                unmet_guards,
            } => {
                debug!("Trigger {:?} unhandled in state {:?}", trigger, state);
                match &self.unhandled {
                    Some(handler) => Ok(handler.execute_async(&state, &trigger, &unmet_guards).await?),
                    None => Err(unhandled_error(&state, &trigger, unmet_guards)),
                }
            }
            FirePlan::Ignored => Ok(()),
            FirePlan::Internal { action, transition } => {
                Ok(action.execute_async(&transition).await?)
            }
            FirePlan::Transition(plan) => self.run_transition_async(&plan).await,
        }
    }

    async fn run_transition_async(&self, plan: &TransitionPlan<S, T>) -> Result<(), FireError> {
        for (state, transition) in &plan.exits {
            trace!("Exiting {:?}", state);
            if let Some(node) = self.graph.node(state) {
                for action in node.exit_actions() {
                    action.execute_async(transition).await?;
                }
            }
        }

        let entered = self.commit(plan);

        notify_async(&self.transitioned, &plan.transition).await?;
        self.enter_async(&plan.entries, &plan.transition).await?;

        for step in &plan.initial_steps {
            let superstate = step.announced.source();
            if self.state() != *superstate {
                debug!("State changed during entry, skipping remaining initial transitions");
                break;
            }
            notify_async(&self.transitioned, &step.announced).await?;
            self.enter_async(&step.entries, &step.transition).await?;
            if self.state() == *superstate {
                entered.advance(step.announced.destination().clone());
            }
        }
        drop(entered);

        let completed = plan.completed(self.state());
        notify_async(&self.completed, &completed).await
    }

    async fn enter_async(&self, states: &[S], transition: &Transition<S, T>) -> Result<(), FireError> {
        for state in states {
            trace!("Entering {:?}", state);
            if let Some(node) = self.graph.node(state) {
                for action in node.entry_actions_for(transition) {
                    action.execute_async(transition).await?;
                }
            }
        }
        Ok(())
    }

    /// Async counterpart of [`activate`](Self::activate).
    pub async fn activate_async(&self) -> Result<(), FireError> {
        if self.active.get() {
            return Ok(());
        }

        let path = self.graph.activation_path(&self.state());
        self.run_lifecycle_async(&path, StateNode::activate_actions).await?;

        self.active.set(true);
        Ok(())
    }

    /// Async counterpart of [`deactivate`](Self::deactivate).
    pub async fn deactivate_async(&self) -> Result<(), FireError> {
        if !self.active.get() {
            return Ok(());
        }

        let path = self.graph.deactivation_path(&self.state());
        self.run_lifecycle_async(&path, StateNode::deactivate_actions).await?;

        self.active.set(false);
        Ok(())
    }

    async fn run_lifecycle_async(
        &self,
        path: &[S],
        actions: fn(&StateNode<S, T>) -> &[LifecycleAction],
    ) -> Result<(), FireError> {
        for state in path {
            trace!("Running lifecycle actions of {:?}", state);
            if let Some(node) = self.graph.node(state) {
                for action in actions(node) {
                    action.execute_async().await?;
                }
            }
        }
        Ok(())
    }
}

async fn notify_async<S: State, T: Trigger>(
    handlers: &[TransitionAction<S, T>],
    transition: &Transition<S, T>,
) -> Result<(), FireError> {
    for handler in handlers {
        handler.execute_async(transition).await?;
    }
    Ok(())
}
