//! Lifecycle, transition and event actions.
//!
//! Every action comes in two flavours. Synchronous actions run to completion
//! immediately. Asynchronous actions are factories that create a fresh
//! Stillwater effect on each invocation; only the async fire path may run them.

use crate::core::{State, Transition, Trigger};
use stillwater::effect::{BoxedEffect, Effect};
use thiserror::Error;

/// Failure reported by an asynchronous action's effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Action failed: {0}")]
    Failed(String),
}

impl ActionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Effect produced by an asynchronous action.
pub type ActionEffect = BoxedEffect<(), ActionError, ()>;

/// Synchronous action receiving the transition being performed.
pub type SyncTransitionAction<S, T> = Box<dyn Fn(&Transition<S, T>)>;

/// Factory creating the effect of an asynchronous transition action.
pub type AsyncTransitionAction<S, T> = Box<dyn Fn(&Transition<S, T>) -> ActionEffect>;

/// Action run with a transition: entry, exit, internal and event handlers.
pub enum TransitionAction<S: State, T: Trigger> {
    Sync(SyncTransitionAction<S, T>),
    Async(AsyncTransitionAction<S, T>),
}

impl<S: State, T: Trigger> TransitionAction<S, T> {
    pub fn sync<F>(action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        Self::Sync(Box::new(action))
    }

    pub fn asynchronous<F>(factory: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        Self::Async(Box::new(factory))
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Run on the synchronous path.
    ///
    /// Asynchronous actions are skipped; the synchronous fire path rejects
    /// them before any side effect happens.
    pub(crate) fn execute(&self, transition: &Transition<S, T>) {
        if let Self::Sync(action) = self {
            action(transition);
        }
    }

    /// Run on the asynchronous path, awaiting the effect of async actions.
    pub(crate) async fn execute_async(&self, transition: &Transition<S, T>) -> Result<(), ActionError> {
        match self {
            Self::Sync(action) => {
                action(transition);
                Ok(())
            }
            Self::Async(factory) => factory(transition).run(&()).await,
        }
    }
}

/// An entry action, optionally restricted to one incoming trigger.
pub struct EntryAction<S: State, T: Trigger> {
    action: TransitionAction<S, T>,
    from_trigger: Option<T>,
}

impl<S: State, T: Trigger> EntryAction<S, T> {
    pub fn new(action: TransitionAction<S, T>) -> Self {
        Self {
            action,
            from_trigger: None,
        }
    }

    pub fn from_trigger(trigger: T, action: TransitionAction<S, T>) -> Self {
        Self {
            action,
            from_trigger: Some(trigger),
        }
    }

    pub fn trigger(&self) -> Option<&T> {
        self.from_trigger.as_ref()
    }

    pub fn action(&self) -> &TransitionAction<S, T> {
        &self.action
    }

    /// Whether this action runs for the given transition.
    pub fn applies_to(&self, transition: &Transition<S, T>) -> bool {
        self.from_trigger
            .as_ref()
            .is_none_or(|trigger| trigger == transition.trigger())
    }
}

/// Action run on activation or deactivation; it takes no arguments.
pub enum LifecycleAction {
    Sync(Box<dyn Fn()>),
    Async(Box<dyn Fn() -> ActionEffect>),
}

impl LifecycleAction {
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    pub(crate) fn execute(&self) {
        if let Self::Sync(action) = self {
            action();
        }
    }

    pub(crate) async fn execute_async(&self) -> Result<(), ActionError> {
        match self {
            Self::Sync(action) => {
                action();
                Ok(())
            }
            Self::Async(factory) => factory().run(&()).await,
        }
    }
}

/// Callback for triggers that no behaviour in the hierarchy accepts.
///
/// Receives the current state, the trigger and the unmet guard
/// descriptions (empty when no behaviour was configured at all).
pub enum UnhandledTriggerAction<S: State, T: Trigger> {
    Sync(Box<dyn Fn(&S, &T, &[String])>),
    Async(Box<dyn Fn(&S, &T, &[String]) -> ActionEffect>),
}

impl<S: State, T: Trigger> UnhandledTriggerAction<S, T> {
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    pub(crate) fn execute(&self, state: &S, trigger: &T, unmet: &[String]) {
        if let Self::Sync(action) = self {
            action(state, trigger, unmet);
        }
    }

    pub(crate) async fn execute_async(
        &self,
        state: &S,
        trigger: &T,
        unmet: &[String],
    ) -> Result<(), ActionError> {
        match self {
            Self::Sync(action) => {
                action(state, trigger, unmet);
                Ok(())
            }
            Self::Async(factory) => factory(state, trigger, unmet).run(&()).await,
        }
    }
}
