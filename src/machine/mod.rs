//! The state machine: configuration owner and transition orchestrator.
//!
//! A machine owns the state graph, the trigger parameter registry, the
//! event subscribers and the reader/writer pair for the current state.
//! Configuration needs `&mut self`; firing only needs `&self`, so actions
//! holding a shared handle to the machine can fire nested triggers.
//!
//! # Example
//!
//! ```rust
//! use substate::StateMachine;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Phone { OffHook, Ringing, Connected }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Call { Dial, Answer, HangUp }
//!
//! let mut phone = StateMachine::new(Phone::OffHook);
//! phone.configure(Phone::OffHook).permit(Call::Dial, Phone::Ringing).unwrap();
//! phone
//!     .configure(Phone::Ringing)
//!     .permit(Call::Answer, Phone::Connected)
//!     .unwrap()
//!     .permit(Call::HangUp, Phone::OffHook)
//!     .unwrap();
//!
//! phone.fire(Call::Dial).unwrap();
//! phone.fire(Call::Answer).unwrap();
//! assert_eq!(phone.state(), Phone::Connected);
//! ```

mod error;
mod fire;
mod fire_async;
mod plan;
mod store;

pub use error::FireError;

use crate::behaviour::{ActionEffect, TransitionAction, UnhandledTriggerAction};
use crate::builder::{ConfigurationError, StateConfiguration};
use crate::core::{Args, State, Transition, Trigger};
use crate::graph::StateGraph;
use crate::parameters::{ParamType, TriggerParameterRegistry};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use store::StateStore;

/// Hierarchical state machine over states `S` and triggers `T`.
pub struct StateMachine<S: State, T: Trigger> {
    graph: StateGraph<S, T>,
    parameters: TriggerParameterRegistry<T>,
    store: StateStore<S>,
    transitioned: Vec<TransitionAction<S, T>>,
    completed: Vec<TransitionAction<S, T>>,
    unhandled: Option<UnhandledTriggerAction<S, T>>,
    active: Cell<bool>,
    /// The state entered so far while a transition's entry actions run.
    entered: RefCell<Option<S>>,
    firing: Cell<bool>,
    queue: RefCell<VecDeque<(T, Args)>>,
}

impl<S: State, T: Trigger> StateMachine<S, T> {
    /// Create a machine that keeps its current state internally.
    pub fn new(initial: S) -> Self {
        Self::with_store(StateStore::internal(initial))
    }

    /// Create a machine whose current state lives with the host.
    ///
    /// `set` is called at most once per fire call, with the state the
    /// machine comes to rest in.
    pub fn with_external_state<G, W>(get: G, set: W) -> Self
    where
        G: Fn() -> S + 'static,
        W: Fn(S) + 'static,
    {
        Self::with_store(StateStore::external(get, set))
    }

    fn with_store(store: StateStore<S>) -> Self {
        Self {
            graph: StateGraph::new(),
            parameters: TriggerParameterRegistry::new(),
            store,
            transitioned: Vec::new(),
            completed: Vec::new(),
            unhandled: None,
            active: Cell::new(false),
            entered: RefCell::new(None),
            firing: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        }
    }

    /// Begin configuring `state`.
    pub fn configure(&mut self, state: S) -> StateConfiguration<'_, S, T> {
        StateConfiguration::new(self, state)
    }

    pub fn graph(&self) -> &StateGraph<S, T> {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut StateGraph<S, T> {
        &mut self.graph
    }

    pub fn trigger_parameters(&self) -> &TriggerParameterRegistry<T> {
        &self.parameters
    }

    /// Declare the argument types `trigger` must be fired with.
    pub fn set_trigger_parameters(
        &mut self,
        trigger: T,
        types: Vec<ParamType>,
    ) -> Result<(), ConfigurationError> {
        self.parameters.set(trigger, types)
    }

    /// The current state.
    ///
    /// While a transition enters states, this is its destination, then each
    /// initial-transition target once that target's entry actions have run.
    /// The store already holds where the fire call will come to rest.
    pub fn state(&self) -> S {
        let entered = self.entered.borrow().clone();
        entered.unwrap_or_else(|| self.store.get())
    }

    /// True when the current state is `state` or one of its substates.
    pub fn is_in_state(&self, state: &S) -> bool {
        self.graph.includes(state, &self.state())
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Whether `trigger` would be accepted without arguments.
    pub fn can_fire(&self, trigger: &T) -> Result<bool, FireError> {
        self.can_fire_with(trigger, &Args::new())
    }

    /// Whether `trigger` would be accepted with `args`.
    pub fn can_fire_with(&self, trigger: &T, args: &Args) -> Result<bool, FireError> {
        let resolution = self.graph.find_handler(&self.state(), trigger, args)?;
        Ok(resolution.is_some_and(|r| r.is_satisfied()))
    }

    /// Guard descriptions blocking `trigger`.
    ///
    /// `None` when no behaviour for the trigger exists anywhere in the
    /// current hierarchy; an empty list when the trigger can fire.
    pub fn unmet_guards(&self, trigger: &T, args: &Args) -> Result<Option<Vec<String>>, FireError> {
        let resolution = self.graph.find_handler(&self.state(), trigger, args)?;
        Ok(resolution.map(|r| r.into_unmet_guards()))
    }

    /// Triggers accepted in the current state with `args`, including
    /// inherited ones.
    pub fn permitted_triggers(&self, args: &Args) -> Vec<T> {
        self.graph.permitted_triggers(&self.state(), args)
    }

    /// Subscribe to transitions, notified after exit and before entry.
    pub fn on_transitioned<F>(&mut self, handler: F)
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.transitioned.push(TransitionAction::sync(handler));
    }

    /// Subscribe to transitions on the async path only.
    pub fn on_transitioned_async<F>(&mut self, handler: F)
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.transitioned.push(TransitionAction::asynchronous(handler));
    }

    /// Subscribe to completed transitions, notified once entry (including
    /// initial transitions) has finished.
    pub fn on_transition_completed<F>(&mut self, handler: F)
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.completed.push(TransitionAction::sync(handler));
    }

    pub fn on_transition_completed_async<F>(&mut self, handler: F)
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.completed.push(TransitionAction::asynchronous(handler));
    }

    /// Replace the handling of unaccepted triggers.
    ///
    /// Without a handler, an unaccepted trigger fails the fire call.
    pub fn on_unhandled_trigger<F>(&mut self, handler: F)
    where
        F: Fn(&S, &T, &[String]) + 'static,
    {
        self.unhandled = Some(UnhandledTriggerAction::Sync(Box::new(handler)));
    }

    pub fn on_unhandled_trigger_async<F>(&mut self, handler: F)
    where
        F: Fn(&S, &T, &[String]) -> ActionEffect + 'static,
    {
        self.unhandled = Some(UnhandledTriggerAction::Async(Box::new(handler)));
    }
}

/// Reports the state being entered through `StateMachine::state` until
/// dropped.
pub(crate) struct EnteredState<'a, S> {
    cell: &'a RefCell<Option<S>>,
}

impl<'a, S> EnteredState<'a, S> {
    fn hold(cell: &'a RefCell<Option<S>>, state: S) -> Self {
        *cell.borrow_mut() = Some(state);
        Self { cell }
    }

    /// Record that `state` has now been entered.
    pub(crate) fn advance(&self, state: S) {
        *self.cell.borrow_mut() = Some(state);
    }
}

impl<S> Drop for EnteredState<'_, S> {
    fn drop(&mut self) {
        *self.cell.borrow_mut() = None;
    }
}

impl<S: State, T: Trigger> fmt::Debug for StateMachine<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state())
            .field("states", &self.graph.nodes().count())
            .field("active", &self.active.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::core::Guard;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Light {
        Off,
        On,
        Dimmed,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Switch {
        Toggle,
        Dim,
    }

    #[test]
    fn new_machine_starts_in_initial_state() {
        let machine = StateMachine::<Light, Switch>::new(Light::Off);
        assert_eq!(machine.state(), Light::Off);
        assert!(!machine.is_active());
    }

    #[test]
    fn is_in_state_covers_superstates() {
        let mut machine = StateMachine::<Light, Switch>::new(Light::Dimmed);
        machine.configure(Light::Dimmed).substate_of(Light::On).unwrap();

        assert!(machine.is_in_state(&Light::Dimmed));
        assert!(machine.is_in_state(&Light::On));
        assert!(!machine.is_in_state(&Light::Off));
    }

    #[test]
    fn can_fire_reflects_guards() {
        let mut machine = StateMachine::new(Light::On);
        machine
            .configure(Light::On)
            .permit_if(Switch::Dim, Light::Dimmed, Guard::described("bright", |args| {
                args.get::<u8>(0).is_some_and(|level| *level > 10)
            }))
            .unwrap();

        assert!(machine.can_fire_with(&Switch::Dim, &args![50u8]).unwrap());
        assert!(!machine.can_fire_with(&Switch::Dim, &args![5u8]).unwrap());
        assert!(!machine.can_fire(&Switch::Toggle).unwrap());
    }

    #[test]
    fn unmet_guards_distinguishes_missing_from_blocked() {
        let mut machine = StateMachine::new(Light::On);
        machine
            .configure(Light::On)
            .permit_if(Switch::Dim, Light::Dimmed, Guard::described("Guard failed", |_| false))
            .unwrap()
            .permit(Switch::Toggle, Light::Off)
            .unwrap();

        assert_eq!(
            machine.unmet_guards(&Switch::Dim, &Args::new()).unwrap(),
            Some(vec!["Guard failed".to_string()])
        );
        assert_eq!(machine.unmet_guards(&Switch::Toggle, &Args::new()).unwrap(), Some(vec![]));

        let bare = StateMachine::<Light, Switch>::new(Light::Off);
        assert_eq!(bare.unmet_guards(&Switch::Toggle, &Args::new()).unwrap(), None);
    }

    #[test]
    fn external_state_is_read_and_written_through_accessors() {
        use std::rc::Rc;

        let stored = Rc::new(RefCell::new(Light::Off));
        let writes = Rc::new(Cell::new(0));
        let (reader, writer, counter) = (stored.clone(), stored.clone(), writes.clone());

        let mut machine = StateMachine::with_external_state(
            move || reader.borrow().clone(),
            move |state| {
                counter.set(counter.get() + 1);
                *writer.borrow_mut() = state;
            },
        );
        machine.configure(Light::Off).permit(Switch::Toggle, Light::On).unwrap();

        machine.fire(Switch::Toggle).unwrap();

        assert_eq!(*stored.borrow(), Light::On);
        assert_eq!(writes.get(), 1);
    }
}
