//! Fluent configuration of a single state.

use crate::behaviour::{
    ActionEffect, BehaviourKind, DynamicDestination, EntryAction, LifecycleAction,
    TransitionAction, TriggerBehaviour,
};
use crate::builder::error::ConfigurationError;
use crate::core::{name_of, Guard, State, Transition, Trigger};
use crate::machine::StateMachine;

/// Configures one state of a machine.
///
/// Obtained from [`StateMachine::configure`]. Infallible operations return
/// `Self`; operations that can violate a hierarchy or reentry rule return
/// `Result<Self, ConfigurationError>` so chains read naturally with `?`.
///
/// # Example
///
/// ```rust
/// use substate::{ConfigurationError, Guard, StateMachine};
///
/// fn build() -> Result<StateMachine<&'static str, &'static str>, ConfigurationError> {
///     let mut machine = StateMachine::new("Idle");
///
///     machine
///         .configure("Idle")
///         .permit("start", "Running")?
///         .ignore("stop");
///
///     machine
///         .configure("Running")
///         .permit_if("stop", "Idle", Guard::described("job finished", |_| true))?
///         .permit_reentry("restart")
///         .on_entry(|t| println!("running after {:?}", t.trigger()));
///
///     Ok(machine)
/// }
///
/// let machine = build().unwrap();
/// machine.fire("start").unwrap();
/// assert_eq!(machine.state(), "Running");
/// ```
pub struct StateConfiguration<'m, S: State, T: Trigger> {
    machine: &'m mut StateMachine<S, T>,
    state: S,
}

impl<'m, S: State, T: Trigger> StateConfiguration<'m, S, T> {
    pub(crate) fn new(machine: &'m mut StateMachine<S, T>, state: S) -> Self {
        machine.graph_mut().node_mut(state.clone());
        Self { machine, state }
    }

    /// The state being configured.
    pub fn state(&self) -> &S {
        &self.state
    }

    fn behaviour(self, trigger: T, guard: Guard, kind: BehaviourKind<S, T>) -> Self {
        let behaviour = TriggerBehaviour::new(trigger, guard, kind);
        self.machine
            .graph_mut()
            .add_trigger_behaviour(self.state.clone(), behaviour);
        self
    }

    /// Move to `destination` when `trigger` fires.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, ConfigurationError> {
        self.permit_if(trigger, destination, Guard::none())
    }

    /// Move to `destination` when `trigger` fires and `guard` holds.
    pub fn permit_if(self, trigger: T, destination: S, guard: Guard) -> Result<Self, ConfigurationError> {
        if destination == self.state {
            return Err(ConfigurationError::ImplicitReentry {
                state: name_of(&self.state),
                trigger: name_of(&trigger),
            });
        }
        Ok(self.behaviour(trigger, guard, BehaviourKind::Transitioning { destination }))
    }

    /// Exit and re-enter this state when `trigger` fires.
    pub fn permit_reentry(self, trigger: T) -> Self {
        self.permit_reentry_if(trigger, Guard::none())
    }

    pub fn permit_reentry_if(self, trigger: T, guard: Guard) -> Self {
        let destination = self.state.clone();
        self.behaviour(trigger, guard, BehaviourKind::Reentry { destination })
    }

    /// Move to a destination chosen from the fire-time arguments.
    pub fn permit_dynamic(self, trigger: T, destination: DynamicDestination<S>) -> Self {
        self.permit_dynamic_if(trigger, destination, Guard::none())
    }

    pub fn permit_dynamic_if(self, trigger: T, destination: DynamicDestination<S>, guard: Guard) -> Self {
        self.behaviour(trigger, guard, BehaviourKind::Dynamic(destination))
    }

    /// Accept `trigger` without doing anything.
    pub fn ignore(self, trigger: T) -> Self {
        self.ignore_if(trigger, Guard::none())
    }

    pub fn ignore_if(self, trigger: T, guard: Guard) -> Self {
        self.behaviour(trigger, guard, BehaviourKind::Ignored)
    }

    /// Run `action` when `trigger` fires, without leaving the state.
    pub fn internal_transition<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.internal_transition_if(trigger, Guard::none(), action)
    }

    pub fn internal_transition_if<F>(self, trigger: T, guard: Guard, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        let action = TransitionAction::sync(action);
        self.behaviour(trigger, guard, BehaviourKind::Internal { action })
    }

    pub fn internal_transition_async<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.internal_transition_async_if(trigger, Guard::none(), action)
    }

    pub fn internal_transition_async_if<F>(self, trigger: T, guard: Guard, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        let action = TransitionAction::asynchronous(action);
        self.behaviour(trigger, guard, BehaviourKind::Internal { action })
    }

    fn entry(self, entry: EntryAction<S, T>) -> Self {
        self.machine
            .graph_mut()
            .add_entry_action(self.state.clone(), entry);
        self
    }

    /// Run `action` whenever the state is entered.
    pub fn on_entry<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.entry(EntryAction::new(TransitionAction::sync(action)))
    }

    /// Run `action` when the state is entered through `trigger`.
    pub fn on_entry_from<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.entry(EntryAction::from_trigger(trigger, TransitionAction::sync(action)))
    }

    pub fn on_entry_async<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.entry(EntryAction::new(TransitionAction::asynchronous(action)))
    }

    pub fn on_entry_from_async<F>(self, trigger: T, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.entry(EntryAction::from_trigger(
            trigger,
            TransitionAction::asynchronous(action),
        ))
    }

    /// Run `action` whenever the state is exited.
    pub fn on_exit<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) + 'static,
    {
        self.machine
            .graph_mut()
            .add_exit_action(self.state.clone(), TransitionAction::sync(action));
        self
    }

    pub fn on_exit_async<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> ActionEffect + 'static,
    {
        self.machine
            .graph_mut()
            .add_exit_action(self.state.clone(), TransitionAction::asynchronous(action));
        self
    }

    /// Run `action` when the machine is activated in this state or a substate.
    pub fn on_activate<F>(self, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.machine
            .graph_mut()
            .add_activate_action(self.state.clone(), LifecycleAction::Sync(Box::new(action)));
        self
    }

    pub fn on_activate_async<F>(self, action: F) -> Self
    where
        F: Fn() -> ActionEffect + 'static,
    {
        self.machine
            .graph_mut()
            .add_activate_action(self.state.clone(), LifecycleAction::Async(Box::new(action)));
        self
    }

    /// Run `action` when the machine is deactivated in this state or a substate.
    pub fn on_deactivate<F>(self, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.machine
            .graph_mut()
            .add_deactivate_action(self.state.clone(), LifecycleAction::Sync(Box::new(action)));
        self
    }

    pub fn on_deactivate_async<F>(self, action: F) -> Self
    where
        F: Fn() -> ActionEffect + 'static,
    {
        self.machine
            .graph_mut()
            .add_deactivate_action(self.state.clone(), LifecycleAction::Async(Box::new(action)));
        self
    }

    /// Make this state a substate of `superstate`.
    pub fn substate_of(self, superstate: S) -> Result<Self, ConfigurationError> {
        self.machine
            .graph_mut()
            .set_superstate(self.state.clone(), superstate)?;
        Ok(self)
    }

    /// Enter `target` automatically whenever this state is entered.
    pub fn initial_transition(self, target: S) -> Result<Self, ConfigurationError> {
        self.machine
            .graph_mut()
            .set_initial_transition(self.state.clone(), target)?;
        Ok(self)
    }
}
