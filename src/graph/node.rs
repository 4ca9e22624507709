//! Per-state configuration.

use crate::behaviour::{EntryAction, LifecycleAction, TransitionAction, TriggerBehaviour};
use crate::core::{State, Transition, Trigger};

/// Everything configured for one state.
///
/// Hierarchy links are stored as identities; the owning [`StateGraph`]
/// resolves them.
///
/// [`StateGraph`]: super::StateGraph
pub struct StateNode<S: State, T: Trigger> {
    state: S,
    entry_actions: Vec<EntryAction<S, T>>,
    exit_actions: Vec<TransitionAction<S, T>>,
    activate_actions: Vec<LifecycleAction>,
    deactivate_actions: Vec<LifecycleAction>,
    behaviours: Vec<TriggerBehaviour<S, T>>,
    pub(super) superstate: Option<S>,
    pub(super) substates: Vec<S>,
    pub(super) initial_transition: Option<S>,
}

impl<S: State, T: Trigger> StateNode<S, T> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            activate_actions: Vec::new(),
            deactivate_actions: Vec::new(),
            behaviours: Vec::new(),
            superstate: None,
            substates: Vec::new(),
            initial_transition: None,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn superstate(&self) -> Option<&S> {
        self.superstate.as_ref()
    }

    /// Immediate substates, in the order they were attached.
    pub fn substates(&self) -> &[S] {
        &self.substates
    }

    pub fn initial_transition(&self) -> Option<&S> {
        self.initial_transition.as_ref()
    }

    pub fn entry_actions(&self) -> &[EntryAction<S, T>] {
        &self.entry_actions
    }

    pub fn exit_actions(&self) -> &[TransitionAction<S, T>] {
        &self.exit_actions
    }

    pub fn activate_actions(&self) -> &[LifecycleAction] {
        &self.activate_actions
    }

    pub fn deactivate_actions(&self) -> &[LifecycleAction] {
        &self.deactivate_actions
    }

    /// All behaviours of this state, in registration order.
    pub fn behaviours(&self) -> &[TriggerBehaviour<S, T>] {
        &self.behaviours
    }

    /// Distinct triggers with at least one behaviour, in registration order.
    pub fn triggers(&self) -> Vec<&T> {
        let mut triggers: Vec<&T> = Vec::new();
        for behaviour in &self.behaviours {
            if !triggers.contains(&behaviour.trigger()) {
                triggers.push(behaviour.trigger());
            }
        }
        triggers
    }

    pub fn add_entry_action(&mut self, action: EntryAction<S, T>) {
        self.entry_actions.push(action);
    }

    pub fn add_exit_action(&mut self, action: TransitionAction<S, T>) {
        self.exit_actions.push(action);
    }

    pub fn add_activate_action(&mut self, action: LifecycleAction) {
        self.activate_actions.push(action);
    }

    pub fn add_deactivate_action(&mut self, action: LifecycleAction) {
        self.deactivate_actions.push(action);
    }

    pub fn add_trigger_behaviour(&mut self, behaviour: TriggerBehaviour<S, T>) {
        self.behaviours.push(behaviour);
    }

    /// Entry actions that run for `transition`.
    pub fn entry_actions_for<'a>(
        &'a self,
        transition: &'a Transition<S, T>,
    ) -> impl Iterator<Item = &'a TransitionAction<S, T>> + 'a {
        self.entry_actions
            .iter()
            .filter(move |entry| entry.applies_to(transition))
            .map(EntryAction::action)
    }
}
