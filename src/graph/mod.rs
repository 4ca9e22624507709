//! The state graph: every configured state, keyed by identity.
//!
//! Nodes are created lazily the first time configuration mentions a state.
//! Hierarchy links are identities resolved through the graph, so the graph
//! is the sole owner of every node. The superstate relation is kept acyclic
//! when it is configured, which lets every upward walk terminate.
//!
//! The planning functions here are pure. They compute which states to exit
//! and enter for a transition without running anything.

mod node;

pub use node::StateNode;

use crate::behaviour::{
    resolve_local, AmbiguousTransition, EntryAction, LifecycleAction, Resolution,
    TransitionAction, TriggerBehaviour,
};
use crate::builder::ConfigurationError;
use crate::core::{name_of, Args, State, Transition, Trigger};
use std::collections::HashMap;
use tracing::trace;

/// All state nodes of one machine.
pub struct StateGraph<S: State, T: Trigger> {
    nodes: HashMap<S, StateNode<S, T>>,
    order: Vec<S>,
}

impl<S: State, T: Trigger> Default for StateGraph<S, T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<S: State, T: Trigger> StateGraph<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, state: &S) -> Option<&StateNode<S, T>> {
        self.nodes.get(state)
    }

    /// The node for `state`, created on first use.
    pub fn node_mut(&mut self, state: S) -> &mut StateNode<S, T> {
        if !self.nodes.contains_key(&state) {
            self.order.push(state.clone());
        }
        self.nodes
            .entry(state)
            .or_insert_with_key(|s| StateNode::new(s.clone()))
    }

    /// Nodes in the order their states were first configured.
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode<S, T>> {
        self.order.iter().filter_map(|s| self.nodes.get(s))
    }

    pub fn superstate_of(&self, state: &S) -> Option<&S> {
        self.nodes.get(state).and_then(StateNode::superstate)
    }

    pub fn initial_target(&self, state: &S) -> Option<&S> {
        self.nodes.get(state).and_then(StateNode::initial_transition)
    }

    /// `state` followed by each of its superstates, innermost first.
    pub fn ancestors<'a>(&'a self, state: &'a S) -> Ancestors<'a, S, T> {
        Ancestors {
            graph: self,
            next: Some(state),
        }
    }

    /// True when `state` is `ancestor` or one of its transitive substates.
    pub fn includes(&self, ancestor: &S, state: &S) -> bool {
        self.ancestors(state).any(|s| s == ancestor)
    }

    /// True when `state` is `ancestor` or one of its transitive substates.
    ///
    /// The upward reading of [`includes`](Self::includes).
    pub fn is_included_in(&self, state: &S, ancestor: &S) -> bool {
        self.includes(ancestor, state)
    }

    pub fn add_entry_action(&mut self, state: S, action: EntryAction<S, T>) {
        self.node_mut(state).add_entry_action(action);
    }

    pub fn add_exit_action(&mut self, state: S, action: TransitionAction<S, T>) {
        self.node_mut(state).add_exit_action(action);
    }

    pub fn add_activate_action(&mut self, state: S, action: LifecycleAction) {
        self.node_mut(state).add_activate_action(action);
    }

    pub fn add_deactivate_action(&mut self, state: S, action: LifecycleAction) {
        self.node_mut(state).add_deactivate_action(action);
    }

    pub fn add_trigger_behaviour(&mut self, state: S, behaviour: TriggerBehaviour<S, T>) {
        self.node_mut(state).add_trigger_behaviour(behaviour);
    }

    /// Attach `substate` below `superstate`.
    ///
    /// Repeating an existing link is a no-op. A state keeps the first
    /// superstate it is given.
    pub fn set_superstate(&mut self, substate: S, superstate: S) -> Result<(), ConfigurationError> {
        if substate == superstate {
            return Err(ConfigurationError::SelfSuperstate {
                state: name_of(&substate),
            });
        }

        match self.superstate_of(&substate) {
            Some(existing) if *existing == superstate => return Ok(()),
            Some(existing) => {
                return Err(ConfigurationError::SuperstateAlreadySet {
                    state: name_of(&substate),
                    existing: name_of(existing),
                    requested: name_of(&superstate),
                })
            }
            None => {}
        }

        if self.includes(&substate, &superstate) {
            return Err(ConfigurationError::CyclicHierarchy {
                substate: name_of(&substate),
                superstate: name_of(&superstate),
            });
        }

        self.node_mut(superstate.clone())
            .substates
            .push(substate.clone());
        self.node_mut(substate).superstate = Some(superstate);
        Ok(())
    }

    /// Declare the substate entered automatically whenever `state` is entered.
    ///
    /// A target that is already known to lie outside `state` is rejected
    /// here. A target whose place in the hierarchy is not yet configured is
    /// checked again when the transition is taken.
    pub fn set_initial_transition(&mut self, state: S, target: S) -> Result<(), ConfigurationError> {
        if state == target {
            return Err(ConfigurationError::InitialTransitionToSelf {
                state: name_of(&state),
            });
        }

        if let Some(existing) = self.initial_target(&state) {
            return Err(ConfigurationError::InitialTransitionAlreadySet {
                state: name_of(&state),
                existing: name_of(existing),
            });
        }

        if self.outside_of(&state, &target) {
            return Err(ConfigurationError::InitialTransitionNotDescendant {
                state: name_of(&state),
                target: name_of(&target),
            });
        }

        self.node_mut(state).initial_transition = Some(target);
        Ok(())
    }

    /// True when `target` can never become a descendant of `state`.
    ///
    /// Superstate links never change once set, so if the upward walk from
    /// `target` meets a strict ancestor of `state` before meeting `state`
    /// itself, `target` is in another branch for good.
    fn outside_of(&self, state: &S, target: &S) -> bool {
        let strict_ancestors: Vec<&S> = self.ancestors(state).skip(1).collect();
        for candidate in self.ancestors(target) {
            if candidate == state {
                return false;
            }
            if strict_ancestors.contains(&candidate) {
                return true;
            }
        }
        false
    }

    /// Find the behaviour that handles `trigger` in `state`.
    ///
    /// A guard-satisfied local behaviour wins. Otherwise the superstate's
    /// resolution (satisfied or not) is preferred, and the local unmet
    /// diagnostic surfaces only when no ancestor has any behaviour for the
    /// trigger.
    pub fn find_handler<'a>(
        &'a self,
        state: &S,
        trigger: &T,
        args: &Args,
    ) -> Result<Option<Resolution<'a, S, T>>, AmbiguousTransition> {
        let local = match self.nodes.get(state) {
            Some(node) => resolve_local(state, trigger, node.behaviours(), args)?,
            None => None,
        };

        if local.as_ref().is_some_and(Resolution::is_satisfied) {
            trace!("Trigger {:?} handled locally in {:?}", trigger, state);
            return Ok(local);
        }

        let inherited = match self.superstate_of(state) {
            Some(parent) => self.find_handler(parent, trigger, args)?,
            None => None,
        };

        Ok(inherited.or(local))
    }

    /// States whose exit actions run for `transition`, innermost first.
    ///
    /// Exits only as many levels as needed: the walk stops at the first
    /// state that contains the destination, and never exits the destination
    /// itself when it is an ancestor of the source.
    pub fn exit_path(&self, transition: &Transition<S, T>) -> Vec<S> {
        let destination = transition.destination();
        let mut path = Vec::new();
        let mut current = transition.source().clone();

        loop {
            if transition.is_reentry() {
                path.push(current);
                break;
            }
            if self.includes(&current, destination) {
                break;
            }

            let parent = self.superstate_of(&current).cloned();
            path.push(current);
            match parent {
                Some(parent) if parent != *destination => current = parent,
                _ => break,
            }
        }

        path
    }

    /// States whose entry actions run for `transition`, outermost first.
    ///
    /// Superstates that already contain the source stay entered.
    pub fn entry_path(&self, transition: &Transition<S, T>) -> Vec<S> {
        let destination = transition.destination();
        if transition.is_reentry() {
            return vec![destination.clone()];
        }

        let mut path: Vec<S> = self
            .ancestors(destination)
            .take_while(|s| !self.includes(s, transition.source()))
            .cloned()
            .collect();
        path.reverse();
        path
    }

    /// `state` and its superstates, outermost first.
    pub fn activation_path(&self, state: &S) -> Vec<S> {
        let mut path: Vec<S> = self.ancestors(state).cloned().collect();
        path.reverse();
        path
    }

    /// `state` and its superstates, innermost first.
    pub fn deactivation_path(&self, state: &S) -> Vec<S> {
        self.ancestors(state).cloned().collect()
    }

    /// Triggers with a guard-satisfied behaviour in `state` or any superstate.
    ///
    /// Own triggers come first, then inherited ones; each appears once.
    pub fn permitted_triggers(&self, state: &S, args: &Args) -> Vec<T> {
        let mut triggers: Vec<T> = Vec::new();
        for node in self.ancestors(state).filter_map(|s| self.nodes.get(s)) {
            for behaviour in node.behaviours() {
                if !triggers.contains(behaviour.trigger()) && behaviour.guard().is_met(args) {
                    triggers.push(behaviour.trigger().clone());
                }
            }
        }
        triggers
    }
}

/// Iterator over a state and its superstates.
pub struct Ancestors<'a, S: State, T: Trigger> {
    graph: &'a StateGraph<S, T>,
    next: Option<&'a S>,
}

impl<'a, S: State, T: Trigger> Iterator for Ancestors<'a, S, T> {
    type Item = &'a S;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.graph.superstate_of(current);
        Some(current)
    }
}
