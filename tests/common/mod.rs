//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use substate::{identity_enum, Transition};

identity_enum! {
    pub enum Phase {
        A,
        B,
        C,
        D,
        E,
        F,
    }
}

identity_enum! {
    pub enum Signal {
        X,
        Y,
        Z,
    }
}

pub type Machine = substate::StateMachine<Phase, Signal>;

/// Ordered record of what actions ran.
#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// An action that records `label`.
    pub fn action(&self, label: &str) -> impl Fn(&Transition<Phase, Signal>) + 'static {
        let log = self.clone();
        let label = label.to_string();
        move |_| log.push(label.clone())
    }

    /// An action that records `label` and the transition it received.
    pub fn transition(&self, label: &str) -> impl Fn(&Transition<Phase, Signal>) + 'static {
        let log = self.clone();
        let label = label.to_string();
        move |t| log.push(format!("{} {}->{}", label, t.source(), t.destination()))
    }

    /// A lifecycle action that records `label`.
    pub fn lifecycle(&self, label: &str) -> impl Fn() + 'static {
        let log = self.clone();
        let label = label.to_string();
        move || log.push(label.clone())
    }
}

pub fn strings(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}
