//! Storage for the externally visible current state.

use crate::core::State;
use std::cell::RefCell;
use std::rc::Rc;

/// Reader and writer pair for the current state.
///
/// The machine calls the writer at most once per fire call, so a writer
/// with side effects (persisting the state, for instance) sees one write
/// per transition.
pub(crate) struct StateStore<S: State> {
    get: Box<dyn Fn() -> S>,
    set: Box<dyn Fn(S)>,
}

impl<S: State> StateStore<S> {
    /// A store owned by the machine.
    pub(crate) fn internal(initial: S) -> Self {
        let cell = Rc::new(RefCell::new(initial));
        let reader = Rc::clone(&cell);
        Self {
            get: Box::new(move || reader.borrow().clone()),
            set: Box::new(move |state| *cell.borrow_mut() = state),
        }
    }

    /// A store owned by the host.
    pub(crate) fn external<G, W>(get: G, set: W) -> Self
    where
        G: Fn() -> S + 'static,
        W: Fn(S) + 'static,
    {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    pub(crate) fn get(&self) -> S {
        (self.get)()
    }

    pub(crate) fn set(&self, state: S) {
        (self.set)(state)
    }
}
