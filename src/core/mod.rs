//! Core value types of the engine.
//!
//! This module contains the pure building blocks shared by the graph and the
//! orchestrator:
//! - State and trigger identities via the `State` and `Trigger` traits
//! - Type-erased fire-time arguments
//! - Guard predicates with accumulated failure descriptions
//! - Immutable transition values
//!
//! Nothing in this module performs side effects.

mod args;
mod guard;
mod state;
mod transition;

pub use args::{Arg, Args};
pub use guard::{Guard, GuardCondition, GuardPredicate};
pub(crate) use state::name_of;
pub use state::{State, Trigger};
pub use transition::Transition;
