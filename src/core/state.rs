//! State and trigger identities.
//!
//! The engine never inspects identities beyond equality and hashing, so both
//! traits are blanket-implemented: any enum, integer or string that is
//! `Clone + Eq + Hash + Debug` can be used directly.

use std::fmt::Debug;
use std::hash::Hash;

/// Identity of a node in the configured state hierarchy.
///
/// The `Debug` representation is used as the display name in errors,
/// log events and introspection output.
///
/// # Example
///
/// ```rust
/// use substate::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state<S: State>(_: &S) {}
/// assert_state(&Door::Open);
/// assert_state(&"Locked");
/// assert_state(&42u32);
/// ```
pub trait State: Clone + Eq + Hash + Debug + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + 'static {}

/// Identity of an event that may cause a transition.
///
/// Same contract as [`State`], distinct role.
pub trait Trigger: Clone + Eq + Hash + Debug + 'static {}

impl<T> Trigger for T where T: Clone + Eq + Hash + Debug + 'static {}

/// Display name of an identity, as used in error messages and introspection.
pub(crate) fn name_of<V: Debug>(value: &V) -> String {
    format!("{:?}", value)
}
