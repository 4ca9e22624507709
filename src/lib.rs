//! Substate: a hierarchical state machine engine
//!
//! Substate resolves which transition a fired trigger causes, runs entry,
//! exit and activation actions in the right order across nested states, and
//! reports unhandled or ambiguous triggers. It is meant to be embedded in a
//! larger application: a workflow object, a protocol endpoint or a view
//! model owns a machine and fires triggers at it.
//!
//! # Core Concepts
//!
//! - **State / Trigger**: any `Clone + Eq + Hash + Debug` type is an identity
//! - **Hierarchy**: states may be substates of other states and inherit their
//!   behaviours; initial transitions descend automatically into a substate
//! - **Behaviours**: permit, reentry, internal, ignore and dynamic rules,
//!   each gated by a [`Guard`]
//! - **Actions**: synchronous closures, or Stillwater effects awaited on the
//!   async path
//!
//! # Example
//!
//! ```rust
//! use substate::{args, Guard, StateMachine};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Order { Placed, Processing, Packing, Shipping, Delivered }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Event { Accept, Ship, Deliver }
//!
//! let mut order = StateMachine::new(Order::Placed);
//!
//! order
//!     .configure(Order::Placed)
//!     .permit_if(
//!         Event::Accept,
//!         Order::Processing,
//!         Guard::described("in stock", |args| {
//!             args.get::<u32>(0).is_some_and(|quantity| *quantity > 0)
//!         }),
//!     )
//!     .unwrap();
//! order
//!     .configure(Order::Processing)
//!     .initial_transition(Order::Packing)
//!     .unwrap()
//!     .permit(Event::Deliver, Order::Delivered)
//!     .unwrap();
//! order.configure(Order::Packing).substate_of(Order::Processing).unwrap();
//! order
//!     .configure(Order::Shipping)
//!     .substate_of(Order::Processing)
//!     .unwrap();
//! order.configure(Order::Packing).permit(Event::Ship, Order::Shipping).unwrap();
//!
//! order.fire_with(Event::Accept, args![3u32]).unwrap();
//! assert_eq!(order.state(), Order::Packing);
//! assert!(order.is_in_state(&Order::Processing));
//!
//! order.fire(Event::Ship).unwrap();
//! order.fire(Event::Deliver).unwrap();
//! assert_eq!(order.state(), Order::Delivered);
//! ```

pub mod behaviour;
pub mod builder;
pub mod core;
pub mod graph;
pub mod machine;
pub mod parameters;
pub mod reflection;

// Re-export commonly used types
pub use behaviour::{ActionEffect, ActionError, DynamicDestination};
pub use builder::{ConfigurationError, StateConfiguration};
pub use core::{Arg, Args, Guard, State, Transition, Trigger};
pub use machine::{FireError, StateMachine};
pub use parameters::{ArgumentError, ParamType};
pub use reflection::StateMachineInfo;
