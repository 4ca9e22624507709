//! Configuration API for state machines.
//!
//! This module provides the fluent per-state configuration surface, the
//! configuration errors it reports, and a macro for declaring state and
//! trigger enums with minimal boilerplate.

pub mod configuration;
pub mod error;
pub mod macros;

pub use configuration::StateConfiguration;
pub use error::ConfigurationError;
