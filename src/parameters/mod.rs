//! Trigger parameter signatures.
//!
//! A trigger may declare the argument types it expects. Fire calls for that
//! trigger are then validated positionally before any resolution happens.
//! Triggers without a declared signature accept any arguments.

mod error;

pub use error::ArgumentError;

use crate::builder::ConfigurationError;
use crate::core::{name_of, Arg, Args, Trigger};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Expected type of one trigger argument.
///
/// `ParamType::of::<V>()` accepts exactly `V`; `ParamType::any()` accepts
/// every value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    name: &'static str,
    type_id: Option<TypeId>,
}

impl ParamType {
    pub fn of<V: Any>() -> Self {
        Self {
            name: type_name::<V>(),
            type_id: Some(TypeId::of::<V>()),
        }
    }

    pub fn any() -> Self {
        Self {
            name: "any",
            type_id: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn accepts(&self, arg: &Arg) -> bool {
        self.type_id.is_none_or(|id| id == arg.type_id())
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declared argument signatures, keyed by trigger.
pub struct TriggerParameterRegistry<T: Trigger> {
    signatures: HashMap<T, Vec<ParamType>>,
}

impl<T: Trigger> Default for TriggerParameterRegistry<T> {
    fn default() -> Self {
        Self {
            signatures: HashMap::new(),
        }
    }
}

impl<T: Trigger> TriggerParameterRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the signature of `trigger`.
    ///
    /// Declaring the same signature again is accepted; a different one is
    /// rejected.
    pub fn set(&mut self, trigger: T, types: Vec<ParamType>) -> Result<(), ConfigurationError> {
        match self.signatures.get(&trigger) {
            Some(existing) if *existing == types => Ok(()),
            Some(existing) => Err(ConfigurationError::TriggerParametersAlreadySet {
                trigger: name_of(&trigger),
                existing: names(existing),
                requested: names(&types),
            }),
            None => {
                self.signatures.insert(trigger, types);
                Ok(())
            }
        }
    }

    pub fn get(&self, trigger: &T) -> Option<&[ParamType]> {
        self.signatures.get(trigger).map(Vec::as_slice)
    }

    /// Declared signatures, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &[ParamType])> {
        self.signatures.iter().map(|(t, types)| (t, types.as_slice()))
    }

    /// Check fire-time arguments against the declared signature, if any.
    pub fn validate(&self, trigger: &T, args: &Args) -> Result<(), ArgumentError> {
        let Some(expected) = self.signatures.get(trigger) else {
            return Ok(());
        };

        if expected.len() != args.len() {
            return Err(ArgumentError::ArgumentCount {
                trigger: name_of(trigger),
                expected: expected.len(),
                actual: args.len(),
            });
        }

        for (position, (param, arg)) in expected.iter().zip(args).enumerate() {
            if !param.accepts(arg) {
                return Err(ArgumentError::ArgumentType {
                    trigger: name_of(trigger),
                    position,
                    expected: param.name().to_string(),
                    actual: arg.type_name().to_string(),
                });
            }
        }

        Ok(())
    }
}

fn names(types: &[ParamType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn unregistered_trigger_accepts_anything() {
        let registry = TriggerParameterRegistry::<&str>::new();
        assert!(registry.validate(&"X", &args![1, "two"]).is_ok());
    }

    #[test]
    fn matching_arguments_pass() {
        let mut registry = TriggerParameterRegistry::new();
        registry
            .set("Assign", vec![ParamType::of::<String>(), ParamType::of::<u32>()])
            .unwrap();

        assert!(registry
            .validate(&"Assign", &args![String::from("joe"), 3u32])
            .is_ok());
    }

    #[test]
    fn wrong_count_is_reported() {
        let mut registry = TriggerParameterRegistry::new();
        registry.set("Assign", vec![ParamType::of::<String>()]).unwrap();

        let err = registry.validate(&"Assign", &Args::new()).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::ArgumentCount {
                trigger: "\"Assign\"".to_string(),
                expected: 1,
                actual: 0,
            }
        );
    }

    #[test]
    fn wrong_type_names_position_and_types() {
        let mut registry = TriggerParameterRegistry::new();
        registry
            .set("Assign", vec![ParamType::of::<String>(), ParamType::of::<u32>()])
            .unwrap();

        let err = registry
            .validate(&"Assign", &args![String::from("joe"), 3i64])
            .unwrap_err();

        assert_eq!(
            err,
            ArgumentError::ArgumentType {
                trigger: "\"Assign\"".to_string(),
                position: 1,
                expected: "u32".to_string(),
                actual: "i64".to_string(),
            }
        );
    }

    #[test]
    fn any_accepts_every_value() {
        let mut registry = TriggerParameterRegistry::new();
        registry.set(1, vec![ParamType::any()]).unwrap();

        assert!(registry.validate(&1, &args![vec![1u8]]).is_ok());
        assert!(registry.validate(&1, &args!["text"]).is_ok());
    }

    #[test]
    fn identical_signature_may_be_registered_twice() {
        let mut registry = TriggerParameterRegistry::new();
        registry.set("X", vec![ParamType::of::<i32>()]).unwrap();
        assert!(registry.set("X", vec![ParamType::of::<i32>()]).is_ok());
    }

    #[test]
    fn different_signature_is_rejected() {
        let mut registry = TriggerParameterRegistry::new();
        registry.set("X", vec![ParamType::of::<i32>()]).unwrap();

        let err = registry
            .set("X", vec![ParamType::of::<String>()])
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::TriggerParametersAlreadySet { .. }
        ));
        assert_eq!(registry.get(&"X"), Some(&[ParamType::of::<i32>()][..]));
    }
}
