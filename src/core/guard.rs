//! Guard predicates for controlling trigger behaviours.
//!
//! A guard is a conjunction of described predicates over the fire-time
//! arguments. Evaluation never short-circuits: every condition runs exactly
//! once and every failing description is collected, using Stillwater's
//! `Validation` to accumulate failures.

use super::args::Args;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for guard predicate functions.
pub type GuardPredicate = Box<dyn Fn(&Args) -> bool>;

/// One described predicate of a guard.
pub struct GuardCondition {
    predicate: GuardPredicate,
    description: String,
}

impl GuardCondition {
    pub fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, args: &Args) -> Validation<(), NonEmptyVec<String>> {
        if (self.predicate)(args) {
            Validation::success(())
        } else {
            Validation::fail(self.description.clone())
        }
    }
}

/// Predicate (or conjunction of predicates) gating a trigger behaviour.
///
/// An empty guard is always satisfied.
///
/// # Example
///
/// ```rust
/// use substate::{args, Guard};
///
/// let guard = Guard::described("amount is positive", |args| {
///     args.get::<i64>(0).is_some_and(|amount| *amount > 0)
/// })
/// .and("amount below limit", |args| {
///     args.get::<i64>(0).is_some_and(|amount| *amount < 1_000)
/// });
///
/// assert!(guard.is_met(&args![250i64]));
/// assert_eq!(guard.unmet(&args![5_000i64]), vec!["amount below limit".to_string()]);
/// ```
#[derive(Default)]
pub struct Guard {
    conditions: Vec<GuardCondition>,
}

impl Guard {
    /// A guard without conditions.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single-condition guard, described by the predicate's type name.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Args) -> bool + 'static,
    {
        Self::described(std::any::type_name::<F>(), predicate)
    }

    /// A single-condition guard with an explicit description.
    pub fn described<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Args) -> bool + 'static,
    {
        Self::none().and(description, predicate)
    }

    /// Add another condition; all conditions must hold.
    pub fn and<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Args) -> bool + 'static,
    {
        self.conditions.push(GuardCondition {
            predicate: Box::new(predicate),
            description: description.into(),
        });
        self
    }

    /// Evaluate every condition, accumulating all failures.
    pub fn evaluate(&self, args: &Args) -> Validation<(), NonEmptyVec<String>> {
        if self.conditions.is_empty() {
            return Validation::success(());
        }

        let checks: Vec<_> = self.conditions.iter().map(|c| c.check(args)).collect();
        Validation::all_vec(checks).map(|_| ())
    }

    /// Descriptions of the failing conditions, in declaration order.
    pub fn unmet(&self, args: &Args) -> Vec<String> {
        match self.evaluate(args) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    pub fn is_met(&self, args: &Args) -> bool {
        self.evaluate(args).is_success()
    }

    /// Descriptions of every condition, met or not.
    pub fn descriptions(&self) -> Vec<String> {
        self.conditions
            .iter()
            .map(|c| c.description.clone())
            .collect()
    }

    pub fn conditions(&self) -> &[GuardCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("conditions", &self.descriptions())
            .finish()
    }
}
