//! Fire-time trigger arguments.
//!
//! Arguments are type-erased so that one machine can carry triggers with
//! different signatures. Each value remembers its concrete type so the
//! parameter registry can validate it and errors can name it.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A single type-erased trigger argument.
#[derive(Clone)]
pub struct Arg {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Arg {
    /// Wrap a value as an argument.
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
        }
    }

    /// Borrow the value if it has type `V`.
    pub fn downcast_ref<V: Any>(&self) -> Option<&V> {
        self.value.downcast_ref::<V>()
    }

    /// Check whether the value has type `V`.
    pub fn is<V: Any>(&self) -> bool {
        self.type_id == TypeId::of::<V>()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg<{}>", self.type_name)
    }
}

/// Ordered list of arguments supplied to a fire call.
///
/// # Example
///
/// ```rust
/// use substate::args;
///
/// let args = args!["reviewer", 3u8];
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get::<&str>(0), Some(&"reviewer"));
/// assert_eq!(args.get::<u8>(1), Some(&3));
/// assert_eq!(args.get::<u8>(0), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Args {
    values: Vec<Arg>,
}

impl Args {
    /// Empty argument list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append a value, returning the extended list.
    pub fn with<V: Any + Send + Sync>(mut self, value: V) -> Self {
        self.values.push(Arg::new(value));
        self
    }

    /// Typed access to the argument at `index`.
    ///
    /// Returns `None` when the index is out of range or the type differs.
    pub fn get<V: Any>(&self, index: usize) -> Option<&V> {
        self.values.get(index).and_then(Arg::downcast_ref::<V>)
    }

    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.values.iter()
    }

    /// Type names of every argument, in order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.values.iter().map(Arg::type_name).collect()
    }
}

impl From<Vec<Arg>> for Args {
    fn from(values: Vec<Arg>) -> Self {
        Self { values }
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Arg;
    type IntoIter = std::slice::Iter<'a, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Build an [`Args`] list from a comma-separated list of values.
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Args::from(vec![$($crate::Arg::new($value)),+])
    };
}
