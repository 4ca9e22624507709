//! Macros for ergonomic machine definitions.

/// Declare a state or trigger enum usable as a machine identity.
///
/// Derives the traits identities need and adds `ALL` (every variant, in
/// declaration order) and `name()` (the variant name).
///
/// # Example
///
/// ```
/// use substate::identity_enum;
///
/// identity_enum! {
///     pub enum Ticket {
///         Open,
///         Assigned,
///         Closed,
///     }
/// }
///
/// assert_eq!(Ticket::ALL.len(), 3);
/// assert_eq!(Ticket::Assigned.name(), "Assigned");
/// assert_eq!(Ticket::Closed.to_string(), "Closed");
/// ```
#[macro_export]
macro_rules! identity_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
