//! Strongly-typed catalog identifiers.
//!
//! All three id kinds wrap the integer primary key of the relational
//! catalog. They order numerically, which is what gives seed processing
//! and card listings their deterministic order.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw integer id.
            #[inline]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identity of a card, the atomic ingredient of every variant.
    CardId
);
define_id!(
    /// Identity of a feature (an effect granted by cards or produced by combos).
    FeatureId
);
define_id!(
    /// Identity of a combo rule.
    ComboId
);
