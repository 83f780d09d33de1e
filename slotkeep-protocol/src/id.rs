//! Typed identifiers for effects, object types, actors and subscriptions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers keep effect ids, object type ids and actor ids apart.
/// They are plain strings underneath; the host decides what they look
/// like. Comparisons that the engine performs on them are
/// case-insensitive (see [`EffectId::matches`]).
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize, JsonSchema)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Case-insensitive comparison against a raw id.
            pub fn matches(&self, other: &str) -> bool {
                self.0.eq_ignore_ascii_case(other)
            }

            /// Lower-cased form, used wherever the id keys a map.
            pub fn normalized(&self) -> String {
                self.0.to_ascii_lowercase()
            }

            /// True when the id is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(EffectId, "Identifier of an effect in the host's catalog.");
typed_id!(ObjectTypeId, "Identity of an object type; shared by every spawn of that type.");
typed_id!(ActorId, "Identifier of an actor that can hold objects or be credited with a load.");

/// Handle returned by [`crate::LifecycleSource::subscribe`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}
