//! Typed identifier newtypes backed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident, $label:literal) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Human readable name of the identified record, used in errors.
            pub const LABEL: &'static str = $label;

            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }

            /// Parse user input (path segment, form field) into an id.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::InvalidId`] when `text` is not a UUID.
            pub fn parse(text: &str) -> Result<Self, ValidationError> {
                Self::from_str(text.trim()).map_err(|_| ValidationError::InvalidId {
                    entity: $label,
                    value: text.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a [`Customer`](crate::customer::Customer).
    CustomerId,
    "customer"
);

define_id!(
    /// Unique identifier for a [`Product`](crate::product::Product).
    ProductId,
    "product"
);

define_id!(
    /// Unique identifier for an [`Order`](crate::order::Order).
    OrderId,
    "order"
);

define_id!(
    /// Unique identifier for a [`User`](crate::user::User).
    UserId,
    "user"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = CustomerId::new();
        let b = CustomerId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_parse() {
        let id = OrderId::new();
        let parsed = OrderId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = ProductId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn should_trim_whitespace_when_parsing() {
        let id = UserId::new();
        let parsed = UserId::parse(&format!("  {id} ")).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_return_invalid_id_when_parsing_garbage() {
        let result = OrderId::parse("42");
        assert_eq!(
            result,
            Err(ValidationError::InvalidId {
                entity: "order",
                value: "42".to_string(),
            })
        );
    }
}
