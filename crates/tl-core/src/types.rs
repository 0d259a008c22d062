//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value could not be parsed as a timestamp.
    #[error("unrecognized timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// A field-level validation failure.
///
/// Drafts collect these before anything is persisted, so a caller gets every
/// failing field back in one pass, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// Identity itself lives outside this crate; the current user arrives from
    /// configuration or whatever identity layer sits in front of the tracker.
    /// Here a user is only an opaque non-empty string to compare ownership
    /// against.
    UserId, "user ID"
);

define_string_id!(
    /// The opaque lookup token of a time slice.
    ///
    /// Tokens are assigned once at creation and never change. They are the
    /// whole access control for shared slice views, so they must be
    /// collision-resistant and unguessable from a slice's internal row ID.
    SliceToken, "slice token"
);

impl SliceToken {
    /// Mints a fresh random token.
    ///
    /// v4 UUIDs carry 122 random bits, which keeps collisions negligible and
    /// tokens unguessable.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("michael").is_ok());
    }

    #[test]
    fn slice_token_rejects_empty() {
        assert!(SliceToken::new("").is_err());
        assert!(SliceToken::new("4f2a9b").is_ok());
    }

    #[test]
    fn user_id_serde_roundtrip() {
        let id = UserId::new("michael").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"michael\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn user_id_serde_rejects_empty() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn generated_tokens_are_distinct() {
        let a = SliceToken::generate();
        let b = SliceToken::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_token_is_not_trivial() {
        let token = SliceToken::generate();
        // v4 UUID in hyphenated form
        assert_eq!(token.as_str().len(), 36);
        assert!(token.as_str().parse::<uuid::Uuid>().is_ok());
    }

    #[test]
    fn field_error_display_is_keyed_by_field() {
        let err = FieldError::new("start", "start time is required");
        assert_eq!(err.to_string(), "start: start time is required");
    }
}
