//! Error types for code generation
//!
//! Every variant carries the structured context needed to point the user at
//! the offending declaration: the entity name, the property, and the key role
//! it was used in.

use thiserror::Error;

use crate::keys::KeyRole;

/// Errors that can occur while generating code for an entity
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A declared key references a property that does not exist on the entity
    #[error(
        "a {role} '{property}' was specified but was not found as a property of the entity '{entity}'"
    )]
    Schema {
        entity: String,
        property: String,
        role: KeyRole,
    },

    /// A multi-property sort key mixes numeric and non-numeric properties
    ///
    /// The default serialization encodes values as strings, which breaks
    /// numeric ordering ("100" < "9" lexically, though 100 > 9). A single
    /// numeric sort property is stored unencoded instead, but a mixed key has
    /// no safe default encoding.
    #[error(
        "the default serialization can not encode the numeric sort key(s) `{}` of entity '{entity}' into a string while preserving numeric sort order (100 > 9, but \"100\" < \"9\"); specify a custom sort key encoding",
        properties.join(",")
    )]
    AmbiguousSortEncoding {
        entity: String,
        properties: Vec<String>,
    },

    /// A reference property targets an entity kind that can not be embedded by value
    ///
    /// Only literals compare by content and may be embedded into a key or
    /// record; every other kind must be referenced by its key.
    #[error(
        "property '{property}' of entity '{entity}' references a {kind}, but only literals may be embedded by value"
    )]
    ReferencedVariant {
        entity: String,
        property: String,
        kind: String,
    },

    /// A required configuration section is missing or malformed
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeneratorError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message_names_role_and_entity() {
        let error = GeneratorError::Schema {
            entity: "Sensor".to_string(),
            property: "serial".to_string(),
            role: KeyRole::Unique,
        };
        let message = error.to_string();
        assert!(message.contains("uniqueKey"));
        assert!(message.contains("'serial'"));
        assert!(message.contains("'Sensor'"));
    }

    #[test]
    fn test_ambiguous_sort_error_names_numeric_offenders() {
        let error = GeneratorError::AmbiguousSortEncoding {
            entity: "SeaSponge".to_string(),
            properties: vec!["age".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("`age`"));
        assert!(message.contains("numeric sort order"));
    }

    #[test]
    fn test_referenced_variant_error_names_kind() {
        let error = GeneratorError::ReferencedVariant {
            entity: "SeaTurtleReport".to_string(),
            property: "forRegion".to_string(),
            kind: "entity".to_string(),
        };
        assert!(error.to_string().contains("only literals"));
    }
}
