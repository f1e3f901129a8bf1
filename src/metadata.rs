//! Entity metadata model
//!
//! An immutable description of one domain object, built once by the
//! introspection collaborator and consumed as plain data. The generation
//! engine never reflects over live types; everything it needs is here.

use serde::{Deserialize, Serialize};

/// The kind of a domain object
///
/// Entities carry a natural unique key and a generated surrogate identity.
/// Literals have no independent identity and are embedded by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Entity,
    ValueObject,
    Literal,
    Event,
}

impl EntityKind {
    /// Human-readable label, used in generated comments and error messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Entity => "entity",
            EntityKind::ValueObject => "value-object",
            EntityKind::Literal => "literal",
            EntityKind::Event => "event",
        }
    }
}

/// A domain object referenced by a property of another domain object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedEntity {
    /// Name of the referenced domain object
    pub name: String,
    /// Kind of the referenced domain object
    pub kind: EntityKind,
}

impl ReferencedEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The declared type of an entity property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    /// A nested domain object; only literal-kind targets may be embedded by value
    Reference {
        of: ReferencedEntity,
    },
}

impl PropertyType {
    pub fn is_number(&self) -> bool {
        matches!(self, PropertyType::Number)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, PropertyType::Reference { .. })
    }
}

/// A single property of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    /// Property name, as declared on the domain object
    pub name: String,

    /// Declared type of the property
    #[serde(flatten)]
    pub property_type: PropertyType,

    /// Whether the property allows null (default: false)
    #[serde(default)]
    pub nullable: bool,
}

impl PropertyMetadata {
    /// Create a new property with a name and type
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            nullable: false,
        }
    }

    /// Mark the property as nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Decorations declared on an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDecorations {
    /// Preferred variable name for the entity in generated code, if declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Ordered property names that make up the natural unique key
    #[serde(default)]
    pub unique: Vec<String>,

    /// Property names that may change between versions of the same record
    #[serde(default)]
    pub updatable: Vec<String>,
}

/// Immutable description of one entity
///
/// Properties keep their declaration order; the order of key properties is
/// part of the key encoding contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Name of the domain object (PascalCase by convention)
    pub name: String,

    /// Kind of the domain object
    pub kind: EntityKind,

    /// Properties, in declaration order
    pub properties: Vec<PropertyMetadata>,

    /// Declared decorations
    pub decorations: EntityDecorations,
}

impl EntityMetadata {
    /// Create a new entity description
    pub fn new(
        name: impl Into<String>,
        kind: EntityKind,
        properties: Vec<PropertyMetadata>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            properties,
            decorations: EntityDecorations::default(),
        }
    }

    /// Declare the natural unique key
    pub fn unique_on(mut self, properties: Vec<String>) -> Self {
        self.decorations.unique = properties;
        self
    }

    /// Declare an alias to use as the variable name in generated code
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.decorations.alias = Some(alias.into());
        self
    }

    /// Declare the updatable properties
    pub fn updatable_on(mut self, properties: Vec<String>) -> Self {
        self.decorations.updatable = properties;
        self
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|property| property.name == name)
    }
}
