//! Key encoding engine
//!
//! Resolves named key property lists into typed parameters and decides how a
//! key is encoded into a storable value. Keys default to an ordered,
//! order-preserving text serialization; the one exemption is a sort key made
//! of a single numeric property, which is stored unencoded so the store can
//! sort it numerically ("100" < "9" lexically, though 100 > 9).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};
use crate::metadata::{EntityKind, EntityMetadata, PropertyMetadata, PropertyType};

/// The role a key plays in the access pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    /// The natural unique key of the entity
    Unique,
    /// The filter key of a supplemental query
    Filter,
    /// The sort key of a supplemental query
    Sort,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeyRole::Unique => "uniqueKey",
            KeyRole::Filter => "supplementalQuery.filterByKey",
            KeyRole::Sort => "supplementalQuery.sortByKey",
        };
        write!(f, "{}", label)
    }
}

/// A resolved key parameter: the property name and its TypeScript type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParameter {
    pub name: String,
    pub ts_type: String,
}

/// A key property that holds an embedded reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceProperty {
    /// Name of the property on the entity
    pub property_name: String,
    /// Name of the referenced literal type
    pub referenced_type: String,
}

fn lookup_property<'a>(
    entity: &'a EntityMetadata,
    property_name: &str,
    role: KeyRole,
) -> Result<&'a PropertyMetadata> {
    entity
        .property(property_name)
        .ok_or_else(|| GeneratorError::Schema {
            entity: entity.name.clone(),
            property: property_name.to_string(),
            role,
        })
}

/// TypeScript type for a single entity property
///
/// References resolve to the referenced literal's type name; any other
/// referenced kind must not be embedded and fails generation.
fn typescript_type_for_property(
    entity: &EntityMetadata,
    property: &PropertyMetadata,
) -> Result<String> {
    let base = match &property.property_type {
        PropertyType::String => "string".to_string(),
        PropertyType::Number => "number".to_string(),
        PropertyType::Boolean => "boolean".to_string(),
        PropertyType::Date => "Date".to_string(),
        PropertyType::Enum => format!("{}['{}']", entity.name, property.name),
        PropertyType::Reference { of } => {
            if of.kind != EntityKind::Literal {
                return Err(GeneratorError::ReferencedVariant {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                    kind: of.kind.label().to_string(),
                });
            }
            of.name.clone()
        }
    };
    if property.nullable {
        Ok(format!("{} | null", base))
    } else {
        Ok(base)
    }
}

/// Resolve a named key property list into typed parameters
///
/// Fails if any name is absent from the entity's properties, carrying the
/// role so the error points at the offending declaration.
pub fn resolve_key_parameters(
    entity: &EntityMetadata,
    key_properties: &[String],
    role: KeyRole,
) -> Result<Vec<KeyParameter>> {
    key_properties
        .iter()
        .map(|property_name| {
            let property = lookup_property(entity, property_name, role)?;
            Ok(KeyParameter {
                name: property.name.clone(),
                ts_type: typescript_type_for_property(entity, property)?,
            })
        })
        .collect()
}

/// Which of the given key properties are embedded references
///
/// Embedded references need content-only serialization before keying, and
/// their types need importing in generated code.
pub fn reference_property_names(
    entity: &EntityMetadata,
    key_properties: &[String],
    role: KeyRole,
) -> Result<Vec<ReferenceProperty>> {
    let mut references = Vec::new();
    for property_name in key_properties {
        let property = lookup_property(entity, property_name, role)?;
        if let PropertyType::Reference { of } = &property.property_type {
            if of.kind != EntityKind::Literal {
                return Err(GeneratorError::ReferencedVariant {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                    kind: of.kind.label().to_string(),
                });
            }
            references.push(ReferenceProperty {
                property_name: property.name.clone(),
                referenced_type: of.name.clone(),
            });
        }
    }
    Ok(references)
}

/// Build the TypeScript expression that encodes a key from a source object
///
/// - a sort key of exactly one numeric property is the bare member
///   expression, unencoded, so the store attribute can be declared numeric;
/// - a sort key mixing numeric and non-numeric properties has no safe
///   default encoding and fails generation;
/// - every other key is an ordered `JSON.stringify` of the member values,
///   with embedded literals first reduced to their canonical content-only
///   serialization (literals compare by content, not storage identity).
pub fn key_encoding_expr(
    entity: &EntityMetadata,
    key_properties: &[String],
    role: KeyRole,
    source: &str,
) -> Result<String> {
    if role == KeyRole::Sort {
        let mut numeric_properties = Vec::new();
        for property_name in key_properties {
            let property = lookup_property(entity, property_name, role)?;
            if property.property_type.is_number() {
                numeric_properties.push(property.name.clone());
            }
        }
        let all_numeric = numeric_properties.len() == key_properties.len();

        if key_properties.len() == 1 && all_numeric {
            return Ok(format!("{}.{}", source, key_properties[0]));
        }
        if !numeric_properties.is_empty() && !all_numeric {
            return Err(GeneratorError::AmbiguousSortEncoding {
                entity: entity.name.clone(),
                properties: numeric_properties,
            });
        }
    }

    let references = reference_property_names(entity, key_properties, role)?;
    let members = key_properties
        .iter()
        .map(|property_name| {
            // missing properties already rejected above for sort keys; check the rest
            lookup_property(entity, property_name, role)?;
            let is_reference = references
                .iter()
                .any(|reference| &reference.property_name == property_name);
            Ok(if is_reference {
                format!("serialize(omitMetadataValues({}.{}))", source, property_name)
            } else {
                format!("{}.{}", source, property_name)
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("JSON.stringify([{}])", members.join(", ")))
}

/// Whether the single-numeric-sort exemption applies to this sort key
///
/// Decides both the encoding (bare value) and the declared type of the store
/// attribute (`N` instead of `S`).
pub fn sort_key_is_single_numeric(
    entity: &EntityMetadata,
    sort_key: &[String],
) -> bool {
    sort_key.len() == 1
        && entity
            .property(&sort_key[0])
            .is_some_and(|property| property.property_type.is_number())
}

/// Render resolved parameters as a TypeScript object type literal
pub fn parameters_object_type(parameters: &[KeyParameter]) -> String {
    let entries = parameters
        .iter()
        .map(|parameter| format!("{}: {};", parameter.name, parameter.ts_type))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{{ {} }}", entries)
}
