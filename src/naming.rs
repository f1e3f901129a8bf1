//! Deterministic name derivation
//!
//! Index names and operation names are a pure function of the query's key
//! property lists: identical specs always name identically. Property names
//! are validated as strict alphanumeric identifiers before derivation; see
//! the per-function docs for the residual collision the kebab join leaves
//! open.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use regex::Regex;

use crate::error::{GeneratorError, Result};
use crate::query::SupplementalQuery;

/// Validate an entity or property name
///
/// Names must start with a letter and contain only letters and digits; the
/// case-conversion that name derivation relies on is only well-defined for
/// such identifiers.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GeneratorError::invalid_identifier(
            "identifier can not be empty",
        ));
    }
    let pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap();
    if !pattern.is_match(name) {
        return Err(GeneratorError::invalid_identifier(format!(
            "identifier '{}' must start with a letter and contain only letters and digits",
            name
        )));
    }
    Ok(())
}

/// Derive the secondary index name for a supplemental query
///
/// Shape: `index-by-{filter-keys}` with a `-sort-{sort-keys}` segment when a
/// sort key is declared; keys are kebab-cased and joined with `-`.
///
/// The join is not injective over every pair of validated specs: kebab-cased
/// segments can realign across property boundaries (filter keys `["aB"]` and
/// `["a", "b"]` both derive `index-by-a-b`), so specs whose kebab-joined key
/// lists coincide map to the same index. Declaring two such queries on one
/// entity is the caller's mistake; the store rejects the duplicate index name
/// at provision time.
pub fn secondary_index_name(query: &SupplementalQuery) -> String {
    let filter_segment = query
        .filter_by_key
        .iter()
        .map(|key| key.to_kebab_case())
        .collect::<Vec<_>>()
        .join("-");
    let segments = match &query.sort_by_key {
        Some(sort_keys) => {
            let sort_segment = sort_keys
                .iter()
                .map(|key| key.to_kebab_case())
                .collect::<Vec<_>>()
                .join("-");
            [filter_segment, sort_segment].join("-sort-")
        }
        None => filter_segment,
    };
    ["index-by", &segments].join("-")
}

/// Derive the operation name for a supplemental query
///
/// Shape: `findAllBy{FilterKeys}` with a `SortBy{SortKeys}` segment when a
/// sort key is declared; keys are pascal-cased and joined with `And`.
///
/// Subject to the same boundary-realignment collision as
/// [`secondary_index_name`]: key lists whose pascal-joined forms coincide
/// (`["andOr"]` vs `["and", "or"]`) derive the same operation name.
pub fn operation_name(query: &SupplementalQuery) -> String {
    let filter_segment = query
        .filter_by_key
        .iter()
        .map(|key| key.to_upper_camel_case())
        .collect::<Vec<_>>()
        .join("And");
    let segments = match &query.sort_by_key {
        Some(sort_keys) => {
            let sort_segment = sort_keys
                .iter()
                .map(|key| key.to_upper_camel_case())
                .collect::<Vec<_>>()
                .join("And");
            [filter_segment, sort_segment].join("SortBy")
        }
        None => filter_segment,
    };
    ["findAllBy", &segments].concat()
}

/// Kebab-case form of an entity name, used in table name expressions
pub fn entity_kebab_name(entity_name: &str) -> String {
    entity_name.to_kebab_case()
}

/// Snake-case form of an entity name, used in resource names and file names
pub fn entity_snake_name(entity_name: &str) -> String {
    entity_name.to_snake_case()
}

/// Camel-case form of an entity name, used as the default variable name and
/// dao directory prefix in generated code
pub fn entity_camel_name(entity_name: &str) -> String {
    entity_name.to_lower_camel_case()
}
