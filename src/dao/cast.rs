//! Caster emission
//!
//! `castToDatabaseObject` computes both table records from one source of
//! truth: the identity record with every derived index attribute, and the
//! uniqueness record keyed on the encoded natural key. `castFromDatabaseObject`
//! rebuilds the domain object from the payload attribute, applying defaults
//! so old records survive schema evolution.

use crate::dao::{all_key_properties, input_variable_name, require_unique_key};
use crate::error::Result;
use crate::keys::{key_encoding_expr, reference_property_names, KeyRole};
use crate::metadata::EntityMetadata;
use crate::query::SupplementalQuery;

pub fn cast_to_database_object_code(
    entity: &EntityMetadata,
    supplemental_queries: &[SupplementalQuery],
    generator_label: &str,
) -> Result<String> {
    let unique_key = require_unique_key(entity)?;

    // embedded literals in any key force the serialization imports
    let key_properties = all_key_properties(entity, supplemental_queries);
    let references = reference_property_names(entity, &key_properties, KeyRole::Unique)?;
    let serialization_import = if references.is_empty() {
        ""
    } else {
        "\nimport { serialize, omitMetadataValues } from 'domain-objects';"
    };

    let mut index_attribute_lines = Vec::new();
    for (index, query) in supplemental_queries.iter().enumerate() {
        let query_number = index + 1;
        let filter_expr =
            key_encoding_expr(entity, &query.filter_by_key, KeyRole::Filter, "object")?;
        index_attribute_lines.push(format!("      p{}: {},", query_number, filter_expr));
        if let Some(sort_key) = &query.sort_by_key {
            let sort_expr = key_encoding_expr(entity, sort_key, KeyRole::Sort, "object")?;
            index_attribute_lines.push(format!("      s{}: {},", query_number, sort_expr));
        }
    }
    let index_attributes = if index_attribute_lines.is_empty() {
        String::new()
    } else {
        format!("\n{}", index_attribute_lines.join("\n"))
    };

    let unique_key_expr = key_encoding_expr(entity, unique_key, KeyRole::Unique, "object")?;
    let variable = input_variable_name(entity);

    Ok(format!(
        r#"import {{ HasMetadata }} from 'type-fns';{serialization_import}

import {{ {entity} }} from '../../../domain';

/**
 * defines how to cast a {entity} to its database-objects
 *
 * computes both the index-by-uuid record and the index-by-unique record from
 * one source of truth, so schema and access code stay consistent
 *
 * generated by {label}
 */
export const castToDatabaseObject = ({{
  {variable}: object,
}}: {{
  {variable}: HasMetadata<{entity}>;
}}) => {{
  return {{
    byUuid: {{
      p: object.uuid,{index_attributes}
      o: JSON.stringify(object),
    }},
    byUniqueOnNaturalKey: {{
      p: {unique_key_expr},
      o: JSON.stringify(object),
    }},
  }};
}};
"#,
        entity = entity.name,
        label = generator_label,
        variable = variable,
        serialization_import = serialization_import,
        index_attributes = index_attributes,
        unique_key_expr = unique_key_expr,
    ))
}

pub fn cast_from_database_object_code(entity: &EntityMetadata, generator_label: &str) -> String {
    format!(
        r#"import {{ HasMetadata }} from 'type-fns';

import {{ {entity} }} from '../../../domain';

/**
 * defines how to cast a database-object to a {entity}
 *
 * generated by {label}
 */
export const castFromDatabaseObject = (item: any): HasMetadata<{entity}> => {{
  // parse the payload attribute into an object
  const parsedObject = JSON.parse(item.o);

  // add defaults for backwards compatibility, if needed (e.g., for records created before adding or changing fields)
  const updatedObject = {{
    ...parsedObject,
  }};

  return new {entity}(updatedObject) as HasMetadata<{entity}>;
}};
"#,
        entity = entity.name,
        label = generator_label,
    )
}
