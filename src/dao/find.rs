//! Point lookup emission
//!
//! `findByUuid` reads the identity table; `findByUnique` reads the
//! uniqueness table. Both treat more than one match as corruption: the
//! partition key is the whole key, so a second record under it can only mean
//! the store's invariant was violated, never a retryable condition.

use crate::dao::{table_name_expr, TableKey};
use crate::error::Result;
use crate::keys::{
    key_encoding_expr, parameters_object_type, reference_property_names, resolve_key_parameters,
    KeyRole,
};
use crate::metadata::EntityMetadata;

pub fn find_by_uuid_code(entity: &EntityMetadata, generator_label: &str) -> String {
    let table_name = table_name_expr(entity, TableKey::Uuid);
    format!(
        r#"import {{ simpleDynamodbClient }} from 'simple-dynamodb-client';
import {{ HasMetadata }} from 'type-fns';

import {{ {entity} }} from '../../../domain';
import {{ getConfig }} from '../../../utils/config/getConfig';
import {{ ConsistencyViolationError }} from '../../../utils/errors';
import {{ log }} from '../../../utils/logger';
import {{ castFromDatabaseObject }} from './castFromDatabaseObject';

/**
 * enables finding a {entity} by uuid
 *
 * generated by {label}
 */
export const findByUuid = async ({{ uuid }}: {{ uuid: string }}): Promise<HasMetadata<{entity}> | null> => {{
  const config = await getConfig();
  const items = await simpleDynamodbClient.query({{
    tableName: {table_name},
    logDebug: log.debug,
    attributesToRetrieveInQuery: ['o'],
    queryConditions: {{
      KeyConditionExpression: 'p = :p',
      ExpressionAttributeValues: {{
        ':p': uuid,
      }},
    }},
  }});
  if (!items.length) return null;
  if (items.length > 1)
    throw new ConsistencyViolationError('more than one record found by uuid', {{
      items,
      uuid,
    }});
  return castFromDatabaseObject(items[0]);
}};
"#,
        entity = entity.name,
        label = generator_label,
        table_name = table_name,
    )
}

pub fn find_by_unique_code(entity: &EntityMetadata, generator_label: &str) -> Result<String> {
    let unique_key = crate::dao::require_unique_key(entity)?;
    let parameters = resolve_key_parameters(entity, unique_key, KeyRole::Unique)?;
    let references = reference_property_names(entity, unique_key, KeyRole::Unique)?;

    // embedded literal types are part of the parameter surface; import them
    let mut domain_imports = vec![entity.name.clone()];
    domain_imports.extend(
        references
            .iter()
            .map(|reference| reference.referenced_type.clone()),
    );
    let serialization_import = if references.is_empty() {
        ""
    } else {
        "\nimport { serialize, omitMetadataValues } from 'domain-objects';"
    };

    let args_type = parameters_object_type(&parameters);
    let key_expr = key_encoding_expr(entity, unique_key, KeyRole::Unique, "args")?;
    let table_name = table_name_expr(entity, TableKey::UniqueOnNaturalKey);

    Ok(format!(
        r#"import {{ simpleDynamodbClient }} from 'simple-dynamodb-client';
import {{ HasMetadata }} from 'type-fns';{serialization_import}

import {{ {domain_imports} }} from '../../../domain';
import {{ getConfig }} from '../../../utils/config/getConfig';
import {{ ConsistencyViolationError }} from '../../../utils/errors';
import {{ log }} from '../../../utils/logger';
import {{ castFromDatabaseObject }} from './castFromDatabaseObject';

/**
 * enables finding a {entity} by its natural unique key
 *
 * generated by {label}
 */
export const findByUnique = async (args: {args_type}): Promise<HasMetadata<{entity}> | null> => {{
  const config = await getConfig();
  const items = await simpleDynamodbClient.query({{
    tableName: {table_name},
    logDebug: log.debug,
    attributesToRetrieveInQuery: ['o'],
    queryConditions: {{
      KeyConditionExpression: 'p = :p',
      ExpressionAttributeValues: {{
        ':p': {key_expr},
      }},
    }},
  }});
  if (!items.length) return null;
  if (items.length > 1)
    throw new ConsistencyViolationError('more than one record found by unique key', {{
      items,
      args,
    }});
  return castFromDatabaseObject(items[0]);
}};
"#,
        entity = entity.name,
        label = generator_label,
        serialization_import = serialization_import,
        domain_imports = domain_imports.join(", "),
        args_type = args_type,
        key_expr = key_expr,
        table_name = table_name,
    ))
}
