//! Upsert emission
//!
//! The generated upsert keeps the identity and uniqueness tables consistent
//! by writing both records in one transaction. Creation asserts absence with
//! a conditional write; losing that race to a concurrent creator is retried
//! exactly once, since the second attempt finds the record and writes without
//! the precondition. A second consecutive loss means the store is misbehaving
//! and is surfaced as a fatal error.

use crate::dao::{input_variable_name, require_unique_key, table_name_expr, TableKey};
use crate::error::Result;
use crate::metadata::EntityMetadata;

pub fn upsert_code(entity: &EntityMetadata, generator_label: &str) -> Result<String> {
    let unique_key = require_unique_key(entity)?;
    let variable = input_variable_name(entity);

    let find_by_unique_args = unique_key
        .iter()
        .map(|name| format!("    {name}: object.{name},"))
        .collect::<Vec<_>>()
        .join("\n");

    // entities unique on uuid carry a caller-assigned uuid; it is the natural
    // key, so minting a fresh one would change identity
    let unique_on_uuid = unique_key.iter().any(|name| name == "uuid");
    let uuid_expr = if unique_on_uuid {
        "object.uuid"
    } else {
        "uuidv4()"
    };
    let uuid_import = if unique_on_uuid {
        ""
    } else {
        "\nimport { v4 as uuidv4 } from 'uuid';"
    };

    let by_unique_table = table_name_expr(entity, TableKey::UniqueOnNaturalKey);
    let by_uuid_table = table_name_expr(entity, TableKey::Uuid);

    Ok(format!(
        r#"import {{ serialize, omitMetadataValues }} from 'domain-objects';
import {{ simpleDynamodbClient }} from 'simple-dynamodb-client';
import {{ HasMetadata }} from 'type-fns';{uuid_import}

import {{ {entity} }} from '../../../domain';
import {{ getConfig }} from '../../../utils/config/getConfig';
import {{ LockViolationError }} from '../../../utils/errors';
import {{ log }} from '../../../utils/logger';
import {{ castToDatabaseObject }} from './castToDatabaseObject';
import {{ findByUnique }} from './findByUnique';

const attemptUpsert = async ({{
  {variable}: object,
  lockOn,
  force,
  retriesRemaining,
}}: {{
  {variable}: {entity};
  lockOn: null | undefined;
  force: boolean;
  retriesRemaining: number;
}}): Promise<HasMetadata<{entity}>> => {{
  const config = await getConfig();

  // lookup the currently persisted version of this object by its natural unique key
  const foundObject = await findByUnique({{
{find_by_unique_args}
  }});

  // a caller who locked on null requires that no record exists for this unique key yet
  const askedToLockOnNull = lockOn === null;
  if (askedToLockOnNull && foundObject)
    throw new LockViolationError(
      'a record already exists for this unique key',
      {{ foundObject }},
    );

  // skip the write when nothing would change, unless forced
  if (
    foundObject &&
    !force &&
    serialize(omitMetadataValues(foundObject)) ===
      serialize(omitMetadataValues(object))
  )
    return foundObject;

  // carry forward the identity metadata of the found record; mint it otherwise
  const objectWithMetadata = {{
    ...object,
    uuid: foundObject ? foundObject.uuid : {uuid_expr},
    createdAt: foundObject ? foundObject.createdAt : new Date().toISOString(),
    updatedAt: new Date().toISOString(),
  }} as HasMetadata<{entity}>;

  // write both records in one transaction, so the tables can never diverge
  const {{ byUuid, byUniqueOnNaturalKey }} = castToDatabaseObject({{
    {variable}: objectWithMetadata,
  }});
  const mustNotExist = !foundObject; // assert absence only when creating
  const transaction = simpleDynamodbClient.startTransaction();
  transaction.queue.put({{
    tableName: {by_unique_table},
    logDebug: log.debug,
    item: byUniqueOnNaturalKey,
    putConditions: mustNotExist
      ? {{ ConditionExpression: 'attribute_not_exists(p)' }}
      : undefined,
  }});
  transaction.queue.put({{
    tableName: {by_uuid_table},
    logDebug: log.debug,
    item: byUuid,
    putConditions: mustNotExist
      ? {{ ConditionExpression: 'attribute_not_exists(p)' }}
      : undefined,
  }});
  try {{
    await transaction.execute({{ logDebug: log.debug }});
  }} catch (error) {{
    const dueToPreexistingRecord =
      error.message.includes('ConditionalCheckFailed') ||
      error.message.includes('conditional request failed');
    if (!dueToPreexistingRecord) throw error;
    if (askedToLockOnNull)
      throw new LockViolationError(
        'a record was created for this unique key concurrently',
        {{ object }},
      );
    if (retriesRemaining > 0)
      return attemptUpsert({{
        {variable}: object,
        lockOn,
        force,
        retriesRemaining: retriesRemaining - 1,
      }}); // the retry will find the concurrently created record and write without the precondition
    throw new Error(
      'records were created for this unique key concurrently on consecutive attempts',
    );
  }}
  return objectWithMetadata;
}};

/**
 * enables upserting a {entity}
 *
 * finds the persisted record by the natural unique key, skips the write when
 * nothing changed, and otherwise writes the identity and uniqueness records
 * in one transaction
 *
 * generated by {label}
 */
export const upsert = async ({{
  {variable},
  lockOn,
  force,
}}: {{
  {variable}: {entity};

  /**
   * specify null to require that no record exists for this unique key yet
   */
  lockOn?: null;

  /**
   * specify true to write even when the persisted record already matches
   *
   * note: force bypasses only the no-op short-circuit; write preconditions
   * remain governed solely by whether a prior record was found
   */
  force?: boolean;
}}): Promise<HasMetadata<{entity}>> =>
  attemptUpsert({{ {variable}, lockOn, force: force ?? false, retriesRemaining: 1 }});
"#,
        entity = entity.name,
        label = generator_label,
        variable = variable,
        uuid_import = uuid_import,
        uuid_expr = uuid_expr,
        find_by_unique_args = find_by_unique_args,
        by_unique_table = by_unique_table,
        by_uuid_table = by_uuid_table,
    ))
}
