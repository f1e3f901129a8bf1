//! Range query emission
//!
//! One unit per supplemental query. Queries with a sort key expose two
//! mutually exclusive range modifiers: `until` (inclusive upper bound,
//! descending scan) and `since` (exclusive lower bound, ascending scan),
//! either settable to the `'ANY'` sentinel to control scan direction without
//! bounding.

use crate::dao::{table_name_expr, TableKey};
use crate::error::Result;
use crate::keys::{
    key_encoding_expr, parameters_object_type, resolve_key_parameters, KeyParameter, KeyRole,
};
use crate::metadata::EntityMetadata;
use crate::naming::{operation_name, secondary_index_name};
use crate::query::SupplementalQuery;

fn filter_parameter_lines(parameters: &[KeyParameter]) -> String {
    parameters
        .iter()
        .map(|parameter| format!("  {}: {};", parameter.name, parameter.ts_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The two alternative argument shapes of a sorted query
fn sorted_args_type(
    filter_parameters: &[KeyParameter],
    sort_parameters: &[KeyParameter],
) -> String {
    let filter_lines = filter_parameter_lines(filter_parameters);
    let sort_type = parameters_object_type(sort_parameters);
    let until_variant = format!(
        r#"{{
{filter_lines}

  /**
   * specify this to use a descending scan over the sort key
   * - specify 'ANY' to control scan direction without bounding
   * - specify a value to additionally filter out everything greater than the value (inclusive upper bound)
   */
  until: {sort_type} | 'ANY';

  /**
   * specify this to limit the number of results returned
   */
  limit?: number;
}}"#
    );
    let since_variant = format!(
        r#"{{
{filter_lines}

  /**
   * specify this to use an ascending scan over the sort key
   * - specify 'ANY' to control scan direction without bounding
   * - specify a value to additionally filter out everything less than or equal to the value (exclusive lower bound)
   */
  since: {sort_type} | 'ANY';

  /**
   * specify this to limit the number of results returned
   */
  limit?: number;
}}"#
    );
    [until_variant, since_variant].join(" | ")
}

fn unsorted_args_type(filter_parameters: &[KeyParameter]) -> String {
    let filter_lines = filter_parameter_lines(filter_parameters);
    format!(
        r#"{{
{filter_lines}

  /**
   * specify this to limit the number of results returned
   */
  limit?: number;
}}"#
    )
}

pub fn find_all_by_code(
    entity: &EntityMetadata,
    query: &SupplementalQuery,
    query_number: usize,
    generator_label: &str,
) -> Result<String> {
    let filter_parameters =
        resolve_key_parameters(entity, &query.filter_by_key, KeyRole::Filter)?;
    let sort_parameters = match &query.sort_by_key {
        Some(sort_key) => Some(resolve_key_parameters(entity, sort_key, KeyRole::Sort)?),
        None => None,
    };

    let name = operation_name(query);
    let index_name = secondary_index_name(query);
    let table_name = table_name_expr(entity, TableKey::Uuid);
    let filter_expr = key_encoding_expr(entity, &query.filter_by_key, KeyRole::Filter, "args")?;

    let filter_names = filter_parameters
        .iter()
        .map(|parameter| parameter.name.as_str())
        .collect::<Vec<_>>()
        .join(" and ");

    let (type_guard, purpose, args_type, body) = match (&query.sort_by_key, &sort_parameters) {
        (Some(sort_key), Some(sort_parameters)) => {
            let sort_expr = key_encoding_expr(entity, sort_key, KeyRole::Sort, "sortArgs")?;
            let sort_names = sort_parameters
                .iter()
                .map(|parameter| parameter.name.as_str())
                .collect::<Vec<_>>()
                .join(" and ");
            let type_guard = r#"

const isSortingUntil = <T>(
  args: { until: T } | { since: T },
): args is { until: T } => !!(args as any).until;"#
                .to_string();
            let purpose = format!(
                "enables finding all {} by {} with optional sorting by {}",
                entity.name, filter_names, sort_names
            );
            let args_type = sorted_args_type(&filter_parameters, sort_parameters);
            let body = format!(
                r#"  const sortArgs = isSortingUntil(args) ? args.until : args.since;
  const sortOperator = isSortingUntil(args) ? '<=' : '>';
  const skipSortKeyCondition = sortArgs === 'ANY'; // 'ANY' means control scan direction only, no bound
  const items = await simpleDynamodbClient.query({{
    tableName: {table_name},
    logDebug: log.debug,
    attributesToRetrieveInQuery: ['o'],
    queryConditions: {{
      IndexName: '{index_name}',
      KeyConditionExpression: skipSortKeyCondition
        ? 'p{n} = :p{n}' // no need to bound the sort key when sorting on any
        : `p{n} = :p{n} AND s{n} ${{sortOperator}} :s{n}`, // otherwise compare the sort key
      ExpressionAttributeValues: {{
        ':p{n}': {filter_expr},
        ...(skipSortKeyCondition
          ? undefined
          : {{ ':s{n}': {sort_expr} }}),
      }},
      ScanIndexForward: isSortingUntil(args) ? false : true, // descending on the sort key for "until" (latest first); ascending for "since"
      Limit: args.limit,
    }},
  }});"#,
                n = query_number,
                table_name = table_name,
                index_name = index_name,
                filter_expr = filter_expr,
                sort_expr = sort_expr,
            );
            (type_guard, purpose, args_type, body)
        }
        _ => {
            let purpose = format!(
                "enables finding all {} by {}",
                entity.name, filter_names
            );
            let args_type = unsorted_args_type(&filter_parameters);
            let body = format!(
                r#"  const items = await simpleDynamodbClient.query({{
    tableName: {table_name},
    logDebug: log.debug,
    attributesToRetrieveInQuery: ['o'],
    queryConditions: {{
      IndexName: '{index_name}',
      KeyConditionExpression: 'p{n} = :p{n}',
      ExpressionAttributeValues: {{
        ':p{n}': {filter_expr},
      }},
      Limit: args.limit,
    }},
  }});"#,
                n = query_number,
                table_name = table_name,
                index_name = index_name,
                filter_expr = filter_expr,
            );
            (String::new(), purpose, args_type, body)
        }
    };

    Ok(format!(
        r#"import {{ simpleDynamodbClient }} from 'simple-dynamodb-client';
import {{ HasMetadata }} from 'type-fns';

import {{ {entity} }} from '../../../domain';
import {{ getConfig }} from '../../../utils/config/getConfig';
import {{ log }} from '../../../utils/logger';
import {{ castFromDatabaseObject }} from './castFromDatabaseObject';{type_guard}

/**
 * {purpose}
 *
 * generated by {label}
 */
export const {name} = async (args: {args_type}): Promise<HasMetadata<{entity}>[]> => {{
  const config = await getConfig();
{body}
  return items.map(castFromDatabaseObject);
}};
"#,
        entity = entity.name,
        label = generator_label,
        type_guard = type_guard,
        purpose = purpose,
        name = name,
        args_type = args_type,
        body = body,
    ))
}
