//! Terraform resource emission
//!
//! Emits the DynamoDB table definitions required to persist one entity:
//! the index-by-uuid table, on which every supplemental query gets a global
//! secondary index, and the index-by-unique table, which exists solely to
//! enforce the global uniqueness constraint the uuid table can not provide.

use crate::error::Result;
use crate::keys::{key_encoding_expr, resolve_key_parameters, sort_key_is_single_numeric, KeyRole};
use crate::metadata::EntityMetadata;
use crate::naming::{entity_kebab_name, entity_snake_name, secondary_index_name};
use crate::query::{GeneratedArtifact, SupplementalQuery};

/// The attribute and global_secondary_index blocks one supplemental query
/// requires on the index-by-uuid table
///
/// The filter attribute `p{n}` is always a string; the sort attribute `s{n}`
/// is numeric iff the single-numeric-sort exemption applies, so the store
/// sorts it numerically instead of lexically.
fn query_index_blocks(
    entity: &EntityMetadata,
    query: &SupplementalQuery,
    query_number: usize,
) -> Result<Vec<String>> {
    // resolve both keys up front so schema errors surface before any output
    resolve_key_parameters(entity, &query.filter_by_key, KeyRole::Filter)?;
    if let Some(sort_key) = &query.sort_by_key {
        key_encoding_expr(entity, sort_key, KeyRole::Sort, "object")?;
    }

    let mut blocks = Vec::new();

    blocks.push(format!(
        r#"  attribute {{
    name = "p{query_number}"
    type = "S"
  }}"#
    ));

    if let Some(sort_key) = &query.sort_by_key {
        let attribute_type = if sort_key_is_single_numeric(entity, sort_key) {
            "N"
        } else {
            "S"
        };
        blocks.push(format!(
            r#"  attribute {{
    name = "s{query_number}"
    type = "{attribute_type}"
  }}"#
        ));
    }

    let index_name = secondary_index_name(query);
    let range_key_line = if query.sort_by_key.is_some() {
        format!("\n    range_key          = \"s{query_number}\"")
    } else {
        String::new()
    };
    blocks.push(format!(
        r#"  global_secondary_index {{
    name               = "{index_name}"
    hash_key           = "p{query_number}"{range_key_line}
    projection_type    = "INCLUDE"
    non_key_attributes = ["o"]
  }}"#
    ));

    Ok(blocks)
}

fn table_resource(
    resource_name: &str,
    table_name_suffix: &str,
    entity: &EntityMetadata,
    extra_blocks: &[String],
) -> String {
    let kebab_name = entity_kebab_name(&entity.name);
    let extra = if extra_blocks.is_empty() {
        String::new()
    } else {
        format!("\n{}", extra_blocks.join("\n"))
    };
    format!(
        r#"resource "aws_dynamodb_table" "{resource_name}" {{
  name         = "${{local.service}}-${{var.environment}}-table-{kebab_name}-by-{table_name_suffix}"
  billing_mode = "PAY_PER_REQUEST"
  point_in_time_recovery {{
    enabled = var.environment == "prod" ? true : false
  }}

  hash_key = "p" # partition key

  attribute {{
    name = "p"
    type = "S"
  }}{extra}

  tags = local.tags
}}"#
    )
}

/// Emit the terraform artifact for one entity
///
/// Produces one file with two table resources: `table_{entity}_by_uuid` with
/// a secondary index per supplemental query, and
/// `table_{entity}_by_unique_on_natural_key` with no secondary indexes.
pub fn terraform_artifact(
    entity: &EntityMetadata,
    supplemental_queries: &[SupplementalQuery],
    generator_name: &str,
) -> Result<GeneratedArtifact> {
    let snake_name = entity_snake_name(&entity.name);

    let header = format!(
        r#"/**
 * declares the tables required to persist the {} {} in dynamodb
 * - includes the index-by-uuid table w/ all required secondary search indexes
 * - includes an index-by-unique table per unique key, to ensure the global uniqueness constraint
 * - enforces point_in_time_recovery in prod for disaster recovery and data analytics
 *
 * generated by {}
 */"#,
        entity.name,
        entity.kind.label(),
        generator_name,
    );

    let mut query_blocks = Vec::new();
    for (index, query) in supplemental_queries.iter().enumerate() {
        query_blocks.extend(query_index_blocks(entity, query, index + 1)?);
    }

    let by_uuid_table = table_resource(
        &format!("table_{}_by_uuid", snake_name),
        "uuid",
        entity,
        &query_blocks,
    );

    let by_unique_table = table_resource(
        &format!("table_{}_by_unique_on_natural_key", snake_name),
        "unique-on-natural-key",
        entity,
        &[],
    );

    let path = format!("dynamodb.table.{}.tf", snake_name);
    let content = [header, by_uuid_table, by_unique_table].join("\n") + "\n";
    Ok(GeneratedArtifact::new(path, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{EntityKind, PropertyMetadata, PropertyType};

    const GENERATOR: &str = "dynamodb-dao-codegen vX.X.X";

    fn sensor_entity() -> EntityMetadata {
        EntityMetadata::new(
            "Sensor",
            EntityKind::Entity,
            vec![
                PropertyMetadata::new("serialNumber", PropertyType::String),
                PropertyMetadata::new("ownerUuid", PropertyType::String).nullable(),
                PropertyMetadata::new("addressUuid", PropertyType::String),
                PropertyMetadata::new("createdAt", PropertyType::Date),
            ],
        )
        .unique_on(vec!["serialNumber".to_string()])
    }

    fn sea_sponge_entity() -> EntityMetadata {
        EntityMetadata::new(
            "SeaSponge",
            EntityKind::Entity,
            vec![
                PropertyMetadata::new("name", PropertyType::String),
                PropertyMetadata::new("age", PropertyType::Number),
                PropertyMetadata::new("shape", PropertyType::Enum),
            ],
        )
        .unique_on(vec!["name".to_string()])
    }

    // =========================================================================
    // Table Shape Tests
    // =========================================================================

    #[test]
    fn test_emits_two_table_resources() {
        let artifact = terraform_artifact(&sensor_entity(), &[], GENERATOR).unwrap();
        assert_eq!(artifact.path, "dynamodb.table.sensor.tf");
        assert!(artifact.content.contains(r#"resource "aws_dynamodb_table" "table_sensor_by_uuid""#));
        assert!(artifact.content.contains(
            r#"resource "aws_dynamodb_table" "table_sensor_by_unique_on_natural_key""#
        ));
        assert_eq!(artifact.content.matches("resource \"aws_dynamodb_table\"").count(), 2);
    }

    #[test]
    fn test_table_names_derive_from_namespace_and_entity() {
        let artifact = terraform_artifact(&sensor_entity(), &[], GENERATOR).unwrap();
        assert!(artifact.content.contains(
            r#"name         = "${local.service}-${var.environment}-table-sensor-by-uuid""#
        ));
        assert!(artifact.content.contains(
            r#"name         = "${local.service}-${var.environment}-table-sensor-by-unique-on-natural-key""#
        ));
    }

    #[test]
    fn test_tables_declare_operational_practices() {
        let artifact = terraform_artifact(&sensor_entity(), &[], GENERATOR).unwrap();
        // count the blocks; the header comment mentions the practice too
        assert_eq!(
            artifact.content.matches("point_in_time_recovery {").count(),
            2
        );
        assert_eq!(artifact.content.matches(r#"billing_mode = "PAY_PER_REQUEST""#).count(), 2);
        assert_eq!(artifact.content.matches("tags = local.tags").count(), 2);
    }

    #[test]
    fn test_no_queries_means_no_secondary_indexes() {
        let artifact = terraform_artifact(&sensor_entity(), &[], GENERATOR).unwrap();
        assert!(!artifact.content.contains("global_secondary_index"));
    }

    // =========================================================================
    // Supplemental Query Tests
    // =========================================================================

    #[test]
    fn test_query_attributes_are_one_based() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["addressUuid".to_string()]),
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
                .sort_by(vec!["createdAt".to_string()]),
        ];
        let artifact = terraform_artifact(&sensor_entity(), &queries, GENERATOR).unwrap();
        assert!(artifact.content.contains(r#"name = "p1""#));
        assert!(artifact.content.contains(r#"name = "p2""#));
        assert!(!artifact.content.contains(r#"name = "s1""#));
        assert!(artifact.content.contains(r#"name = "s2""#));
        assert!(artifact.content.contains(r#"range_key          = "s2""#));
    }

    #[test]
    fn test_secondary_index_per_query() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["addressUuid".to_string()]),
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
                .sort_by(vec!["createdAt".to_string()]),
        ];
        let artifact = terraform_artifact(&sensor_entity(), &queries, GENERATOR).unwrap();
        assert_eq!(artifact.content.matches("global_secondary_index").count(), 2);
        assert!(artifact.content.contains(r#"name               = "index-by-address-uuid""#));
        assert!(artifact
            .content
            .contains(r#"name               = "index-by-owner-uuid-sort-created-at""#));
        assert_eq!(artifact.content.matches(r#"non_key_attributes = ["o"]"#).count(), 2);
    }

    #[test]
    fn test_single_numeric_sort_attribute_is_declared_numeric() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["name".to_string()])
                .sort_by(vec!["age".to_string()]),
        ];
        let artifact = terraform_artifact(&sea_sponge_entity(), &queries, GENERATOR).unwrap();
        let sort_attribute = r#"  attribute {
    name = "s1"
    type = "N"
  }"#;
        assert!(artifact.content.contains(sort_attribute));
    }

    #[test]
    fn test_non_numeric_sort_attribute_is_declared_string() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["name".to_string()])
                .sort_by(vec!["shape".to_string()]),
        ];
        let artifact = terraform_artifact(&sea_sponge_entity(), &queries, GENERATOR).unwrap();
        assert!(artifact.content.contains(
            r#"  attribute {
    name = "s1"
    type = "S"
  }"#
        ));
    }

    #[test]
    fn test_mixed_sort_key_fails_generation() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["name".to_string()])
                .sort_by(vec!["age".to_string(), "shape".to_string()]),
        ];
        let error = terraform_artifact(&sea_sponge_entity(), &queries, GENERATOR).unwrap_err();
        assert!(matches!(
            error,
            crate::error::GeneratorError::AmbiguousSortEncoding { .. }
        ));
    }

    #[test]
    fn test_unknown_filter_property_fails_generation() {
        let queries = vec![SupplementalQuery::filter_by(vec!["ghost".to_string()])];
        let error = terraform_artifact(&sensor_entity(), &queries, GENERATOR).unwrap_err();
        assert!(matches!(error, crate::error::GeneratorError::Schema { .. }));
    }

    // =========================================================================
    // Determinism Tests
    // =========================================================================

    #[test]
    fn test_output_is_byte_identical_across_runs() {
        let queries = vec![
            SupplementalQuery::filter_by(vec!["addressUuid".to_string()]),
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
                .sort_by(vec!["createdAt".to_string()]),
        ];
        let first = terraform_artifact(&sensor_entity(), &queries, GENERATOR).unwrap();
        let second = terraform_artifact(&sensor_entity(), &queries, GENERATOR).unwrap();
        assert_eq!(first, second);
    }
}
