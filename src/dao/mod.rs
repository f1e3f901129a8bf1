//! TypeScript data-access-object emission
//!
//! Emits one directory of DAO source units per entity: casters between the
//! domain object and its database records, the point lookups, one range
//! query per supplemental query, the optimistic-locking upsert, an
//! aggregating index, and a maintenance migration stub.

pub mod cast;
pub mod find;
pub mod find_all_by;
pub mod upsert;

use crate::error::{GeneratorError, Result};
use crate::metadata::EntityMetadata;
use crate::naming::{entity_camel_name, entity_kebab_name, operation_name};
use crate::query::{GeneratedArtifact, SupplementalQuery};

/// Which table a generated operation runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableKey {
    Uuid,
    UniqueOnNaturalKey,
}

/// TypeScript expression that builds the table name from runtime config
pub(crate) fn table_name_expr(entity: &EntityMetadata, key: TableKey) -> String {
    let qualifier = match key {
        TableKey::Uuid => "uuid",
        TableKey::UniqueOnNaturalKey => "unique-on-natural-key",
    };
    format!(
        "`${{config.service}}-${{config.environment}}-table-{}-by-{}`",
        entity_kebab_name(&entity.name),
        qualifier
    )
}

/// Variable name the generated code binds the domain object to
pub(crate) fn input_variable_name(entity: &EntityMetadata) -> String {
    entity
        .decorations
        .alias
        .clone()
        .unwrap_or_else(|| entity_camel_name(&entity.name))
}

/// Every property name used by any key of the entity, deduplicated
pub(crate) fn all_key_properties(
    entity: &EntityMetadata,
    supplemental_queries: &[SupplementalQuery],
) -> Vec<String> {
    let mut properties = Vec::new();
    let mut push_unique = |name: &String| {
        if !properties.contains(name) {
            properties.push(name.clone());
        }
    };
    for name in &entity.decorations.unique {
        push_unique(name);
    }
    for query in supplemental_queries {
        for name in &query.filter_by_key {
            push_unique(name);
        }
        if let Some(sort_key) = &query.sort_by_key {
            for name in sort_key {
                push_unique(name);
            }
        }
    }
    properties
}

pub(crate) fn require_unique_key(entity: &EntityMetadata) -> Result<&[String]> {
    if entity.decorations.unique.is_empty() {
        return Err(GeneratorError::configuration(format!(
            "no unique key was declared on the entity '{}'",
            entity.name
        )));
    }
    Ok(&entity.decorations.unique)
}

/// The aggregating index unit, exporting every operation under one name
fn index_code(entity: &EntityMetadata, supplemental_queries: &[SupplementalQuery]) -> String {
    let mut method_names = vec![
        "upsert".to_string(),
        "findByUuid".to_string(),
        "findByUnique".to_string(),
    ];
    method_names.extend(supplemental_queries.iter().map(operation_name));

    let mut import_names = method_names.clone();
    import_names.sort();
    let imports = import_names
        .iter()
        .map(|name| format!("import {{ {} }} from './{}';", name, name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nexport const {}Dao = {{\n  {},\n}};\n",
        imports,
        entity_camel_name(&entity.name),
        method_names.join(",\n  ")
    )
}

/// The maintenance stub for re-shaping persisted records
fn migrate_all_records_code(entity: &EntityMetadata, generator_label: &str) -> String {
    format!(
        r#"/**
 * enables migrating all {entity} records to the latest schema
 *
 * procedure
 * - scan the index-by-uuid table
 * - castFromDatabaseObject each record, applying the current defaults
 * - upsert each record with force: true, to propagate the new shape to every table
 *
 * generated by {label}
 */
export const migrateAllRecordsToNewSchema = async (): Promise<void> => {{
  throw new Error(
    'not implemented: scan the index-by-uuid table and upsert each record with force: true',
  );
}};
"#,
        entity = entity.name,
        label = generator_label,
    )
}

/// Emit the full set of DAO artifacts for one entity
///
/// Paths are relative to the dao output root, under a `{entity}Dao/`
/// directory.
pub fn dao_artifacts(
    entity: &EntityMetadata,
    supplemental_queries: &[SupplementalQuery],
    generator_label: &str,
) -> Result<Vec<GeneratedArtifact>> {
    require_unique_key(entity)?;
    let directory = format!("{}Dao", entity_camel_name(&entity.name));
    let unit_path = |file_name: &str| [directory.as_str(), file_name].join("/");

    let mut artifacts = vec![
        GeneratedArtifact::new(
            unit_path("castToDatabaseObject.ts"),
            cast::cast_to_database_object_code(entity, supplemental_queries, generator_label)?,
        ),
        GeneratedArtifact::new(
            unit_path("castFromDatabaseObject.ts"),
            cast::cast_from_database_object_code(entity, generator_label),
        ),
        GeneratedArtifact::new(
            unit_path("upsert.ts"),
            upsert::upsert_code(entity, generator_label)?,
        ),
        GeneratedArtifact::new(
            unit_path("findByUuid.ts"),
            find::find_by_uuid_code(entity, generator_label),
        ),
        GeneratedArtifact::new(
            unit_path("findByUnique.ts"),
            find::find_by_unique_code(entity, generator_label)?,
        ),
    ];

    for (index, query) in supplemental_queries.iter().enumerate() {
        artifacts.push(GeneratedArtifact::new(
            unit_path(&format!("{}.ts", operation_name(query))),
            find_all_by::find_all_by_code(entity, query, index + 1, generator_label)?,
        ));
    }

    artifacts.push(GeneratedArtifact::new(
        unit_path("index.ts"),
        index_code(entity, supplemental_queries),
    ));
    artifacts.push(GeneratedArtifact::new(
        unit_path(".maintenance/migrateAllRecordsToNewSchema.ts"),
        migrate_all_records_code(entity, generator_label),
    ));

    Ok(artifacts)
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
                PropertyMetadata::new("name", PropertyType::String),
                PropertyMetadata::new("ownerUuid", PropertyType::String).nullable(),
                PropertyMetadata::new("addressUuid", PropertyType::String),
                PropertyMetadata::new("createdAt", PropertyType::Date),
            ],
        )
        .unique_on(vec!["serialNumber".to_string()])
    }

    fn sensor_queries() -> Vec<SupplementalQuery> {
        vec![
            SupplementalQuery::filter_by(vec!["addressUuid".to_string()]),
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
                .sort_by(vec!["createdAt".to_string()]),
        ]
    }

    // =========================================================================
    // Artifact Set Tests
    // =========================================================================

    #[test]
    fn test_artifact_paths_without_queries() {
        let artifacts = dao_artifacts(&sensor_entity(), &[], GENERATOR).unwrap();
        let paths: Vec<&str> = artifacts.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "sensorDao/castToDatabaseObject.ts",
                "sensorDao/castFromDatabaseObject.ts",
                "sensorDao/upsert.ts",
                "sensorDao/findByUuid.ts",
                "sensorDao/findByUnique.ts",
                "sensorDao/index.ts",
                "sensorDao/.maintenance/migrateAllRecordsToNewSchema.ts",
            ]
        );
    }

    #[test]
    fn test_artifact_paths_include_one_unit_per_query() {
        let artifacts = dao_artifacts(&sensor_entity(), &sensor_queries(), GENERATOR).unwrap();
        let paths: Vec<&str> = artifacts.iter().map(|a| a.path.as_str()).collect();
        assert!(paths.contains(&"sensorDao/findAllByAddressUuid.ts"));
        assert!(paths.contains(&"sensorDao/findAllByOwnerUuidSortByCreatedAt.ts"));
    }

    #[test]
    fn test_missing_unique_key_fails() {
        let entity = EntityMetadata::new(
            "Sensor",
            EntityKind::Entity,
            vec![PropertyMetadata::new("name", PropertyType::String)],
        );
        let error = dao_artifacts(&entity, &[], GENERATOR).unwrap_err();
        assert!(matches!(error, GeneratorError::Configuration(_)));
    }

    // =========================================================================
    // Helper Tests
    // =========================================================================

    #[test]
    fn test_table_name_expr() {
        let entity = sensor_entity();
        assert_eq!(
            table_name_expr(&entity, TableKey::Uuid),
            "`${config.service}-${config.environment}-table-sensor-by-uuid`"
        );
        assert_eq!(
            table_name_expr(&entity, TableKey::UniqueOnNaturalKey),
            "`${config.service}-${config.environment}-table-sensor-by-unique-on-natural-key`"
        );
    }

    #[test]
    fn test_input_variable_name_prefers_alias() {
        let entity = sensor_entity();
        assert_eq!(input_variable_name(&entity), "sensor");
        assert_eq!(
            input_variable_name(&entity.clone().with_alias("device")),
            "device"
        );
    }

    #[test]
    fn test_all_key_properties_deduplicates_in_order() {
        let entity = sensor_entity();
        let queries = vec![
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
                .sort_by(vec!["createdAt".to_string()]),
            SupplementalQuery::filter_by(vec!["ownerUuid".to_string(), "addressUuid".to_string()]),
        ];
        assert_eq!(
            all_key_properties(&entity, &queries),
            vec!["serialNumber", "ownerUuid", "createdAt", "addressUuid"]
        );
    }

    // =========================================================================
    // Index Unit Tests
    // =========================================================================

    #[test]
    fn test_index_unit_exports_all_operations() {
        let artifacts = dao_artifacts(&sensor_entity(), &sensor_queries(), GENERATOR).unwrap();
        let index = artifacts
            .iter()
            .find(|a| a.path.ends_with("index.ts"))
            .unwrap();
        assert!(index.content.contains("export const sensorDao = {"));
        for name in [
            "upsert",
            "findByUuid",
            "findByUnique",
            "findAllByAddressUuid",
            "findAllByOwnerUuidSortByCreatedAt",
        ] {
            assert!(
                index
                    .content
                    .contains(&format!("import {{ {} }} from './{}';", name, name)),
                "missing import for {}",
                name
            );
        }
    }

    #[test]
    fn test_index_unit_imports_are_sorted() {
        let artifacts = dao_artifacts(&sensor_entity(), &sensor_queries(), GENERATOR).unwrap();
        let index = artifacts
            .iter()
            .find(|a| a.path.ends_with("index.ts"))
            .unwrap();
        let import_lines: Vec<&str> = index
            .content
            .lines()
            .filter(|line| line.starts_with("import"))
            .collect();
        let mut sorted = import_lines.clone();
        sorted.sort();
        assert_eq!(import_lines, sorted);
    }

    // =========================================================================
    // Maintenance Unit Tests
    // =========================================================================

    #[test]
    fn test_migration_stub_names_procedure() {
        let artifacts = dao_artifacts(&sensor_entity(), &[], GENERATOR).unwrap();
        let stub = artifacts
            .iter()
            .find(|a| a.path.contains(".maintenance/"))
            .unwrap();
        assert!(stub.content.contains("migrateAllRecordsToNewSchema"));
        assert!(stub.content.contains("force: true"));
        assert!(stub.content.contains(GENERATOR));
    }
}
