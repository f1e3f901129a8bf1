//! Generation orchestration
//!
//! Plans the full artifact set for each configured entity: the terraform
//! table definitions first, then the dao modules. Entities are generated
//! independently, so one misdeclared entity reports its error without
//! blocking the others.

use crate::config::GeneratorConfig;
use crate::dao::dao_artifacts;
use crate::error::{GeneratorError, Result};
use crate::metadata::EntityMetadata;
use crate::naming::validate_identifier;
use crate::query::{GeneratedArtifact, SupplementalQuery};
use crate::terraform::terraform_artifact;

/// Name the generator signs its artifacts with
pub const GENERATOR_NAME: &str = "dynamodb-dao-codegen";

/// Identity of the generator run, stamped into every artifact header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorContext {
    /// Version string, e.g. "v0.1.0"
    pub version: String,
}

impl GeneratorContext {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// The context of the running build
    pub fn current() -> Self {
        Self::new(concat!("v", env!("CARGO_PKG_VERSION")))
    }

    /// The label stamped into artifact headers, e.g. "dynamodb-dao-codegen v0.1.0"
    pub fn label(&self) -> String {
        format!("{} {}", GENERATOR_NAME, self.version)
    }
}

/// Generate every artifact for one entity
///
/// Paths are relative: the terraform artifact to the terraform output
/// directory, the dao artifacts to the dao output directory.
pub fn generate_for_entity(
    entity: &EntityMetadata,
    supplemental_queries: &[SupplementalQuery],
    context: &GeneratorContext,
) -> Result<Vec<GeneratedArtifact>> {
    // name derivation is only well-defined for strict alphanumeric identifiers
    validate_identifier(&entity.name)?;
    for property in &entity.properties {
        validate_identifier(&property.name)?;
    }

    let label = context.label();
    log::debug!(
        "planning artifacts for entity '{}' with {} supplemental queries",
        entity.name,
        supplemental_queries.len()
    );
    let mut artifacts = vec![terraform_artifact(entity, supplemental_queries, &label)?];
    artifacts.extend(dao_artifacts(entity, supplemental_queries, &label)?);
    Ok(artifacts)
}

/// The outcome of generating one entity
#[derive(Debug)]
pub struct EntityGeneration {
    /// Name of the entity the outcome belongs to
    pub entity: String,
    /// The artifacts, with paths prefixed by the configured directories, or
    /// the error that stopped this entity
    pub result: Result<Vec<GeneratedArtifact>>,
}

fn prefixed(directory: &str, artifact: GeneratedArtifact) -> GeneratedArtifact {
    GeneratedArtifact::new(format!("{}/{}", directory, artifact.path), artifact.content)
}

/// Generate artifacts for every configured entity
///
/// Each specification is resolved against the provided metadata by entity
/// name. Failures are per entity.
pub fn generate_all(
    entities: &[EntityMetadata],
    config: &GeneratorConfig,
    context: &GeneratorContext,
) -> Vec<EntityGeneration> {
    config
        .specifications
        .iter()
        .map(|specification| {
            let result = entities
                .iter()
                .find(|entity| entity.name == specification.entity)
                .ok_or_else(|| {
                    GeneratorError::configuration(format!(
                        "no metadata was provided for the specified entity '{}'",
                        specification.entity
                    ))
                })
                .and_then(|entity| {
                    let artifacts = generate_for_entity(
                        entity,
                        &specification.supplemental_queries,
                        context,
                    )?;
                    Ok(artifacts
                        .into_iter()
                        .enumerate()
                        .map(|(index, artifact)| {
                            // the terraform artifact always comes first
                            let directory = if index == 0 {
                                &config.directories.terraform
                            } else {
                                &config.directories.dao
                            };
                            prefixed(directory, artifact)
                        })
                        .collect::<Vec<_>>())
                });
            match &result {
                Ok(artifacts) => log::info!(
                    "planned {} artifacts for entity '{}'",
                    artifacts.len(),
                    specification.entity
                ),
                Err(error) => log::warn!(
                    "could not generate for entity '{}': {}",
                    specification.entity,
                    error
                ),
            }
            EntityGeneration {
                entity: specification.entity.clone(),
                result,
            }
        })
        .collect()
}
