//! Configuration for the generator
//!
//! Provides a builder pattern for configuring generation in code, and a JSON
//! loader for driving it from a declaration file.

use serde::Deserialize;

use crate::error::{GeneratorError, Result};
use crate::query::SupplementalQuery;

/// Where generated artifacts are written, relative to the declaration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectories {
    /// Directory for terraform table definitions
    pub terraform: String,
    /// Directory for TypeScript dao modules
    pub dao: String,
}

/// One entity to generate for, by name, with its supplemental queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpecification {
    /// Name of the entity, matched against the provided metadata
    pub entity: String,
    /// Additional access patterns beyond the fixed operations
    pub supplemental_queries: Vec<SupplementalQuery>,
}

/// Configuration for the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Output directories
    pub directories: OutputDirectories,
    /// Entities to generate for
    pub specifications: Vec<EntitySpecification>,
}

impl GeneratorConfig {
    /// Create a new configuration builder
    pub fn builder(
        terraform_directory: impl Into<String>,
        dao_directory: impl Into<String>,
    ) -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new(terraform_directory, dao_directory)
    }

    /// Load a configuration from a JSON declaration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let directories = raw.directories.ok_or_else(|| {
            GeneratorError::configuration("no 'directories' section was specified in the config")
        })?;
        let terraform = directories.terraform.ok_or_else(|| {
            GeneratorError::configuration("no 'directories.terraform' was specified in the config")
        })?;
        let dao = directories.dao.ok_or_else(|| {
            GeneratorError::configuration("no 'directories.dao' was specified in the config")
        })?;
        let specifications = raw.specifications.ok_or_else(|| {
            GeneratorError::configuration("no 'specifications' section was specified in the config")
        })?;
        Ok(Self {
            directories: OutputDirectories { terraform, dao },
            specifications: specifications
                .into_iter()
                .map(|specification| EntitySpecification {
                    entity: specification.entity,
                    supplemental_queries: specification.supplemental_queries,
                })
                .collect(),
        })
    }
}

// raw shape of the JSON declaration, before section validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    directories: Option<RawDirectories>,
    specifications: Option<Vec<RawSpecification>>,
}

#[derive(Debug, Deserialize)]
struct RawDirectories {
    terraform: Option<String>,
    dao: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSpecification {
    entity: String,
    #[serde(rename = "supplementalQueries", default)]
    supplemental_queries: Vec<SupplementalQuery>,
}

/// Builder for GeneratorConfig
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    directories: OutputDirectories,
    specifications: Vec<EntitySpecification>,
}

impl GeneratorConfigBuilder {
    /// Create a new builder with the output directories
    pub fn new(terraform_directory: impl Into<String>, dao_directory: impl Into<String>) -> Self {
        Self {
            directories: OutputDirectories {
                terraform: terraform_directory.into(),
                dao: dao_directory.into(),
            },
            specifications: Vec::new(),
        }
    }

    /// Add an entity to generate for
    pub fn specification(
        mut self,
        entity: impl Into<String>,
        supplemental_queries: Vec<SupplementalQuery>,
    ) -> Self {
        self.specifications.push(EntitySpecification {
            entity: entity.into(),
            supplemental_queries,
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> GeneratorConfig {
        GeneratorConfig {
            directories: self.directories,
            specifications: self.specifications,
        }
    }
}
