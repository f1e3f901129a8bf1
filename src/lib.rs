//! # dynamodb-dao-codegen
//!
//! A schema-driven generator of DynamoDB persistence layers.
//!
//! This crate turns entity metadata plus declared access patterns into two
//! kinds of deterministic artifacts: terraform definitions for the DynamoDB
//! tables and indexes an entity needs, and TypeScript data-access-object
//! modules that read and write those tables safely.
//!
//! ## Features
//!
//! - **Dual-Table Persistence**: An identity table keyed by uuid and a
//!   uniqueness table keyed by the natural key, kept consistent transactionally
//! - **Supplemental Queries**: One global secondary index and one generated
//!   query operation per declared filter/sort access pattern
//! - **Optimistic Creation Locking**: Generated upserts assert absence on
//!   creation and recover from lost races with a single retry
//! - **Sorted Range Queries**: `until`/`since` range modifiers with numeric
//!   sort attributes where numeric ordering is required
//! - **Deterministic Output**: The same metadata always produces byte-identical
//!   artifacts, so generated code can be committed and diffed
//!
//! ## Quick Start
//!
//! ```rust
//! use dynamodb_dao_codegen::{
//!     generate_all, EntityKind, EntityMetadata, GeneratorConfig, GeneratorContext,
//!     PropertyMetadata, PropertyType, SupplementalQuery,
//! };
//!
//! let sensor = EntityMetadata::new(
//!     "Sensor",
//!     EntityKind::Entity,
//!     vec![
//!         PropertyMetadata::new("serialNumber", PropertyType::String),
//!         PropertyMetadata::new("ownerUuid", PropertyType::String).nullable(),
//!         PropertyMetadata::new("createdAt", PropertyType::Date),
//!     ],
//! )
//! .unique_on(vec!["serialNumber".to_string()]);
//!
//! let config = GeneratorConfig::builder("provision/terraform", "src/data/dao")
//!     .specification(
//!         "Sensor",
//!         vec![SupplementalQuery::filter_by(vec!["ownerUuid".to_string()])
//!             .sort_by(vec!["createdAt".to_string()])],
//!     )
//!     .build();
//!
//! for outcome in generate_all(&[sensor], &config, &GeneratorContext::current()) {
//!     let artifacts = outcome.result.expect("generation failed");
//!     for artifact in artifacts {
//!         // write artifact.content to artifact.path
//!     }
//! }
//! ```
//!
//! ## Configuration
//!
//! Generation can also be driven from a JSON declaration:
//!
//! ```rust
//! use dynamodb_dao_codegen::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_json_str(
//!     r#"{
//!       "directories": { "terraform": "provision/terraform", "dao": "src/data/dao" },
//!       "specifications": [{ "entity": "Sensor" }]
//!     }"#,
//! ).unwrap();
//! ```

pub mod config;
pub mod dao;
pub mod error;
pub mod generate;
pub mod keys;
pub mod metadata;
pub mod naming;
pub mod query;
pub mod terraform;

// Re-export main types for convenience
pub use config::{
    EntitySpecification, GeneratorConfig, GeneratorConfigBuilder, OutputDirectories,
};
pub use error::{GeneratorError, Result};
pub use generate::{
    generate_all, generate_for_entity, EntityGeneration, GeneratorContext, GENERATOR_NAME,
};
pub use metadata::{
    EntityDecorations, EntityKind, EntityMetadata, PropertyMetadata, PropertyType,
    ReferencedEntity,
};
pub use query::{GeneratedArtifact, SupplementalQuery};

// Re-export the lower-level emitters for advanced users
pub use dao::dao_artifacts;
pub use keys::{KeyParameter, KeyRole};
pub use naming::{operation_name, secondary_index_name, validate_identifier};
pub use terraform::terraform_artifact;
