//! Supplemental query declarations and generated artifacts

use serde::{Deserialize, Serialize};

/// A supplemental query to expose on the generated data-access object
///
/// Declares a secondary access path beyond the identity and unique lookups:
/// the properties to filter on, and optionally the properties to sort on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalQuery {
    /// Ordered properties that make up the filter key
    #[serde(rename = "filterByKey")]
    pub filter_by_key: Vec<String>,

    /// Ordered properties that make up the sort key, if any
    #[serde(rename = "sortByKey", skip_serializing_if = "Option::is_none")]
    pub sort_by_key: Option<Vec<String>>,
}

impl SupplementalQuery {
    /// Declare a query filtering on the given properties
    pub fn filter_by(properties: Vec<String>) -> Self {
        Self {
            filter_by_key: properties,
            sort_by_key: None,
        }
    }

    /// Add a sort key to the query
    pub fn sort_by(mut self, properties: Vec<String>) -> Self {
        self.sort_by_key = Some(properties);
        self
    }
}

/// One generated output file
///
/// The path is relative to the output root for its artifact family; writing
/// it to disk is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Relative file path this artifact is expected to be created at
    pub path: String,

    /// The generated text content
    pub content: String,
}

impl GeneratedArtifact {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
