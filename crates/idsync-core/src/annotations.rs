//! Side annotations attached to resource types, resources and call results.

use serde::{Deserialize, Serialize};

/// A single typed annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// The annotated resource owns children of the named resource type.
    ChildResourceType {
        /// Child resource type id.
        resource_type_id: String,
    },
    /// The driver should not ask this resource type for entitlements or grants.
    SkipEntitlementsAndGrants,
}

/// Ordered, duplicate-free annotation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    /// Create an empty annotation list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an annotation, replacing an equal one already present.
    pub fn update(&mut self, annotation: Annotation) {
        if !self.0.contains(&annotation) {
            self.0.push(annotation);
        }
    }

    /// Builder: add an annotation.
    #[must_use]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.update(annotation);
        self
    }

    /// Check whether an annotation is present.
    #[must_use]
    pub fn contains(&self, annotation: &Annotation) -> bool {
        self.0.contains(annotation)
    }

    /// Child resource type ids announced by these annotations.
    pub fn child_resource_types(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|a| match a {
            Annotation::ChildResourceType { resource_type_id } => Some(resource_type_id.as_str()),
            Annotation::SkipEntitlementsAndGrants => None,
        })
    }

    /// Check if there are no annotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the annotations.
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.0.iter()
    }
}
