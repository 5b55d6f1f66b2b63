//! Resource declarations
//!
//! A [`ResourceConfig`] is one declaration handed to the provisioning engine.
//! A [`ResourceSet`] keeps them in declaration order, which is also the order
//! dependencies are satisfied in.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// Engine type token (e.g. "oci:Core/vcn:Vcn")
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Logical name, unique within a set
    pub name: String,

    /// Provider plugin name
    pub provider: String,

    /// Logical names this resource references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Resource body as the engine consumes it
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            provider: provider.into(),
            depends_on: Vec::new(),
            config,
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }
}

/// Ordered set of declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSet {
    resources: Vec<ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration; logical names must be unique
    pub fn add(&mut self, resource: ResourceConfig) -> Result<()> {
        if self.contains(&resource.name) {
            return Err(CloudError::DuplicateResource(resource.name));
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.iter()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Check that every `depends_on` names a resource declared earlier
    pub fn validate_dependencies(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            for dependency in &resource.depends_on {
                if !seen.contains(dependency.as_str()) {
                    return Err(CloudError::UnknownDependency {
                        resource: resource.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            seen.insert(resource.name.as_str());
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a ResourceConfig;
    type IntoIter = std::slice::Iter<'a, ResourceConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
