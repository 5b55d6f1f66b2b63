//! Stack outputs
//!
//! Outputs are symbolic until the engine has provisioned the resources they
//! point at. An [`OutputRef`] is written as `${resource.attribute}` and is
//! resolved against the engine's [`GlobalState`].

use crate::error::{CloudError, Result};
use crate::state::GlobalState;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reference to an attribute of a declared resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub resource: String,
    pub attribute: String,
}

impl OutputRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn resolve(&self, state: &GlobalState) -> Result<String> {
        state
            .attribute_text(&self.resource, &self.attribute)
            .ok_or_else(|| CloudError::UnresolvedOutput(self.to_string()))
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.resource, self.attribute)
    }
}

impl FromStr for OutputRef {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| CloudError::InvalidOutputRef(s.to_string()))?;

        match inner.split_once('.') {
            Some((resource, attribute)) if !resource.is_empty() && !attribute.is_empty() => {
                Ok(Self::new(resource, attribute))
            }
            _ => Err(CloudError::InvalidOutputRef(s.to_string())),
        }
    }
}

impl Serialize for OutputRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OutputRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An output is either one reference or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Single(OutputRef),
    List(Vec<OutputRef>),
}

/// Resolved counterpart of [`OutputValue`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedValue {
    Single(String),
    List(Vec<String>),
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Single(value) => write!(f, "{}", value),
            ResolvedValue::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Named stack outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outputs {
    entries: BTreeMap<String, OutputValue>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: OutputValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every output; fails on the first unavailable attribute
    pub fn resolve(&self, state: &GlobalState) -> Result<BTreeMap<String, ResolvedValue>> {
        self.entries
            .iter()
            .map(|(name, value)| {
                let resolved = match value {
                    OutputValue::Single(r) => ResolvedValue::Single(r.resolve(state)?),
                    OutputValue::List(refs) => ResolvedValue::List(
                        refs.iter()
                            .map(|r| r.resolve(state))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                };
                Ok((name.clone(), resolved))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ResourceState;

    fn state() -> GlobalState {
        let mut state = GlobalState::new();
        state.set_resource(
            "dokployMain".to_string(),
            ResourceState::new("ocid1.instance.oc1..main", "oci:Core/instance:Instance")
                .with_attribute("publicIp", serde_json::json!("203.0.113.10")),
        );
        state.set_resource(
            "dokployWorker1".to_string(),
            ResourceState::new("ocid1.instance.oc1..w1", "oci:Core/instance:Instance")
                .with_attribute("publicIp", serde_json::json!("203.0.113.11")),
        );
        state
    }

    #[test]
    fn test_display_and_parse() {
        let r = OutputRef::new("dokployMain", "publicIp");
        assert_eq!(r.to_string(), "${dokployMain.publicIp}");
        assert_eq!("${dokployMain.publicIp}".parse::<OutputRef>().unwrap(), r);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["dokployMain.publicIp", "${dokployMain}", "${.publicIp}", "${a.}"] {
            assert!(bad.parse::<OutputRef>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_serialized_as_string() {
        let value = OutputValue::List(vec![
            OutputRef::new("dokployWorker1", "publicIp"),
            OutputRef::new("dokployWorker2", "publicIp"),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["${dokployWorker1.publicIp}", "${dokployWorker2.publicIp}"])
        );

        let back: OutputValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_resolve() {
        let mut outputs = Outputs::new();
        outputs.insert(
            "mainInstancePublicIp",
            OutputValue::Single(OutputRef::new("dokployMain", "publicIp")),
        );
        outputs.insert(
            "workerInstancePublicIps",
            OutputValue::List(vec![OutputRef::new("dokployWorker1", "publicIp")]),
        );

        let resolved = outputs.resolve(&state()).unwrap();
        assert_eq!(
            resolved["mainInstancePublicIp"],
            ResolvedValue::Single("203.0.113.10".to_string())
        );
        assert_eq!(
            resolved["workerInstancePublicIps"],
            ResolvedValue::List(vec!["203.0.113.11".to_string()])
        );
    }

    #[test]
    fn test_resolve_names_missing_attribute() {
        let mut outputs = Outputs::new();
        outputs.insert(
            "workerInstancePublicIps",
            OutputValue::List(vec![
                OutputRef::new("dokployWorker1", "publicIp"),
                OutputRef::new("dokployWorker2", "publicIp"),
            ]),
        );

        let err = outputs.resolve(&state()).unwrap_err();
        assert!(err.to_string().contains("${dokployWorker2.publicIp}"));
    }

    #[test]
    fn test_empty_list_resolves() {
        let mut outputs = Outputs::new();
        outputs.insert("workerInstancePublicIps", OutputValue::List(Vec::new()));
        let resolved = outputs.resolve(&GlobalState::new()).unwrap();
        assert_eq!(
            resolved["workerInstancePublicIps"],
            ResolvedValue::List(Vec::new())
        );
    }
}
