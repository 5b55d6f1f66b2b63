//! Configuration resolution
//!
//! Turns a [`RawConfig`] into a fully populated [`FleetConfig`]. Every check
//! happens here, so a `FleetConfig` that exists is always valid.

use crate::error::{ConfigError, Result};
use crate::stack::RawConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod keys {
    pub const SSH_AUTHORIZED_KEYS: &str = "sshAuthorizedKeys";
    pub const COMPARTMENT_ID: &str = "compartmentId";
    pub const SOURCE_IMAGE_ID: &str = "sourceImageId";
    pub const NUM_WORKER_INSTANCES: &str = "numWorkerInstances";
    pub const AVAILABILITY_DOMAIN_MAIN: &str = "availabilityDomainMain";
    pub const AVAILABILITY_DOMAIN_WORKERS: &str = "availabilityDomainWorkers";
    pub const INSTANCE_SHAPE: &str = "instanceShape";
    pub const MEMORY_IN_GBS: &str = "memoryInGbs";
    pub const OCPUS: &str = "ocpus";
    pub const MAIN_STARTUP_SCRIPT: &str = "mainStartupScript";
    pub const WORKER_STARTUP_SCRIPT: &str = "workerStartupScript";
}

use keys::*;

/// Keys without a default
pub const REQUIRED_KEYS: &[&str] = &[
    SSH_AUTHORIZED_KEYS,
    COMPARTMENT_ID,
    SOURCE_IMAGE_ID,
    AVAILABILITY_DOMAIN_MAIN,
    AVAILABILITY_DOMAIN_WORKERS,
];

/// Defaults for optional keys
pub const DEFAULTS: &[(&str, &str)] = &[
    (NUM_WORKER_INSTANCES, "1"),
    (INSTANCE_SHAPE, "VM.Standard.A1.Flex"),
    (MEMORY_IN_GBS, "6"),
    (OCPUS, "1"),
    (MAIN_STARTUP_SCRIPT, "bin/dokploy-main.sh"),
    (WORKER_STARTUP_SCRIPT, "bin/dokploy-worker.sh"),
];

/// Every key the resolver reads
pub const KNOWN_KEYS: &[&str] = &[
    SSH_AUTHORIZED_KEYS,
    COMPARTMENT_ID,
    SOURCE_IMAGE_ID,
    NUM_WORKER_INSTANCES,
    AVAILABILITY_DOMAIN_MAIN,
    AVAILABILITY_DOMAIN_WORKERS,
    INSTANCE_SHAPE,
    MEMORY_IN_GBS,
    OCPUS,
    MAIN_STARTUP_SCRIPT,
    WORKER_STARTUP_SCRIPT,
];

/// Upper bound for `numWorkerInstances`
pub const MAX_WORKER_INSTANCES: u32 = 100;

pub fn default_for(key: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, value)| *value)
}

/// Validated fleet configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetConfig {
    /// Public key installed on every node
    pub ssh_authorized_keys: String,

    /// Compartment owning every resource
    pub compartment_id: String,

    /// Boot image for every node
    pub source_image_id: String,

    pub num_worker_instances: u32,

    /// Availability domain of the main node
    pub availability_domain_main: String,

    /// Availability domain shared by all workers
    pub availability_domain_workers: String,

    pub instance_shape: String,
    pub memory_in_gbs: u32,
    pub ocpus: u32,

    pub main_startup_script: PathBuf,
    pub worker_startup_script: PathBuf,
}

impl FleetConfig {
    /// Apply defaults and validate
    pub fn resolve(raw: &RawConfig) -> Result<Self> {
        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| raw.get(key).is_none_or(|v| v.trim().is_empty()))
            .map(|key| (*key).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let config = Self {
            ssh_authorized_keys: required(raw, SSH_AUTHORIZED_KEYS),
            compartment_id: required(raw, COMPARTMENT_ID),
            source_image_id: required(raw, SOURCE_IMAGE_ID),
            num_worker_instances: parse_count(
                NUM_WORKER_INSTANCES,
                optional(raw, NUM_WORKER_INSTANCES),
            )?,
            availability_domain_main: required(raw, AVAILABILITY_DOMAIN_MAIN),
            availability_domain_workers: required(raw, AVAILABILITY_DOMAIN_WORKERS),
            instance_shape: optional(raw, INSTANCE_SHAPE).to_string(),
            memory_in_gbs: parse_positive(MEMORY_IN_GBS, optional(raw, MEMORY_IN_GBS))?,
            ocpus: parse_positive(OCPUS, optional(raw, OCPUS))?,
            main_startup_script: resolve_path(
                raw.base_dir(),
                optional(raw, MAIN_STARTUP_SCRIPT),
            ),
            worker_startup_script: resolve_path(
                raw.base_dir(),
                optional(raw, WORKER_STARTUP_SCRIPT),
            ),
        };

        tracing::debug!(
            workers = config.num_worker_instances,
            shape = %config.instance_shape,
            "Resolved fleet configuration"
        );
        Ok(config)
    }
}

/// Shorthand for [`FleetConfig::resolve`]
pub fn resolve(raw: &RawConfig) -> Result<FleetConfig> {
    FleetConfig::resolve(raw)
}

// Only called after the missing-key check.
fn required(raw: &RawConfig, key: &str) -> String {
    raw.get(key).unwrap_or_default().to_string()
}

fn optional<'a>(raw: &'a RawConfig, key: &str) -> &'a str {
    raw.get(key)
        .or_else(|| default_for(key))
        .unwrap_or_default()
}

fn parse_positive(key: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a positive integer",
        }),
    }
}

fn parse_count(key: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n <= MAX_WORKER_INSTANCES => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected an integer from 0 to 100",
        }),
    }
}

fn resolve_path(base: Option<&Path>, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
